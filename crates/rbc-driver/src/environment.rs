//! The compilation environment.

use anyhow::{Context, Result};
use rbc_binder::{NamespaceId, NamespaceTree, SymbolTable};
use rbc_solver::TypeTable;
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::unit::Unit;

/// Source file extension the scanner picks up.
pub const SOURCE_EXTENSION: &str = "rbc";

/// Everything resolution works on: the namespace tree, the shared
/// symbol and type tables, and the units grouped under their
/// namespaces.
#[derive(Debug)]
pub struct Environment {
    pub tree: NamespaceTree,
    pub symbols: SymbolTable,
    pub types: TypeTable,
    units: Vec<Unit>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: NamespaceTree::new(),
            symbols: SymbolTable::new(),
            types: TypeTable::new(),
            units: Vec::new(),
        }
    }

    /// Scan a root directory: every subdirectory becomes a namespace
    /// (dotted path from its components), every `.rbc` file a unit
    /// attached to its directory's namespace. Files directly under the
    /// root land in `main`.
    pub fn from_root(root: &Path) -> Result<Self> {
        let mut env = Self::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("scanning {}", root.display()))?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| unreachable!("walkdir yields children of root"));
            if rel.as_os_str().is_empty() {
                continue;
            }
            // Skip hidden files and directories.
            if rel.components().any(|c| c.as_os_str().to_string_lossy().starts_with('.')) {
                continue;
            }

            if entry.file_type().is_dir() {
                let path = dotted_path(rel);
                env.tree
                    .register_path(&path)
                    .with_context(|| format!("registering namespace for {}", rel.display()))?;
            } else if entry.path().extension().is_some_and(|e| e == SOURCE_EXTENSION) {
                let ns_path = match rel.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => dotted_path(parent),
                    _ => "main".to_string(),
                };
                let ns = env
                    .tree
                    .register_path(&ns_path)
                    .with_context(|| format!("registering namespace for {}", rel.display()))?;
                debug!(path = %entry.path().display(), ns = %ns_path, "discovered unit");
                env.units.push(Unit::new(entry.path().to_path_buf(), ns));
            }
        }

        // Deterministic unit order: scope numbering within a namespace
        // depends on it.
        env.units.sort_by(|a, b| (a.ns, &a.path).cmp(&(b.ns, &b.path)));
        Ok(env)
    }

    /// Attach an externally constructed unit (tests, embedders).
    pub fn add_unit(&mut self, unit: Unit) {
        self.units.push(unit);
        self.units.sort_by(|a, b| (a.ns, &a.path).cmp(&(b.ns, &b.path)));
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    /// Namespaces that own at least one unit, in id order.
    #[must_use]
    pub fn namespaces_with_units(&self) -> Vec<NamespaceId> {
        let mut grouped: FxHashMap<NamespaceId, usize> = FxHashMap::default();
        for unit in &self.units {
            *grouped.entry(unit.ns).or_default() += 1;
        }
        let mut ids: Vec<_> = grouped.into_keys().collect();
        ids.sort();
        ids
    }

    /// Split borrow for the resolve phase: shared tree, mutable tables
    /// and units.
    pub(crate) fn split_for_resolve(
        &mut self,
    ) -> (&NamespaceTree, &mut SymbolTable, &mut TypeTable, &mut [Unit]) {
        (
            &self.tree,
            &mut self.symbols,
            &mut self.types,
            &mut self.units,
        )
    }
}

/// `a/b/c` -> `a.b.c`
fn dotted_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}
