//! The namespace tree.
//!
//! Namespaces mirror the source directory layout: each directory is a
//! node, addressed by a dotted path (`a.b.c`). Nodes live in a flat
//! arena and refer to each other by id — parents hold child ids,
//! children hold a parent id — so the natural parent/child cycle never
//! becomes an ownership cycle.

use rbc_common::{CompileError, NamespaceErrorKind, SourceLoc};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Stable id of a namespace node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub u32);

impl NamespaceId {
    pub const ROOT: NamespaceId = NamespaceId(0);
}

/// One node of the tree. The root has the empty name and path.
#[derive(Clone, Debug)]
pub struct NamespaceNode {
    pub name: String,
    pub full_path: String,
    pub id: NamespaceId,
    pub parent: Option<NamespaceId>,
    pub children: Vec<NamespaceId>,
}

/// Tree of dotted-path namespaces with id <-> path maps kept mutually
/// consistent. `main` is pre-registered.
#[derive(Debug)]
pub struct NamespaceTree {
    nodes: Vec<NamespaceNode>,
    paths: FxHashMap<String, NamespaceId>,
}

impl Default for NamespaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTree {
    #[must_use]
    pub fn new() -> Self {
        let root = NamespaceNode {
            name: String::new(),
            full_path: String::new(),
            id: NamespaceId::ROOT,
            parent: None,
            children: Vec::new(),
        };
        let mut paths = FxHashMap::default();
        paths.insert(String::new(), NamespaceId::ROOT);

        let mut tree = Self {
            nodes: vec![root],
            paths,
        };
        tree.register_path("main")
            .unwrap_or_else(|_| unreachable!("'main' is a valid path"));
        tree
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NamespaceId) -> Option<&NamespaceNode> {
        self.nodes.get(id.0 as usize)
    }

    #[must_use]
    pub fn path_of(&self, id: NamespaceId) -> Option<&str> {
        self.node(id).map(|n| n.full_path.as_str())
    }

    /// Direct child of `parent` named `name`.
    #[must_use]
    pub fn child_of(&self, parent: NamespaceId, name: &str) -> Option<NamespaceId> {
        let node = self.node(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0 as usize].name == name)
    }

    /// Resolve a dotted path to its node id.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Option<NamespaceId> {
        self.paths.get(path).copied()
    }

    /// Register a dotted path, creating any missing ancestors.
    /// Idempotent: an existing path returns its id unchanged.
    pub fn register_path(&mut self, path: &str) -> Result<NamespaceId, CompileError> {
        if let Some(id) = self.resolve_path(path) {
            return Ok(id);
        }
        if !is_valid_path(path) {
            return Err(CompileError::namespace(
                NamespaceErrorKind::InvalidPath,
                path,
                SourceLoc::NONE,
            ));
        }

        let mut current = NamespaceId::ROOT;
        let mut current_path = String::new();
        for segment in path.split('.') {
            if current_path.is_empty() {
                current_path.push_str(segment);
            } else {
                current_path.push('.');
                current_path.push_str(segment);
            }

            current = if let Some(existing) = self.child_of(current, segment) {
                existing
            } else {
                let id = NamespaceId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
                self.nodes.push(NamespaceNode {
                    name: segment.to_string(),
                    full_path: current_path.clone(),
                    id,
                    parent: Some(current),
                    children: Vec::new(),
                });
                self.nodes[current.0 as usize].children.push(id);
                self.paths.insert(current_path.clone(), id);
                debug!(path = %current_path, id = id.0, "registered namespace");
                id
            };
        }
        Ok(current)
    }

    /// Resolve a dotted path, reporting `PathNotFound` at `loc`.
    pub fn require_path(&self, path: &str, loc: SourceLoc) -> Result<NamespaceId, CompileError> {
        self.resolve_path(path).ok_or_else(|| {
            CompileError::namespace(NamespaceErrorKind::PathNotFound, path, loc)
        })
    }

    /// Ids in creation order (root first).
    pub fn ids(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        (0..self.nodes.len()).map(|i| NamespaceId(u32::try_from(i).unwrap_or(u32::MAX)))
    }
}

fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
#[path = "../tests/namespace_tests.rs"]
mod tests;
