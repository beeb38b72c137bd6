//! Pipeline composition: `read ⨟ lex ⨟ parse ⨟ resolve`.
//!
//! Per-unit transforms (read, and the external lex/parse collaborators)
//! run in parallel across files and fail fast on the first error. The
//! terminal resolve phase runs after the join, one namespace at a time,
//! because it mutates the shared symbol and type tables.

use rayon::prelude::*;
use rbc_ast::Ast;
use rbc_checker::{ResolveOutcome, Resolver, ResolverOptions};
use rbc_common::{CompileError, Diagnostic};
use rbc_binder::NamespaceId;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::environment::Environment;
use crate::unit::{Unit, UnitStage};

/// One per-unit phase of the pipeline.
///
/// Implementations assert nothing themselves: the pipeline checks
/// `input_stage` before calling `apply` and advances the unit to
/// `output_stage` after it succeeds. External lexer/parser
/// collaborators implement this trait; stateful ones keep their own
/// interior-locked storage, since `apply` runs from worker threads.
pub trait UnitTransform: Send + Sync {
    fn name(&self) -> &'static str;
    fn input_stage(&self) -> UnitStage;
    fn output_stage(&self) -> UnitStage;
    fn apply(&self, unit: &mut Unit) -> Result<(), CompileError>;
}

/// Built-in read phase: file contents into `unit.source`.
pub struct ReadSource;

impl UnitTransform for ReadSource {
    fn name(&self) -> &'static str {
        "read"
    }

    fn input_stage(&self) -> UnitStage {
        UnitStage::Init
    }

    fn output_stage(&self) -> UnitStage {
        UnitStage::Read
    }

    fn apply(&self, unit: &mut Unit) -> Result<(), CompileError> {
        let text = std::fs::read_to_string(&unit.path).map_err(|e| {
            CompileError::internal(format!("failed to read {}: {e}", unit.path.display()))
        })?;
        unit.source = Some(text);
        Ok(())
    }
}

/// A pipeline failure attributed to the unit it occurred in (when it
/// occurred in one).
#[derive(Clone, Debug)]
pub struct PipelineError {
    pub path: Option<PathBuf>,
    pub error: CompileError,
}

impl PipelineError {
    fn in_unit(path: &PathBuf, error: CompileError) -> Self {
        Self {
            path: Some(path.clone()),
            error,
        }
    }

    /// Render for reporting.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let file = self
            .path
            .as_ref()
            .map_or_else(|| "<environment>".to_string(), |p| p.display().to_string());
        self.error.to_diagnostic(file)
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_diagnostic())
    }
}

impl std::error::Error for PipelineError {}

/// What a full pipeline run produced.
#[derive(Clone, Debug, Default)]
pub struct PipelineReport {
    /// Resolve outcome per namespace that owns units.
    pub outcomes: Vec<(NamespaceId, ResolveOutcome)>,
    /// True when every namespace resolved completely.
    pub fully_resolved: bool,
}

/// Ordered composition of unit transforms with an optional terminal
/// resolve phase.
pub struct Pipeline {
    transforms: Vec<Box<dyn UnitTransform>>,
    resolve: Option<ResolverOptions>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
            resolve: None,
        }
    }

    /// Append a per-unit transform.
    #[must_use]
    pub fn then(mut self, transform: impl UnitTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Terminate with the resolver.
    #[must_use]
    pub fn then_resolve(mut self, options: ResolverOptions) -> Self {
        self.resolve = Some(options);
        self
    }

    /// Run every phase over the environment. Fails fast on the first
    /// error; on success every unit has advanced through each
    /// transform's output stage.
    pub fn run(&self, env: &mut Environment) -> Result<PipelineReport, PipelineError> {
        for transform in &self.transforms {
            info!(phase = transform.name(), "running unit transform");
            Self::apply_transform(transform.as_ref(), env.units_mut())?;
        }

        let mut report = PipelineReport {
            outcomes: Vec::new(),
            fully_resolved: true,
        };
        if let Some(options) = self.resolve {
            self.run_resolve(env, options, &mut report)?;
        }
        Ok(report)
    }

    fn apply_transform(
        transform: &dyn UnitTransform,
        units: &mut [Unit],
    ) -> Result<(), PipelineError> {
        // Unit phases are independent per file; join before resolve.
        units.par_iter_mut().try_for_each(|unit| {
            unit.assert_stage(transform.input_stage())
                .map_err(|e| PipelineError::in_unit(&unit.path, e))?;
            transform
                .apply(unit)
                .map_err(|e| PipelineError::in_unit(&unit.path, e))?;
            unit.advance_to(transform.output_stage())
                .map_err(|e| PipelineError::in_unit(&unit.path, e))
        })
    }

    fn run_resolve(
        &self,
        env: &mut Environment,
        options: ResolverOptions,
        report: &mut PipelineReport,
    ) -> Result<(), PipelineError> {
        let namespaces = env.namespaces_with_units();
        let resolver = Resolver::new(options);
        let (tree, symbols, types, units) = env.split_for_resolve();

        for ns in namespaces {
            info!(ns = ns.0, "resolving namespace");
            for unit in units.iter().filter(|u| u.ns == ns) {
                unit.assert_stage(UnitStage::Parsed)
                    .map_err(|e| PipelineError::in_unit(&unit.path, e))?;
            }

            let mut asts: Vec<&mut Ast> = Vec::new();
            for unit in units.iter_mut().filter(|u| u.ns == ns) {
                let ast = unit.ast.as_mut().ok_or_else(|| {
                    PipelineError::in_unit(
                        &unit.path,
                        CompileError::internal("parsed unit has no AST"),
                    )
                })?;
                asts.push(ast);
            }

            let outcome = resolver
                .resolve_namespace(symbols, types, tree, ns, &mut asts)
                .map_err(|error| PipelineError { path: None, error })?;
            debug!(
                ns = ns.0,
                fully_resolved = outcome.fully_resolved,
                attempts = outcome.stats.attempts,
                "namespace resolved"
            );

            let stage = if outcome.fully_resolved {
                UnitStage::FullyResolved
            } else {
                UnitStage::PartiallyResolved
            };
            for unit in units.iter_mut().filter(|u| u.ns == ns) {
                if stage > unit.stage() {
                    unit.advance_to(stage)
                        .map_err(|e| PipelineError::in_unit(&unit.path, e))?;
                }
            }

            report.fully_resolved &= outcome.fully_resolved;
            report.outcomes.push((ns, outcome));
        }
        Ok(())
    }
}

/// Scan `root` and run `pipeline` over it.
pub fn compile_root(root: &std::path::Path, pipeline: &Pipeline) -> anyhow::Result<PipelineReport> {
    let mut env = Environment::from_root(root)?;
    let report = pipeline
        .run(&mut env)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(report)
}
