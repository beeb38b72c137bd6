//! Compilation units and their stage machine.

use rbc_ast::Ast;
use rbc_binder::NamespaceId;
use rbc_common::CompileError;
use std::path::PathBuf;

/// Where a unit is in the compile pipeline. Stages are strictly
/// ordered; a transform asserts its input stage and a unit never moves
/// backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitStage {
    Init,
    Read,
    Lexed,
    Parsed,
    PartiallyResolved,
    FullyResolved,
}

impl UnitStage {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            UnitStage::Init => "INIT",
            UnitStage::Read => "READ",
            UnitStage::Lexed => "LEXED",
            UnitStage::Parsed => "PARSED",
            UnitStage::PartiallyResolved => "PARTIALLY_RESOLVED",
            UnitStage::FullyResolved => "FULLY_RESOLVED",
        }
    }
}

impl std::fmt::Display for UnitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One source file moving through the pipeline.
///
/// `source` is filled by the read phase; `ast` by the external parse
/// collaborator. Resolution annotates `ast` in place.
#[derive(Debug)]
pub struct Unit {
    pub path: PathBuf,
    pub ns: NamespaceId,
    pub source: Option<String>,
    pub ast: Option<Ast>,
    stage: UnitStage,
}

impl Unit {
    #[must_use]
    pub fn new(path: PathBuf, ns: NamespaceId) -> Self {
        Self {
            path,
            ns,
            source: None,
            ast: None,
            stage: UnitStage::Init,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> UnitStage {
        self.stage
    }

    /// Check the unit is at `expected` before a transform runs.
    pub fn assert_stage(&self, expected: UnitStage) -> Result<(), CompileError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(CompileError::internal(format!(
                "unit '{}' is at stage {}, expected {}",
                self.path.display(),
                self.stage,
                expected
            )))
        }
    }

    /// Move the unit forward. Downgrades are refused.
    pub fn advance_to(&mut self, stage: UnitStage) -> Result<(), CompileError> {
        if stage <= self.stage {
            return Err(CompileError::internal(format!(
                "unit '{}' cannot move from {} back to {}",
                self.path.display(),
                self.stage,
                stage
            )));
        }
        self.stage = stage;
        Ok(())
    }
}
