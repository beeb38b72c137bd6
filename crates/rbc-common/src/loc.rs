//! Source location tracking for AST nodes and diagnostics.
//!
//! The resolver works on line/column pairs supplied by the parser
//! collaborator. Locations are small and cheap to copy; synthetic nodes
//! and internal errors use the `NONE` sentinel, which renders as `-1:-1`.

use serde::{Deserialize, Serialize};

/// A line/column position in a source unit (1-indexed lines, 0-indexed
/// columns, matching what the external lexer reports).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLoc {
    pub line: i32,
    pub column: i32,
}

impl SourceLoc {
    /// Sentinel for nodes with no source position (synthetic nodes,
    /// internal-invariant errors).
    pub const NONE: SourceLoc = SourceLoc {
        line: -1,
        column: -1,
    };

    #[inline]
    #[must_use]
    pub const fn new(line: i32, column: i32) -> Self {
        SourceLoc { line, column }
    }

    /// Check if this is the no-position sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.line < 0
    }
}

impl std::fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl From<(i32, i32)> for SourceLoc {
    fn from((line, column): (i32, i32)) -> Self {
        SourceLoc { line, column }
    }
}

/// Line map for byte offset -> line/column conversion.
///
/// The external lexer usually reports positions directly, but driver
/// code that only has a byte offset (for example when surfacing an I/O
/// or parse failure) can build one of these from the unit text.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (`line_starts[0]` is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    #[must_use]
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];

        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            } else if ch == '\r' {
                // \r\n is handled by the \n branch; bare \r ends a line
                let next_idx = i + 1;
                if source.as_bytes().get(next_idx) != Some(&b'\n') {
                    line_starts.push(u32::try_from(next_idx).unwrap_or(u32::MAX));
                }
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a `SourceLoc` (1-indexed line).
    #[must_use]
    pub fn locate(&self, offset: u32, source: &str) -> SourceLoc {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };

        let line_start = usize::try_from(self.line_starts.get(line).copied().unwrap_or(0))
            .unwrap_or(usize::MAX)
            .min(source.len());
        let end = usize::try_from(offset).unwrap_or(source.len()).min(source.len());
        let start = line_start.min(end);
        let column = source.get(start..end).map_or(0, |s| s.chars().count());

        SourceLoc {
            line: i32::try_from(line + 1).unwrap_or(i32::MAX),
            column: i32::try_from(column).unwrap_or(i32::MAX),
        }
    }

    /// Get the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
#[path = "../tests/loc_tests.rs"]
mod tests;
