//! Declaration modifiers.

use bitflags::bitflags;

bitflags! {
    /// Source-level modifiers on declarations and parameters.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const MUTABLE  = 1 << 0;
        const PUBLIC   = 1 << 1;
        const CONST    = 1 << 2;
        const OPTIONAL = 1 << 3;
    }
}

impl Modifiers {
    /// Whether a binding with these modifiers accepts reassignment.
    #[must_use]
    pub const fn is_reassignable(&self) -> bool {
        self.contains(Modifiers::MUTABLE) && !self.contains(Modifiers::CONST)
    }
}
