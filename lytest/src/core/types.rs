//! Shared result types for comparison and viewer dispatch.

use std::fmt;

/// Tolerance in database units when none is given.
pub const DEFAULT_TOLERANCE: u32 = 1;

/// Result of an XOR comparison between two layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XorOutcome {
    /// No geometry differs beyond the tolerance.
    Match,
    /// The layouts differ.
    Mismatch,
}

/// Viewer pane a layout is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPane {
    Reference,
    Test,
}

impl ViewerPane {
    /// Numeric mode understood by the viewer (reference = 1, test = 2).
    pub fn mode(self) -> u8 {
        match self {
            ViewerPane::Reference => 1,
            ViewerPane::Test => 2,
        }
    }
}

impl fmt::Display for ViewerPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerPane::Reference => f.write_str("reference"),
            ViewerPane::Test => f.write_str("test"),
        }
    }
}
