//! Relaxation strategies.
//!
//! Matching starts strict (all query movies must be covered) and relaxes in
//! a fixed sequence of (fraction, mode) steps until a neighbor clears the
//! similarity threshold. The sequence and its order are part of the service
//! contract: changing either changes which user a given query matches.

use serde::Serialize;
use std::fmt;

/// How a subset of the query's movies is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubsetMode {
    /// Every query movie
    All,
    /// A uniform draw without replacement from the per-request stream
    Random,
    /// The most popular query movies per the popularity index
    Popular,
}

impl fmt::Display for SubsetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetMode::All => write!(f, "all"),
            SubsetMode::Random => write!(f, "random"),
            SubsetMode::Popular => write!(f, "popular"),
        }
    }
}

/// One step of the relaxation sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelaxationStep {
    /// Fraction of the query's movies the subset targets
    pub fraction: f32,
    pub mode: SubsetMode,
}

impl RelaxationStep {
    pub const fn new(fraction: f32, mode: SubsetMode) -> Self {
        Self { fraction, mode }
    }
}

impl fmt::Display for RelaxationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}% {}", self.fraction * 100.0, self.mode)
    }
}

/// The fixed strategy sequence, strictest first
pub const RELAXATION_SEQUENCE: [RelaxationStep; 7] = [
    RelaxationStep::new(1.0, SubsetMode::All),
    RelaxationStep::new(0.75, SubsetMode::Random),
    RelaxationStep::new(0.75, SubsetMode::Popular),
    RelaxationStep::new(0.5, SubsetMode::Random),
    RelaxationStep::new(0.5, SubsetMode::Popular),
    RelaxationStep::new(0.25, SubsetMode::Random),
    RelaxationStep::new(0.25, SubsetMode::Popular),
];
