//! Typed failures for the routing core.
//!
//! Per-pool and per-edge errors (`MalformedPoolName`, `Convergence`,
//! `InvalidQuote`) are absorbed where they occur: the offending pool or edge
//! drops out of consideration and the scan continues. Route- and
//! encode-level errors surface to the caller.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RouterError {
    /// Pool name does not match the family encoding rules.
    MalformedPoolName { name: String, reason: String },

    /// An iterative solver hit its iteration cap before reaching tolerance.
    Convergence { iterations: usize },

    /// A quote produced a negative or non-finite amount.
    InvalidQuote,

    /// No path from source to destination within the hop bound.
    NoRouteFound {
        from: String,
        to: String,
        max_hops: usize,
    },

    /// More hops than any on-chain entry point supports.
    RouteTooLong { hops: usize },

    /// Caller-supplied wallet balance cannot cover the route input.
    InsufficientBalance { required: f64, available: f64 },

    /// A pool weight has no matching on-chain generic type name.
    UnencodableWeight { weight: f64 },

    /// Request parameter outside the allowed range.
    Validation(String),

    /// Transport-level failure from the data source or submitter.
    Source(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::MalformedPoolName { name, reason } => {
                write!(f, "malformed pool name {:?}: {}", name, reason)
            }
            RouterError::Convergence { iterations } => {
                write!(f, "solver did not converge within {} iterations", iterations)
            }
            RouterError::InvalidQuote => {
                write!(f, "quote produced a negative or non-finite amount")
            }
            RouterError::NoRouteFound { from, to, max_hops } => {
                write!(f, "no route from {} to {} within {} hops", from, to, max_hops)
            }
            RouterError::RouteTooLong { hops } => {
                write!(f, "route has {} hops, on-chain entry points support at most 3", hops)
            }
            RouterError::InsufficientBalance { required, available } => {
                write!(
                    f,
                    "insufficient balance: route needs {} but wallet holds {}",
                    required, available
                )
            }
            RouterError::UnencodableWeight { weight } => {
                write!(
                    f,
                    "weight {} is not a whole percentage and has no on-chain type name",
                    weight
                )
            }
            RouterError::Validation(msg) => write!(f, "invalid request: {}", msg),
            RouterError::Source(msg) => write!(f, "data source error: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}
