//! Phase 2: The Brain (Route Search)
//!
//! Pure computation: swap quoting for both pool families and the layered
//! search that picks the best conversion path over the graph.

mod finder;
pub mod swap_math;

pub use finder::{Route, RouteFinder, RouteRequest, SwapStep, TradeDirection, DEFAULT_MAX_HOPS};
