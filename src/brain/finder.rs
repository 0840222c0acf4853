//! Route search - layered relaxation over the pool graph.
//!
//! Bellman-Ford restricted to `max_hops` layers, maximizing output instead
//! of minimizing cost. Layer h holds the best amount of each token reachable
//! in exactly h hops; after filling every layer, the best completed layer at
//! the destination wins, so a short route beats a long one that delivers
//! less. Relaxation visits edges in insertion order (pool listing order,
//! then ordered-pair order) and only a strictly greater amount replaces a
//! slot, which pins the tie-break and makes results reproducible.

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::brain::swap_math;
use crate::cartographer::{Pool, RouteGraph};
use crate::error::RouterError;
use crate::tokens;

/// Hop bound used by the bot. The search itself accepts any bound; the
/// on-chain entry points cap execution at 3 hops.
pub const DEFAULT_MAX_HOPS: usize = 3;

/// A route search request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    pub amount_in: f64,
    pub max_hops: usize,
}

/// One traversed edge with resolved coin types.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapStep {
    pub from_coin: String,
    pub to_coin: String,
    pub pool: Pool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    ExactInput,
    /// Representable but produced by no caller; the encoder rejects it.
    ExactOutput,
}

/// A found conversion: ordered hops, the fixed input, and the quoted output
/// before any slippage adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub steps: Vec<SwapStep>,
    pub amount_in: f64,
    pub amount_out: f64,
    pub direction: TradeDirection,
}

impl Route {
    pub fn hop_count(&self) -> usize {
        self.steps.len()
    }

    /// Coin chain actually traversed: input, intermediates, output.
    pub fn coin_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.first() {
            path.push(first.from_coin.as_str());
        }
        for step in &self.steps {
            path.push(step.to_coin.as_str());
        }
        path
    }

    pub fn path_display(&self) -> String {
        self.coin_path()
            .iter()
            .map(|address| self.symbol_for(address))
            .collect::<Vec<_>>()
            .join(" → ")
    }

    fn symbol_for(&self, address: &str) -> String {
        for step in &self.steps {
            if let Some(index) = step.pool.asset_index(address) {
                return step.pool.coins[index].symbol.clone();
            }
        }
        tokens::format_coin(address)
    }
}

/// Dynamic-programming search over a routing graph.
pub struct RouteFinder<'a> {
    graph: &'a RouteGraph,
}

impl<'a> RouteFinder<'a> {
    pub fn new(graph: &'a RouteGraph) -> Self {
        Self { graph }
    }

    pub fn find_best_route(&self, request: &RouteRequest) -> Result<Route, RouterError> {
        if request.max_hops == 0 {
            return Err(RouterError::Validation("max_hops must be at least 1".into()));
        }

        let no_route = || RouterError::NoRouteFound {
            from: request.start.clone(),
            to: request.end.clone(),
            max_hops: request.max_hops,
        };

        let start_node = self.graph.get_node(&request.start).ok_or_else(no_route)?;
        let end_node = self.graph.get_node(&request.end).ok_or_else(no_route)?;

        let hops = request.max_hops;

        // best[h][token] = best amount of `token` reachable in exactly h hops
        let mut best: Vec<HashMap<NodeIndex, f64>> = vec![HashMap::new(); hops + 1];
        best[0].insert(start_node, request.amount_in);

        let mut predecessor: HashMap<(NodeIndex, usize), EdgeIndex> = HashMap::new();

        for layer in 1..=hops {
            let (settled, open) = best.split_at_mut(layer);
            let previous = &settled[layer - 1];
            let current = &mut open[0];

            for edge in self.graph.graph.edge_references() {
                let from = edge.source();
                let to = edge.target();

                // Never leave the destination, never return to the source.
                if from == end_node || to == start_node {
                    continue;
                }
                let Some(&amount) = previous.get(&from) else {
                    continue;
                };

                let data = edge.weight();
                let out = match swap_math::amount_out(
                    &data.pool,
                    data.from_index,
                    data.to_index,
                    amount,
                ) {
                    Ok(out) => out,
                    Err(e) => {
                        trace!("Edge unusable in {}: {}", data.pool.name, e);
                        continue;
                    }
                };

                // Strictly greater only: first maximum at a slot wins.
                if current.get(&to).map_or(true, |&held| out > held) {
                    current.insert(to, out);
                    predecessor.insert((to, layer), edge.id());
                }
            }
        }

        let mut chosen: Option<(usize, f64)> = None;
        for layer in 1..=hops {
            if let Some(&amount) = best[layer].get(&end_node) {
                if chosen.map_or(true, |(_, held)| amount > held) {
                    chosen = Some((layer, amount));
                }
            }
        }
        let Some((route_hops, amount_out)) = chosen else {
            return Err(no_route());
        };

        debug!(
            "Best route uses {} of {} allowed hops, output {}",
            route_hops, hops, amount_out
        );

        // Walk the predecessor chain backwards from the destination.
        let mut steps = Vec::with_capacity(route_hops);
        let mut node = end_node;
        let mut layer = route_hops;
        while layer > 0 {
            let edge_id = *predecessor
                .get(&(node, layer))
                .expect("predecessor recorded for every reachable (token, layer)");
            let (source, target) = self
                .graph
                .graph
                .edge_endpoints(edge_id)
                .expect("edge endpoints exist");
            let data = &self.graph.graph[edge_id];

            steps.push(SwapStep {
                from_coin: self
                    .graph
                    .get_token(source)
                    .expect("token recorded for node")
                    .to_string(),
                to_coin: self
                    .graph
                    .get_token(target)
                    .expect("token recorded for node")
                    .to_string(),
                pool: data.pool.clone(),
            });

            node = source;
            layer -= 1;
        }
        steps.reverse();

        Ok(Route {
            steps,
            amount_in: request.amount_in,
            amount_out,
            direction: TradeDirection::ExactInput,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::swap_math::weighted_out;
    use crate::cartographer::{Coin, PoolKind};
    use approx::assert_relative_eq;

    fn coin(symbol: &str) -> Coin {
        Coin {
            address: format!("0xfeed::coins::{}", symbol),
            symbol: symbol.to_string(),
            decimals: 0,
        }
    }

    fn addr(symbol: &str) -> String {
        format!("0xfeed::coins::{}", symbol)
    }

    fn even_pool(a: &str, b: &str, balance_a: u64, balance_b: u64) -> Pool {
        Pool {
            name: format!("W:{}-50:{}-50", a, b),
            kind: PoolKind::Weighted {
                weights: vec![0.5, 0.5],
            },
            coins: vec![coin(a), coin(b)],
            balances: vec![balance_a, balance_b],
            fee: 0.003,
        }
    }

    fn request(from: &str, to: &str, amount_in: f64, max_hops: usize) -> RouteRequest {
        RouteRequest {
            start: addr(from),
            end: addr(to),
            amount_in,
            max_hops,
        }
    }

    #[test]
    fn test_two_hop_chain() {
        // No direct X-Z edge: the only way is X → Y → Z.
        let pools = vec![
            even_pool("X", "Y", 1000, 1000),
            even_pool("Y", "Z", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Y", 10.0, 2))
            .unwrap();
        assert_eq!(route.hop_count(), 1);

        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Z", 10.0, 2))
            .unwrap();

        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.coin_path(), vec![addr("X"), addr("Y"), addr("Z")]);

        let first = weighted_out(1000.0, 1000.0, 0.5, 0.5, 10.0, 0.003).unwrap();
        let chained = weighted_out(1000.0, 1000.0, 0.5, 0.5, first, 0.003).unwrap();
        assert_relative_eq!(route.amount_out, chained);
    }

    #[test]
    fn test_shorter_route_wins_when_better() {
        // Direct pool is deep and cheap; the detour loses twice to fees.
        let pools = vec![
            even_pool("X", "Z", 100_000, 100_000),
            even_pool("X", "Y", 1000, 1000),
            even_pool("Y", "Z", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Z", 10.0, 3))
            .unwrap();
        assert_eq!(route.hop_count(), 1);
    }

    #[test]
    fn test_detour_wins_over_bad_direct_pool() {
        // Direct pool is badly skewed against us; two balanced hops pay more.
        let pools = vec![
            even_pool("X", "Z", 10_000, 100),
            even_pool("X", "Y", 100_000, 100_000),
            even_pool("Y", "Z", 100_000, 100_000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Z", 10.0, 2))
            .unwrap();
        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.coin_path(), vec![addr("X"), addr("Y"), addr("Z")]);
    }

    #[test]
    fn test_hop_bound_above_longest_feasible_path() {
        // Longest feasible path is 3 hops; asking for 4 must still succeed.
        let pools = vec![
            even_pool("X", "Y", 1000, 1000),
            even_pool("Y", "Z", 1000, 1000),
            even_pool("Z", "W", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "W", 10.0, 4))
            .unwrap();
        assert_eq!(route.hop_count(), 3);
    }

    #[test]
    fn test_no_route_found() {
        let pools = vec![
            even_pool("X", "Y", 1000, 1000),
            even_pool("Z", "W", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let err = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Z", 10.0, 3))
            .unwrap_err();
        assert!(matches!(err, RouterError::NoRouteFound { .. }));

        // Token entirely absent from the graph
        let err = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Q", 10.0, 3))
            .unwrap_err();
        assert!(matches!(err, RouterError::NoRouteFound { .. }));
    }

    #[test]
    fn test_never_revisits_source_or_leaves_destination() {
        // Dense little graph with cycles through X.
        let pools = vec![
            even_pool("X", "Y", 1000, 1000),
            even_pool("Y", "X", 500, 2000),
            even_pool("Y", "Z", 1000, 1000),
            even_pool("Z", "X", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let route = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Z", 10.0, 3))
            .unwrap();

        assert!(route.hop_count() <= 3);
        let path = route.coin_path();
        // Source appears only at the head, destination only at the tail.
        assert_eq!(path.iter().filter(|&c| *c == addr("X")).count(), 1);
        assert_eq!(path.last().copied(), Some(addr("Z")).as_deref());
    }

    #[test]
    fn test_deterministic_across_runs() {
        let mut twin = even_pool("X", "Y", 1000, 1000);
        twin.name = "W:X-50:Y-50:twin".into();
        let pools = vec![
            even_pool("X", "Y", 1000, 1000),
            twin, // identical balances and fee: an exact tie
            even_pool("Y", "Z", 1000, 1000),
        ];
        let graph = RouteGraph::from_pools(&pools);
        let finder = RouteFinder::new(&graph);

        let first = finder.find_best_route(&request("X", "Z", 10.0, 2)).unwrap();
        let second = finder.find_best_route(&request("X", "Z", 10.0, 2)).unwrap();
        assert_eq!(first, second);
        // The tie goes to the earlier-listed twin.
        assert_eq!(first.steps[0].pool.name, "W:X-50:Y-50");
    }

    #[test]
    fn test_zero_max_hops_is_invalid() {
        let graph = RouteGraph::from_pools(&[even_pool("X", "Y", 1000, 1000)]);
        let err = RouteFinder::new(&graph)
            .find_best_route(&request("X", "Y", 10.0, 0))
            .unwrap_err();
        assert!(matches!(err, RouterError::Validation(_)));
    }
}
