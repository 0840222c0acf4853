//! Route graph construction.
//!
//! Nodes are coin types, edges are (pool, ordered asset-index pair). A pool
//! with n constituents contributes n*(n-1) directed edges. Edge insertion
//! order is pool listing order then ordered-pair order, which is what makes
//! the route search deterministic.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::cartographer::catalog::Pool;

/// One directed traversal option inside a pool.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub pool: Pool,
    pub from_index: usize,
    pub to_index: usize,
}

/// The routing graph. Built fresh from each listing snapshot and never
/// mutated afterwards.
pub struct RouteGraph {
    pub graph: DiGraph<String, EdgeData>,
    token_to_node: HashMap<String, NodeIndex>,
    node_to_token: HashMap<NodeIndex, String>,
}

impl RouteGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            token_to_node: HashMap::new(),
            node_to_token: HashMap::new(),
        }
    }

    pub fn from_pools(pools: &[Pool]) -> Self {
        let mut graph = Self::new();
        let mut skipped_drained = 0;

        for pool in pools {
            if !graph.add_pool(pool) {
                skipped_drained += 1;
            }
        }

        info!(
            "Graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        if skipped_drained > 0 {
            warn!("  Skipped {} pools with a drained balance", skipped_drained);
        }

        graph
    }

    /// Add a pool's ordered asset pairs. Returns false if the pool has a
    /// drained balance; such a pool can only quote zero and a zero-output
    /// path must not shadow a genuine no-route result.
    pub fn add_pool(&mut self, pool: &Pool) -> bool {
        if pool.balances.iter().any(|&b| b == 0) {
            return false;
        }

        for i in 0..pool.coins.len() {
            for j in 0..pool.coins.len() {
                if i == j {
                    continue;
                }
                let from = self.get_or_create_node(&pool.coins[i].address);
                let to = self.get_or_create_node(&pool.coins[j].address);
                self.graph.add_edge(
                    from,
                    to,
                    EdgeData {
                        pool: pool.clone(),
                        from_index: i,
                        to_index: j,
                    },
                );
            }
        }

        true
    }

    fn get_or_create_node(&mut self, token: &str) -> NodeIndex {
        if let Some(&node) = self.token_to_node.get(token) {
            return node;
        }

        let node = self.graph.add_node(token.to_string());
        self.token_to_node.insert(token.to_string(), node);
        self.node_to_token.insert(node, token.to_string());
        node
    }

    pub fn get_node(&self, token: &str) -> Option<NodeIndex> {
        self.token_to_node.get(token).copied()
    }

    pub fn get_token(&self, node: NodeIndex) -> Option<&str> {
        self.node_to_token.get(&node).map(|s| s.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for RouteGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartographer::catalog::{Coin, PoolKind};

    fn coin(address: &str, decimals: u8) -> Coin {
        Coin {
            address: address.to_string(),
            symbol: address.rsplit("::").next().unwrap_or(address).to_string(),
            decimals,
        }
    }

    fn three_asset_pool() -> Pool {
        Pool {
            name: "S:60:A:B:C".into(),
            kind: PoolKind::Stable { amplification: 60.0 },
            coins: vec![
                coin("0xa::m::A", 6),
                coin("0xb::m::B", 6),
                coin("0xc::m::C", 6),
            ],
            balances: vec![1_000_000, 1_000_000, 1_000_000],
            fee: 0.001,
        }
    }

    #[test]
    fn test_edges_per_pool() {
        let graph = RouteGraph::from_pools(&[three_asset_pool()]);
        // n * (n - 1) ordered pairs
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 6);
    }

    #[test]
    fn test_drained_pool_is_excluded() {
        let mut pool = three_asset_pool();
        pool.balances[1] = 0;
        let graph = RouteGraph::from_pools(&[pool]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_token_with_no_pool_is_absent() {
        let graph = RouteGraph::from_pools(&[three_asset_pool()]);
        assert!(graph.get_node("0xa::m::A").is_some());
        assert!(graph.get_node("0xd::m::D").is_none());
    }

    #[test]
    fn test_shared_token_gets_one_node() {
        let mut second = three_asset_pool();
        second.name = "W:A-50:B-50".into();
        second.kind = PoolKind::Weighted {
            weights: vec![0.5, 0.5],
        };
        second.coins.truncate(2);
        second.balances.truncate(2);

        let graph = RouteGraph::from_pools(&[three_asset_pool(), second]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 8);
    }
}
