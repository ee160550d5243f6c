//! Bounded point-to-center matching as a minimum-cost flow.
//!
//! Nearest-center assignment cannot respect occupancy bounds, so the micro
//! clusterer assigns through a transportation matching instead: every point
//! is a unit of supply, every center accepts between 1 and `max_per` units,
//! and the flow minimizes total squared distance. The occupancy lower bound
//! is modeled as a single high-reward first unit per center, which any
//! minimum-cost solution saturates when the instance is feasible.

use std::collections::VecDeque;

use anyhow::{Result, bail, ensure};

struct Edge {
    to: usize,
    cap: u32,
    cost: f64,
}

/// Residual network with successive-shortest-path augmentation.
struct FlowNetwork {
    edges: Vec<Edge>,     // forward edge at 2i, reverse at 2i + 1
    adj: Vec<Vec<usize>>, // adj[node] = edge indices out of node
}

impl FlowNetwork {
    fn new(num_nodes: usize) -> Self {
        Self { edges: Vec::new(), adj: vec![Vec::new(); num_nodes] }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: u32, cost: f64) {
        self.adj[from].push(self.edges.len());
        self.edges.push(Edge { to, cap, cost });
        self.adj[to].push(self.edges.len());
        self.edges.push(Edge { to: from, cap: 0, cost: -cost });
    }

    /// Shortest residual path from `source` to `sink` by label-correcting
    /// search (handles the negative first-unit arcs). Returns the predecessor
    /// edge per node, or None when the sink is unreachable.
    fn shortest_path(&self, source: usize, sink: usize) -> Option<Vec<usize>> {
        const UNREACHED: usize = usize::MAX;
        let n = self.adj.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev_edge = vec![UNREACHED; n];
        let mut in_queue = vec![false; n];

        let mut queue = VecDeque::new();
        dist[source] = 0.0;
        queue.push_back(source);
        in_queue[source] = true;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            for &e in &self.adj[u] {
                let edge = &self.edges[e];
                if edge.cap == 0 { continue }
                let candidate = dist[u] + edge.cost;
                if candidate + 1e-12 < dist[edge.to] {
                    dist[edge.to] = candidate;
                    prev_edge[edge.to] = e;
                    if !in_queue[edge.to] {
                        queue.push_back(edge.to);
                        in_queue[edge.to] = true;
                    }
                }
            }
        }

        (prev_edge[sink] != UNREACHED).then_some(prev_edge)
    }

    /// Push `required` units from `source` to `sink` along shortest paths.
    fn solve(&mut self, source: usize, sink: usize, required: u32) -> Result<()> {
        let mut flow = 0;
        while flow < required {
            let Some(prev_edge) = self.shortest_path(source, sink) else {
                bail!("assignment infeasible: pushed {flow} of {required} units");
            };

            // Bottleneck along the path, then push it.
            let mut bottleneck = required - flow;
            let mut node = sink;
            while node != source {
                let e = prev_edge[node];
                bottleneck = bottleneck.min(self.edges[e].cap);
                node = self.edges[e ^ 1].to;
            }

            let mut node = sink;
            while node != source {
                let e = prev_edge[node];
                self.edges[e].cap -= bottleneck;
                self.edges[e ^ 1].cap += bottleneck;
                node = self.edges[e ^ 1].to;
            }

            flow += bottleneck;
        }
        Ok(())
    }
}

/// Assign each point to one center minimizing total cost, with every center
/// receiving between 1 and `max_per` points.
///
/// `costs[i][j]` is the cost of placing point `i` on center `j`. Requires
/// `num_centers <= num_points <= num_centers * max_per`. Deterministic: the
/// search visits nodes in a fixed order, so equal-cost ties break stably.
pub(crate) fn solve_bounded_assignment(costs: &[Vec<f64>], max_per: usize) -> Result<Vec<usize>> {
    let num_points = costs.len();
    ensure!(num_points > 0, "no points to assign");
    let num_centers = costs[0].len();
    ensure!(num_centers >= 1, "no centers to assign to");
    ensure!(
        num_centers <= num_points,
        "more centers ({num_centers}) than points ({num_points})"
    );
    ensure!(
        num_centers * max_per >= num_points,
        "total capacity {} below point count {num_points}",
        num_centers * max_per
    );

    let max_cost = costs.iter()
        .flat_map(|row| row.iter().copied())
        .fold(0.0_f64, f64::max);
    // Reward large enough that no routing choice can outweigh filling a center.
    let reward = (max_cost + 1.0) * (num_points as f64 + 1.0);

    // Node layout: source, points, centers, sink.
    let source = 0;
    let point = |i: usize| 1 + i;
    let center = |j: usize| 1 + num_points + j;
    let sink = 1 + num_points + num_centers;

    let mut network = FlowNetwork::new(sink + 1);
    for i in 0..num_points {
        network.add_edge(source, point(i), 1, 0.0);
        debug_assert_eq!(costs[i].len(), num_centers, "ragged cost matrix");
        for j in 0..num_centers {
            network.add_edge(point(i), center(j), 1, costs[i][j]);
        }
    }
    for j in 0..num_centers {
        network.add_edge(center(j), sink, 1, -reward);
        if max_per > 1 {
            network.add_edge(center(j), sink, (max_per - 1) as u32, 0.0);
        }
    }

    network.solve(source, sink, num_points as u32)?;

    // A point's saturated center edge (cap drained to 0) is its assignment.
    let mut labels = vec![usize::MAX; num_points];
    for i in 0..num_points {
        for &e in &network.adj[point(i)] {
            let edge = &network.edges[e];
            if e % 2 == 0 && edge.cap == 0 && edge.to >= center(0) && edge.to < sink {
                labels[i] = edge.to - center(0);
                break;
            }
        }
        ensure!(labels[i] != usize::MAX, "point {i} left unassigned");
    }

    Ok(labels)
}
