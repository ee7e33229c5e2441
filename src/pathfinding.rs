//! A* search over a grid map.
//!
//! This module contains the [`PathFinder`], an 8-connected A* search using the Euclidean distance
//! both as heuristic and as step cost. Search nodes live in an arena addressed by index, so
//! predecessor links stay valid however much the working sets grow, and the search is fully
//! deterministic for a given map, start and goal.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use log::{debug, trace};

use crate::map::{GridMap, GridPos};

/// Neighbour offsets in row-major order, skipping the centre.
///
/// The enumeration order is part of the search's determinism.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Search node stored in the arena.
#[derive(Clone, Debug)]
struct PathNode {
    /// Cell the node stands for.
    pos: GridPos,
    /// Cost accumulated from the start along the current best predecessor chain.
    g_cost: f64,
    /// Heuristic estimate of the remaining cost to the goal.
    h_cost: f64,
    /// Arena index of the predecessor. Only the start node has none.
    parent: Option<usize>,
    /// Whether the node has been expanded.
    closed: bool,
}

impl PathNode {
    /// Returns the estimated total cost through this node.
    fn f_cost(&self) -> f64 {
        self.g_cost + self.h_cost
    }
}

/// Entry of the open set.
///
/// Nodes whose cost improves are pushed again instead of being updated in place; the stale entry
/// is recognised on pop because its `g_cost` no longer matches the arena.
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    /// Total cost at push time.
    f_cost: f64,
    /// Heuristic at push time.
    h_cost: f64,
    /// Cost from the start at push time.
    g_cost: f64,
    /// Arena index of the node, which is also its insertion order.
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    /// Orders entries so that the max-heap pops the lowest `f`, then the lowest `h`, then the node
    /// that entered the open set first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.h_cost.total_cmp(&self.h_cost))
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Outcome of a search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    /// Cells from the step after the start up to and including the goal. Empty when the goal
    /// cannot be reached or equals the start.
    pub path: Vec<GridPos>,
    /// Accumulated cost of the goal node, or zero when no path was found.
    pub cost: f64,
    /// Number of nodes expanded before the search ended.
    pub expanded: usize,
}

/// A* pathfinder over a borrowed [`GridMap`].
///
/// Every call to [`PathFinder::find_path`] owns fresh working sets, so the finder itself carries
/// no state between searches.
#[derive(Clone, Copy, Debug)]
pub struct PathFinder<'map> {
    /// Map searched. It must not change during a search.
    map: &'map GridMap,
    /// Upper bound on node expansions, if any.
    max_expansions: Option<usize>,
}

impl<'map> PathFinder<'map> {
    /// Creates a pathfinder over `map` with no expansion budget.
    #[must_use]
    pub const fn new(map: &'map GridMap) -> Self {
        Self {
            map,
            max_expansions: None,
        }
    }

    /// Returns the pathfinder with a bound on how many nodes one search may expand.
    ///
    /// A search that exhausts the budget ends as if the goal were unreachable.
    #[must_use]
    pub const fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    /// Finds the cells of a shortest walkable route from `start` to `goal`.
    ///
    /// The start is excluded and the goal included. The result is empty when the goal equals the
    /// start, lies outside the map or on a blocked cell, or cannot be reached.
    #[must_use]
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> Vec<GridPos> {
        self.search(start, goal).path
    }

    /// Runs the search and returns the path together with its cost and bookkeeping.
    #[must_use]
    pub fn search(&self, start: GridPos, goal: GridPos) -> SearchOutcome {
        trace!("searching path from {start:?} to {goal:?}");

        if start == goal {
            return SearchOutcome::default();
        }
        let (Some(start_idx), true) = (self.map.index(start), self.map.is_open(goal)) else {
            debug!("path request from {start:?} to {goal:?} rejected: endpoint not walkable");
            return SearchOutcome::default();
        };

        let mut arena = vec![PathNode {
            pos: start,
            g_cost: 0.,
            h_cost: start.distance(goal),
            parent: None,
            closed: false,
        }];
        // Arena index of every cell that has entered the open set, by map index.
        let mut lookup: Vec<Option<usize>> = vec![None; self.map.width() * self.map.height()];
        let mut open = BinaryHeap::new();
        let mut expanded = 0_usize;

        if let Some(slot) = lookup.get_mut(start_idx) {
            *slot = Some(0);
        }
        open.push(entry(&arena, 0));

        while let Some(current) = open.pop() {
            let Some(node) = arena.get(current.node) else {
                continue;
            };
            #[expect(
                clippy::float_cmp,
                reason = "Stale entries carry a bitwise copy of an older cost."
            )]
            let stale = node.closed || node.g_cost != current.g_cost;
            if stale {
                continue;
            }

            if node.pos == goal {
                debug!(
                    "path from {start:?} to {goal:?} found after {expanded} expansions, cost {:.3}",
                    node.g_cost
                );
                return SearchOutcome {
                    path: reconstruct(&arena, current.node),
                    cost: node.g_cost,
                    expanded,
                };
            }

            if self.max_expansions.is_some_and(|limit| expanded >= limit) {
                debug!("path search from {start:?} to {goal:?} ran out of budget");
                return SearchOutcome {
                    expanded,
                    ..SearchOutcome::default()
                };
            }

            let (pos, g_cost) = (node.pos, node.g_cost);
            if let Some(node) = arena.get_mut(current.node) {
                node.closed = true;
            }
            expanded += 1;

            for neighbour in self.neighbours(pos) {
                let Some(map_idx) = self.map.index(neighbour) else {
                    continue;
                };
                let tentative = g_cost + pos.distance(neighbour);

                match lookup.get(map_idx).copied().flatten() {
                    None => {
                        let idx = arena.len();
                        arena.push(PathNode {
                            pos: neighbour,
                            g_cost: tentative,
                            h_cost: neighbour.distance(goal),
                            parent: Some(current.node),
                            closed: false,
                        });
                        if let Some(slot) = lookup.get_mut(map_idx) {
                            *slot = Some(idx);
                        }
                        open.push(entry(&arena, idx));
                    }
                    Some(idx) => {
                        let Some(known) = arena.get_mut(idx) else {
                            continue;
                        };
                        if known.closed || tentative >= known.g_cost {
                            continue;
                        }
                        known.g_cost = tentative;
                        known.parent = Some(current.node);
                        open.push(entry(&arena, idx));
                    }
                }
            }
        }

        debug!("no path from {start:?} to {goal:?} after {expanded} expansions");
        SearchOutcome {
            expanded,
            ..SearchOutcome::default()
        }
    }

    /// Returns the walkable neighbours of a cell in the fixed enumeration order.
    fn neighbours(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| pos.offset(dx, dy))
            .filter(|&neighbour| self.map.is_open(neighbour))
    }
}

/// Builds the open-set entry for an arena node from its current costs.
fn entry(arena: &[PathNode], node: usize) -> OpenEntry {
    arena.get(node).map_or(
        OpenEntry {
            f_cost: f64::INFINITY,
            h_cost: f64::INFINITY,
            g_cost: f64::INFINITY,
            node,
        },
        |path_node| OpenEntry {
            f_cost: path_node.f_cost(),
            h_cost: path_node.h_cost,
            g_cost: path_node.g_cost,
            node,
        },
    )
}

/// Follows predecessor links from `end` and returns the cells after the start, start first.
fn reconstruct(arena: &[PathNode], end: usize) -> Vec<GridPos> {
    let mut path = VecDeque::new();
    let mut cursor = arena.get(end);

    while let Some(node) = cursor {
        let Some(parent) = node.parent else {
            break;
        };
        path.push_front(node.pos);
        cursor = arena.get(parent);
    }

    path.into()
}
