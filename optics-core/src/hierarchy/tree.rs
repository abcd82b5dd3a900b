//! Arena-backed cluster tree over a normalised reachability plot.
//!
//! Nodes cover half-open ranges of ordering positions. A split at position
//! `s` produces the candidate children `[start, s)` and `[s + 1, end)`; the
//! split point itself stays with the parent. Back-references are plain arena
//! indices, so the tree owns every node exactly once.

use std::ops::Range;

use tracing::debug;

/// Fraction of each child's range, adjacent to the split, averaged when
/// comparing the two sides of a split.
const BOUNDARY_FRACTION: f64 = 0.8;

/// Index of a node within a [`ClusterTree`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A contiguous range of ordering positions considered as a cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    start: usize,
    end: usize,
    split_point: Option<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attached: bool,
}

impl TreeNode {
    fn new(range: Range<usize>, parent: Option<NodeId>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            split_point: None,
            parent,
            children: Vec::new(),
            attached: true,
        }
    }

    /// First ordering position covered by the node.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last ordering position covered by the node.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// The covered ordering positions.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of covered positions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the node covers no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// The accepted split position, if the node was divided.
    #[must_use]
    pub const fn split_point(&self) -> Option<usize> {
        self.split_point
    }

    /// The node this one hangs from.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attached children, left to right.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether the node is still reachable from the root. Collapsed nodes
    /// stay in the arena but are detached.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the node was never split.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.split_point.is_none()
    }
}

/// Thresholds applied while splitting nodes, in normalised reachability
/// units except where noted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeParams {
    /// Children with fewer positions than this are pruned.
    pub min_cluster_size: usize,
    /// Splits below this reachability are discarded.
    pub significant_min: f64,
    /// A side whose boundary average exceeds `similarity_ratio` times the
    /// split reachability is not clearly separated from it.
    pub similarity_ratio: f64,
    /// When the sides are not clearly separated, a side whose boundary
    /// average falls below `rejection_ratio` times the split keeps only
    /// itself.
    pub rejection_ratio: f64,
    /// Split nodes spanning more than this fraction of their parent are
    /// collapsed into it.
    pub collapse_ratio: f64,
    /// Candidates lower than this fraction of the node's highest finite
    /// reachability are ignored.
    pub min_maxima_ratio: f64,
}

/// Pending work: a node together with the candidates still available to it.
struct Task {
    node: NodeId,
    parent: Option<NodeId>,
    candidates: Vec<usize>,
}

/// The outcome of evaluating a single candidate split.
enum Verdict {
    Discard,
    Accept { keep_left: bool, keep_right: bool },
}

/// Hierarchy of clusters over a normalised reachability plot.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterTree {
    nodes: Vec<TreeNode>,
}

impl ClusterTree {
    /// Builds the tree for `plot` from `maxima`, which must be ordered
    /// highest first (as returned by [`crate::find_local_maxima`]).
    ///
    /// # Examples
    /// ```
    /// use optics_core::{ClusterTree, TreeParams, find_local_maxima};
    ///
    /// let plot = [f64::INFINITY, 0.1, 0.1, 0.1, 0.1, 1.0, 0.1, 0.1, 0.1, 0.1];
    /// let maxima = find_local_maxima(&plot, 2);
    /// let tree = ClusterTree::build(&plot, &maxima, &TreeParams {
    ///     min_cluster_size: 2,
    ///     significant_min: 0.003,
    ///     similarity_ratio: 0.75,
    ///     rejection_ratio: 0.7,
    ///     collapse_ratio: 0.4,
    ///     min_maxima_ratio: 0.001,
    /// });
    /// let ranges: Vec<_> = tree
    ///     .leaves()
    ///     .into_iter()
    ///     .filter_map(|id| tree.node(id).map(|node| node.range()))
    ///     .collect();
    /// assert_eq!(ranges, [0..5, 6..10]);
    /// ```
    #[must_use]
    pub fn build(plot: &[f64], maxima: &[usize], params: &TreeParams) -> Self {
        let mut tree = Self {
            nodes: vec![TreeNode::new(0..plot.len(), None)],
        };
        let mut stack = vec![Task {
            node: Self::root(),
            parent: None,
            candidates: maxima.to_vec(),
        }];
        while let Some(task) = stack.pop() {
            tree.process(task, plot, params, &mut stack);
        }
        tree
    }

    /// The root node, covering the whole plot.
    #[must_use]
    pub const fn root() -> NodeId {
        NodeId(0)
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty. Always false for a built tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates every node in the arena, detached ones included.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// Attached nodes without a split, ordered by starting position.
    #[must_use]
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut pending = vec![Self::root()];
        while let Some(id) = pending.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.is_leaf() {
                leaves.push(id);
            }
            pending.extend(node.children.iter().rev().copied());
        }
        leaves.sort_by_key(|id| self.node(*id).map_or(usize::MAX, TreeNode::start));
        leaves
    }

    /// Positions inside `id`'s range that no attached child covers.
    #[must_use]
    pub fn own_positions(&self, id: NodeId) -> Vec<usize> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        node.range()
            .filter(|position| {
                !node.children.iter().any(|child| {
                    self.node(*child)
                        .is_some_and(|child| child.range().contains(position))
                })
            })
            .collect()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    fn push_node(&mut self, range: Range<usize>, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode::new(range, Some(parent)));
        id
    }

    fn process(&mut self, task: Task, plot: &[f64], params: &TreeParams, stack: &mut Vec<Task>) {
        let Task {
            node,
            parent,
            candidates,
        } = task;
        let Some(range) = self.node(node).map(TreeNode::range) else {
            return;
        };
        let gate = params.min_maxima_ratio * peak(plot, range.clone());

        for (consumed, &split) in candidates.iter().enumerate() {
            let Some(&split_reach) = plot.get(split) else {
                continue;
            };
            if split_reach < gate {
                debug!(split, split_reach, gate, "candidate below maxima gate");
                continue;
            }
            if split_reach < params.significant_min {
                debug!(split, split_reach, "split below significant minimum");
                continue;
            }

            let left = range.start..split;
            let right = split + 1..range.end;
            let (keep_left, keep_right) =
                match judge_split(plot, left.clone(), right.clone(), split_reach, params) {
                    Verdict::Discard => {
                        debug!(split, split_reach, "split sides not separated");
                        continue;
                    }
                    Verdict::Accept {
                        keep_left,
                        keep_right,
                    } => (
                        keep_left && left.len() >= params.min_cluster_size,
                        keep_right && right.len() >= params.min_cluster_size,
                    ),
                };

            if let Some(current) = self.node_mut(node) {
                current.split_point = Some(split);
            }
            let remaining = candidates.get(consumed + 1..).unwrap_or_default();
            let mut kept = Vec::with_capacity(2);
            if keep_left {
                kept.push((left, split_candidates(remaining, |c| c < split)));
            }
            if keep_right {
                kept.push((right, split_candidates(remaining, |c| c > split)));
            }
            if kept.is_empty() {
                debug!(split, "both children pruned");
                if let Some(current) = self.node_mut(node) {
                    current.split_point = None;
                }
                return;
            }

            self.attach(node, parent, kept, params.collapse_ratio, stack);
            return;
        }
    }

    /// Attaches the surviving children either to `node` or, when `node`
    /// covers too much of `parent`, in place of `node` under `parent`.
    fn attach(
        &mut self,
        node: NodeId,
        parent: Option<NodeId>,
        kept: Vec<(Range<usize>, Vec<usize>)>,
        collapse_ratio: f64,
        stack: &mut Vec<Task>,
    ) {
        let collapse_into =
            parent.filter(|&parent| self.should_collapse(node, parent, collapse_ratio));
        let target = collapse_into.unwrap_or(node);

        let mut tasks = Vec::with_capacity(kept.len());
        let mut ids = Vec::with_capacity(kept.len());
        for (range, candidates) in kept {
            let id = self.push_node(range, target);
            ids.push(id);
            tasks.push(Task {
                node: id,
                parent: Some(target),
                candidates,
            });
        }

        match collapse_into {
            Some(parent) => {
                debug!(
                    node = node.0,
                    parent = parent.0,
                    "collapsing node into parent"
                );
                if let Some(current) = self.node_mut(node) {
                    current.attached = false;
                }
                if let Some(parent_node) = self.node_mut(parent) {
                    let siblings = &mut parent_node.children;
                    match siblings.iter().position(|&child| child == node) {
                        Some(slot) => {
                            siblings.remove(slot);
                            for (offset, id) in ids.into_iter().enumerate() {
                                siblings.insert(slot + offset, id);
                            }
                        }
                        None => siblings.extend(ids),
                    }
                }
            }
            None => {
                if let Some(current) = self.node_mut(node) {
                    current.children = ids;
                }
            }
        }

        stack.extend(tasks.into_iter().rev());
    }

    fn should_collapse(&self, node: NodeId, parent: NodeId, collapse_ratio: f64) -> bool {
        match (self.node(node), self.node(parent)) {
            (Some(node), Some(parent)) if !parent.is_empty() => {
                node.len() as f64 / parent.len() as f64 > collapse_ratio
            }
            _ => false,
        }
    }
}

fn split_candidates(remaining: &[usize], keep: impl Fn(usize) -> bool) -> Vec<usize> {
    remaining.iter().copied().filter(|&c| keep(c)).collect()
}

/// Highest finite value in `range`, or zero when there is none.
fn peak(plot: &[f64], range: Range<usize>) -> f64 {
    plot.get(range)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max)
}

/// Mean of `values`, or `None` for an empty window.
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn boundary_len(range: &Range<usize>) -> usize {
    (BOUNDARY_FRACTION * range.len() as f64).round() as usize
}

fn judge_split(
    plot: &[f64],
    left: Range<usize>,
    right: Range<usize>,
    split_reach: f64,
    params: &TreeParams,
) -> Verdict {
    let left_window = left.end.saturating_sub(boundary_len(&left)).max(left.start)..left.end;
    let right_window = right.start..(right.start + boundary_len(&right)).min(right.end);
    let left_avg = plot.get(left_window).and_then(mean);
    let right_avg = plot.get(right_window).and_then(mean);

    let too_similar =
        |avg: Option<f64>| avg.is_some_and(|avg| avg / params.similarity_ratio > split_reach);
    if !too_similar(left_avg) && !too_similar(right_avg) {
        return Verdict::Accept {
            keep_left: true,
            keep_right: true,
        };
    }

    let threshold = split_reach * params.rejection_ratio;
    let is_low = |avg: Option<f64>| avg.is_some_and(|avg| avg < threshold);
    let is_high = |avg: Option<f64>| avg.is_some_and(|avg| avg >= threshold);
    if is_high(left_avg) && is_high(right_avg) {
        return Verdict::Discard;
    }
    let (left_low, right_low) = (is_low(left_avg), is_low(right_avg));
    Verdict::Accept {
        keep_left: !right_low,
        keep_right: !left_low,
    }
}
