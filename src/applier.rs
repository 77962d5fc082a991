//! The merge scan that maps every node through the current selection.
//!
//! Nodes and selection intervals are both sorted by offset, so a single pass with a cursor into
//! the selection is enough to compute the geometry of every node, rebuild the aggregation tables
//! and sum up what is currently in view.

use crate::aggregation::AggregationTables;
use crate::config::FlameConfig;
use crate::interval_set::IntervalSet;
use crate::node_store::NodeStore;
use crate::types::{Classification, DisplayRect, Interval, Node, NodeDisplay, NodeKind};

/// Quantities currently in view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    /// Total length of the selection, samples and bytes together.
    pub selected_length: f64,
    /// Part of the selection covered by allocation nodes.
    pub bytes: f64,
    /// Number of allocations, 0 when the selection isn't tiled by allocation nodes.
    pub allocations: f64,
}

impl Summary {
    pub fn samples(&self) -> f64 {
        self.selected_length - self.bytes
    }
}

/// Everything derived from one selection.
#[derive(Debug, Clone, Default)]
pub struct ApplyResult {
    /// Indexed like the nodes of the store.
    pub displays: Vec<NodeDisplay>,
    pub tables: AggregationTables,
    pub summary: Summary,
}

/// Walks the selection, advancing to the next interval whenever a node reaches the end of the
/// current one, and crediting allocation counts only while nodes tile the selection gap-free.
struct AllocationCursor<'a> {
    selection: &'a [Interval],
    idx: usize,
    pos: f64,
    end: f64,
    finish: f64,
    allocations: f64,
}

impl<'a> AllocationCursor<'a> {
    fn new(selection: &'a [Interval]) -> Self {
        let (pos, end) = selection
            .first()
            .map_or((-1.0, 0.0), |first| (first.offset, first.end()));
        let finish = selection.last().map_or(0.0, |last| last.end());
        Self {
            selection,
            idx: 0,
            pos,
            end,
            finish,
            allocations: 0.0,
        }
    }

    fn visit(&mut self, node: &Node, epsilon: f64) {
        if node.depth == 0 || node.end() - epsilon >= self.end {
            return;
        }

        let continues = match node.kind {
            // A time node continues the tiling if it straddles the cursor.
            NodeKind::Time => {
                node.offset - epsilon < self.pos && node.end() - epsilon > self.pos
            }
            NodeKind::Allocation => (node.offset - self.pos).abs() < epsilon,
        };
        if !continues {
            return;
        }

        if node.kind == NodeKind::Allocation {
            self.allocations += node.secondary();
        }
        self.pos = node.end();

        if self.pos + epsilon > self.end && self.idx + 1 < self.selection.len() {
            self.idx += 1;
            self.pos = self.selection[self.idx].offset;
            self.end = self.selection[self.idx].end();
        }
    }

    fn finish(&self, epsilon: f64) -> f64 {
        if self.pos + epsilon < self.finish {
            0.0
        } else {
            self.allocations
        }
    }
}

/// Recomputes display state, aggregation tables and summary for `selection`.
pub fn apply(store: &NodeStore, selection: &IntervalSet, config: &FlameConfig) -> ApplyResult {
    let epsilon = config.epsilon;
    let intervals = selection.as_slice();
    let selected_length = selection.total_length();
    let nodes = store.nodes();

    let mut result = ApplyResult {
        displays: vec![NodeDisplay::hidden(); nodes.len()],
        tables: AggregationTables::default(),
        summary: Summary {
            selected_length,
            ..Summary::default()
        },
    };
    if intervals.is_empty() || selected_length <= 0.0 {
        return result;
    }

    let scale = config.canvas_width as f64 / selected_length;

    // Index of the current interval and the selected length of all intervals before it.
    let mut zidx = 0;
    let mut pos = 0.0;
    let mut summary_extent = 0.0;
    let mut allocation_cursor = AllocationCursor::new(intervals);

    for (node_index, node) in nodes.iter().enumerate() {
        while zidx < intervals.len() && node.offset + epsilon >= intervals[zidx].end() {
            pos += intervals[zidx].length;
            zidx += 1;
        }
        if zidx >= intervals.len() {
            // Nodes are sorted, nothing after this can be visible.
            break;
        }
        let current = intervals[zidx];
        if node.end() - epsilon <= current.offset
            || (node.depth == 0 && store.is_background_hidden())
        {
            continue;
        }

        let (x1, x2) = visible_range(node, intervals, zidx, pos);

        result.displays[node_index] = NodeDisplay {
            visible: true,
            rect: DisplayRect {
                x: config.margin + (x1 * scale) as f32,
                y: config.header_height + store.row_of(node.depth) as f32 * config.row_height,
                width: ((x2 - x1) * scale) as f32,
                height: config.row_height,
            },
            opacity: if node.depth >= current.min_depth {
                1.0
            } else {
                0.5
            },
        };

        aggregate(&mut result.tables, nodes, node_index, x2 - x1, epsilon);

        if node.depth > 0 && node.offset + epsilon > summary_extent {
            if node.kind == NodeKind::Allocation {
                result.summary.bytes += x2 - x1;
            }
            summary_extent = node.end();
        }
        allocation_cursor.visit(node, epsilon);
    }

    result.summary.allocations = allocation_cursor.finish(epsilon);
    result
}

/// Start and end of the node in selected-length coordinates.
///
/// A node may stretch over several intervals, each of them contributes the part the node covers.
fn visible_range(node: &Node, intervals: &[Interval], zidx: usize, pos: f64) -> (f64, f64) {
    let current = intervals[zidx];
    let x1 = pos + (node.offset - current.offset).max(0.0);

    let mut x2 = pos;
    for interval in intervals[zidx..]
        .iter()
        .take_while(|interval| node.end() > interval.offset)
    {
        if node.end() > interval.end() {
            x2 += interval.length;
        } else {
            x2 += node.end() - interval.offset;
        }
    }
    (x1, x2)
}

fn aggregate(
    tables: &mut AggregationTables,
    nodes: &[Node],
    node_index: usize,
    visible_weight: f64,
    epsilon: f64,
) {
    let node = &nodes[node_index];
    if node.depth == 0 {
        return;
    }
    let has_key = Classification::ALL
        .iter()
        .any(|classification| node.key(*classification).is_some());
    if !has_key || !tables.accepts_kind(node.kind) {
        return;
    }

    for classification in Classification::ALL {
        if let Some(key) = node.key(classification) {
            tables
                .table_mut(classification)
                .offer(key, nodes, node_index, visible_weight, epsilon);
        }
    }
}
