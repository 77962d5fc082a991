use crate::node_store::NodeStore;
use crate::types::{Classification, Interval, Node};

/// Selection covering exactly `node`, focused on its depth.
pub fn from_node(node: &Node) -> Vec<Interval> {
    vec![Interval::new(node.offset, node.weight, node.depth)]
}

/// Ranges of all nodes carrying `key`, as selected from a ranked list.
///
/// Returns the intervals and the index of the first contributing node.
pub fn from_key(
    store: &NodeStore,
    classification: Classification,
    key: &str,
    epsilon: f64,
) -> (Vec<Interval>, Option<usize>) {
    gather(store, epsilon, |node| node.key(classification) == Some(key))
}

/// Ranges of all nodes flagged as blocked.
pub fn blocked(store: &NodeStore, epsilon: f64) -> Vec<Interval> {
    gather(store, epsilon, |node| node.blocked).0
}

/// Collects the ranges of matching nodes in offset order.
/// A node starting inside an already collected range is nested in it and skipped, which keeps the
/// result disjoint.
fn gather(
    store: &NodeStore,
    epsilon: f64,
    matches: impl Fn(&Node) -> bool,
) -> (Vec<Interval>, Option<usize>) {
    let mut intervals = vec![];
    let mut first = None;
    let mut max_extent = 0.0;

    for (index, node) in store.nodes().iter().enumerate() {
        if !matches(node) || node.offset + epsilon < max_extent {
            continue;
        }
        first.get_or_insert(index);
        max_extent = node.end();
        intervals.push(Interval::new(node.offset, node.weight, node.depth));
    }
    (intervals, first)
}
