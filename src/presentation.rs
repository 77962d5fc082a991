use crate::node_store::NodeStore;
use crate::types::{Node, NodeKind};

/// Formats sample, byte and allocation counts, e.g. `12 samples (3.00%)  &  2048 B / 4`.
/// Quantities that are (almost) zero are left out.
pub fn sum_text(
    samples: f64,
    bytes: f64,
    allocations: f64,
    total_sample_time: f64,
    epsilon: f64,
) -> String {
    let mut text = String::new();
    if samples > epsilon {
        // Count, unit and percentage all describe the same whole number of samples.
        let count = samples.round();
        let percent = if total_sample_time > 0.0 {
            100.0 * count / total_sample_time
        } else {
            0.0
        };
        let unit = if count == 1.0 { "sample" } else { "samples" };
        text.push_str(&format!("{count:.0} {unit} ({percent:.2}%)"));
    }
    if samples > epsilon && bytes > epsilon {
        text.push_str("  &  ");
    }
    if bytes > epsilon {
        text.push_str(&format!("{bytes:.0} B"));
        if allocations > epsilon {
            text.push_str(&format!(" / {allocations:.0}"));
        }
    }
    text
}

/// The info lines shown below the flame graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoText {
    pub function: String,
    pub source: String,
    pub address: String,
    pub sum: String,
    pub thread: String,
}

impl InfoText {
    /// Hover text of the node at `index`.
    pub fn for_node(store: &NodeStore, index: usize, epsilon: f64) -> InfoText {
        let Some(node) = store.get(index) else {
            return InfoText::default();
        };
        let mut info = InfoText::attributes_of(node);
        info.sum = node_sum_text(store, index, epsilon);
        info.thread = node.thread.clone().unwrap_or_default();
        info
    }

    /// Function, source and address of `node`, nothing else.
    pub fn attributes_of(node: &Node) -> InfoText {
        InfoText {
            function: node.function.clone().unwrap_or_default(),
            source: node.source.clone().unwrap_or_default(),
            address: node.address_text(),
            ..InfoText::default()
        }
    }

    /// Non-empty lines, top to bottom.
    pub fn lines(&self) -> Vec<&str> {
        [
            &self.function,
            &self.source,
            &self.address,
            &self.sum,
            &self.thread,
        ]
        .into_iter()
        .map(String::as_str)
        .filter(|line| !line.is_empty())
        .collect()
    }

    pub fn tooltip(&self) -> String {
        self.lines().join("\n")
    }
}

fn node_sum_text(store: &NodeStore, index: usize, epsilon: f64) -> String {
    let Some(node) = store.get(index) else {
        return String::new();
    };
    let total = store.total_sample_time();

    if store.root() == Some(index) {
        // The background row spans both sampled time and allocated bytes.
        let top_level = store.top_level();
        return sum_text(
            top_level.samples,
            node.weight - top_level.samples,
            top_level.allocations,
            total,
            epsilon,
        );
    }

    match node.kind {
        NodeKind::Time => sum_text(node.weight, 0.0, 0.0, total, epsilon),
        NodeKind::Allocation => sum_text(0.0, node.weight, node.secondary(), total, epsilon),
    }
}
