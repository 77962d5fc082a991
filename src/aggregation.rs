use std::collections::HashMap;

use crate::types::{Classification, Node, NodeKind, Offset};

/// Running statistics of one classification key for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationEntry {
    pub occurrence_count: usize,
    /// End of the furthest-right node credited to this key so far.
    pub max_extent: Offset,
    pub sum_primary: f64,
    pub sum_secondary: f64,
    /// Index of a node carrying the display attributes of the key.
    pub representative: usize,
    /// All contributions came from the same source location.
    pub single_source: bool,
    /// All contributions came from the same address.
    pub single_address: bool,
}

impl AggregationEntry {
    fn new(representative: usize) -> Self {
        Self {
            occurrence_count: 0,
            max_extent: 0.0,
            sum_primary: 0.0,
            sum_secondary: 0.0,
            representative,
            single_source: true,
            single_address: true,
        }
    }
}

/// Key to statistics map of one classification.
#[derive(Debug, Clone, Default)]
pub struct AggregationTable {
    entries: HashMap<String, AggregationEntry>,
}

impl AggregationTable {
    /// Credits `node` to `key` unless an earlier node of the same key already covers its start.
    ///
    /// A recursive or inlined frame appears several times in one stack with the same key, only the
    /// outermost occurrence is counted. Returns true if the contribution was accepted.
    pub fn offer(
        &mut self,
        key: &str,
        nodes: &[Node],
        node_index: usize,
        visible_weight: f64,
        epsilon: f64,
    ) -> bool {
        let node = &nodes[node_index];
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| AggregationEntry::new(node_index));

        if node.offset + epsilon < entry.max_extent {
            return false;
        }

        let representative = &nodes[entry.representative];
        if representative.source != node.source {
            entry.single_source = false;
        }
        if representative.address != node.address {
            entry.single_address = false;
        }

        entry.occurrence_count += 1;
        entry.sum_primary += visible_weight;
        entry.sum_secondary += node.secondary();
        // The unclipped end, later occurrences are compared against the full node.
        entry.max_extent = node.end();
        true
    }

    pub fn get(&self, key: &str) -> Option<&AggregationEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AggregationEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// The four tables, rebuilt from scratch on every selection change.
#[derive(Debug, Clone, Default)]
pub struct AggregationTables {
    pub functions: AggregationTable,
    pub sources: AggregationTable,
    pub addresses: AggregationTable,
    pub threads: AggregationTable,
    /// Kind of the first aggregated node. Nodes of the other kind are not mixed into the tables.
    pub kind: Option<NodeKind>,
}

impl AggregationTables {
    pub fn table(&self, classification: Classification) -> &AggregationTable {
        match classification {
            Classification::Function => &self.functions,
            Classification::Source => &self.sources,
            Classification::Address => &self.addresses,
            Classification::Thread => &self.threads,
        }
    }

    pub fn table_mut(&mut self, classification: Classification) -> &mut AggregationTable {
        match classification {
            Classification::Function => &mut self.functions,
            Classification::Source => &mut self.sources,
            Classification::Address => &mut self.addresses,
            Classification::Thread => &mut self.threads,
        }
    }

    pub fn clear(&mut self) {
        for classification in Classification::ALL {
            self.table_mut(classification).clear();
        }
        self.kind = None;
    }

    /// Fixes the table kind on first use and tells whether `kind` may be aggregated.
    pub fn accepts_kind(&mut self, kind: NodeKind) -> bool {
        *self.kind.get_or_insert(kind) == kind
    }

    /// Whether the aggregated weights are samples (otherwise bytes).
    pub fn is_time(&self) -> bool {
        self.kind != Some(NodeKind::Allocation)
    }
}
