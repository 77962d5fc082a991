use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::task_timer::TaskTimer;
use crate::types::{Depth, Node, NodeKind};

/// Immutable, offset-sorted collection of the nodes of one profile.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    total_sample_time: f64,
    max_depth: Depth,
    root: Option<usize>,
    /// The background row adds nothing over the first top level row and is not laid out.
    background_hidden: bool,
    top_level: TopLevelTotals,
}

/// Totals of the depth 1 rows, shown in the tooltip of the background row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TopLevelTotals {
    pub samples: f64,
    pub allocations: f64,
}

/// On-disk form of a decoded profile.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProfileDump {
    pub total_sample_time: f64,
    pub nodes: Vec<Node>,
}

impl NodeStore {
    /// `nodes` must be sorted by offset, ties by depth.
    pub fn new(nodes: Vec<Node>, total_sample_time: f64) -> NodeStore {
        debug_assert!(
            nodes.windows(2).all(|w| w[0].offset < w[1].offset
                || (w[0].offset == w[1].offset && w[0].depth <= w[1].depth)),
            "nodes are not sorted by offset and depth"
        );

        let mut max_depth = 0;
        let mut root = None;
        let mut top_level = TopLevelTotals::default();
        for (i, node) in nodes.iter().enumerate() {
            max_depth = max_depth.max(node.depth + 1);
            if node.depth == 0 && root.is_none() {
                root = Some(i);
            }
            if node.depth == 1 {
                match node.kind {
                    NodeKind::Time => top_level.samples += node.weight,
                    NodeKind::Allocation => top_level.allocations += node.secondary(),
                }
            }
        }

        NodeStore {
            nodes,
            total_sample_time,
            max_depth,
            root,
            background_hidden: false,
            top_level,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of samples taken over the whole profile, the base of every percentage.
    pub fn total_sample_time(&self) -> f64 {
        self.total_sample_time
    }

    /// Number of rows, one more than the deepest depth, one less if the background is hidden.
    pub fn max_depth(&self) -> Depth {
        self.max_depth
    }

    /// Index of the background row, if the profile has one.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Hides the background row when it is no wider than the first top level row, which then
    /// takes the bottom row. Returns whether it was hidden.
    pub fn hide_redundant_background(&mut self, epsilon: f64) -> bool {
        if self.background_hidden {
            return true;
        }
        let (Some(root), Some(first)) = (self.root, self.first_top_level()) else {
            return false;
        };
        if self.nodes[root].weight > self.nodes[first].weight + epsilon {
            return false;
        }
        self.background_hidden = true;
        self.max_depth = self.max_depth.saturating_sub(1);
        true
    }

    pub fn is_background_hidden(&self) -> bool {
        self.background_hidden
    }

    /// Row of `depth` counted from the top of the graph.
    pub fn row_of(&self, depth: Depth) -> Depth {
        let shift = Depth::from(self.background_hidden);
        self.max_depth
            .saturating_sub(depth.saturating_sub(shift))
            .saturating_sub(1)
    }

    pub fn top_level(&self) -> TopLevelTotals {
        self.top_level
    }

    /// Index of the first depth 1 node.
    pub fn first_top_level(&self) -> Option<usize> {
        self.nodes.iter().position(|node| node.depth == 1)
    }
}

/// Reads a profile dump, gzip compressed if the file name ends with `.gz`.
pub fn load_profile(path: &Path) -> Result<NodeStore> {
    let t = TaskTimer::new("Loading profile");

    let mut file_bytes = Vec::new();
    std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .read_to_end(&mut file_bytes)?;

    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
    let dump = parse_profile(&file_bytes, is_gzip)?;
    log::info!(
        "Loaded {} nodes ({} samples total)",
        dump.nodes.len(),
        dump.total_sample_time
    );

    let mut nodes = dump.nodes;
    // Dumps written by hand are not always ordered.
    nodes.sort_by(|a, b| {
        a.offset
            .total_cmp(&b.offset)
            .then_with(|| a.depth.cmp(&b.depth))
    });

    t.stop();
    Ok(NodeStore::new(nodes, dump.total_sample_time))
}

pub fn parse_profile(file_bytes: &[u8], is_gzip: bool) -> Result<ProfileDump> {
    let dump = if is_gzip {
        let mut text = String::new();
        GzDecoder::new(file_bytes)
            .read_to_string(&mut text)
            .context("Failed to decompress profile")?;
        serde_json::from_str(&text)?
    } else {
        let text = std::str::from_utf8(file_bytes)
            .map_err(|e| anyhow::anyhow!("File is not UTF8!: {}", e))?;
        serde_json::from_str(text)?
    };
    Ok(dump)
}
