/// Position along the cumulative weight axis (samples or bytes).
pub type Offset = f64;

pub type Depth = u32;

/// What the primary weight of a node measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    /// Weight is a number of samples.
    #[default]
    Time,
    /// Weight is a number of bytes, `secondary_weight` the number of allocations.
    Allocation,
}

/// One rectangle of the flame graph.
///
/// Nodes form an implicit tree of intervals: a child's `[offset, offset + weight)` lies inside its
/// parent's range and siblings never overlap. The store keeps them sorted by offset, then depth.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub offset: Offset,
    /// Depth 0 is the synthetic background row.
    pub depth: Depth,
    pub weight: f64,
    #[serde(default)]
    pub secondary_weight: Option<u64>,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub thread: Option<String>,
    #[serde(default)]
    pub blocked: bool,
}

impl Node {
    pub fn end(&self) -> Offset {
        self.offset + self.weight
    }

    pub fn secondary(&self) -> f64 {
        self.secondary_weight.unwrap_or(0) as f64
    }

    pub fn key(&self, classification: Classification) -> Option<&str> {
        match classification {
            Classification::Function => self.function.as_deref(),
            Classification::Source => self.source.as_deref(),
            Classification::Address => self.address.as_deref(),
            Classification::Thread => self.thread.as_deref(),
        }
    }

    /// Text displayed inside the node's rectangle.
    pub fn label(&self) -> Option<&str> {
        if let Some(function) = &self.function {
            return Some(function);
        }
        if let Some(source) = &self.source {
            return Some(source);
        }
        if let Some(module) = &self.module {
            return Some(module_basename(module));
        }
        self.address.as_deref().or(self.thread.as_deref())
    }

    /// Address and module, e.g. `0x401000: C:\app\app.exe`.
    /// Frames that only know their module are inlined ones.
    pub fn address_text(&self) -> String {
        match (&self.address, &self.module) {
            (Some(address), Some(module)) => format!("{address}: {module}"),
            (None, Some(module)) => format!("inlined: {module}"),
            (Some(address), None) => address.clone(),
            (None, None) => String::new(),
        }
    }
}

pub fn module_basename(module: &str) -> &str {
    match module.rfind(['\\', '/']) {
        Some(delim) => &module[delim + 1..],
        None => module,
    }
}

/// The four axes by which samples are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    Function,
    Source,
    Address,
    Thread,
}

impl Classification {
    pub const ALL: [Classification; 4] = [
        Classification::Function,
        Classification::Source,
        Classification::Address,
        Classification::Thread,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Classification::Function => "Functions",
            Classification::Source => "Sources",
            Classification::Address => "Addresses",
            Classification::Thread => "Threads",
        }
    }
}

/// A contiguous selected range of the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub offset: Offset,
    pub length: f64,
    /// Rows shallower than this are shown dimmed, as context for the zoomed focus.
    pub min_depth: Depth,
}

impl Interval {
    pub fn new(offset: Offset, length: f64, min_depth: Depth) -> Self {
        Self {
            offset,
            length,
            min_depth,
        }
    }

    pub fn end(&self) -> Offset {
        self.offset + self.length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Computed display state of a node for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeDisplay {
    pub visible: bool,
    pub rect: DisplayRect,
    pub opacity: f32,
}

impl NodeDisplay {
    pub fn hidden() -> Self {
        Self::default()
    }
}
