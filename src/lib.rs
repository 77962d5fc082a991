pub mod aggregation;
pub mod applier;
pub mod colors;
pub mod config;
pub mod engine;
pub mod interval_set;
pub mod node_store;
pub mod presentation;
pub mod ranking;
pub mod search;
pub mod selection;
pub mod task_timer;
pub mod types;

pub use engine::FlameEngine;
pub use interval_set::IntervalSet;
pub use node_store::NodeStore;
pub use types::{Classification, Interval, Node, NodeKind};
