use regex::{Regex, RegexBuilder};

use crate::types::Node;

/// Case-insensitive pattern highlighting matching function names.
/// Only affects colors, never the selection or the aggregation.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pattern: Option<Regex>,
}

impl SearchFilter {
    /// An empty pattern clears the filter. On error the previous pattern stays active.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), regex::Error> {
        if pattern.is_empty() {
            self.pattern = None;
            return Ok(());
        }
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.pattern = Some(regex);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pattern = None;
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn matches(&self, node: &Node) -> bool {
        match (&self.pattern, &node.function) {
            (Some(pattern), Some(function)) => pattern.is_match(function),
            _ => false,
        }
    }
}
