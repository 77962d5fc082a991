use std::path::Path;

use anyhow::{Context, Result};

/// Tolerance for every offset comparison.
/// Offsets come from summed weights upstream, so boundaries can be off by a fraction of a unit.
pub const DEFAULT_EPSILON: f64 = 0.1;

/// Hard cap on the number of rows in a ranked list.
pub const DEFAULT_RANKED_CAP: usize = 100;

/// Layout and tolerance parameters of a flame graph session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    pub epsilon: f64,
    /// Width available to the flame rectangles, without margins.
    pub canvas_width: f32,
    /// Horizontal margin on both sides of the canvas.
    pub margin: f32,
    pub row_height: f32,
    pub header_height: f32,
    pub footer_height: f32,
    pub ranked_row_height: f32,
    pub ranked_cap: usize,
    /// Seed of the color generator, the same seed gives the same colors.
    pub color_seed: u64,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            canvas_width: 1200.0,
            margin: 10.0,
            row_height: 16.0,
            header_height: 50.0,
            footer_height: 90.0,
            ranked_row_height: 16.0,
            ranked_cap: DEFAULT_RANKED_CAP,
            color_seed: 0,
        }
    }
}

impl FlameConfig {
    pub fn load(path: &Path) -> Result<FlameConfig> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: FlameConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Height of the flame part, ranked lists are placed below it.
    pub fn canvas_height(&self, max_depth: u32) -> f32 {
        self.header_height + max_depth as f32 * self.row_height + self.footer_height
    }
}
