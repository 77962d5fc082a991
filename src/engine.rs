use eframe::egui::Color32;

use crate::applier::{apply, ApplyResult, Summary};
use crate::colors::{self, ColorCache, ColorKey};
use crate::config::FlameConfig;
use crate::interval_set::IntervalSet;
use crate::node_store::NodeStore;
use crate::presentation::{sum_text, InfoText};
use crate::ranking::{build_rankings, RankedEntry, Rankings};
use crate::search::SearchFilter;
use crate::selection;
use crate::task_timer::TaskTimer;
use crate::types::{Classification, Interval, NodeDisplay};

/// Session state of one flame graph.
///
/// Every interaction builds a new selection (or cuts the current one) and then recomputes all
/// derived state from scratch.
pub struct FlameEngine {
    store: NodeStore,
    config: FlameConfig,
    selection: IntervalSet,
    result: ApplyResult,
    rankings: Rankings,
    colors: ColorCache,
    search: SearchFilter,
    /// Info text shown while nothing is hovered, describes what was zoomed into.
    info_reset: InfoText,
}

impl FlameEngine {
    pub fn new(mut store: NodeStore, config: FlameConfig) -> FlameEngine {
        if store.hide_redundant_background(config.epsilon) {
            log::debug!("Background row hidden, it holds no more than the first top level row");
        }
        let colors = ColorCache::new(config.color_seed);
        let mut engine = FlameEngine {
            store,
            config,
            selection: IntervalSet::default(),
            result: ApplyResult::default(),
            rankings: Rankings::default(),
            colors,
            search: SearchFilter::default(),
            info_reset: InfoText::default(),
        };

        match engine.initial_zoom_node() {
            Some(index) => engine.zoom_node(index),
            None => engine.recompute(),
        }
        engine
    }

    /// The background row, or the first top level row if the background is hidden.
    fn initial_zoom_node(&self) -> Option<usize> {
        let first = self.store.first_top_level();
        if self.store.is_background_hidden() {
            return first;
        }
        self.store.root().or(first)
    }

    pub fn zoom_node(&mut self, index: usize) {
        let Some(node) = self.store.get(index) else {
            log::warn!("Zoom into unknown node {index}");
            return;
        };
        let intervals = selection::from_node(node);
        self.info_reset = InfoText {
            thread: node.thread.clone().unwrap_or_default(),
            ..InfoText::attributes_of(node)
        };
        self.apply_new_selection(intervals);
    }

    /// Removes the node's range from the selection, or everything but it with `invert`.
    pub fn zoom_out_node(&mut self, index: usize, invert: bool) {
        let Some(node) = self.store.get(index) else {
            log::warn!("Zoom out of unknown node {index}");
            return;
        };
        let delta = selection::from_node(node);
        self.subtract(&delta, invert);
    }

    pub fn zoom_key(&mut self, classification: Classification, key: &str) {
        let (intervals, first) =
            selection::from_key(&self.store, classification, key, self.config.epsilon);

        self.info_reset = match classification {
            Classification::Thread => InfoText {
                function: key.to_string(),
                ..InfoText::default()
            },
            _ => first
                .and_then(|index| self.store.get(index))
                .map(InfoText::attributes_of)
                .unwrap_or_default(),
        };
        self.apply_new_selection(intervals);
    }

    pub fn zoom_out_key(&mut self, classification: Classification, key: &str, invert: bool) {
        let (delta, _) = selection::from_key(&self.store, classification, key, self.config.epsilon);
        self.subtract(&delta, invert);
    }

    pub fn zoom_blocked(&mut self) {
        let intervals = selection::blocked(&self.store, self.config.epsilon);
        self.info_reset = InfoText {
            function: "blocked".to_string(),
            ..InfoText::default()
        };
        self.apply_new_selection(intervals);
    }

    pub fn zoom_out_blocked(&mut self, invert: bool) {
        let delta = selection::blocked(&self.store, self.config.epsilon);
        self.subtract(&delta, invert);
    }

    fn apply_new_selection(&mut self, intervals: Vec<Interval>) {
        self.selection.apply_new_selection(intervals, self.config.epsilon);
        self.recompute();
    }

    fn subtract(&mut self, delta: &[Interval], invert: bool) {
        self.selection.subtract(delta, invert, self.config.epsilon);
        self.recompute();
    }

    fn recompute(&mut self) {
        let t = TaskTimer::new("Applying selection");
        self.result = apply(&self.store, &self.selection, &self.config);
        self.rankings = build_rankings(&self.store, &self.result.tables, &self.config);
        self.info_reset.sum = self.summary_text();
        log::debug!(
            "Selection of {} intervals, {} ranked functions",
            self.selection.len(),
            self.rankings.functions.len()
        );
        t.stop();
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn config(&self) -> &FlameConfig {
        &self.config
    }

    pub fn selection(&self) -> &IntervalSet {
        &self.selection
    }

    pub fn result(&self) -> &ApplyResult {
        &self.result
    }

    pub fn rankings(&self) -> &Rankings {
        &self.rankings
    }

    pub fn summary(&self) -> Summary {
        self.result.summary
    }

    pub fn summary_text(&self) -> String {
        let summary = self.result.summary;
        sum_text(
            summary.samples(),
            summary.bytes,
            summary.allocations,
            self.store.total_sample_time(),
            self.config.epsilon,
        )
    }

    pub fn display(&self, index: usize) -> NodeDisplay {
        self.result
            .displays
            .get(index)
            .copied()
            .unwrap_or_else(NodeDisplay::hidden)
    }

    pub fn info_for(&self, index: usize) -> InfoText {
        InfoText::for_node(&self.store, index, self.config.epsilon)
    }

    pub fn info_reset(&self) -> &InfoText {
        &self.info_reset
    }

    pub fn set_search(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.search.set_pattern(pattern)
    }

    pub fn search(&self) -> &SearchFilter {
        &self.search
    }

    pub fn node_color(&mut self, index: usize) -> Color32 {
        let Some(node) = self.store.get(index) else {
            return colors::BACKGROUND;
        };
        if self.search.matches(node) {
            return colors::SEARCH_HIGHLIGHT;
        }
        self.colors.color(&ColorKey::of_node(node))
    }

    pub fn entry_color(&mut self, entry: &RankedEntry) -> Color32 {
        self.colors.color(&entry.color_key)
    }

    /// Opacity of a node while a ranked entry is hovered: nodes of that key are fully shown, the
    /// rest fades out.
    pub fn hover_opacity(&self, index: usize, hovered: Option<(Classification, &str)>) -> f32 {
        let opacity = self.display(index).opacity;
        let (Some((classification, key)), Some(node)) = (hovered, self.store.get(index)) else {
            return opacity;
        };
        if node.key(classification) == Some(key) {
            1.0
        } else {
            opacity * 0.25
        }
    }
}
