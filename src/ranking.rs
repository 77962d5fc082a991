use std::cmp::Ordering;

use crate::aggregation::{AggregationEntry, AggregationTable, AggregationTables};
use crate::colors::{ColorFamily, ColorKey};
use crate::config::FlameConfig;
use crate::node_store::NodeStore;
use crate::presentation::{sum_text, InfoText};
use crate::types::Classification;

/// Narrowest bar of a ranked list, so tiny entries stay clickable.
const MIN_BAR_WIDTH: f32 = 2.0;

/// One row of a ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub classification: Classification,
    pub key: String,
    pub label: String,
    pub tooltip: String,
    pub bar_width: f32,
    pub color_key: ColorKey,
    pub sum: f64,
}

/// Ranked lists of the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub functions: Vec<RankedEntry>,
    pub sources: Vec<RankedEntry>,
    pub addresses: Vec<RankedEntry>,
    pub threads: Vec<RankedEntry>,
    /// Number of rows needed to display the longest list.
    pub rows: usize,
}

impl Rankings {
    pub fn list(&self, classification: Classification) -> &[RankedEntry] {
        match classification {
            Classification::Function => &self.functions,
            Classification::Source => &self.sources,
            Classification::Address => &self.addresses,
            Classification::Thread => &self.threads,
        }
    }
}

/// Keys seen at least twice come first, then by descending sum.
/// Only keys seen at least twice with a nonzero sum are returned, at most `cap` of them.
pub fn rank_table(table: &AggregationTable, cap: usize) -> Vec<(&String, &AggregationEntry)> {
    let mut entries: Vec<(&String, &AggregationEntry)> = table.iter().collect();
    entries.sort_by(|(key_a, a), (key_b, b)| {
        let repeated_a = a.occurrence_count >= 2;
        let repeated_b = b.occurrence_count >= 2;
        repeated_b
            .cmp(&repeated_a)
            .then_with(|| b.sum_primary.total_cmp(&a.sum_primary))
            .then_with(|| key_a.cmp(key_b))
    });
    entries.retain(|(_, entry)| entry.occurrence_count >= 2 && entry.sum_primary > 0.0);
    entries.truncate(cap);
    entries
}

/// Threads with samples, by descending sum. Empty if only a single thread has samples.
pub fn rank_threads(table: &AggregationTable) -> Vec<(&String, &AggregationEntry)> {
    let mut entries: Vec<(&String, &AggregationEntry)> = table
        .iter()
        .filter(|(_, entry)| entry.sum_primary > 0.0)
        .collect();
    entries.sort_by(|(key_a, a), (key_b, b)| {
        b.sum_primary
            .total_cmp(&a.sum_primary)
            .then_with(|| natural_cmp(key_a, key_b))
    });
    if entries.len() == 1 {
        entries.clear();
    }
    entries
}

/// Thread names often carry numbers ("thread 9", "thread 10"), runs of digits compare by value.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_runs = runs(a);
    let mut b_runs = runs(b);
    loop {
        match (a_runs.next(), b_runs.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => match compare_runs(a, b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            },
        }
    }
}

/// Splits `s` into alternating runs of ASCII digits and other characters.
fn runs(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let digits = rest.chars().next()?.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}

fn compare_runs(a: &str, b: &str) -> Ordering {
    let is_number = |run: &str| run.starts_with(|c: char| c.is_ascii_digit());
    if !is_number(a) || !is_number(b) {
        return a.cmp(b);
    }
    // Without leading zeros the longer number is the bigger one, no parsing needed.
    let a_digits = a.trim_start_matches('0');
    let b_digits = b.trim_start_matches('0');
    a_digits
        .len()
        .cmp(&b_digits.len())
        .then_with(|| a_digits.cmp(b_digits))
        .then_with(|| a.len().cmp(&b.len()))
}

pub fn build_rankings(
    store: &NodeStore,
    tables: &AggregationTables,
    config: &FlameConfig,
) -> Rankings {
    let functions = rank_table(&tables.functions, config.ranked_cap);
    let sources = rank_table(&tables.sources, config.ranked_cap);
    let addresses = rank_table(&tables.addresses, config.ranked_cap);
    let threads = rank_threads(&tables.threads);

    let longest_keys = functions.len().max(sources.len()).max(addresses.len());
    // Key lists are on the left and threads on the right, each gets half when both are shown.
    let width = if longest_keys > 0 && !threads.is_empty() {
        (config.canvas_width - config.margin) / 2.0
    } else {
        config.canvas_width
    };

    let builder = EntryBuilder {
        store,
        tables,
        config,
        width,
    };
    Rankings {
        rows: longest_keys.max(threads.len()),
        functions: builder.key_entries(Classification::Function, &functions),
        sources: builder.key_entries(Classification::Source, &sources),
        addresses: builder.key_entries(Classification::Address, &addresses),
        threads: builder.thread_entries(&threads),
    }
}

struct EntryBuilder<'a> {
    store: &'a NodeStore,
    tables: &'a AggregationTables,
    config: &'a FlameConfig,
    width: f32,
}

impl EntryBuilder<'_> {
    fn bar_width(&self, sum: f64, max_sum: f64) -> f32 {
        let width = if max_sum > 0.0 {
            (sum / max_sum) as f32 * self.width
        } else {
            0.0
        };
        width.max(MIN_BAR_WIDTH)
    }

    fn entry_sum_text(&self, entry: &AggregationEntry) -> String {
        let (samples, bytes) = if self.tables.is_time() {
            (entry.sum_primary, 0.0)
        } else {
            (0.0, entry.sum_primary)
        };
        sum_text(
            samples,
            bytes,
            entry.sum_secondary,
            self.store.total_sample_time(),
            self.config.epsilon,
        )
    }

    fn key_entries(
        &self,
        classification: Classification,
        ranked: &[(&String, &AggregationEntry)],
    ) -> Vec<RankedEntry> {
        let max_sum = ranked.first().map_or(0.0, |(_, entry)| entry.sum_primary);
        ranked
            .iter()
            .filter_map(|(key, entry)| {
                let node = self.store.get(entry.representative)?;

                let mut info = InfoText::attributes_of(node);
                // Details that differ between the contributions would be misleading.
                if classification != Classification::Source && !entry.single_source {
                    info.source.clear();
                }
                if classification != Classification::Address && !entry.single_address {
                    info.address.clear();
                }
                info.sum = self.entry_sum_text(entry);

                Some(RankedEntry {
                    classification,
                    key: (*key).clone(),
                    label: node.label().unwrap_or(key.as_str()).to_string(),
                    tooltip: info.tooltip(),
                    bar_width: self.bar_width(entry.sum_primary, max_sum),
                    color_key: ColorKey::of_node(node),
                    sum: entry.sum_primary,
                })
            })
            .collect()
    }

    fn thread_entries(&self, ranked: &[(&String, &AggregationEntry)]) -> Vec<RankedEntry> {
        let max_sum = ranked.first().map_or(0.0, |(_, entry)| entry.sum_primary);
        ranked
            .iter()
            .map(|(key, entry)| RankedEntry {
                classification: Classification::Thread,
                key: (*key).clone(),
                label: (*key).clone(),
                tooltip: format!("{}\n{}", key, self.entry_sum_text(entry)),
                bar_width: self.bar_width(entry.sum_primary, max_sum),
                color_key: ColorKey::new(ColorFamily::Thread, key.as_str()),
                sum: entry.sum_primary,
            })
            .collect()
    }
}
