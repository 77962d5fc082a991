use flamezoom::aggregation::{AggregationTable, AggregationTables};
use flamezoom::config::FlameConfig;
use flamezoom::presentation::{sum_text, InfoText};
use flamezoom::ranking::{build_rankings, rank_table, rank_threads};
use flamezoom::types::Node;
use flamezoom::NodeStore;

use test_helpers::*;

/// Offers every node to the table under its function name, with its full weight.
fn table_of(nodes: &[Node]) -> AggregationTable {
    let mut table = AggregationTable::default();
    for (index, node) in nodes.iter().enumerate() {
        let key = node.function.as_deref().unwrap();
        table.offer(key, nodes, index, node.weight, 0.1);
    }
    table
}

#[test]
fn test_repeated_keys_ranked_by_sum() {
    let nodes = vec![
        frame(0.0, 2, 1.0, "a"),
        frame(1.0, 2, 50.0, "c"),
        frame(51.0, 2, 4.0, "b"),
        frame(55.0, 2, 2.0, "a"),
        frame(57.0, 2, 6.0, "b"),
    ];
    let table = table_of(&nodes);

    let ranked: Vec<&str> = rank_table(&table, 100)
        .into_iter()
        .map(|(key, _)| key.as_str())
        .collect();
    // "c" has the largest sum but occurs only once.
    assert_eq!(ranked, vec!["b", "a"]);

    let capped: Vec<&str> = rank_table(&table, 1)
        .into_iter()
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(capped, vec!["b"]);
}

#[test]
fn test_zero_sum_keys_are_not_ranked() {
    let nodes = vec![frame(0.0, 2, 0.0, "idle"), frame(0.5, 2, 0.0, "idle")];
    let table = table_of(&nodes);
    assert_eq!(table.get("idle").unwrap().occurrence_count, 2);
    assert!(rank_table(&table, 100).is_empty());
}

#[test]
fn test_threads_ranked_and_single_thread_hidden() {
    let nodes = vec![
        thread_row(0.0, 5.0, "10"),
        thread_row(5.0, 8.0, "9"),
        thread_row(13.0, 5.0, "2"),
    ];
    let mut table = AggregationTable::default();
    for (index, node) in nodes.iter().enumerate() {
        table.offer(node.thread.as_deref().unwrap(), &nodes, index, node.weight, 0.1);
    }
    let ranked: Vec<&str> = rank_threads(&table)
        .into_iter()
        .map(|(key, _)| key.as_str())
        .collect();
    // Equal sums are ordered numerically.
    assert_eq!(ranked, vec!["9", "2", "10"]);

    let single = vec![thread_row(0.0, 5.0, "1")];
    let mut table = AggregationTable::default();
    table.offer("1", &single, 0, 5.0, 0.1);
    assert!(rank_threads(&table).is_empty());
}

#[test]
fn test_thread_names_with_numbers_ranked_naturally() {
    let nodes = vec![
        thread_row(0.0, 3.0, "thread 10"),
        thread_row(3.0, 3.0, "thread 9"),
        thread_row(6.0, 3.0, "thread 2"),
        thread_row(9.0, 3.0, "main"),
        thread_row(12.0, 3.0, "thread 2b"),
    ];
    let mut table = AggregationTable::default();
    for (index, node) in nodes.iter().enumerate() {
        table.offer(node.thread.as_deref().unwrap(), &nodes, index, node.weight, 0.1);
    }
    let ranked: Vec<&str> = rank_threads(&table)
        .into_iter()
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(
        ranked,
        vec!["main", "thread 2", "thread 2b", "thread 9", "thread 10"]
    );
}

#[test]
fn test_build_rankings_bar_widths_and_tooltips() {
    let nodes = vec![
        frame(0.0, 2, 6.0, "big"),
        with_source(frame(6.0, 2, 2.0, "small"), "small.c:4"),
        frame(8.0, 2, 6.0, "big"),
        with_source(frame(14.0, 2, 1.0, "small"), "small.c:4"),
    ];
    let mut tables = AggregationTables::default();
    tables.functions = table_of(&nodes);
    let config = FlameConfig::default();

    // Representatives are indexes into the store, so it must hold the same nodes.
    let store = NodeStore::new(nodes, 15.0);
    let rankings = build_rankings(&store, &tables, &config);

    assert_eq!(rankings.rows, 2);
    assert!(rankings.threads.is_empty());
    let big = &rankings.functions[0];
    let small = &rankings.functions[1];
    assert_eq!(big.key, "big");
    assert_eq!(big.bar_width, config.canvas_width);
    assert_eq!(small.bar_width, config.canvas_width * 0.25);
    assert_eq!(big.tooltip, "big\n12 samples (80.00%)");
    assert_eq!(small.tooltip, "small\nsmall.c:4\n3 samples (20.00%)");
    assert_eq!(small.label, "small");
}

#[test]
fn test_sum_text() {
    assert_eq!(sum_text(1.0, 0.0, 0.0, 4.0, 0.1), "1 sample (25.00%)");
    assert_eq!(
        sum_text(12.0, 2048.0, 4.0, 400.0, 0.1),
        "12 samples (3.00%)  &  2048 B / 4"
    );
    assert_eq!(sum_text(0.0, 2048.0, 0.0, 400.0, 0.1), "2048 B");
    assert_eq!(sum_text(0.05, 0.0, 3.0, 400.0, 0.1), "");
    assert_eq!(sum_text(5.0, 0.0, 0.0, 0.0, 0.1), "5 samples (0.00%)");
}

#[test]
fn test_sum_text_of_partial_samples() {
    // Clipped nodes leave fractional sample counts.
    assert_eq!(sum_text(2.5, 0.0, 0.0, 10.0, 0.1), "3 samples (30.00%)");
    assert_eq!(sum_text(0.6, 0.0, 0.0, 10.0, 0.1), "1 sample (10.00%)");
    assert_eq!(sum_text(1.4, 0.0, 0.0, 10.0, 0.1), "1 sample (10.00%)");
}

#[test]
fn test_info_text() {
    let mut node = frame(0.0, 2, 3.0, "parse");
    node.source = Some("parser.c:120".to_string());
    node.module = Some("C:\\app\\parser.dll".to_string());
    node.thread = Some("7".to_string());
    let store = NodeStore::new(vec![node.clone()], 30.0);

    let info = InfoText::for_node(&store, 0, 0.1);
    assert_eq!(info.function, "parse");
    assert_eq!(info.address, "inlined: C:\\app\\parser.dll");
    assert_eq!(info.sum, "3 samples (10.00%)");
    assert_eq!(info.thread, "7");
    assert_eq!(info.lines().len(), 5);

    node.function = None;
    node.source = None;
    assert_eq!(node.label(), Some("parser.dll"));
}
