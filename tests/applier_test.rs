use approx::assert_abs_diff_eq;

use flamezoom::applier::apply;
use flamezoom::config::FlameConfig;
use flamezoom::selection;
use flamezoom::{Classification, IntervalSet};

use test_helpers::*;

#[test]
fn test_zoom_into_main_shows_children_proportionally() {
    let store = main_foo_bar();
    let config = FlameConfig::default();
    let selection = IntervalSet::new(selection::from_node(&store.nodes()[0]));

    let result = apply(&store, &selection, &config);

    assert!(result.displays.iter().all(|display| display.visible));
    let main = result.displays[0];
    let foo = result.displays[1];
    let bar = result.displays[2];
    assert_abs_diff_eq!(main.rect.width, config.canvas_width, epsilon = 1e-3);
    assert_abs_diff_eq!(foo.rect.width, config.canvas_width * 0.6, epsilon = 1e-3);
    assert_abs_diff_eq!(bar.rect.width, config.canvas_width * 0.4, epsilon = 1e-3);
    assert_abs_diff_eq!(bar.rect.x, config.margin + config.canvas_width * 0.6, epsilon = 1e-3);

    // Three rows, depth 1 is the lowest one.
    assert_abs_diff_eq!(main.rect.y, config.header_height + config.row_height, epsilon = 1e-3);
    assert_abs_diff_eq!(foo.rect.y, config.header_height, epsilon = 1e-3);
    assert_eq!(main.opacity, 1.0);
}

#[test]
fn test_zoom_into_child_hides_sibling_and_dims_parent() {
    let store = main_foo_bar();
    let config = FlameConfig::default();
    let selection = IntervalSet::new(selection::from_node(&store.nodes()[1]));

    let result = apply(&store, &selection, &config);

    let main = result.displays[0];
    assert!(main.visible);
    assert_eq!(main.opacity, 0.5);
    assert_abs_diff_eq!(main.rect.width, config.canvas_width, epsilon = 1e-3);
    assert!(result.displays[1].visible);
    assert_eq!(result.displays[1].opacity, 1.0);
    assert!(!result.displays[2].visible);
}

#[test]
fn test_node_spanning_a_gap_is_clipped() {
    let store = main_foo_bar();
    let config = FlameConfig::default();
    let selection = IntervalSet::new(vec![iv(0.0, 3.0, 1), iv(7.0, 3.0, 1)]);

    let result = apply(&store, &selection, &config);

    let widths: Vec<f32> = result.displays.iter().map(|d| d.rect.width).collect();
    assert_abs_diff_eq!(widths[0], config.canvas_width, epsilon = 1e-3);
    assert_abs_diff_eq!(widths[1], config.canvas_width / 2.0, epsilon = 1e-3);
    assert_abs_diff_eq!(widths[2], config.canvas_width / 2.0, epsilon = 1e-3);
    assert_abs_diff_eq!(
        result.displays[2].rect.x,
        config.margin + config.canvas_width / 2.0,
        epsilon = 1e-3
    );
}

#[test]
fn test_node_visible_across_adjacent_intervals() {
    let store = main_foo_bar();
    let config = FlameConfig::default();
    let selection = IntervalSet::new(vec![iv(0.0, 5.0, 0), iv(5.0, 5.0, 0)]);

    let result = apply(&store, &selection, &config);

    assert_abs_diff_eq!(result.displays[0].rect.width, config.canvas_width, epsilon = 1e-3);
    let depth_2_width: f32 = result.displays[1..].iter().map(|d| d.rect.width).sum();
    assert_abs_diff_eq!(depth_2_width, config.canvas_width, epsilon = 1e-3);
}

#[test]
fn test_visibility_matches_intersection() {
    let store = store(vec![
        frame(0.0, 1, 4.0, "a"),
        frame(4.0, 1, 3.0, "b"),
        frame(7.0, 1, 5.0, "c"),
        frame(12.0, 1, 2.0, "d"),
    ]);
    let config = FlameConfig::default();
    let selections = vec![
        vec![iv(4.0, 3.0, 1)],
        vec![iv(0.0, 2.0, 1), iv(12.0, 2.0, 1)],
        vec![iv(5.0, 4.0, 1)],
        vec![iv(6.96, 5.08, 1)],
    ];

    for intervals in selections {
        let selection = IntervalSet::new(intervals.clone());
        let result = apply(&store, &selection, &config);
        for (node, display) in store.nodes().iter().zip(&result.displays) {
            let intersects = intervals.iter().any(|interval| {
                node.end().min(interval.end()) - node.offset.max(interval.offset)
                    > config.epsilon
            });
            assert_eq!(
                display.visible, intersects,
                "node {node:?} with selection {intervals:?}"
            );
        }
    }
}

#[test]
fn test_empty_selection_hides_everything() {
    let store = main_foo_bar();
    let result = apply(&store, &IntervalSet::default(), &FlameConfig::default());

    assert!(result.displays.iter().all(|display| !display.visible));
    assert_eq!(result.summary.samples(), 0.0);
    assert_eq!(result.summary.bytes, 0.0);
    assert!(result.tables.functions.is_empty());
}

#[test]
fn test_inlined_duplicate_counted_once() {
    let store = store(vec![
        frame(0.0, 1, 10.0, "main"),
        frame(0.0, 2, 6.0, "foo"),
        frame(0.0, 3, 6.0, "foo"),
    ]);
    let config = FlameConfig::default();

    let (intervals, first) =
        selection::from_key(&store, Classification::Function, "foo", config.epsilon);
    assert_eq!(intervals.len(), 1);
    assert_eq!(first, Some(1));

    let result = apply(&store, &IntervalSet::new(intervals), &config);
    let foo = result.tables.functions.get("foo").expect("foo is aggregated");
    assert_eq!(foo.occurrence_count, 1);
    assert_eq!(foo.sum_primary, 6.0);
    assert_eq!(foo.representative, 1);
}

#[test]
fn test_recursion_counted_per_call() {
    let store = store(vec![
        frame(0.0, 1, 10.0, "main"),
        frame(0.0, 2, 6.0, "foo"),
        frame(0.0, 3, 6.0, "foo"),
        frame(6.0, 2, 4.0, "bar"),
        frame(6.0, 3, 2.0, "foo"),
    ]);
    let config = FlameConfig::default();
    let selection = IntervalSet::new(vec![iv(0.0, 10.0, 1)]);

    let result = apply(&store, &selection, &config);

    let foo = result.tables.functions.get("foo").expect("foo is aggregated");
    assert_eq!(foo.occurrence_count, 2);
    assert_eq!(foo.sum_primary, 8.0);
    assert_eq!(foo.max_extent, 8.0);
    assert_eq!(result.tables.functions.get("main").unwrap().occurrence_count, 1);
}

#[test]
fn test_aggregated_weight_is_clipped_but_extent_is_not() {
    let store = main_foo_bar();
    let config = FlameConfig::default();
    let selection = IntervalSet::new(vec![iv(2.0, 6.0, 1)]);

    let result = apply(&store, &selection, &config);

    let foo = result.tables.functions.get("foo").unwrap();
    assert_eq!(foo.sum_primary, 4.0);
    assert_eq!(foo.max_extent, 6.0);
    let bar = result.tables.functions.get("bar").unwrap();
    assert_eq!(bar.sum_primary, 2.0);
}

#[test]
fn test_single_source_tracking() {
    let store = store(vec![
        frame(0.0, 1, 10.0, "main"),
        with_source(frame(0.0, 2, 4.0, "foo"), "foo.c:10"),
        with_source(frame(4.0, 2, 4.0, "foo"), "foo.c:12"),
        with_source(frame(8.0, 2, 2.0, "bar"), "bar.c:3"),
        with_source(frame(8.0, 3, 2.0, "bar"), "bar.c:3"),
    ]);
    let selection = IntervalSet::new(vec![iv(0.0, 10.0, 1)]);

    let result = apply(&store, &selection, &FlameConfig::default());

    assert!(!result.tables.functions.get("foo").unwrap().single_source);
    assert!(result.tables.functions.get("bar").unwrap().single_source);
    assert!(result.tables.functions.get("foo").unwrap().single_address);
}

#[test]
fn test_thread_table_dedup() {
    let store = store(vec![
        root(20.0),
        thread_row(0.0, 12.0, "1"),
        with_thread(frame(0.0, 2, 12.0, "work"), "1"),
        thread_row(12.0, 8.0, "2"),
        with_thread(frame(12.0, 2, 8.0, "work"), "2"),
    ]);
    let selection = IntervalSet::new(vec![iv(0.0, 20.0, 0)]);

    let result = apply(&store, &selection, &FlameConfig::default());

    let thread_1 = result.tables.threads.get("1").unwrap();
    assert_eq!(thread_1.occurrence_count, 1);
    assert_eq!(thread_1.sum_primary, 12.0);
    assert_eq!(result.tables.threads.get("2").unwrap().sum_primary, 8.0);
}

#[test]
fn test_time_summary() {
    let store = main_foo_bar();
    let selection = IntervalSet::new(vec![iv(0.0, 6.0, 2)]);

    let result = apply(&store, &selection, &FlameConfig::default());

    assert_eq!(result.summary.samples(), 6.0);
    assert_eq!(result.summary.bytes, 0.0);
    assert_eq!(result.summary.allocations, 0.0);
}

#[test]
fn test_allocation_summary() {
    let store = store(vec![
        root(150.0),
        allocation(0.0, 1, 100.0, 2, "a.c:1"),
        allocation(100.0, 1, 50.0, 1, "b.c:2"),
    ]);
    let config = FlameConfig::default();

    let all = apply(&store, &IntervalSet::new(vec![iv(0.0, 150.0, 0)]), &config);
    assert_eq!(all.summary.bytes, 150.0);
    assert_eq!(all.summary.samples(), 0.0);
    assert_eq!(all.summary.allocations, 3.0);
    assert!(!all.tables.is_time());

    // Half of an allocation site is in view, its count can't be split.
    let partial = apply(&store, &IntervalSet::new(vec![iv(50.0, 100.0, 0)]), &config);
    assert_eq!(partial.summary.bytes, 100.0);
    assert_eq!(partial.summary.allocations, 0.0);
}
