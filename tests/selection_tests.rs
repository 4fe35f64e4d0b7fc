mod common;
use common::key;
use coursereport::models::RowKey;
use coursereport::selection::{SelectionAction, SelectionState};
use std::collections::BTreeSet;

fn page_keys(range: std::ops::Range<i64>) -> Vec<RowKey> {
    range.map(|u| RowKey::from_ids(u, 1)).collect()
}

fn header(selected: bool, visible: &[RowKey], total: u64, loaded: u64) -> SelectionAction {
    SelectionAction::SelectAllVisible {
        selected,
        visible_keys: visible.to_vec(),
        total,
        loaded,
    }
}

fn select(k: &RowKey, selected: bool) -> SelectionAction {
    SelectionAction::Select {
        key: k.clone(),
        selected,
    }
}

#[test]
fn header_checkbox_with_more_pages_selects_all_matching() {
    // 250 matches, page size 100
    let page1 = page_keys(1..101);
    let state = SelectionState::default().apply(&header(true, &page1, 250, 100));

    assert_eq!(state, SelectionState::SelectAllMatching(BTreeSet::new()));
    assert_eq!(state.count(250), 250);
}

#[test]
fn unchecking_one_row_in_select_all_adds_an_exception() {
    let page1 = page_keys(1..101);
    let state = SelectionState::default()
        .apply(&header(true, &page1, 250, 100))
        .apply(&select(&page1[7], false));

    let mut expected = BTreeSet::new();
    expected.insert(page1[7].clone());
    assert_eq!(state, SelectionState::SelectAllMatching(expected));
    assert_eq!(state.count(250), 249);
}

#[test]
fn count_tracks_exceptions() {
    let page1 = page_keys(1..51);
    let mut state = SelectionState::default().apply(&header(true, &page1, 100, 50));
    assert_eq!(state.count(100), 100);

    for k in &page1[..3] {
        state = state.apply(&select(k, false));
    }
    assert_eq!(state.count(100), 97);

    state = state.apply(&select(&page1[1], true));
    assert_eq!(state.count(100), 98);
}

#[test]
fn explicit_keys_accumulate_across_pages_then_reset_on_filter_change() {
    let page1 = page_keys(1..11);
    let page2 = page_keys(11..21);

    let actions = vec![
        select(&page1[0], true),
        select(&page1[4], true),
        select(&page1[9], true),
        select(&page2[2], true),
        select(&page2[3], true),
    ];
    let state = SelectionState::default().apply_all(&actions);

    assert_eq!(state.mode(), "explicit");
    assert_eq!(state.count(40), 5);

    let state = state.apply(&SelectionAction::FilterChanged);
    assert_eq!(state, SelectionState::default());
    assert_eq!(state.count(17), 17);
}

#[test]
fn header_off_in_select_all_returns_to_empty_explicit() {
    let page1 = page_keys(1..101);
    let state = SelectionState::default()
        .apply(&header(true, &page1, 250, 100))
        .apply(&select(&page1[0], false))
        .apply(&header(false, &page1, 250, 100));

    assert_eq!(state, SelectionState::Explicit(BTreeSet::new()));
}

#[test]
fn header_on_single_page_is_a_plain_bulk_toggle() {
    let page = page_keys(1..6);
    let state = SelectionState::default().apply(&header(true, &page, 5, 5));

    assert!(!state.is_select_all());
    assert_eq!(state.count(5), 5);

    let state = state.apply(&header(false, &page, 5, 5));
    assert_eq!(state, SelectionState::default());
}

#[test]
fn replace_visible_only_touches_the_visible_page() {
    let page1 = page_keys(1..4);
    let page2 = page_keys(4..7);

    let state = SelectionState::default()
        .apply(&select(&page1[0], true))
        .apply(&select(&page1[1], true))
        .apply(&SelectionAction::ReplaceVisible {
            visible_keys: page2.clone(),
            selected_keys: vec![page2[2].clone()],
        });

    let expected: BTreeSet<RowKey> = [page1[0].clone(), page1[1].clone(), page2[2].clone()]
        .into_iter()
        .collect();
    assert_eq!(state, SelectionState::Explicit(expected));

    // page 1 comes back with only its first row checked
    let state = state.apply(&SelectionAction::ReplaceVisible {
        visible_keys: page1.clone(),
        selected_keys: vec![page1[0].clone()],
    });
    assert_eq!(state.count(6), 2);
}

#[test]
fn visible_checkboxes_hide_exceptions_in_select_all() {
    let page = page_keys(1..5);
    let state = SelectionState::default()
        .apply(&header(true, &page, 40, 4))
        .apply(&select(&page[2], false));

    let checked = state.resolve_visible_keys(&page);
    assert_eq!(checked, vec![page[0].clone(), page[1].clone(), page[3].clone()]);
}

#[test]
fn explicit_checkboxes_reflect_raw_membership() {
    let state = SelectionState::default()
        .apply(&select(&key("9-9"), true))
        .apply(&select(&key("1-1"), true));

    let checked = state.resolve_visible_keys(&page_keys(1..3));
    assert_eq!(checked, vec![key("1-1"), key("9-9")]);
}

#[test]
fn reducer_does_not_mutate_previous_state() {
    let before = SelectionState::default().apply(&select(&key("1-1"), true));
    let snapshot = before.clone();
    let _after = before.apply(&select(&key("2-1"), true));
    assert_eq!(before, snapshot);
}

#[test]
fn actions_deserialize_from_grid_events() {
    let json = r#"[
        {"action": "select_all_visible", "selected": true, "visible_keys": ["1-1", "2-1"], "total": 250, "loaded": 100},
        {"action": "select", "key": "2-1", "selected": false},
        {"action": "filter_changed"}
    ]"#;
    let actions: Vec<SelectionAction> = serde_json::from_str(json).unwrap();
    assert_eq!(actions.len(), 3);

    let state = SelectionState::default().apply_all(&actions[..2]);
    assert_eq!(state.count(250), 249);
    assert_eq!(SelectionState::default().apply_all(&actions), SelectionState::default());
}
