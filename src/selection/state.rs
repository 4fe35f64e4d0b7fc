use crate::models::RowKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Exactly one of the two selection shapes is active at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "keys", rename_all = "snake_case")]
pub enum SelectionState {
    /// Keys the operator checked, accumulated across pages.
    Explicit(BTreeSet<RowKey>),
    /// Everything matching the filter except these keys.
    SelectAllMatching(BTreeSet<RowKey>),
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::Explicit(BTreeSet::new())
    }
}

/// Events emitted by the enrollment grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SelectionAction {
    /// A single row checkbox changed.
    Select { key: RowKey, selected: bool },

    /// The header checkbox changed. `total` is the filter's match count,
    /// `loaded` the number of rows the client has fetched so far.
    SelectAllVisible {
        selected: bool,
        visible_keys: Vec<RowKey>,
        total: u64,
        loaded: u64,
    },

    /// The grid reported the checked keys of the visible page; keys of
    /// other pages are left untouched.
    ReplaceVisible {
        visible_keys: Vec<RowKey>,
        selected_keys: Vec<RowKey>,
    },

    /// Search text, date range or any picker changed.
    FilterChanged,
}

impl SelectionState {
    pub fn is_select_all(&self) -> bool {
        matches!(self, SelectionState::SelectAllMatching(_))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            SelectionState::Explicit(_) => "explicit",
            SelectionState::SelectAllMatching(_) => "select_all_matching",
        }
    }

    /// Pure reducer: (state, action) -> state.
    pub fn apply(&self, action: &SelectionAction) -> SelectionState {
        match action {
            SelectionAction::FilterChanged => SelectionState::default(),

            SelectionAction::Select { key, selected } => match self {
                SelectionState::SelectAllMatching(exceptions) => {
                    SelectionState::SelectAllMatching(toggled(exceptions, key, !*selected))
                }
                SelectionState::Explicit(keys) => {
                    SelectionState::Explicit(toggled(keys, key, *selected))
                }
            },

            SelectionAction::SelectAllVisible {
                selected,
                visible_keys,
                total,
                loaded,
            } => {
                if *selected && total > loaded {
                    return SelectionState::SelectAllMatching(BTreeSet::new());
                }
                match self {
                    SelectionState::SelectAllMatching(_) if !*selected => SelectionState::default(),
                    SelectionState::SelectAllMatching(exceptions) => SelectionState::SelectAllMatching(
                        exceptions.iter().filter(|k| !visible_keys.contains(*k)).cloned().collect(),
                    ),
                    SelectionState::Explicit(keys) => {
                        let mut next = keys.clone();
                        for k in visible_keys {
                            if *selected {
                                next.insert(k.clone());
                            } else {
                                next.remove(k);
                            }
                        }
                        SelectionState::Explicit(next)
                    }
                }
            }

            SelectionAction::ReplaceVisible {
                visible_keys,
                selected_keys,
            } => {
                let checked: BTreeSet<&RowKey> = selected_keys.iter().collect();
                match self {
                    SelectionState::Explicit(keys) => {
                        let mut next: BTreeSet<RowKey> = keys
                            .iter()
                            .filter(|k| !visible_keys.contains(*k))
                            .cloned()
                            .collect();
                        next.extend(
                            visible_keys.iter().filter(|k| checked.contains(k)).cloned(),
                        );
                        SelectionState::Explicit(next)
                    }
                    SelectionState::SelectAllMatching(exceptions) => {
                        let mut next: BTreeSet<RowKey> = exceptions
                            .iter()
                            .filter(|k| !visible_keys.contains(*k))
                            .cloned()
                            .collect();
                        next.extend(
                            visible_keys.iter().filter(|k| !checked.contains(k)).cloned(),
                        );
                        SelectionState::SelectAllMatching(next)
                    }
                }
            }
        }
    }

    /// Fold a sequence of actions, starting from `self`.
    pub fn apply_all<'a, I>(&self, actions: I) -> SelectionState
    where
        I: IntoIterator<Item = &'a SelectionAction>,
    {
        actions
            .into_iter()
            .fold(self.clone(), |state, action| state.apply(action))
    }

    /// Keys whose checkbox is drawn checked.
    ///
    /// In select-all mode: the page keys minus the exceptions.
    /// In explicit mode: the raw explicit membership.
    pub fn resolve_visible_keys(&self, page_keys: &[RowKey]) -> Vec<RowKey> {
        match self {
            SelectionState::SelectAllMatching(exceptions) => page_keys
                .iter()
                .filter(|k| !exceptions.contains(*k))
                .cloned()
                .collect(),
            SelectionState::Explicit(keys) => keys.iter().cloned().collect(),
        }
    }

    /// Rows the export would contain, given the filter's match count.
    /// An untouched explicit selection means "export everything".
    pub fn count(&self, total_matching: u64) -> u64 {
        match self {
            SelectionState::SelectAllMatching(exceptions) => {
                total_matching.saturating_sub(exceptions.len() as u64)
            }
            SelectionState::Explicit(keys) if !keys.is_empty() => keys.len() as u64,
            SelectionState::Explicit(_) => total_matching,
        }
    }
}

fn toggled(set: &BTreeSet<RowKey>, key: &RowKey, present: bool) -> BTreeSet<RowKey> {
    let mut next = set.clone();
    if present {
        next.insert(key.clone());
    } else {
        next.remove(key);
    }
    next
}
