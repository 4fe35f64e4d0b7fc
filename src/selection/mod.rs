//! Client-side selection reconciler.
//!
//! Tracks which rows, among *all* rows matching the active filter, the
//! operator wants to export, without ever holding the full row set. The
//! state is a pure value: every transition returns a new state.

mod encoder;
mod state;

pub use encoder::encode_intent;
pub use state::{SelectionAction, SelectionState};
