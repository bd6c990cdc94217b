//! Input layer: raw window events folded into a polled `InputState`, then
//! resolved into high-level `Action`s through `Bindings`.
//!
//! # Invariants
//! - Cursor offsets are queued in arrival order; the first cursor sample
//!   only seeds the tracker and produces no offset.
//! - A toggle key fires exactly once per press, on the Released -> Pressed edge.
//! - Consumers see actions, never raw window events.

pub mod action;
pub mod event;
pub mod state;
pub mod toggle;

pub use action::{Action, Bindings};
pub use event::{InputEvent, Key};
pub use state::{CursorTracker, InputState};
pub use toggle::ToggleKey;
