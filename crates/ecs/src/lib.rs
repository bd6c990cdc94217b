//! Data-oriented scene storage.
//!
//! Entities are plain [`EntityId`](vista_common::EntityId)s handed out by a
//! [`Scene`] arena. Each component type lives in its own `BTreeMap` keyed by
//! id, and systems are free functions over the scene.
//!
//! # Invariants
//! - Iteration order is deterministic (BTreeMap, ids ascending).
//! - The parent graph is acyclic; `Scene::set_parent` rejects cycles.
//! - World matrices are only written by `propagate_transforms`.

mod components;
pub mod demos;
mod rng;
mod scene;
mod systems;

pub use components::{Name, Parent, Renderable};
pub use rng::SplitMix64;
pub use scene::{Scene, SceneError, SceneSummary};
pub use systems::{collect_draws, propagate_transforms};
