//! Narrated UI automation for scripted user journeys
//!
//! This crate drives a web-style UI the way a careful human would: every
//! interaction is an atomic, narrated operation (click, fill, choose, hover,
//! scroll, wait) paced by configurable delays, and element lookup walks an
//! ordered ladder of resolution strategies until one produces a hit.
//!
//! The actual page transport is abstracted behind [`PageEngine`]; an
//! in-memory [`sim::SimPage`] implementation ships with the crate for tests
//! and scripted demo runs.

pub mod engine;
pub mod errors;
pub mod events;
pub mod interact;
pub mod locator;
pub mod pacing;
pub mod resolve;
pub mod selector;
pub mod sim;

pub use engine::{Bounds, DomEvent, NodeId, PageEngine, UiElement};
pub use errors::AutomationError;
pub use events::{Narrator, ThoughtEvent, ThoughtKind};
pub use interact::Interactor;
pub use locator::Locator;
pub use pacing::Pacing;
pub use resolve::{ResolveStrategy, Resolver};
pub use selector::ElementQuery;

use std::sync::Arc;

/// The main entry point for driving a page.
///
/// Wraps a [`PageEngine`] and hands out [`Locator`]s bound to it, mirroring
/// the way a browser automation session wraps its transport.
#[derive(Clone)]
pub struct Page {
    engine: Arc<dyn PageEngine>,
}

impl Page {
    pub fn new(engine: Arc<dyn PageEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> Arc<dyn PageEngine> {
        self.engine.clone()
    }

    /// Create a locator for the given query.
    pub fn locator(&self, query: impl Into<ElementQuery>) -> Locator {
        Locator::new(self.engine.clone(), query.into())
    }
}
