use crate::errors::AutomationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Opaque handle to a node known to a [`PageEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Whether `other` fully contains `self`.
    pub fn contained_in(&self, other: &Bounds) -> bool {
        self.x >= other.x
            && self.y >= other.y
            && self.x + self.width <= other.x + other.width
            && self.y + self.height <= other.y + other.height
    }
}

/// DOM-level notifications a primitive may need to dispatch explicitly.
///
/// Reactive UI frameworks intercept synthetic value assignment; text entry
/// works by invoking the native value setter and then dispatching these
/// notifications so per-keystroke validation sees each character land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    Input,
    Change,
    Focus,
    Blur,
}

impl DomEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::Focus => "focus",
            DomEvent::Blur => "blur",
        }
    }
}

/// Contract between the automation layer and whatever renders the page.
///
/// Implementations own element lookup and event dispatch mechanics; the
/// automation layer composes these into narrated, paced user interactions.
/// All methods are node-scoped except [`query`] and [`viewport`].
///
/// [`query`]: PageEngine::query
/// [`viewport`]: PageEngine::viewport
#[async_trait]
pub trait PageEngine: Send + Sync {
    /// CSS query over the whole document, in document order.
    async fn query(&self, css: &str) -> Result<Vec<NodeId>, AutomationError>;

    async fn tag_name(&self, node: NodeId) -> Result<String, AutomationError>;

    /// Visible text of the node and its descendants.
    async fn text(&self, node: NodeId) -> Result<String, AutomationError>;

    async fn attribute(
        &self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, AutomationError>;

    /// Current value of a form control.
    async fn value(&self, node: NodeId) -> Result<String, AutomationError>;

    async fn is_disabled(&self, node: NodeId) -> Result<bool, AutomationError>;

    async fn bounds(&self, node: NodeId) -> Result<Bounds, AutomationError>;

    /// The currently visible document region.
    async fn viewport(&self) -> Result<Bounds, AutomationError>;

    /// Scroll so the node is centered in the viewport.
    async fn scroll_into_view(&self, node: NodeId) -> Result<(), AutomationError>;

    async fn click(&self, node: NodeId) -> Result<(), AutomationError>;

    async fn hover(&self, node: NodeId) -> Result<(), AutomationError>;

    async fn focus(&self, node: NodeId) -> Result<(), AutomationError>;

    /// Assign a form control's value through the framework-bypassing native
    /// setter, without dispatching any notification.
    async fn set_native_value(&self, node: NodeId, value: &str) -> Result<(), AutomationError>;

    /// Dispatch a DOM notification on the node.
    async fn dispatch(&self, node: NodeId, event: DomEvent) -> Result<(), AutomationError>;

    /// Select the option whose label matches (case-insensitive) on a select
    /// control. Returns `false` when no such option exists.
    async fn select_option(&self, node: NodeId, label: &str) -> Result<bool, AutomationError>;
}

/// Handle pairing a [`NodeId`] with the engine that produced it.
#[derive(Clone)]
pub struct UiElement {
    engine: Arc<dyn PageEngine>,
    node: NodeId,
}

impl UiElement {
    pub fn new(engine: Arc<dyn PageEngine>, node: NodeId) -> Self {
        Self { engine, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub async fn tag_name(&self) -> Result<String, AutomationError> {
        self.engine.tag_name(self.node).await
    }

    pub async fn text(&self) -> Result<String, AutomationError> {
        self.engine.text(self.node).await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        self.engine.attribute(self.node, name).await
    }

    pub async fn value(&self) -> Result<String, AutomationError> {
        self.engine.value(self.node).await
    }

    pub async fn is_disabled(&self) -> Result<bool, AutomationError> {
        self.engine.is_disabled(self.node).await
    }

    pub async fn bounds(&self) -> Result<Bounds, AutomationError> {
        self.engine.bounds(self.node).await
    }

    pub async fn scroll_into_view(&self) -> Result<(), AutomationError> {
        self.engine.scroll_into_view(self.node).await
    }

    pub async fn click(&self) -> Result<(), AutomationError> {
        self.engine.click(self.node).await
    }

    pub async fn hover(&self) -> Result<(), AutomationError> {
        self.engine.hover(self.node).await
    }

    pub async fn focus(&self) -> Result<(), AutomationError> {
        self.engine.focus(self.node).await
    }

    pub async fn set_native_value(&self, value: &str) -> Result<(), AutomationError> {
        self.engine.set_native_value(self.node, value).await
    }

    pub async fn dispatch(&self, event: DomEvent) -> Result<(), AutomationError> {
        self.engine.dispatch(self.node, event).await
    }

    pub async fn select_option(&self, label: &str) -> Result<bool, AutomationError> {
        self.engine.select_option(self.node, label).await
    }
}

impl std::fmt::Debug for UiElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiElement").field("node", &self.node).finish()
    }
}
