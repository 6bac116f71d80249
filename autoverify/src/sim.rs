//! In-memory page engine.
//!
//! `SimPage` implements [`PageEngine`] over a node tree with a small CSS
//! subset, a scrollable viewport model, scriptable click behaviors, and a
//! recorded event log. It backs the integration tests and any scripted demo
//! run where no real UI transport is attached.
//!
//! Supported selector grammar: comma-separated alternatives of descendant
//! chains of compound selectors, each compound being
//! `tag`/`*` + `#id` + `.class`* + `[attr]`/`[attr="value"]`*.

use crate::engine::{Bounds, DomEvent, NodeId, PageEngine};
use crate::errors::AutomationError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One recorded engine-level event, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEvent {
    pub node: NodeId,
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct SimNode {
    pub tag: String,
    pub id_attr: Option<String>,
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,
    pub text: String,
    pub value: String,
    pub disabled: bool,
    pub bounds: Bounds,
    pub parent: Option<NodeId>,
    pub detached: bool,
}

impl SimNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id_attr: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            bounds: Bounds::new(0.0, 0.0, 100.0, 24.0),
            parent: None,
            detached: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id_attr = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id_attr.clone(),
            "class" => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(self.classes.join(" "))
                }
            }
            "value" => Some(self.value.clone()),
            _ => self.attrs.get(name).cloned(),
        }
    }
}

/// The mutable document: nodes, viewport, scroll position, event log.
pub struct SimDom {
    nodes: Vec<SimNode>,
    viewport_size: (f64, f64),
    scroll_y: f64,
    events: Vec<SimEvent>,
}

impl SimDom {
    fn node(&self, id: NodeId) -> Result<&SimNode, AutomationError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| AutomationError::EngineError(format!("unknown {id}")))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SimNode, AutomationError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| AutomationError::EngineError(format!("unknown {id}")))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Ok(node) = self.node_mut(id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Ok(node) = self.node_mut(id) {
            node.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id)
            .map(|n| n.classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let Ok(node) = self.node_mut(id) {
            node.text = text.to_string();
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Ok(node) = self.node_mut(id) {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Ok(node) = self.node_mut(id) {
            node.value = value.to_string();
        }
    }

    pub fn value_of(&self, id: NodeId) -> String {
        self.node(id).map(|n| n.value.clone()).unwrap_or_default()
    }

    /// Detach a node (and implicitly its subtree) from queries.
    pub fn remove(&mut self, id: NodeId) {
        if let Ok(node) = self.node_mut(id) {
            node.detached = true;
        }
    }

    /// First match for the selector, in document order.
    pub fn find(&self, selector: &str) -> Option<NodeId> {
        self.query_selector(selector)
            .ok()
            .and_then(|m| m.into_iter().next())
    }

    fn is_detached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Ok(node) if node.detached => return true,
                Ok(node) => current = node.parent,
                Err(_) => return true,
            }
        }
        false
    }

    fn gather_text(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        if let Ok(node) = self.node(id) {
            if !node.text.is_empty() {
                parts.push(node.text.clone());
            }
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.parent == Some(id) && !node.detached {
                let child_text = self.gather_text(NodeId(idx as u64));
                if !child_text.is_empty() {
                    parts.push(child_text);
                }
            }
        }
        parts.join(" ")
    }

    fn query_selector(&self, selector: &str) -> Result<Vec<NodeId>, AutomationError> {
        let mut chains = Vec::new();
        for alt in selector.split(',') {
            let alt = alt.trim();
            if alt.is_empty() {
                return Err(AutomationError::InvalidSelector(selector.to_string()));
            }
            let chain: Result<Vec<Compound>, _> =
                alt.split_whitespace().map(Compound::parse).collect();
            chains.push(chain?);
        }

        let mut matches = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            let id = NodeId(idx as u64);
            if node.detached || self.is_detached(id) {
                continue;
            }
            if chains.iter().any(|chain| self.matches_chain(id, chain)) {
                matches.push(id);
            }
        }
        Ok(matches)
    }

    fn matches_chain(&self, id: NodeId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }
        // Remaining compounds must match ancestors, innermost first.
        let mut current = self.node(id).ok().and_then(|n| n.parent);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(ancestor) = current else {
                    return false;
                };
                current = self.node(ancestor).ok().and_then(|n| n.parent);
                if self.matches_compound(ancestor, compound) {
                    break;
                }
            }
        }
        true
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let Ok(node) = self.node(id) else {
            return false;
        };
        if let Some(tag) = &compound.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some(want) = &compound.id {
            if node.id_attr.as_deref() != Some(want.as_str()) {
                return false;
            }
        }
        for class in &compound.classes {
            if !node.classes.iter().any(|c| c == class) {
                return false;
            }
        }
        for (name, value) in &compound.attrs {
            match (node.attribute(name), value) {
                (Some(actual), Some(want)) if &actual == want => {}
                (Some(_), None) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Compound {
    fn parse(raw: &str) -> Result<Self, AutomationError> {
        let mut compound = Compound::default();
        let mut chars = raw.chars().peekable();
        let mut tag = String::new();
        while let Some(&c) = chars.peek() {
            if c == '#' || c == '.' || c == '[' {
                break;
            }
            tag.push(c);
            chars.next();
        }
        if !tag.is_empty() {
            compound.tag = Some(tag);
        }
        while let Some(c) = chars.next() {
            match c {
                '#' => {
                    let name = take_ident(&mut chars);
                    if name.is_empty() {
                        return Err(AutomationError::InvalidSelector(raw.to_string()));
                    }
                    compound.id = Some(name);
                }
                '.' => {
                    let name = take_ident(&mut chars);
                    if name.is_empty() {
                        return Err(AutomationError::InvalidSelector(raw.to_string()));
                    }
                    compound.classes.push(name);
                }
                '[' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        if inner == ']' {
                            closed = true;
                            break;
                        }
                        body.push(inner);
                    }
                    if !closed {
                        return Err(AutomationError::InvalidSelector(raw.to_string()));
                    }
                    match body.split_once('=') {
                        Some((name, value)) => compound.attrs.push((
                            name.trim().to_string(),
                            Some(value.trim().trim_matches('"').to_string()),
                        )),
                        None => compound.attrs.push((body.trim().to_string(), None)),
                    }
                }
                _ => return Err(AutomationError::InvalidSelector(raw.to_string())),
            }
        }
        if compound.tag.is_none()
            && compound.id.is_none()
            && compound.classes.is_empty()
            && compound.attrs.is_empty()
        {
            return Err(AutomationError::InvalidSelector(raw.to_string()));
        }
        Ok(compound)
    }
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

type ClickBehavior = Arc<dyn Fn(&mut SimDom) + Send + Sync>;

struct SimState {
    dom: SimDom,
    behaviors: HashMap<u64, ClickBehavior>,
}

/// Scriptable in-memory page.
pub struct SimPage {
    state: Mutex<SimState>,
}

impl SimPage {
    pub fn new() -> Self {
        Self::with_viewport(1280.0, 800.0)
    }

    pub fn with_viewport(width: f64, height: f64) -> Self {
        Self {
            state: Mutex::new(SimState {
                dom: SimDom {
                    nodes: Vec::new(),
                    viewport_size: (width, height),
                    scroll_y: 0.0,
                    events: Vec::new(),
                },
                behaviors: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().expect("sim page state poisoned")
    }

    /// Append a node under the given parent; returns its handle.
    pub fn append(&self, parent: Option<NodeId>, mut node: SimNode) -> NodeId {
        let mut state = self.lock();
        node.parent = parent;
        let id = NodeId(state.dom.nodes.len() as u64);
        state.dom.nodes.push(node);
        id
    }

    /// Register a behavior run when the node is clicked, emulating the
    /// application's own reaction to the event.
    pub fn on_click(&self, node: NodeId, behavior: impl Fn(&mut SimDom) + Send + Sync + 'static) {
        self.lock().behaviors.insert(node.0, Arc::new(behavior));
    }

    /// Mutate the document directly, outside any dispatched event.
    pub fn mutate(&self, f: impl FnOnce(&mut SimDom)) {
        f(&mut self.lock().dom);
    }

    /// Read the document under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&SimDom) -> T) -> T {
        f(&self.lock().dom)
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.lock().dom.events.clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<SimEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    pub fn clear_events(&self) {
        self.lock().dom.events.clear();
    }

    fn record(state: &mut SimState, node: NodeId, name: &str, detail: impl Into<String>) {
        state.dom.events.push(SimEvent {
            node,
            name: name.to_string(),
            detail: detail.into(),
        });
    }
}

impl Default for SimPage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageEngine for SimPage {
    async fn query(&self, css: &str) -> Result<Vec<NodeId>, AutomationError> {
        self.lock().dom.query_selector(css)
    }

    async fn tag_name(&self, node: NodeId) -> Result<String, AutomationError> {
        Ok(self.lock().dom.node(node)?.tag.clone())
    }

    async fn text(&self, node: NodeId) -> Result<String, AutomationError> {
        let state = self.lock();
        state.dom.node(node)?;
        Ok(state.dom.gather_text(node))
    }

    async fn attribute(
        &self,
        node: NodeId,
        name: &str,
    ) -> Result<Option<String>, AutomationError> {
        Ok(self.lock().dom.node(node)?.attribute(name))
    }

    async fn value(&self, node: NodeId) -> Result<String, AutomationError> {
        Ok(self.lock().dom.node(node)?.value.clone())
    }

    async fn is_disabled(&self, node: NodeId) -> Result<bool, AutomationError> {
        let state = self.lock();
        let n = state.dom.node(node)?;
        Ok(n.disabled || n.attrs.contains_key("disabled"))
    }

    async fn bounds(&self, node: NodeId) -> Result<Bounds, AutomationError> {
        Ok(self.lock().dom.node(node)?.bounds)
    }

    async fn viewport(&self) -> Result<Bounds, AutomationError> {
        let state = self.lock();
        let (width, height) = state.dom.viewport_size;
        Ok(Bounds::new(0.0, state.dom.scroll_y, width, height))
    }

    async fn scroll_into_view(&self, node: NodeId) -> Result<(), AutomationError> {
        let mut state = self.lock();
        let bounds = state.dom.node(node)?.bounds;
        let (_, height) = state.dom.viewport_size;
        state.dom.scroll_y = (bounds.y + bounds.height / 2.0 - height / 2.0).max(0.0);
        Self::record(&mut state, node, "scroll", "");
        Ok(())
    }

    async fn click(&self, node: NodeId) -> Result<(), AutomationError> {
        let mut state = self.lock();
        state.dom.node(node)?;
        Self::record(&mut state, node, "click", "");
        let behavior = state.behaviors.get(&node.0).cloned();
        if let Some(behavior) = behavior {
            (*behavior)(&mut state.dom);
        }
        Ok(())
    }

    async fn hover(&self, node: NodeId) -> Result<(), AutomationError> {
        let mut state = self.lock();
        state.dom.node(node)?;
        Self::record(&mut state, node, "hover", "");
        Ok(())
    }

    async fn focus(&self, node: NodeId) -> Result<(), AutomationError> {
        let mut state = self.lock();
        state.dom.node(node)?;
        Self::record(&mut state, node, "focus", "");
        Ok(())
    }

    async fn set_native_value(&self, node: NodeId, value: &str) -> Result<(), AutomationError> {
        let mut state = self.lock();
        state.dom.node_mut(node)?.value = value.to_string();
        Self::record(&mut state, node, "set_value", value);
        Ok(())
    }

    async fn dispatch(&self, node: NodeId, event: DomEvent) -> Result<(), AutomationError> {
        let mut state = self.lock();
        let value = state.dom.node(node)?.value.clone();
        Self::record(&mut state, node, event.as_str(), value);
        Ok(())
    }

    async fn select_option(&self, node: NodeId, label: &str) -> Result<bool, AutomationError> {
        let mut state = self.lock();
        state.dom.node(node)?;
        let option = state
            .dom
            .nodes
            .iter()
            .enumerate()
            .find(|(_, n)| {
                n.parent == Some(node)
                    && n.tag.eq_ignore_ascii_case("option")
                    && n.text.eq_ignore_ascii_case(label)
            })
            .map(|(idx, n)| {
                let value = n
                    .attrs
                    .get("value")
                    .cloned()
                    .unwrap_or_else(|| n.text.clone());
                (NodeId(idx as u64), value)
            });
        let Some((_, value)) = option else {
            return Ok(false);
        };
        state.dom.node_mut(node)?.value = value.clone();
        Self::record(&mut state, node, "option", value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_tree() -> (SimPage, NodeId, NodeId, NodeId) {
        let page = SimPage::new();
        let root = page.append(None, SimNode::new("div").id("root").class("panel"));
        let button = page.append(
            Some(root),
            SimNode::new("button")
                .class("save")
                .attr("data-action", "save")
                .text("Save changes"),
        );
        let orphan = page.append(None, SimNode::new("span").text("elsewhere"));
        (page, root, button, orphan)
    }

    #[tokio::test]
    async fn matches_compound_selectors() {
        let (page, root, button, _) = page_with_tree();
        assert_eq!(page.query("#root").await.unwrap(), vec![root]);
        assert_eq!(page.query("button.save").await.unwrap(), vec![button]);
        assert_eq!(
            page.query("[data-action=\"save\"]").await.unwrap(),
            vec![button]
        );
        assert_eq!(page.query("div button").await.unwrap(), vec![button]);
        assert!(page.query("#root span").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comma_alternatives_preserve_document_order() {
        let (page, root, button, orphan) = page_with_tree();
        assert_eq!(
            page.query("span, button, div").await.unwrap(),
            vec![root, button, orphan]
        );
    }

    #[tokio::test]
    async fn detached_subtrees_disappear_from_queries() {
        let (page, root, _, _) = page_with_tree();
        page.mutate(|dom| dom.remove(root));
        assert!(page.query("button").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn click_runs_registered_behavior() {
        let (page, root, button, _) = page_with_tree();
        page.on_click(button, move |dom| dom.add_class(root, "expanded"));
        page.click(button).await.unwrap();
        assert!(page.read(|dom| dom.has_class(root, "expanded")));
        assert_eq!(page.events_named("click").len(), 1);
    }

    #[tokio::test]
    async fn select_option_sets_value_case_insensitively() {
        let page = SimPage::new();
        let select = page.append(None, SimNode::new("select").attr("name", "status"));
        page.append(
            Some(select),
            SimNode::new("option").attr("value", "completed").text("Completed"),
        );
        assert!(page.select_option(select, "completed").await.unwrap());
        assert_eq!(page.read(|dom| dom.value_of(select)), "completed");
        assert!(!page.select_option(select, "missing").await.unwrap());
    }

    #[tokio::test]
    async fn scroll_centers_target_in_viewport() {
        let page = SimPage::with_viewport(800.0, 600.0);
        let far = page.append(
            None,
            SimNode::new("div").bounds(Bounds::new(0.0, 2000.0, 100.0, 50.0)),
        );
        page.scroll_into_view(far).await.unwrap();
        let viewport = page.viewport().await.unwrap();
        let bounds = page.bounds(far).await.unwrap();
        assert!(bounds.contained_in(&viewport));
    }
}
