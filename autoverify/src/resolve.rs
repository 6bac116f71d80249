//! Ordered element-resolution strategies.
//!
//! Each strategy knows one way of turning an [`ElementQuery`] into a live
//! element; the [`Resolver`] runs them in a fixed order and the first hit
//! wins. Keeping the ladder as explicit strategy objects (rather than inline
//! branching) makes the order auditable and lets hosts extend it.

use crate::engine::{NodeId, PageEngine, UiElement};
use crate::errors::AutomationError;
use crate::selector::ElementQuery;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Tags considered when matching by visible text. Interactive controls and
/// labels; containers are excluded so an outer wrapper never shadows the
/// control inside it.
const TEXT_MATCH_TAGS: &str = "button, a, label, span, option, th, td, h1, h2, h3, h4";

#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError>;
}

async fn first_match(
    engine: &Arc<dyn PageEngine>,
    css: &str,
) -> Result<Option<NodeId>, AutomationError> {
    Ok(engine.query(css).await?.into_iter().next())
}

/// Rung (a): the direct CSS selector.
pub struct DirectCss;

#[async_trait]
impl ResolveStrategy for DirectCss {
    fn name(&self) -> &'static str {
        "direct-css"
    }

    async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        let Some(css) = &query.css else {
            return Ok(None);
        };
        Ok(first_match(engine, &query.scoped(css))
            .await?
            .map(|node| UiElement::new(engine.clone(), node)))
    }
}

/// Rung (b): match by a single attribute pair.
pub struct AttributeMatch;

#[async_trait]
impl ResolveStrategy for AttributeMatch {
    fn name(&self) -> &'static str {
        "attribute"
    }

    async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        let Some((name, value)) = &query.attr else {
            return Ok(None);
        };
        let css = query.scoped(&format!("[{name}=\"{value}\"]"));
        Ok(first_match(engine, &css)
            .await?
            .map(|node| UiElement::new(engine.clone(), node)))
    }
}

/// Rung (c): case-insensitive visible-text match over interactive tags.
pub struct TextMatch;

#[async_trait]
impl ResolveStrategy for TextMatch {
    fn name(&self) -> &'static str {
        "text"
    }

    async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        let Some(needle) = &query.text else {
            return Ok(None);
        };
        let needle = needle.to_lowercase();
        let candidates = engine.query(&query.scoped(TEXT_MATCH_TAGS)).await?;
        for node in candidates {
            let text = engine.text(node).await?;
            if text.to_lowercase().contains(&needle) {
                return Ok(Some(UiElement::new(engine.clone(), node)));
            }
        }
        Ok(None)
    }
}

/// Rung (d): heuristic CSS patterns, tried in the order given.
pub struct HeuristicPatterns;

#[async_trait]
impl ResolveStrategy for HeuristicPatterns {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        for pattern in &query.patterns {
            if let Some(node) = first_match(engine, &query.scoped(pattern)).await? {
                return Ok(Some(UiElement::new(engine.clone(), node)));
            }
        }
        Ok(None)
    }
}

/// Runs the resolution ladder, first success wins.
pub struct Resolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Resolver {
    /// The standard ladder: direct CSS, attribute, text, heuristics.
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(DirectCss),
                Box::new(AttributeMatch),
                Box::new(TextMatch),
                Box::new(HeuristicPatterns),
            ],
        }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    pub async fn resolve(
        &self,
        engine: &Arc<dyn PageEngine>,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        for strategy in &self.strategies {
            if let Some(element) = strategy.resolve(engine, query).await? {
                debug!(
                    strategy = strategy.name(),
                    target = %query.describe(),
                    node = %element.node(),
                    "resolved element"
                );
                return Ok(Some(element));
            }
        }
        debug!(target = %query.describe(), "no strategy matched");
        Ok(None)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::standard()
    }
}
