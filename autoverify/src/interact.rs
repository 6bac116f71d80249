//! Atomic, narrated user interactions.
//!
//! Each primitive resolves its target through the strategy ladder, narrates
//! what it is about to do, paces itself like a human operator, and narrates
//! the outcome. Ordinary not-found conditions narrate and return `false`;
//! a resolved action control that turns out to be disabled is a hard error.

use crate::engine::{DomEvent, PageEngine, UiElement};
use crate::errors::AutomationError;
use crate::events::Narrator;
use crate::locator::Locator;
use crate::pacing::Pacing;
use crate::resolve::Resolver;
use crate::selector::ElementQuery;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Settle delay after a visibility scroll, before re-checking bounds.
const SCROLL_SETTLE: Duration = Duration::from_millis(250);

/// Performs narrated primitives against one page.
#[derive(Clone)]
pub struct Interactor {
    engine: Arc<dyn PageEngine>,
    resolver: Arc<Resolver>,
    narrator: Narrator,
    pacing: Pacing,
}

impl Interactor {
    pub fn new(engine: Arc<dyn PageEngine>, narrator: Narrator, pacing: Pacing) -> Self {
        Self {
            engine,
            resolver: Arc::new(Resolver::standard()),
            narrator,
            pacing,
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    async fn resolve(
        &self,
        query: &ElementQuery,
    ) -> Result<Option<UiElement>, AutomationError> {
        self.resolver.resolve(&self.engine, query).await
    }

    /// Scroll the element into view if it is outside the viewport, settle,
    /// and re-check. Remaining partially hidden is a soft warning only.
    async fn ensure_visible(
        &self,
        element: &UiElement,
        label: &str,
    ) -> Result<(), AutomationError> {
        let viewport = self.engine.viewport().await?;
        let bounds = element.bounds().await?;
        if bounds.contained_in(&viewport) {
            return Ok(());
        }
        if !bounds.intersects(&viewport) {
            self.narrator
                .action(format!("Scrolling {label} into view"));
            element.scroll_into_view().await?;
            sleep(SCROLL_SETTLE).await;
        }
        let viewport = self.engine.viewport().await?;
        let bounds = element.bounds().await?;
        if !bounds.contained_in(&viewport) {
            self.narrator.result(format!(
                "{label} is not fully visible; proceeding anyway"
            ));
        }
        Ok(())
    }

    /// Click the target. Returns `false` (after narrating) when no element
    /// resolves; errors when the resolved control is disabled.
    pub async fn click(
        &self,
        query: &ElementQuery,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator.action(format!("Clicking {label}..."));
        let Some(element) = self.resolve(query).await? else {
            self.narrator
                .result(format!("Could not find {label}; skipping click"));
            return Ok(false);
        };
        if element.is_disabled().await? {
            self.narrator
                .result(format!("{label} is disabled and cannot be clicked"));
            return Err(AutomationError::ElementDisabled(label.to_string()));
        }
        self.ensure_visible(&element, label).await?;
        element.hover().await?;
        sleep(self.pacing.movement).await;
        sleep(self.pacing.pre_click).await;
        element.click().await?;
        self.narrator.result(format!("Clicked {label}"));
        Ok(true)
    }

    /// Click the primary target, falling back once to an alternate query.
    ///
    /// The single fallback attempt is the only retry the primitive layer
    /// performs; callers opt in where the flakiness is worth absorbing.
    pub async fn click_with_fallback(
        &self,
        query: &ElementQuery,
        fallback: &ElementQuery,
        label: &str,
    ) -> Result<bool, AutomationError> {
        if self.click(query, label).await? {
            return Ok(true);
        }
        debug!(target = %fallback.describe(), "primary click missed; trying fallback locator");
        self.click(fallback, &format!("{label} (fallback)")).await
    }

    /// Type text into the target as a human would: one character at a time
    /// through the native value setter, with an input notification per
    /// keystroke and a final change notification.
    pub async fn fill(
        &self,
        query: &ElementQuery,
        text: &str,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator.action(format!("Filling {label}..."));
        let Some(element) = self.resolve(query).await? else {
            self.narrator
                .result(format!("Could not find {label}; skipping fill"));
            return Ok(false);
        };
        if element.is_disabled().await? {
            self.narrator
                .result(format!("{label} is disabled and cannot be edited"));
            return Err(AutomationError::ElementDisabled(label.to_string()));
        }
        self.ensure_visible(&element, label).await?;
        element.focus().await?;

        let mut typed = String::with_capacity(text.len());
        for ch in text.chars() {
            typed.push(ch);
            element.set_native_value(&typed).await?;
            element.dispatch(DomEvent::Input).await?;
            sleep(self.pacing.typing).await;
        }
        element.dispatch(DomEvent::Change).await?;
        element.dispatch(DomEvent::Blur).await?;
        self.narrator
            .result(format!("Filled {label} ({} characters)", text.chars().count()));
        Ok(true)
    }

    /// Select a dropdown option by its visible label.
    pub async fn choose(
        &self,
        query: &ElementQuery,
        option_label: &str,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator
            .action(format!("Choosing '{option_label}' in {label}..."));
        let Some(element) = self.resolve(query).await? else {
            self.narrator
                .result(format!("Could not find {label}; skipping selection"));
            return Ok(false);
        };
        if element.is_disabled().await? {
            self.narrator
                .result(format!("{label} is disabled and cannot be changed"));
            return Err(AutomationError::ElementDisabled(label.to_string()));
        }
        self.ensure_visible(&element, label).await?;
        sleep(self.pacing.pre_click).await;
        if !element.select_option(option_label).await? {
            self.narrator.result(format!(
                "{label} has no option labelled '{option_label}'"
            ));
            return Ok(false);
        }
        element.dispatch(DomEvent::Change).await?;
        self.narrator
            .result(format!("Chose '{option_label}' in {label}"));
        Ok(true)
    }

    pub async fn hover(
        &self,
        query: &ElementQuery,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator.action(format!("Hovering over {label}..."));
        let Some(element) = self.resolve(query).await? else {
            self.narrator
                .result(format!("Could not find {label}; skipping hover"));
            return Ok(false);
        };
        self.ensure_visible(&element, label).await?;
        sleep(self.pacing.movement).await;
        element.hover().await?;
        self.narrator.result(format!("Hovering over {label}"));
        Ok(true)
    }

    /// Scroll the target to the center of the viewport.
    pub async fn scroll_to(
        &self,
        query: &ElementQuery,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator.action(format!("Scrolling to {label}..."));
        let Some(element) = self.resolve(query).await? else {
            self.narrator
                .result(format!("Could not find {label}; skipping scroll"));
            return Ok(false);
        };
        element.scroll_into_view().await?;
        sleep(SCROLL_SETTLE).await;
        self.narrator.result(format!("Scrolled to {label}"));
        Ok(true)
    }

    /// Bounded poll for the target to appear. Returns `false` on timeout
    /// after narrating; the caller decides whether that is fatal.
    pub async fn wait_for(
        &self,
        query: &ElementQuery,
        timeout: Duration,
        label: &str,
    ) -> Result<bool, AutomationError> {
        self.narrator
            .action(format!("Waiting for {label} to appear..."));
        let locator = Locator::new(self.engine.clone(), query.clone());
        match locator.wait(Some(timeout)).await {
            Ok(_) => {
                self.narrator.result(format!("{label} appeared"));
                Ok(true)
            }
            Err(AutomationError::Timeout(_)) => {
                self.narrator.result(format!(
                    "{label} did not appear within {timeout:?}"
                ));
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
