/// Describes one element the automation wants to touch.
///
/// A query is not a single selector but the raw material for the resolution
/// ladder: a direct CSS selector, an attribute pair, a visible-text needle,
/// and trailing heuristic patterns, each tried in that order until one hits.
/// All parts are optional; an empty query never resolves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementQuery {
    /// CSS selector of the containing scope, prepended to every lookup.
    pub scope: Option<String>,
    /// Direct CSS selector, the first rung of the ladder.
    pub css: Option<String>,
    /// Attribute name/value match, e.g. `("data-action", "save")`.
    pub attr: Option<(String, String)>,
    /// Case-insensitive needle matched against visible text content.
    pub text: Option<String>,
    /// Last-resort CSS patterns tried in order.
    pub patterns: Vec<String>,
}

impl ElementQuery {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            css: Some(selector.into()),
            ..Default::default()
        }
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Self {
            text: Some(needle.into()),
            ..Default::default()
        }
    }

    pub fn within(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn or_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr = Some((name.into(), value.into()));
        self
    }

    pub fn or_text(mut self, needle: impl Into<String>) -> Self {
        self.text = Some(needle.into());
        self
    }

    pub fn or_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Scope-qualified form of a selector belonging to this query. Each
    /// comma-separated alternative is scoped individually.
    pub fn scoped(&self, selector: &str) -> String {
        let Some(scope) = &self.scope else {
            return selector.to_string();
        };
        selector
            .split(',')
            .map(|part| format!("{scope} {}", part.trim()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Short human-readable description used in narration and errors.
    pub fn describe(&self) -> String {
        if let Some(css) = &self.css {
            return css.clone();
        }
        if let Some((name, value)) = &self.attr {
            return format!("[{name}=\"{value}\"]");
        }
        if let Some(text) = &self.text {
            return format!("text \"{text}\"");
        }
        if let Some(first) = self.patterns.first() {
            return first.clone();
        }
        "<empty query>".to_string()
    }
}

impl From<&str> for ElementQuery {
    fn from(selector: &str) -> Self {
        match selector.strip_prefix("text:") {
            Some(needle) => ElementQuery::text(needle.trim()),
            None => ElementQuery::css(selector),
        }
    }
}

impl From<String> for ElementQuery {
    fn from(selector: String) -> Self {
        ElementQuery::from(selector.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_prefix() {
        let query = ElementQuery::from("text: Save changes");
        assert_eq!(query.text.as_deref(), Some("Save changes"));
        assert!(query.css.is_none());
    }

    #[test]
    fn scoped_prepends_scope_to_every_alternative() {
        let query = ElementQuery::css("button").within("#panel");
        assert_eq!(query.scoped("button"), "#panel button");
        assert_eq!(query.scoped("button, a"), "#panel button, #panel a");
    }

    #[test]
    fn describe_prefers_css() {
        let query = ElementQuery::css(".save").or_text("Save");
        assert_eq!(query.describe(), ".save");
    }
}
