//! Ordered extraction rules
//!
//! Every field or link set is described by a list of rules tried in order.
//! The first rule that produces something wins; later rules are broader and
//! only run when everything before them came up empty. Regex scans over the
//! raw markup are always placed last because they also see links that only
//! exist inside inline scripts.

use crate::url::resolve_link;
use crate::ConfigError;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A rule producing candidate links
#[derive(Debug, Clone)]
pub enum LinkRule {
    /// `href` of every element matched by the selector, resolved against the
    /// base origin and kept only if it passes the include/exclude patterns
    Anchors {
        selector: Selector,
        include: Option<Regex>,
        exclude: Option<Regex>,
    },

    /// Regex scan over the raw markup; capture group 1 is used when present.
    /// Found links matching `exclude` are dropped.
    Scan {
        pattern: Regex,
        exclude: Option<Regex>,
    },
}

impl LinkRule {
    /// Builds an anchor rule from a CSS selector
    pub fn anchors(css: &str) -> Result<Self, ConfigError> {
        Ok(Self::Anchors {
            selector: parse_selector(css)?,
            include: None,
            exclude: None,
        })
    }

    /// Builds a raw-markup scan rule
    pub fn scan(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::Scan {
            pattern: parse_regex(pattern)?,
            exclude: None,
        })
    }

    /// Keeps only links matching `pattern` (anchor rules only)
    pub fn including(mut self, pattern: &str) -> Result<Self, ConfigError> {
        if let Self::Anchors { include, .. } = &mut self {
            *include = Some(parse_regex(pattern)?);
        }
        Ok(self)
    }

    /// Drops links matching `pattern`
    pub fn excluding(mut self, pattern: &str) -> Result<Self, ConfigError> {
        match &mut self {
            Self::Anchors { exclude, .. } | Self::Scan { exclude, .. } => {
                *exclude = Some(parse_regex(pattern)?);
            }
        }
        Ok(self)
    }

    /// Applies the rule, returning links in document order without duplicates
    pub fn apply(&self, document: &Html, markup: &str, base_url: &Url) -> Vec<String> {
        let mut links = UniqueLinks::default();

        match self {
            Self::Anchors {
                selector,
                include,
                exclude,
            } => {
                for element in document.select(selector) {
                    let Some(href) = element.value().attr("href") else {
                        continue;
                    };
                    let Some(absolute) = resolve_link(href, base_url) else {
                        continue;
                    };
                    if include.as_ref().is_some_and(|re| !re.is_match(&absolute)) {
                        continue;
                    }
                    if exclude.as_ref().is_some_and(|re| re.is_match(&absolute)) {
                        continue;
                    }
                    links.push(absolute);
                }
            }
            Self::Scan { pattern, exclude } => {
                for captures in pattern.captures_iter(markup) {
                    let matched = captures.get(1).or_else(|| captures.get(0));
                    let Some(found) = matched.and_then(|m| resolve_link(m.as_str(), base_url))
                    else {
                        continue;
                    };
                    if exclude.as_ref().is_some_and(|re| re.is_match(&found)) {
                        continue;
                    }
                    links.push(found);
                }
            }
        }

        links.into_vec()
    }
}

/// A rule producing a single free-text value
#[derive(Debug, Clone)]
pub enum TextRule {
    /// Text content of the first matching element that is not blank
    Text(Selector),

    /// Attribute value of the first matching element that has it
    Attr(Selector, &'static str),

    /// Text of the first matching element whose text matches the pattern
    TextMatching(Selector, Regex),

    /// Capture group 1 (or the whole match) of a scan over the raw markup
    Scan(Regex),
}

impl TextRule {
    pub fn text(css: &str) -> Result<Self, ConfigError> {
        Ok(Self::Text(parse_selector(css)?))
    }

    pub fn attr(css: &str, attribute: &'static str) -> Result<Self, ConfigError> {
        Ok(Self::Attr(parse_selector(css)?, attribute))
    }

    pub fn text_matching(css: &str, pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::TextMatching(parse_selector(css)?, parse_regex(pattern)?))
    }

    pub fn scan(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::Scan(parse_regex(pattern)?))
    }

    /// Applies the rule; blank results count as no match
    pub fn apply(&self, document: &Html, markup: &str) -> Option<String> {
        match self {
            Self::Text(selector) => document
                .select(selector)
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                .find(|text| !text.is_empty()),
            Self::Attr(selector, attribute) => document
                .select(selector)
                .filter_map(|element| element.value().attr(attribute))
                .map(collapse_whitespace)
                .find(|value| !value.is_empty()),
            Self::TextMatching(selector, pattern) => document
                .select(selector)
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                .find(|text| pattern.is_match(text)),
            Self::Scan(pattern) => pattern
                .captures(markup)
                .and_then(|captures| captures.get(1).or_else(|| captures.get(0)))
                .map(|m| collapse_whitespace(m.as_str()))
                .filter(|value| !value.is_empty()),
        }
    }
}

/// Runs link rules in order and returns the index and result of the first
/// rule that found anything
pub fn first_links(
    rules: &[LinkRule],
    document: &Html,
    markup: &str,
    base_url: &Url,
) -> Option<(usize, Vec<String>)> {
    rules.iter().enumerate().find_map(|(index, rule)| {
        let links = rule.apply(document, markup, base_url);
        (!links.is_empty()).then_some((index, links))
    })
}

/// Runs text rules in order and returns the first non-blank value
pub fn first_text(rules: &[TextRule], document: &Html, markup: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(document, markup))
}

/// Ordered link collection that drops exact duplicates
#[derive(Debug, Default)]
struct UniqueLinks {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl UniqueLinks {
    fn push(&mut self, link: String) {
        if self.seen.insert(link.clone()) {
            self.links.push(link);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.links
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css)
        .map_err(|e| ConfigError::InvalidPattern(format!("Invalid selector '{}': {}", css, e)))
}

fn parse_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("Invalid regex '{}': {}", pattern, e)))
}
