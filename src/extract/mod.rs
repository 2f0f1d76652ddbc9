//! Link and metadata extraction from raw markup
//!
//! This module turns fetched markup into candidate links and free-text fields:
//! - Listing pages: links to individual events
//! - Event pages: title, date, description, and participant profile links
//! - Profile pages: display name and external social-network URL
//!
//! All extraction is synchronous. Parsed documents never cross an await point.

mod rules;
mod selectors;

pub use rules::{first_links, first_text, LinkRule, TextRule};
pub use selectors::SiteRules;

use crate::config::SiteConfig;
use crate::records::UNKNOWN_EVENT;
use crate::ConfigError;
use scraper::Html;
use url::Url;

/// The kind of page a piece of markup came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRole {
    /// A page enumerating several events
    Listing,
    /// A single event page; links are participant profiles
    Event,
    /// A participant profile page; links are external social URLs
    Profile,
}

/// Free-text fields extracted from an event page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
    pub title: String,
    pub occurs_at: Option<String>,
    pub description: Option<String>,
    pub participant_links: Vec<String>,
}

/// Fields extracted from a profile page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfilePage {
    pub display_name: Option<String>,
    pub external_url: Option<String>,
}

/// Applies the site's ordered rule tables to fetched markup
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    rules: SiteRules,
}

impl LinkExtractor {
    /// Creates an extractor for the configured site
    pub fn new(site: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rules: SiteRules::from_config(site)?,
        })
    }

    /// The origin relative links are resolved against
    pub fn base_url(&self) -> &Url {
        &self.rules.base_url
    }

    /// Extracts the candidate links for a page role
    ///
    /// Structural rules are tried in order and the first one that yields any
    /// link wins; the raw-markup scan only runs if all of them came up empty.
    /// Links are absolute and deduplicated on their exact text, in discovery
    /// order.
    pub fn extract_links(&self, markup: &str, role: PageRole) -> Vec<String> {
        let document = Html::parse_document(markup);
        self.links_from_document(&document, markup, role)
    }

    /// Extracts event metadata and participant links in a single parse
    pub fn extract_event(&self, markup: &str) -> EventPage {
        let document = Html::parse_document(markup);

        let title = first_text(&self.rules.title, &document, markup)
            .unwrap_or_else(|| UNKNOWN_EVENT.to_string());
        let occurs_at = first_text(&self.rules.date, &document, markup);
        let description = first_text(&self.rules.description, &document, markup);
        let participant_links = self.links_from_document(&document, markup, PageRole::Event);

        EventPage {
            title,
            occurs_at,
            description,
            participant_links,
        }
    }

    /// Extracts the display name and the first external URL from a profile page
    pub fn extract_profile(&self, markup: &str) -> ProfilePage {
        let document = Html::parse_document(markup);

        ProfilePage {
            display_name: first_text(&self.rules.display_name, &document, markup),
            external_url: self
                .links_from_document(&document, markup, PageRole::Profile)
                .into_iter()
                .next(),
        }
    }

    fn links_from_document(&self, document: &Html, markup: &str, role: PageRole) -> Vec<String> {
        let rules = match role {
            PageRole::Listing => &self.rules.listing,
            PageRole::Event => &self.rules.participants,
            PageRole::Profile => &self.rules.social,
        };

        match first_links(rules, document, markup, &self.rules.base_url) {
            Some((index, links)) => {
                tracing::debug!(
                    "{:?} rule #{} matched {} link(s)",
                    role,
                    index,
                    links.len()
                );
                links
            }
            None => {
                tracing::debug!("No {:?} rule matched", role);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LinkExtractor {
        LinkExtractor::new(&SiteConfig::default()).unwrap()
    }

    #[test]
    fn test_host_section_wins_over_everything() {
        let html = r#"<html><body>
            <div class="event-hosts"><a href="/user/usr-host1">Host</a></div>
            <div class="guest-list"><a href="/user/usr-guest1">Guest</a></div>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Event);
        assert_eq!(links, vec!["https://lu.ma/user/usr-host1"]);
    }

    #[test]
    fn test_second_rule_beats_regex_fallback() {
        let html = r#"<html><body>
            <div class="guest-list">
                <a href="/user/usr-guest1">Guest 1</a>
                <a href="https://lu.ma/user/usr-guest2?tk=abc">Guest 2</a>
            </div>
            <script>window.__DATA__ = {"u": "https://lu.ma/user/usr-hidden"};</script>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Event);
        assert_eq!(
            links,
            vec![
                "https://lu.ma/user/usr-guest1",
                "https://lu.ma/user/usr-guest2?tk=abc"
            ]
        );
    }

    #[test]
    fn test_regex_fallback_when_no_anchor_matches() {
        let html = r#"<html><body>
            <script>var hosts = ["https://lu.ma/user/usr-a1", "https://lu.ma/user/usr-b2"];</script>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Event);
        assert_eq!(
            links,
            vec!["https://lu.ma/user/usr-a1", "https://lu.ma/user/usr-b2"]
        );
    }

    #[test]
    fn test_duplicate_links_are_collapsed() {
        let html = r#"<a href="/user/usr-a1">A</a><a href="/user/usr-a1">A</a>
            <a href="/user/usr-a1?tk=1">A with query</a>"#;

        let links = extractor().extract_links(html, PageRole::Event);
        // Query variants stay distinct here; the cache merges them later.
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_offsite_user_links_ignored() {
        let html = r#"<a href="https://other.example/user/usr-a1">Elsewhere</a>"#;
        let links = extractor().extract_links(html, PageRole::Event);
        assert!(links.is_empty());
    }

    #[test]
    fn test_extract_event_metadata() {
        let html = r#"<html><head>
            <meta name="description" content="Meta description">
        </head><body>
            <h1>  Ai Day for startups </h1>
            <time>Sat, Mar 8, 2025</time>
            <div class="whitespace-pre-wrap">Talks and demos.</div>
            <div class="event-hosts"><a href="/user/usr-h1">H</a></div>
        </body></html>"#;

        let page = extractor().extract_event(html);
        assert_eq!(page.title, "Ai Day for startups");
        assert_eq!(page.occurs_at.as_deref(), Some("Sat, Mar 8, 2025"));
        assert_eq!(page.description.as_deref(), Some("Talks and demos."));
        assert_eq!(page.participant_links, vec!["https://lu.ma/user/usr-h1"]);
    }

    #[test]
    fn test_extract_event_sentinels() {
        let page = extractor().extract_event("<html><body><p>nothing</p></body></html>");
        assert_eq!(page.title, UNKNOWN_EVENT);
        assert_eq!(page.occurs_at, None);
        assert_eq!(page.description, None);
        assert!(page.participant_links.is_empty());
    }

    #[test]
    fn test_event_date_from_paragraph_then_script() {
        let html = r#"<p>Join us</p><p>March 8, 2025 · 10:00 AM</p>"#;
        let page = extractor().extract_event(html);
        assert_eq!(page.occurs_at.as_deref(), Some("March 8, 2025 · 10:00 AM"));

        let html = r#"<script>{"start_at": "2025-03-08T04:30:00.000Z"}</script>"#;
        let page = extractor().extract_event(html);
        assert_eq!(page.occurs_at.as_deref(), Some("2025-03-08T04:30:00.000Z"));
    }

    #[test]
    fn test_extract_profile_anchor() {
        let html = r#"<html><body>
            <h1 class="text-2xl">Ravindra M.K</h1>
            <a href="https://x.com/ravi">X</a>
            <a href="https://www.linkedin.com/in/ravindra-mk">LinkedIn</a>
        </body></html>"#;

        let profile = extractor().extract_profile(html);
        assert_eq!(profile.display_name.as_deref(), Some("Ravindra M.K"));
        assert_eq!(
            profile.external_url.as_deref(),
            Some("https://www.linkedin.com/in/ravindra-mk")
        );
    }

    #[test]
    fn test_extract_profile_social_group() {
        let html = r#"<html><body>
            <h2 class="font-bold">Vijetha</h2>
            <div class="social-links">
                <a href="/user/usr-self">Self</a>
                <a href="https://x.com/vijetha">X</a>
            </div>
        </body></html>"#;

        let profile = extractor().extract_profile(html);
        assert_eq!(profile.display_name.as_deref(), Some("Vijetha"));
        assert_eq!(profile.external_url.as_deref(), Some("https://x.com/vijetha"));
    }

    #[test]
    fn test_extract_profile_raw_scan() {
        let html = r#"<html><body>
            <span class="profile-name">Nikhita Habib</span>
            <script>{"linkedin_handle":"https://www.linkedin.com/in/nikhita-habib"}</script>
        </body></html>"#;

        let profile = extractor().extract_profile(html);
        assert_eq!(profile.display_name.as_deref(), Some("Nikhita Habib"));
        assert_eq!(
            profile.external_url.as_deref(),
            Some("https://www.linkedin.com/in/nikhita-habib")
        );
    }

    #[test]
    fn test_extract_profile_nothing_found() {
        let profile = extractor().extract_profile("<html><body></body></html>");
        assert_eq!(profile, ProfilePage::default());
    }

    #[test]
    fn test_listing_links() {
        let html = r#"<html><body>
            <a href="/discover">Discover</a>
            <a href="/18tw2f7h">Event one</a>
            <a href="https://lu.ma/ab12cd34?tk=x">Event two</a>
            <a href="/user/usr-h1">Host</a>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Listing);
        assert_eq!(
            links,
            vec!["https://lu.ma/18tw2f7h", "https://lu.ma/ab12cd34?tk=x"]
        );
    }

    #[test]
    fn test_listing_nav_links_fall_through_to_scan() {
        let html = r#"<html><body>
            <nav><a href="/discover">Discover</a><a href="/settings">Settings</a></nav>
            <script>{"events":["https://lu.ma/abcd1234","https://lu.ma/efgh5678"]}</script>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Listing);
        assert_eq!(
            links,
            vec!["https://lu.ma/abcd1234", "https://lu.ma/efgh5678"]
        );
    }

    #[test]
    fn test_listing_event_cards_first() {
        let html = r#"<html><body>
            <a class="event-link" href="/ai-day-for-startups">Card</a>
            <a href="/18tw2f7h">Footer link</a>
        </body></html>"#;

        let links = extractor().extract_links(html, PageRole::Listing);
        assert_eq!(links, vec!["https://lu.ma/ai-day-for-startups"]);
    }
}
