//! Rule tables for the supported page roles
//!
//! Structural rules follow the class names used by the event site's current
//! markup. They are ordered from most to least specific and always end with a
//! raw-markup regex scan.

use crate::config::SiteConfig;
use crate::extract::rules::{LinkRule, TextRule};
use crate::ConfigError;
use url::Url;

/// Single-segment site paths that are never events
const RESERVED_PATHS: &[&str] = &[
    "about", "calendar", "create", "discover", "explore", "home", "login", "pricing", "privacy",
    "settings", "signin", "signup", "terms", "user",
];

/// All rule tables for one site
#[derive(Debug, Clone)]
pub struct SiteRules {
    pub base_url: Url,
    pub listing: Vec<LinkRule>,
    pub participants: Vec<LinkRule>,
    pub social: Vec<LinkRule>,
    pub title: Vec<TextRule>,
    pub date: Vec<TextRule>,
    pub description: Vec<TextRule>,
    pub display_name: Vec<TextRule>,
}

impl SiteRules {
    /// Builds the rule tables for the configured site and social network
    pub fn from_config(site: &SiteConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let origin = origin_pattern(&base_url)?;
        let social = social_pattern(&site.social_domain);

        Ok(Self {
            listing: listing_rules(&origin)?,
            participants: participant_rules(&origin)?,
            social: social_rules(&origin, &social)?,
            title: title_rules()?,
            date: date_rules()?,
            description: description_rules()?,
            display_name: display_name_rules()?,
            base_url,
        })
    }

}

/// Regex source matching the base origin over http or https, with or without `www.`
fn origin_pattern(base_url: &Url) -> Result<String, ConfigError> {
    let host = base_url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidUrl("base-url has no host".to_string()))?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let authority = match base_url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Ok(format!(r"https?://(?:www\.)?{}", regex::escape(&authority)))
}

/// Regex source matching any URL on the social domain or its subdomains
fn social_pattern(domain: &str) -> String {
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    format!(
        r"(?i)https?://(?:[a-z0-9-]+\.)*{}/",
        regex::escape(domain)
    )
}

/// Regex source matching site pages that are never events
fn reserved_pattern(origin: &str) -> String {
    format!(
        r"(?i)^{}/(?:{})/?(?:[?#].*)?$",
        origin,
        RESERVED_PATHS.join("|")
    )
}

fn listing_rules(origin: &str) -> Result<Vec<LinkRule>, ConfigError> {
    let slug = format!(r"^{}/[A-Za-z0-9_-]+/?(?:\?[^#]*)?$", origin);
    let generated_slug = format!(r"^{}/[a-z0-9]{{8}}(?:\?[^#]*)?$", origin);
    let reserved = reserved_pattern(origin);

    Ok(vec![
        LinkRule::anchors(r#"a.event-link[href], [data-role="event-card"] a[href]"#)?
            .including(&slug)?
            .excluding(&reserved)?,
        LinkRule::anchors("a[href]")?
            .including(&generated_slug)?
            .excluding(&reserved)?,
        LinkRule::scan(&format!(r#"({}/[a-z0-9]{{8}})(?:[?"'<>\s\\]|$)"#, origin))?
            .excluding(&reserved)?,
    ])
}

fn participant_rules(origin: &str) -> Result<Vec<LinkRule>, ConfigError> {
    let profile = format!(r"^{}/user/[^/?#\s]+", origin);

    Ok(vec![
        LinkRule::anchors(
            r#"[data-role="host"] a[href*="/user/"], .event-hosts a[href*="/user/"]"#,
        )?
        .including(&profile)?,
        LinkRule::anchors(
            r#"[data-role="guest"] a[href*="/user/"], .guest-list a[href*="/user/"]"#,
        )?
        .including(&profile)?,
        LinkRule::anchors(r#"a[href*="/user/"]"#)?.including(&profile)?,
        LinkRule::scan(&format!(r#"{}/user/[^\s"'<>\\]+"#, origin))?,
    ])
}

fn social_rules(origin: &str, social: &str) -> Result<Vec<LinkRule>, ConfigError> {
    Ok(vec![
        LinkRule::anchors("a[href]")?.including(&format!("^{}", social))?,
        LinkRule::anchors(
            r#".social-links a[href], [data-role="social-links"] a[href], [class*="social"] a[href]"#,
        )?
        .excluding(&format!("^{}", origin))?,
        LinkRule::scan(&format!(r#"{}[^\s"'<>\\]+"#, social))?,
    ])
}

fn title_rules() -> Result<Vec<TextRule>, ConfigError> {
    Ok(vec![
        TextRule::text("h1")?,
        TextRule::text("h2.text-2xl")?,
        TextRule::text(".text-3xl")?,
        TextRule::attr(r#"meta[property="og:title"]"#, "content")?,
    ])
}

fn date_rules() -> Result<Vec<TextRule>, ConfigError> {
    Ok(vec![
        TextRule::text("time")?,
        TextRule::attr("time[datetime]", "datetime")?,
        TextRule::text_matching("p", r"\b20\d{2}\b")?,
        TextRule::scan(r#""start_at"\s*:\s*"([^"]+)""#)?,
    ])
}

fn description_rules() -> Result<Vec<TextRule>, ConfigError> {
    Ok(vec![
        TextRule::text("div.whitespace-pre-wrap")?,
        TextRule::text("p.text-gray-600")?,
        TextRule::attr(r#"meta[name="description"]"#, "content")?,
    ])
}

fn display_name_rules() -> Result<Vec<TextRule>, ConfigError> {
    Ok(vec![
        TextRule::text("h1.text-2xl")?,
        TextRule::text("h2.font-bold")?,
        TextRule::text(".profile-name")?,
        TextRule::text("h1")?,
        TextRule::attr(r#"meta[property="og:title"]"#, "content")?,
    ])
}
