//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the event site and run the full
//! pipeline end-to-end: seed planning, event processing, profile resolution
//! and export.

use luma_harvest::config::Config;
use luma_harvest::crawler::{Harvester, RunOptions};
use luma_harvest::output::{CsvReportWriter, ReportWriter};
use luma_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.http.max_attempts = 2;
    config.http.retry_base_delay_ms = 5;
    config.http.request_delay_ms = 0;
    config.http.timeout_secs = 5;
    config
}

fn event_html(title: &str, profile_links: &[&str]) -> String {
    let anchors: String = profile_links
        .iter()
        .map(|link| format!(r#"<a href="{}">Guest</a>"#, link))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1>{title}</h1>
        <time>Sat, Mar 8, 2025</time>
        <div class="whitespace-pre-wrap">Come build with us.</div>
        <div class="guest-list">{anchors}</div>
        </body></html>"#
    )
}

fn profile_html(name: &str, social: Option<&str>) -> String {
    let social = social
        .map(|url| format!(r#"<a href="{}">Profile</a>"#, url))
        .unwrap_or_default();
    format!(r#"<html><body><h1 class="text-2xl">{name}</h1>{social}</body></html>"#)
}

fn listing_html(event_paths: &[&str]) -> String {
    let anchors: String = event_paths
        .iter()
        .map(|p| format!(r#"<a href="{}">Event</a>"#, p))
        .collect();
    format!(r#"<html><body><a href="/discover">Discover</a>{anchors}</body></html>"#)
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_event_end_to_end() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/ai-day",
        event_html("AI Day", &["/user/usr-1", "/user/usr-2", "/user/usr-3"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/user/usr-1",
        profile_html("Ada", Some("https://www.linkedin.com/in/ada")),
        1,
    )
    .await;
    mount_page(
        &server,
        "/user/usr-2",
        profile_html("Grace", Some("https://linkedin.com/in/grace")),
        1,
    )
    .await;
    // Fails on every attempt
    Mock::given(method("GET"))
        .and(path("/user/usr-3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(&base_url);
    let harvester = Harvester::new(&config).unwrap();
    let report = harvester
        .run(&format!("{}/ai-day", base_url), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.events.len(), 1);
    assert!(report.failed_events.is_empty());

    let harvest = &report.events[0];
    assert_eq!(harvest.event.title, "AI Day");
    assert_eq!(harvest.event.canonical_id, "ai-day");
    assert_eq!(harvest.event.occurs_at.as_deref(), Some("Sat, Mar 8, 2025"));
    assert_eq!(harvest.event.participant_count, 3);
    assert_eq!(harvest.participants.len(), 3);
    assert_eq!(report.participants_with_external_url(), 2);

    let failed: Vec<_> = harvest
        .participants
        .iter()
        .filter(|row| row.display_name.is_none() && row.external_url.is_none())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].user_id.as_deref(), Some("usr-3"));
    assert_eq!(harvester.cache().computations(), 3);
}

#[tokio::test]
async fn test_profile_fetched_once_across_events() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/discover",
        listing_html(&["/abcd1234", "/efgh5678"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/abcd1234",
        event_html("First", &["/user/usr-shared", "/user/usr-a"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/efgh5678",
        event_html("Second", &["/user/usr-shared?tk=xyz#top"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/user/usr-shared",
        profile_html("Shared", Some("https://www.linkedin.com/in/shared")),
        1,
    )
    .await;
    mount_page(&server, "/user/usr-a", profile_html("A", None), 1).await;

    let config = create_test_config(&base_url);
    let harvester = Harvester::new(&config).unwrap();
    let report = harvester
        .run(&format!("{}/discover", base_url), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.events.len(), 2);
    assert_eq!(report.events[0].event.title, "First");
    assert_eq!(report.events[1].event.title, "Second");

    let second = &report.events[1].participants[0];
    assert!(second.profile_link.ends_with("/user/usr-shared?tk=xyz#top"));
    assert_eq!(
        second.external_url.as_deref(),
        Some("https://www.linkedin.com/in/shared")
    );
    assert_eq!(harvester.cache().computations(), 2);
}

#[tokio::test]
async fn test_participant_cap() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/big-party",
        event_html(
            "Big Party",
            &[
                "/user/usr-1",
                "/user/usr-2",
                "/user/usr-3",
                "/user/usr-4",
                "/user/usr-5",
            ],
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex("^/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_html("Guest", None)))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(&base_url);
    let options = RunOptions {
        max_participants_per_event: Some(2),
        include_description: false,
    };
    let report = Harvester::new(&config)
        .unwrap()
        .run(&format!("{}/big-party", base_url), &options)
        .await
        .unwrap();

    let harvest = &report.events[0];
    assert_eq!(harvest.event.participant_count, 5);
    assert_eq!(harvest.participants.len(), 2);
    assert_eq!(harvest.event.description, None);
    assert_eq!(harvest.participants[0].user_id.as_deref(), Some("usr-1"));
    assert_eq!(harvest.participants[1].user_id.as_deref(), Some("usr-2"));
}

#[tokio::test]
async fn test_failed_event_is_isolated() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/calendar/cal-blr",
        listing_html(&["/gone0001", "/live0002"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone0001"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/live0002",
        event_html("Still On", &["/user/usr-1"]),
        1,
    )
    .await;
    mount_page(&server, "/user/usr-1", profile_html("One", None), 1).await;

    let config = create_test_config(&base_url);
    let report = Harvester::new(&config)
        .unwrap()
        .run(
            &format!("{}/calendar/cal-blr", base_url),
            &RunOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].event.title, "Still On");
    assert_eq!(report.failed_events, vec![format!("{}/gone0001", base_url)]);
    assert_eq!(report.total_participants(), 1);
}

#[tokio::test]
async fn test_page_without_participants_is_expanded_as_listing() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/startup-week",
        listing_html(&["/wkday001"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/wkday001",
        event_html("Day One", &["/user/usr-1"]),
        1,
    )
    .await;
    mount_page(&server, "/user/usr-1", profile_html("One", None), 1).await;

    let config = create_test_config(&base_url);
    let report = Harvester::new(&config)
        .unwrap()
        .run(&format!("{}/startup-week", base_url), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].event.canonical_id, "wkday001");
}

#[tokio::test]
async fn test_empty_seed_is_fatal() {
    let server = MockServer::start().await;
    let config = create_test_config(&server.uri());
    let harvester = Harvester::new(&config).unwrap();

    let err = harvester.run("", &RunOptions::default()).await.unwrap_err();
    assert!(matches!(err, HarvestError::EmptySeed));

    let err = harvester
        .run_all(&[], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::EmptySeed));
}

#[tokio::test]
async fn test_report_exports_to_csv() {
    let server = MockServer::start().await;
    let base_url = server.uri();

    mount_page(
        &server,
        "/meetup",
        event_html("Meetup", &["/user/usr-1", "/user/usr-2"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/user/usr-1",
        profile_html("Ada", Some("https://www.linkedin.com/in/ada")),
        1,
    )
    .await;
    mount_page(&server, "/user/usr-2", profile_html("Bob", None), 1).await;

    let config = create_test_config(&base_url);
    let report = Harvester::new(&config)
        .unwrap()
        .run(&format!("{}/meetup", base_url), &RunOptions::default())
        .await
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("nested/events.csv");
    CsvReportWriter::new(&csv_path).write(&report).unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "event_name");
    assert_eq!(&headers[7], "linkedin_url");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][4], "Ada");
    assert_eq!(&rows[0][7], "https://www.linkedin.com/in/ada");
    assert_eq!(&rows[1][7], "");
}
