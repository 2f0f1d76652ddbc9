//! Bounded worker pool for profile resolution
//!
//! Profile links are pushed into a work channel and drained by a fixed number
//! of worker tasks; each worker reports `(link, outcome)` on a result channel.
//! The caller collects exactly one outcome per submitted link.

use crate::crawler::ProfileResolver;
use crate::state::CachedProfile;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Resolves every link using at most `workers` concurrent resolutions
///
/// Results arrive in completion order. A link whose worker died without
/// reporting is returned with a `None` outcome, so the output always has one
/// entry per input link.
pub async fn resolve_all(
    resolver: &ProfileResolver,
    links: Vec<String>,
    workers: usize,
) -> Vec<(String, CachedProfile)> {
    let total = links.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, total);

    let (work_tx, work_rx) = mpsc::channel::<String>(total);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<(String, CachedProfile)>(total);

    for link in &links {
        if work_tx.send(link.clone()).await.is_err() {
            break;
        }
    }
    drop(work_tx);

    for worker_id in 0..workers {
        let resolver = resolver.clone();
        let work_rx = Arc::clone(&work_rx);
        let result_tx = result_tx.clone();

        tokio::spawn(async move {
            loop {
                let next = work_rx.lock().await.recv().await;
                let Some(link) = next else {
                    break;
                };
                tracing::trace!("Worker {} resolving {}", worker_id, link);
                let outcome = resolver.resolve(&link).await;
                if result_tx.send((link, outcome)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(result_tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
        tracing::debug!("Resolved participant {}/{}", results.len(), total);
    }

    if results.len() < total {
        tracing::warn!(
            "{} profile resolution(s) did not report back",
            total - results.len()
        );
        let reported: HashSet<&str> = results.iter().map(|(link, _)| link.as_str()).collect();
        let missing: Vec<String> = links
            .iter()
            .filter(|link| !reported.contains(link.as_str()))
            .cloned()
            .collect();
        results.extend(missing.into_iter().map(|link| (link, None)));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, SiteConfig};
    use crate::crawler::Fetcher;
    use crate::extract::LinkExtractor;
    use crate::state::ProfileCache;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> ProfileResolver {
        let http = HttpConfig {
            max_attempts: 1,
            request_delay_ms: 0,
            ..HttpConfig::default()
        };
        let site = SiteConfig {
            base_url: server.uri(),
            ..SiteConfig::default()
        };
        ProfileResolver::new(
            Arc::new(Fetcher::new(&http).unwrap()),
            Arc::new(LinkExtractor::new(&site).unwrap()),
            Arc::new(ProfileCache::new()),
        )
    }

    #[tokio::test]
    async fn test_empty_input() {
        let server = MockServer::start().await;
        let results = resolve_all(&resolver_for(&server), Vec::new(), 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_worker_count_bounds_requests_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<h1>Someone</h1>")
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(10)
            .mount(&server)
            .await;

        let links: Vec<String> = (0..10)
            .map(|i| format!("{}/user/usr-{}", server.uri(), i))
            .collect();

        let started = std::time::Instant::now();
        let results = resolve_all(&resolver_for(&server), links, 5).await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 10);
        // 10 responses of 200ms through 5 workers take two full rounds
        assert!(elapsed >= Duration::from_millis(390), "{:?}", elapsed);
        // and run concurrently rather than one after another
        assert!(elapsed < Duration::from_millis(1800), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_one_outcome_per_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<h1>Someone</h1>")
                    .set_delay(Duration::from_millis(10)),
            )
            .expect(7)
            .mount(&server)
            .await;

        let links: Vec<String> = (0..7)
            .map(|i| format!("{}/user/usr-{}", server.uri(), i))
            .collect();
        let mut results = resolve_all(&resolver_for(&server), links.clone(), 3).await;

        results.sort_by(|a, b| a.0.cmp(&b.0));
        let mut expected = links;
        expected.sort();

        assert_eq!(
            results.iter().map(|(l, _)| l.clone()).collect::<Vec<_>>(),
            expected
        );
        assert!(results.iter().all(|(_, outcome)| outcome.is_some()));
    }
}
