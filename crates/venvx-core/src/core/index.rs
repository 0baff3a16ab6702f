//! HTTP access to a PyPI-compatible index.
//!
//! Every call here is best-effort: transport errors, unexpected statuses and
//! undecodable bodies all read as "nothing found" and are logged at debug.

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;
use venvx_domain::{extract_search_names, IdentifierExtractor, ProjectMetadata, SearchMarkup};

fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|err| anyhow!("invalid index URL {base}: {err}"))?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("index URL {base} cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn get_text(client: &Client, url: Url) -> Option<String> {
    let response = match client.get(url.clone()).send() {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(%url, %err, "index request failed");
            return None;
        }
    };
    if response.status() != StatusCode::OK {
        tracing::debug!(%url, status = %response.status(), "index returned non-200");
        return None;
    }
    match response.text() {
        Ok(body) => Some(body),
        Err(err) => {
            tracing::debug!(%url, %err, "failed to read index response");
            None
        }
    }
}

/// `GET {base}/pypi/{name}/json`.
pub(crate) fn fetch_project(client: &Client, base: &str, name: &str) -> Option<ProjectMetadata> {
    let url = match endpoint(base, &["pypi", name, "json"]) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(%err, "cannot build project URL");
            return None;
        }
    };
    let body = get_text(client, url)?;
    match serde_json::from_str::<ProjectMetadata>(&body) {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            tracing::debug!(name, %err, "index metadata is not valid JSON");
            None
        }
    }
}

/// Names from the current search page, falling back to the legacy one.
pub(crate) fn search_names(client: &Client, base: &str, legacy: &str, query: &str) -> Vec<String> {
    let current = endpoint(base, &["search", ""]).map(|mut url| {
        url.query_pairs_mut().append_pair("q", query);
        url
    });
    if let Some(html) = current.ok().and_then(|url| get_text(client, url)) {
        let names = extract_search_names(&html);
        if !names.is_empty() {
            return names;
        }
    }
    let legacy_url = endpoint(legacy, &["pypi"]).map(|mut url| {
        url.query_pairs_mut()
            .append_pair(":action", "search")
            .append_pair("term", query)
            .append_pair("submit", "search");
        url
    });
    legacy_url
        .ok()
        .and_then(|url| get_text(client, url))
        .map(|html| SearchMarkup::LegacyLink.extract(&html))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::NetworkConfig;
    use crate::core::net::build_http_client;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::panic;

    fn server() -> Option<Server> {
        match panic::catch_unwind(Server::run) {
            Ok(server) => Some(server),
            Err(_) => {
                eprintln!("skipping index test (httptest server unavailable)");
                None
            }
        }
    }

    fn client() -> Client {
        build_http_client(&NetworkConfig::default()).unwrap()
    }

    #[test]
    fn missing_project_reads_as_none() {
        let Some(server) = server() else { return };
        server.expect(
            Expectation::matching(request::method_path("GET", "/pypi/nope-not-here/json"))
                .respond_with(status_code(404)),
        );
        let base = server.url_str("/");
        assert!(fetch_project(&client(), &base, "nope-not-here").is_none());
    }

    #[test]
    fn project_metadata_is_decoded() {
        let Some(server) = server() else { return };
        server.expect(
            Expectation::matching(request::method_path("GET", "/pypi/requests/json")).respond_with(
                status_code(200).body(
                    r#"{"info": {"name": "requests", "version": "2.31.0", "summary": "HTTP"},
                        "releases": {"2.30.0": [], "2.31.0": []}}"#,
                ),
            ),
        );
        let base = server.url_str("");
        let metadata = fetch_project(&client(), base.trim_end_matches('/'), "requests").unwrap();
        assert_eq!(metadata.info.name, "requests");
        assert_eq!(metadata.latest_version(), Some("2.31.0"));
        assert_eq!(metadata.releases.len(), 2);
    }

    #[test]
    fn garbage_metadata_reads_as_none() {
        let Some(server) = server() else { return };
        server.expect(
            Expectation::matching(request::method_path("GET", "/pypi/broken/json"))
                .respond_with(status_code(200).body("<html>maintenance</html>")),
        );
        assert!(fetch_project(&client(), &server.url_str("/"), "broken").is_none());
    }

    #[test]
    fn search_falls_back_to_legacy_page() {
        let Some(server) = server() else { return };
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/search/"),
                request::query(url_decoded(contains(("q", "flask")))),
            ])
            .respond_with(status_code(200).body("<html>no results</html>")),
        );
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/pypi"),
                request::query(url_decoded(contains((":action", "search")))),
                request::query(url_decoded(contains(("term", "flask")))),
            ])
            .respond_with(
                status_code(200)
                    .body(r#"<a href="/pypi/Flask">Flask</a><a href="/pypi/Flask-Login">x</a>"#),
            ),
        );
        let base = server.url_str("/");
        let names = search_names(&client(), &base, &base, "flask");
        assert_eq!(names, vec!["Flask", "Flask-Login"]);
    }

    #[test]
    fn search_uses_current_page_when_it_has_results() {
        let Some(server) = server() else { return };
        server.expect(
            Expectation::matching(request::method_path("GET", "/search/")).respond_with(
                status_code(200)
                    .body(r#"<span class="package-snippet__name">attrs</span>"#),
            ),
        );
        let base = server.url_str("/");
        assert_eq!(search_names(&client(), &base, &base, "attrs"), vec!["attrs"]);
    }
}
