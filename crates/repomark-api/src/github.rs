use reqwest::{header::HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const GITHUB_API_BASE: &str = "https://api.github.com";

/// One page, always. We never paginate.
pub const RESULTS_PER_PAGE: u32 = 30;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("GitHub API error: {status}{}", rate_limit_note(.rate_limited))]
    Status { status: u16, rate_limited: bool },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not build HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

fn rate_limit_note(rate_limited: &bool) -> &'static str {
    if *rate_limited {
        " (rate limit exceeded)"
    } else {
        ""
    }
}

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE.to_string(), Duration::from_secs(30))
    }

    /// For GitHub Enterprise, or a local stand-in during tests
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(concat!("repomark/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GitHubError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The exact URL a search for `query` hits
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/repositories?q={}&per_page={}&sort=stars&order=desc",
            self.base_url,
            urlencoding::encode(query),
            RESULTS_PER_PAGE
        )
    }

    /// Search repositories, most-starred first
    ///
    /// One request, no retries. A failure is final for this query; the
    /// caller decides whether to ask again.
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<GitHubRepo>> {
        let url = self.search_url(query);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let rate_limited = is_rate_limited(status, response.headers());
            warn!("GitHub search for '{}' failed with status {}", query, status);
            return Err(GitHubError::Status {
                status: status.as_u16(),
                rate_limited,
            });
        }

        let body = response.text().await?;
        parse_search_body(&body)
    }
}

/// Pull `items` out of a search response body
///
/// Anything that is valid JSON but not shaped like a search response
/// degrades to an empty list, and entries that are not repositories are
/// skipped one by one. Only unparseable text is an error.
pub fn parse_search_body(body: &str) -> Result<Vec<GitHubRepo>> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    let Some(items) = value.get("items").and_then(|items| items.as_array()) else {
        debug!("Search response had no items array");
        return Ok(Vec::new());
    };

    let repos = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match GitHubRepo::deserialize(item) {
            Ok(repo) => Some(repo),
            Err(e) => {
                warn!("Skipping search item #{}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(repos)
}

fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return false;
    }

    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(status == StatusCode::TOO_MANY_REQUESTS)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    pub language: Option<String>,
    pub owner: GitHubOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client() -> GitHubClient {
        GitHubClient::new().unwrap()
    }

    #[test]
    fn test_search_url_has_fixed_params() {
        let url = client().search_url("react");
        assert_eq!(
            url,
            "https://api.github.com/search/repositories?q=react&per_page=30&sort=stars&order=desc"
        );
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = client().search_url("c++ language:rust");
        assert!(url.contains("q=c%2B%2B%20language%3Arust&"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client =
            GitHubClient::with_base_url("http://localhost:8080/".into(), Duration::from_secs(1))
                .unwrap();
        assert!(client
            .search_url("x")
            .starts_with("http://localhost:8080/search/repositories?"));
    }

    #[test]
    fn test_parse_items_in_order() {
        let body = r#"{
            "total_count": 2,
            "items": [
                {"id": 1, "name": "react", "full_name": "facebook/react", "description": "UI",
                 "html_url": "https://github.com/facebook/react", "stargazers_count": 200000,
                 "language": "JavaScript", "owner": {"login": "facebook", "avatar_url": "a"}},
                {"id": 2, "name": "preact", "full_name": "preactjs/preact", "description": null,
                 "html_url": "https://github.com/preactjs/preact", "stargazers_count": 30000,
                 "language": null, "owner": {"login": "preactjs", "avatar_url": "b"}}
            ]
        }"#;

        let repos = parse_search_body(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].full_name, "facebook/react");
        assert_eq!(repos[1].id, 2);
        assert!(repos[1].description.is_none());
    }

    #[test]
    fn test_parse_missing_items_is_empty() {
        assert!(parse_search_body(r#"{"total_count": 0}"#).unwrap().is_empty());
        assert!(parse_search_body("[]").unwrap().is_empty());
        assert!(parse_search_body(r#"{"items": "nope"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_skips_only_the_broken_item() {
        let body = r#"{"items": [
            {"id": 1, "name": "react", "full_name": "facebook/react", "description": null,
             "html_url": "https://github.com/facebook/react", "stargazers_count": 1,
             "language": null, "owner": {"login": "facebook"}},
            {"id": 2, "name": "ghost", "full_name": "ghost/ghost", "description": null,
             "html_url": "https://github.com/ghost/ghost", "stargazers_count": 1,
             "language": null, "owner": null},
            {"id": 3, "name": "vue", "full_name": "vuejs/vue", "description": null,
             "html_url": "https://github.com/vuejs/vue", "stargazers_count": 1,
             "language": null, "owner": {"login": "vuejs"}}
        ]}"#;

        let ids: Vec<u64> = parse_search_body(body).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(matches!(
            parse_search_body("<html>"),
            Err(GitHubError::Parse(_))
        ));
    }

    #[test]
    fn test_status_error_message_includes_code() {
        let err = GitHubError::Status {
            status: 403,
            rate_limited: false,
        };
        assert_eq!(err.to_string(), "GitHub API error: 403");

        let err = GitHubError::Status {
            status: 403,
            rate_limited: true,
        };
        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn test_rate_limit_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, &headers));
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, &headers));

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert!(is_rate_limited(StatusCode::FORBIDDEN, &headers));
        assert!(!is_rate_limited(StatusCode::NOT_FOUND, &headers));
    }

    /// Answer one HTTP request with `response`; the task yields the request head
    async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).into_owned()
        });

        (base_url, server)
    }

    fn http_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n{}connection: close\r\n\r\n{}",
            status,
            body.len(),
            extra_headers,
            body
        )
    }

    #[tokio::test]
    async fn test_forbidden_response_is_rate_limited_status_error() {
        let (base_url, server) = serve_once(http_response(
            "403 Forbidden",
            "x-ratelimit-remaining: 0\r\n",
            r#"{"message": "API rate limit exceeded"}"#,
        ))
        .await;
        let client = GitHubClient::with_base_url(base_url, Duration::from_secs(5)).unwrap();

        let err = client.search_repositories("react").await.unwrap_err();
        assert!(matches!(
            err,
            GitHubError::Status {
                status: 403,
                rate_limited: true
            }
        ));
        assert_eq!(err.to_string(), "GitHub API error: 403 (rate limit exceeded)");

        let head = server.await.unwrap();
        assert!(head.starts_with(
            "GET /search/repositories?q=react&per_page=30&sort=stars&order=desc HTTP/1.1\r\n"
        ));
    }

    #[tokio::test]
    async fn test_ok_response_keeps_item_order() {
        let body = r#"{"total_count": 2, "items": [
            {"id": 10270250, "name": "react", "full_name": "facebook/react", "description": "UI",
             "html_url": "https://github.com/facebook/react", "stargazers_count": 230000,
             "language": "JavaScript", "owner": {"login": "facebook", "avatar_url": "a"}},
            {"id": 70107786, "name": "next.js", "full_name": "vercel/next.js", "description": null,
             "html_url": "https://github.com/vercel/next.js", "stargazers_count": 125000,
             "language": "JavaScript", "owner": {"login": "vercel", "avatar_url": "b"}}
        ]}"#;
        let (base_url, server) = serve_once(http_response("200 OK", "", body)).await;
        let client = GitHubClient::with_base_url(base_url, Duration::from_secs(5)).unwrap();

        let repos = client.search_repositories("react").await.unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["facebook/react", "vercel/next.js"]);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client =
            GitHubClient::with_base_url("http://127.0.0.1:9".into(), Duration::from_secs(2))
                .unwrap();
        let result = client.search_repositories("react").await;

        assert!(matches!(result, Err(GitHubError::Network(_))));
    }
}
