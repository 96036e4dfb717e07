//! Typed client for the catalogue REST API.
//!
//! Every call is a single attempt: non-2xx answers become
//! [`CliError::Server`] via [`classify_problem`], transport errors become
//! [`CliError::Failure`].

use anyhow::anyhow;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use seedshelf_api_models::{
    AuthResponse, Comment, CommentCreateRequest, CommentUpdateRequest, CreatedResource,
    LoginRequest, RegisterRequest, StatusResponse, Torrent, TorrentCreateRequest, TorrentFilter,
};
use url::Url;

use crate::client::{CliError, CliResult, classify_problem};

/// Thin wrapper binding an HTTP client to the API base URL.
#[derive(Clone)]
pub(crate) struct CatalogApi {
    client: Client,
    base_url: Url,
}

impl CatalogApi {
    pub(crate) const fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Append path segments to the base URL, keeping any base path (e.g. `/api`).
    pub(crate) fn endpoint(&self, segments: &[&str]) -> CliResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| CliError::failure(anyhow!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL for `GET /torrents`, carrying only the filter fields that are set.
    pub(crate) fn list_url(&self, filter: &TorrentFilter) -> CliResult<Url> {
        let mut url = self.endpoint(&["torrents"])?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    pub(crate) async fn health(&self) -> CliResult<StatusResponse> {
        let url = self.endpoint(&["health"])?;
        send_json(self.client.get(url), "/health").await
    }

    pub(crate) async fn list_torrents(&self, filter: &TorrentFilter) -> CliResult<Vec<Torrent>> {
        let url = self.list_url(filter)?;
        tracing::debug!(%url, "listing torrents");
        send_json(self.client.get(url), "/torrents").await
    }

    pub(crate) async fn get_torrent(&self, id: &str) -> CliResult<Torrent> {
        let url = self.endpoint(&["torrents", id])?;
        send_json(self.client.get(url), "/torrents/{id}").await
    }

    pub(crate) async fn get_comments(&self, id: &str) -> CliResult<Vec<Comment>> {
        let url = self.endpoint(&["torrents", id, "comments"])?;
        send_json(self.client.get(url), "/torrents/{id}/comments").await
    }

    pub(crate) async fn create_torrent(
        &self,
        headers: HeaderMap,
        payload: &TorrentCreateRequest,
    ) -> CliResult<CreatedResource> {
        let url = self.endpoint(&["torrents"])?;
        let request = self.client.post(url).headers(headers).json(payload);
        send_json(request, "/torrents").await
    }

    pub(crate) async fn create_comment(
        &self,
        headers: HeaderMap,
        torrent_id: &str,
        payload: &CommentCreateRequest,
    ) -> CliResult<CreatedResource> {
        let url = self.endpoint(&["torrents", torrent_id, "comments"])?;
        let request = self.client.post(url).headers(headers).json(payload);
        send_json(request, "/torrents/{id}/comments").await
    }

    pub(crate) async fn update_comment(
        &self,
        headers: HeaderMap,
        comment_id: &str,
        payload: &CommentUpdateRequest,
    ) -> CliResult<()> {
        let url = self.endpoint(&["comments", comment_id])?;
        let request = self.client.put(url).headers(headers).json(payload);
        send_empty(request, "/comments/{id}").await
    }

    pub(crate) async fn delete_comment(&self, headers: HeaderMap, comment_id: &str) -> CliResult<()> {
        let url = self.endpoint(&["comments", comment_id])?;
        send_empty(self.client.delete(url).headers(headers), "/comments/{id}").await
    }

    pub(crate) async fn login(&self, payload: &LoginRequest) -> CliResult<AuthResponse> {
        let url = self.endpoint(&["login"])?;
        send_json(self.client.post(url).json(payload), "/login").await
    }

    pub(crate) async fn register(&self, payload: &RegisterRequest) -> CliResult<AuthResponse> {
        let url = self.endpoint(&["register"])?;
        send_json(self.client.post(url).json(payload), "/register").await
    }
}

async fn send_checked(request: RequestBuilder, route: &str) -> CliResult<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {route} failed: {err}")))?;
    let status = response.status();
    tracing::debug!(route, status = status.as_u16(), "response received");
    if status.is_success() {
        Ok(response)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder, route: &str) -> CliResult<T> {
    send_checked(request, route)
        .await?
        .json::<T>()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to parse {route} response: {err}")))
}

async fn send_empty(request: RequestBuilder, route: &str) -> CliResult<()> {
    send_checked(request, route).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::Method::{DELETE, PUT};
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use reqwest::header::{AUTHORIZATION, HeaderValue};
    use seedshelf_api_models::{SortField, SortOrder};
    use serde_json::json;

    fn api_for(base: &str) -> CatalogApi {
        CatalogApi::new(Client::new(), base.parse().expect("valid URL"))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header"),
        );
        headers
    }

    #[test]
    fn endpoint_keeps_base_path() -> CliResult<()> {
        let api = api_for("http://host:5000/api");
        assert_eq!(
            api.endpoint(&["torrents", "42", "comments"])?.as_str(),
            "http://host:5000/api/torrents/42/comments"
        );
        let trailing = api_for("http://host:5000/api/");
        assert_eq!(
            trailing.endpoint(&["login"])?.as_str(),
            "http://host:5000/api/login"
        );
        Ok(())
    }

    #[test]
    fn endpoint_escapes_identifiers() -> CliResult<()> {
        let api = api_for("http://host/api");
        assert_eq!(
            api.endpoint(&["torrents", "a/b c"])?.as_str(),
            "http://host/api/torrents/a%2Fb%20c"
        );
        Ok(())
    }

    #[test]
    fn empty_filter_sends_no_query() -> CliResult<()> {
        let api = api_for("http://host/api");
        let url = api.list_url(&TorrentFilter::default())?;
        assert_eq!(url.query(), None);
        assert_eq!(url.as_str(), "http://host/api/torrents");

        let blank = TorrentFilter {
            title: Some("  ".into()),
            ..TorrentFilter::default()
        };
        assert_eq!(api.list_url(&blank)?.query(), None);
        Ok(())
    }

    #[test]
    fn filter_subset_serialises_only_present_fields() -> CliResult<()> {
        let api = api_for("http://host/api");
        let filter = TorrentFilter {
            description: Some("director's cut".into()),
            to_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            min_size: Some(100.0),
            sort: Some(SortField::Title),
            ..TorrentFilter::default()
        };
        let url = api.list_url(&filter)?;
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("description".to_string(), "director's cut".to_string()),
                ("toDate".to_string(), "2024-12-31".to_string()),
                ("minSize".to_string(), "100".to_string()),
                ("sort".to_string(), "title".to_string()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn list_torrents_passes_filters_to_server() -> CliResult<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/torrents")
                .query_param("title", "bunny")
                .query_param("order", "asc");
            then.status(200).json_body(json!([
                {"_id": "1", "title": "Big Buck Bunny", "categories": ["Film"]}
            ]));
        });

        let api = api_for(&format!("{}/api", server.base_url()));
        let filter = TorrentFilter {
            title: Some("bunny".into()),
            order: Some(SortOrder::Asc),
            ..TorrentFilter::default()
        };
        let torrents = api.list_torrents(&filter).await?;
        mock.assert();
        assert_eq!(torrents.len(), 1);
        assert_eq!(torrents[0].title, "Big Buck Bunny");
        Ok(())
    }

    #[tokio::test]
    async fn create_torrent_sends_bearer_and_payload() -> CliResult<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/torrents")
                .header("authorization", "Bearer abc")
                .json_body(json!({
                    "title": "t",
                    "description": "d",
                    "size": null,
                    "categories": "Film,Drama",
                    "file_url": "https://files.test/t.torrent",
                    "images": ""
                }));
            then.status(201).json_body(json!({"inserted_id": "new-1"}));
        });

        let api = api_for(&format!("{}/api", server.base_url()));
        let payload = TorrentCreateRequest {
            title: "t".into(),
            description: "d".into(),
            size: None,
            categories: "Film,Drama".into(),
            file_url: "https://files.test/t.torrent".into(),
            images: String::new(),
        };
        let created = api.create_torrent(bearer("abc"), &payload).await?;
        mock.assert();
        assert_eq!(created.identifier(), Some("new-1"));
        Ok(())
    }

    #[tokio::test]
    async fn server_errors_surface_error_field() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/torrents/bad");
            then.status(400).json_body(json!({"error": "Invalid id"}));
        });

        let api = api_for(&format!("{}/api", server.base_url()));
        let err = api.get_torrent("bad").await.expect_err("400 should fail");
        match err {
            CliError::Server { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_and_delete_comment_use_comment_routes() -> CliResult<()> {
        let server = MockServer::start_async().await;
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/comments/c1")
                .header("authorization", "Bearer abc")
                .json_body(json!({"text": "edited", "rating": 4}));
            then.status(200).json_body(json!({"status": "updated"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path("/api/comments/c1")
                .header("authorization", "Bearer abc");
            then.status(200).json_body(json!({"status": "deleted"}));
        });

        let api = api_for(&format!("{}/api", server.base_url()));
        let update = CommentUpdateRequest {
            text: "edited".into(),
            rating: 4,
        };
        api.update_comment(bearer("abc"), "c1", &update).await?;
        api.delete_comment(bearer("abc"), "c1").await?;
        put.assert();
        delete.assert();
        Ok(())
    }

    #[tokio::test]
    async fn login_returns_token_and_user() -> CliResult<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/login")
                .json_body(json!({"username": "ann", "password": "pw"}));
            then.status(200).json_body(json!({
                "token": "tok",
                "user": {"username": "ann", "role": "moderator"}
            }));
        });

        let api = api_for(&format!("{}/api", server.base_url()));
        let response = api
            .login(&LoginRequest {
                username: "ann".into(),
                password: "pw".into(),
            })
            .await?;
        mock.assert();
        assert_eq!(response.token, "tok");
        assert_eq!(response.user.role.as_str(), "moderator");
        Ok(())
    }

    #[tokio::test]
    async fn transport_errors_are_failures() {
        let api = api_for("http://127.0.0.1:9/api");
        let err = api.health().await.expect_err("closed port should fail");
        assert_eq!(err.exit_code(), 3);
    }
}
