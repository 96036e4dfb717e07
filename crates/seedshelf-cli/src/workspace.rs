//! Command context tying the API client to the session and the open detail view.
//!
//! # Design
//! - Opening a detail view takes a generation ticket; results that arrive
//!   after a newer open began are discarded instead of rendered.
//! - Torrent and comments are fetched concurrently and only surfaced together.
//! - The last rendered torrent id is persisted so later comment edits know
//!   which detail view to refresh.

use std::sync::{Mutex, MutexGuard, PoisonError};

use seedshelf_api_models::{Torrent, TorrentFilter};

use crate::api::CatalogApi;
use crate::client::CliResult;
use crate::session::AuthState;
use crate::storage::KeyValueStore;

pub(crate) const OPEN_TORRENT_KEY: &str = "seedshelf.open_torrent";
use crate::views::DetailView;

/// The single open detail view: which torrent, and which request opened it.
#[derive(Debug, Default)]
pub(crate) struct DetailTracker {
    state: Mutex<OpenDetail>,
}

#[derive(Debug, Default)]
struct OpenDetail {
    generation: u64,
    torrent_id: Option<String>,
}

/// Proof of which detail request a response belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetailTicket {
    pub(crate) generation: u64,
    pub(crate) torrent_id: String,
}

impl DetailTracker {
    fn state(&self) -> MutexGuard<'_, OpenDetail> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `torrent_id` the open torrent, superseding any earlier ticket.
    pub(crate) fn begin(&self, torrent_id: &str) -> DetailTicket {
        let mut state = self.state();
        state.generation += 1;
        state.torrent_id = Some(torrent_id.to_string());
        DetailTicket {
            generation: state.generation,
            torrent_id: torrent_id.to_string(),
        }
    }

    pub(crate) fn is_current(&self, ticket: &DetailTicket) -> bool {
        self.state().generation == ticket.generation
    }

    pub(crate) fn current_id(&self) -> Option<String> {
        self.state().torrent_id.clone()
    }
}

pub(crate) struct Workspace {
    pub(crate) api: CatalogApi,
    pub(crate) auth: AuthState,
    detail: DetailTracker,
}

impl Workspace {
    pub(crate) fn new(api: CatalogApi, auth: AuthState) -> Self {
        Self {
            api,
            auth,
            detail: DetailTracker::default(),
        }
    }

    pub(crate) async fn load_list(&self, filter: &TorrentFilter) -> CliResult<Vec<Torrent>> {
        let torrents = self.api.list_torrents(filter).await?;
        tracing::debug!(count = torrents.len(), "torrent list loaded");
        Ok(torrents)
    }

    /// Fetch a torrent and its comments; `None` when a newer open superseded this one.
    pub(crate) async fn open_detail(&self, torrent_id: &str) -> CliResult<Option<DetailView>> {
        let ticket = self.detail.begin(torrent_id);
        tracing::debug!(
            torrent_id,
            generation = ticket.generation,
            "opening torrent detail"
        );

        let (torrent, comments) = tokio::try_join!(
            self.api.get_torrent(torrent_id),
            self.api.get_comments(torrent_id)
        )?;

        if !self.detail.is_current(&ticket) {
            tracing::debug!(
                torrent_id = %ticket.torrent_id,
                generation = ticket.generation,
                current = ?self.detail.current_id(),
                "discarding stale detail response"
            );
            return Ok(None);
        }
        if let Err(err) = self.auth.store().set(OPEN_TORRENT_KEY, torrent_id) {
            tracing::warn!(error = %err, torrent_id, "failed to remember open torrent");
        }
        Ok(Some(DetailView::build(torrent, comments)))
    }

    /// Torrent whose detail view is open: this run's, else the last one persisted.
    pub(crate) fn open_torrent_id(&self) -> Option<String> {
        self.detail
            .current_id()
            .or_else(|| remembered_torrent(self.auth.store()))
    }
}

fn remembered_torrent(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(OPEN_TORRENT_KEY) {
        Ok(id) => id.filter(|id| !id.trim().is_empty()),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable open torrent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::CliError;
    use crate::storage::MemoryStore;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;

    fn workspace(base: &str) -> Workspace {
        workspace_with_store(base, MemoryStore::default())
    }

    fn workspace_with_store(base: &str, store: MemoryStore) -> Workspace {
        let api = CatalogApi::new(Client::new(), base.parse().expect("valid URL"));
        Workspace::new(api, AuthState::load_from_storage(Box::new(store)))
    }

    fn mock_torrent(server: &MockServer, id: &str, delay_ms: u64) {
        server.mock(|when, then| {
            when.method(GET).path(format!("/api/torrents/{id}"));
            then.status(200)
                .delay(Duration::from_millis(delay_ms))
                .json_body(json!({"_id": id, "title": format!("Torrent {id}")}));
        });
        server.mock(|when, then| {
            when.method(GET).path(format!("/api/torrents/{id}/comments"));
            then.status(200)
                .delay(Duration::from_millis(delay_ms))
                .json_body(json!([
                    {"_id": format!("{id}-c1"), "author_name": "ann", "rating": 3, "text": "ok"}
                ]));
        });
    }

    #[test]
    fn tickets_supersede_each_other() {
        let tracker = DetailTracker::default();
        assert_eq!(tracker.current_id(), None);
        let first = tracker.begin("a");
        assert!(tracker.is_current(&first));
        let second = tracker.begin("b");
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(second.generation > first.generation);
        assert_eq!(tracker.current_id().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn detail_combines_torrent_and_comments() -> CliResult<()> {
        let server = MockServer::start_async().await;
        mock_torrent(&server, "t1", 0);
        let workspace = workspace(&format!("{}/api", server.base_url()));

        let view = workspace
            .open_detail("t1")
            .await?
            .ok_or_else(|| CliError::validation("view discarded"))?;
        assert_eq!(view.torrent.title, "Torrent t1");
        assert_eq!(view.comments.len(), 1);
        assert_eq!(view.header.average_rating, "N/A");
        Ok(())
    }

    #[tokio::test]
    async fn stale_detail_response_is_discarded() -> CliResult<()> {
        let server = MockServer::start_async().await;
        mock_torrent(&server, "slow", 300);
        mock_torrent(&server, "fast", 0);
        let workspace = workspace(&format!("{}/api", server.base_url()));

        let (older, newer) =
            tokio::join!(workspace.open_detail("slow"), workspace.open_detail("fast"));
        assert!(older?.is_none());
        let newer = newer?.ok_or_else(|| CliError::validation("newest view discarded"))?;
        assert_eq!(newer.torrent.id, "fast");
        Ok(())
    }

    #[tokio::test]
    async fn opened_torrent_is_remembered_across_runs() -> CliResult<()> {
        let server = MockServer::start_async().await;
        mock_torrent(&server, "t1", 0);
        let base = format!("{}/api", server.base_url());
        let store = MemoryStore::default();

        let first = workspace_with_store(&base, store.clone());
        assert_eq!(first.open_torrent_id(), None);
        first.open_detail("t1").await?;
        assert_eq!(first.open_torrent_id().as_deref(), Some("t1"));

        let next = workspace_with_store(&base, store.clone());
        assert_eq!(next.open_torrent_id().as_deref(), Some("t1"));
        assert_eq!(store.get(OPEN_TORRENT_KEY)?.as_deref(), Some("t1"));
        Ok(())
    }

    #[tokio::test]
    async fn detail_fails_when_either_request_fails() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/torrents/gone");
            then.status(404).json_body(json!({"error": "Torrent not found"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/torrents/gone/comments");
            then.status(200).json_body(json!([]));
        });
        let workspace = workspace(&format!("{}/api", server.base_url()));

        let err = workspace
            .open_detail("gone")
            .await
            .expect_err("missing torrent should fail");
        assert_eq!(err.display_message(), "Torrent not found (status 404)");
    }
}
