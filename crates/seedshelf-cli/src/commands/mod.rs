//! Command handlers grouped by concern.

use std::io::Write;

use crate::cli::OutputFormat;
use crate::client::CliResult;
use crate::forms::Prompt;
use crate::output::render_detail;
use crate::workspace::Workspace;

pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod torrents;

/// Where a command reads answers from and writes its output to.
pub(crate) struct Console<'a> {
    pub(crate) format: OutputFormat,
    pub(crate) prompt: &'a mut dyn Prompt,
    pub(crate) out: &'a mut dyn Write,
}

impl Console<'_> {
    /// Use `value` when given, otherwise ask for it.
    pub(crate) fn value_or_ask(&mut self, value: Option<String>, label: &str) -> CliResult<String> {
        match value {
            Some(value) => Ok(value),
            None => self.prompt.ask(label),
        }
    }

    pub(crate) fn secret_or_ask(
        &mut self,
        value: Option<String>,
        label: &str,
    ) -> CliResult<String> {
        match value {
            Some(value) => Ok(value),
            None => self.prompt.ask_secret(label),
        }
    }
}

/// Fetch and print the detail view for `torrent_id`.
pub(crate) async fn show_detail(
    workspace: &Workspace,
    torrent_id: &str,
    console: &mut Console<'_>,
) -> CliResult<()> {
    match workspace.open_detail(torrent_id).await? {
        Some(view) => render_detail(
            &view,
            workspace.auth.controls(),
            console.format,
            console.out,
        ),
        None => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use reqwest::Client;
    use seedshelf_api_models::{Role, User};

    use super::Console;
    use crate::api::CatalogApi;
    use crate::cli::OutputFormat;
    use crate::forms::testing::ScriptedPrompt;
    use crate::session::AuthState;
    use crate::storage::MemoryStore;
    use crate::workspace::Workspace;

    pub(crate) fn table_console<'a>(
        prompt: &'a mut ScriptedPrompt,
        out: &'a mut Vec<u8>,
    ) -> Console<'a> {
        Console {
            format: OutputFormat::Table,
            prompt,
            out,
        }
    }

    pub(crate) fn guest_workspace(base: &str) -> Workspace {
        workspace_with_store(base, MemoryStore::default())
    }

    pub(crate) fn signed_in_workspace(base: &str) -> Workspace {
        let mut workspace = guest_workspace(base);
        workspace
            .auth
            .save(
                "abc".into(),
                User {
                    id: Some("u1".into()),
                    username: "ann".into(),
                    email: None,
                    role: Role::User,
                },
            )
            .expect("memory store accepts writes");
        workspace
    }

    pub(crate) fn workspace_with_store(base: &str, store: MemoryStore) -> Workspace {
        let api = CatalogApi::new(Client::new(), base.parse().expect("valid URL"));
        Workspace::new(api, AuthState::load_from_storage(Box::new(store)))
    }
}
