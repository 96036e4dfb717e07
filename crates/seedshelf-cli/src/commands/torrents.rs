
use reqwest::header::HeaderMap;
use seedshelf_api_models::TorrentFilter;

use crate::cli::{AddArgs, ListArgs};
use crate::client::CliResult;
use crate::commands::{Console, show_detail};
use crate::forms::TorrentForm;
use crate::output::{render_created, render_list};
use crate::workspace::Workspace;

pub(crate) async fn handle_list(
    workspace: &Workspace,
    args: ListArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    let filter = TorrentFilter::from(args);
    let torrents = workspace.load_list(&filter).await?;
    render_list(&torrents, console.format, console.out)
}

pub(crate) async fn handle_show(
    workspace: &Workspace,
    torrent_id: &str,
    console: &mut Console<'_>,
) -> CliResult<()> {
    show_detail(workspace, torrent_id, console).await
}

pub(crate) async fn handle_add(
    workspace: &Workspace,
    args: AddArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    workspace.auth.require_session("add torrents")?;

    let form = TorrentForm {
        title: console.value_or_ask(args.title, "title")?,
        description: console.value_or_ask(args.description, "description")?,
        size: args.size,
        categories: args.categories,
        file_url: console.value_or_ask(args.file_url, "file URL")?,
        images: args.images,
    };
    let request = form.into_request()?;

    let created = workspace
        .api
        .create_torrent(workspace.auth.auth_headers(HeaderMap::new()), &request)
        .await?;
    tracing::info!(torrent_id = ?created.identifier(), "torrent created");
    render_created("torrent", created.identifier(), console.format, console.out)?;

    let torrents = workspace.load_list(&TorrentFilter::default()).await?;
    render_list(&torrents, console.format, console.out)
}

pub(crate) async fn handle_ping(workspace: &Workspace, console: &mut Console<'_>) -> CliResult<()> {
    let health = workspace.api.health().await?;
    writeln!(console.out, "API status: {}", health.status)?;
    Ok(())
}
