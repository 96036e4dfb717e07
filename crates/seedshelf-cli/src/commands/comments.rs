
use reqwest::header::HeaderMap;

use crate::cli::{CommentAddArgs, CommentDeleteArgs, CommentEditArgs};
use crate::client::{CliError, CliResult};
use crate::commands::{Console, show_detail};
use crate::forms::{comment_request, confirm_delete, edit_request};
use crate::output::render_created;
use crate::views::resolve_author;
use crate::workspace::Workspace;

pub(crate) async fn handle_add(
    workspace: &Workspace,
    args: CommentAddArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    let session = workspace.auth.require_session("comment")?;
    let author = resolve_author(args.author.as_deref(), Some(session));
    let text = console.value_or_ask(args.text, "comment")?;
    let request = comment_request(author, &text, args.rating.as_deref())?;

    let created = workspace
        .api
        .create_comment(
            workspace.auth.auth_headers(HeaderMap::new()),
            &args.torrent_id,
            &request,
        )
        .await?;
    tracing::info!(
        torrent_id = %args.torrent_id,
        comment_id = ?created.identifier(),
        "comment created"
    );
    render_created("comment", created.identifier(), console.format, console.out)?;
    show_detail(workspace, &args.torrent_id, console).await
}

pub(crate) async fn handle_edit(
    workspace: &Workspace,
    args: CommentEditArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    workspace.auth.require_session("edit comments")?;
    let request = edit_request(args.text, args.rating, console.prompt)?;
    let torrent_id = refresh_target(workspace, args.torrent_id)?;

    workspace
        .api
        .update_comment(
            workspace.auth.auth_headers(HeaderMap::new()),
            &args.comment_id,
            &request,
        )
        .await?;
    tracing::info!(comment_id = %args.comment_id, "comment updated");
    writeln!(console.out, "comment {} updated", args.comment_id)?;
    show_detail(workspace, &torrent_id, console).await
}

pub(crate) async fn handle_delete(
    workspace: &Workspace,
    args: CommentDeleteArgs,
    console: &mut Console<'_>,
) -> CliResult<()> {
    workspace.auth.require_session("delete comments")?;
    if !confirm_delete(args.yes, &args.comment_id, console.prompt)? {
        writeln!(console.out, "deletion cancelled")?;
        return Ok(());
    }
    let torrent_id = refresh_target(workspace, args.torrent_id)?;

    workspace
        .api
        .delete_comment(
            workspace.auth.auth_headers(HeaderMap::new()),
            &args.comment_id,
        )
        .await?;
    tracing::info!(comment_id = %args.comment_id, "comment deleted");
    writeln!(console.out, "comment {} deleted", args.comment_id)?;
    show_detail(workspace, &torrent_id, console).await
}

/// Torrent to re-render once the mutation lands; resolved before any request.
fn refresh_target(workspace: &Workspace, explicit: Option<String>) -> CliResult<String> {
    explicit
        .filter(|id| !id.trim().is_empty())
        .or_else(|| workspace.open_torrent_id())
        .ok_or_else(|| {
            CliError::validation("no torrent is open; run `seedshelf show <id>` or pass --torrent")
        })
}
