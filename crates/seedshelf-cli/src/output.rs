//! Output renderers for CLI commands.

use std::io::Write;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::json;
use seedshelf_api_models::Torrent;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::session::{Controls, Session};
use crate::views::{
    CommentThread, DetailView, ListView, NO_COMMENTS_NOTICE, NOT_FOUND_NOTICE,
};

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    writeln!(out, "{text}")?;
    Ok(())
}

pub(crate) fn render_list(
    torrents: &[Torrent],
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, torrents)?,
        OutputFormat::Table => match ListView::from_torrents(torrents) {
            ListView::NotFound => writeln!(out, "{NOT_FOUND_NOTICE}")?,
            ListView::Cards(cards) => {
                for (index, card) in cards.iter().enumerate() {
                    if index > 0 {
                        writeln!(out)?;
                    }
                    writeln!(out, "{}", card.title)?;
                    if !card.description.is_empty() {
                        writeln!(out, "  {}", card.description)?;
                    }
                    writeln!(out, "  size: {}", card.size)?;
                    writeln!(out, "  categories: {}", card.categories)?;
                    writeln!(out, "  details: seedshelf show {}", card.id)?;
                }
            }
        },
    }
    Ok(())
}

pub(crate) fn render_detail(
    view: &DetailView,
    controls: Controls,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &json!({ "torrent": view.torrent, "comments": view.comments }),
        )?,
        OutputFormat::Table => {
            let header = &view.header;
            writeln!(out, "id: {}", header.id)?;
            writeln!(out, "title: {}", header.title)?;
            if !header.description.is_empty() {
                writeln!(out, "description: {}", header.description)?;
            }
            writeln!(out, "size: {}", header.size)?;
            writeln!(out, "categories: {}", header.categories)?;
            writeln!(
                out,
                "rating: {} ({} ratings)",
                header.average_rating, header.ratings_count
            )?;
            if let Some(file_url) = &header.file_url {
                writeln!(out, "file: {file_url}")?;
            }
            if !header.images.is_empty() {
                writeln!(out, "images: {}", header.images.join(", "))?;
            }

            writeln!(out)?;
            match &view.thread {
                CommentThread::Empty => writeln!(out, "{NO_COMMENTS_NOTICE}")?,
                CommentThread::Entries(entries) => {
                    writeln!(out, "comments ({}):", entries.len())?;
                    for entry in entries {
                        let stars = if entry.stars.is_empty() {
                            String::new()
                        } else {
                            format!(" {}", entry.stars)
                        };
                        let timestamp = if entry.timestamp.is_empty() {
                            String::new()
                        } else {
                            format!(" [{}]", entry.timestamp)
                        };
                        writeln!(out, "- {}{stars}{timestamp}", entry.author)?;
                        writeln!(out, "  {}", entry.text)?;
                        if controls.can_comment {
                            writeln!(
                                out,
                                "  edit: seedshelf comment edit {} --torrent {}",
                                entry.id, header.id
                            )?;
                            writeln!(
                                out,
                                "  delete: seedshelf comment delete {} --torrent {}",
                                entry.id, header.id
                            )?;
                        }
                    }
                }
            }
            if controls.can_comment {
                writeln!(out, "add a comment: seedshelf comment add {}", header.id)?;
            } else {
                writeln!(out, "log in to comment (seedshelf login)")?;
            }
        }
    }
    Ok(())
}

/// Describe the current identity along with the affordances it unlocks.
pub(crate) fn render_session(
    session: Option<&Session>,
    controls: Controls,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &json!({
                "user": session.map(|session| &session.user),
                "controls": {
                    "can_add_torrent": controls.can_add_torrent,
                    "can_comment": controls.can_comment,
                    "show_login": controls.show_login,
                    "show_logout": controls.show_logout,
                },
            }),
        )?,
        OutputFormat::Table => {
            match session {
                Some(session) => {
                    writeln!(out, "user: {}", session.user.username)?;
                    if let Some(email) = &session.user.email {
                        writeln!(out, "email: {email}")?;
                    }
                    writeln!(out, "role: {}", session.user.role.as_str())?;
                }
                None => writeln!(out, "user: guest")?,
            }
            writeln!(out, "add torrents: {}", yes_no(controls.can_add_torrent))?;
            writeln!(out, "comment: {}", yes_no(controls.can_comment))?;
            if controls.show_login {
                writeln!(out, "sign in with: seedshelf login")?;
            }
            if controls.show_logout {
                writeln!(out, "sign out with: seedshelf logout")?;
            }
        }
    }
    Ok(())
}

pub(crate) fn render_created(
    kind: &str,
    id: Option<&str>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => write_json(out, &json!({ "created": kind, "id": id }))?,
        OutputFormat::Table => match id {
            Some(id) => writeln!(out, "{kind} created (id: {id})")?,
            None => writeln!(out, "{kind} created")?,
        },
    }
    Ok(())
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
