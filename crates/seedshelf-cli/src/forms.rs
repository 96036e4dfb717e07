//! Input collection and validation for mutating commands.
//!
//! Every check here runs before a request is built; a rejected form never
//! reaches the network.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::anyhow;
use seedshelf_api_models::{
    CommentCreateRequest, CommentUpdateRequest, RATING_RANGE, TorrentCreateRequest,
};

use crate::client::{CliError, CliResult};

/// Source of interactive answers.
pub(crate) trait Prompt {
    /// Ask for a line of text; the answer is returned without the newline.
    fn ask(&mut self, label: &str) -> CliResult<String>;
    /// Ask for a value without echoing it.
    fn ask_secret(&mut self, label: &str) -> CliResult<String>;
    fn confirm(&mut self, question: &str) -> CliResult<bool> {
        let answer = self.ask(&format!("{question} [y/N]"))?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Prompt backed by the controlling terminal; labels go to stderr.
pub(crate) struct TerminalPrompt;

impl TerminalPrompt {
    fn require_terminal(label: &str) -> CliResult<()> {
        if io::stdin().is_terminal() {
            Ok(())
        } else {
            Err(CliError::validation(format!(
                "{label} is required (stdin is not a terminal; pass it as a flag)"
            )))
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, label: &str) -> CliResult<String> {
        Self::require_terminal(label)?;
        let mut stderr = io::stderr();
        write!(stderr, "{label}: ")?;
        stderr.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, label: &str) -> CliResult<String> {
        Self::require_terminal(label)?;
        rpassword::prompt_password(format!("{label}: "))
            .map_err(|err| CliError::failure(anyhow!("failed to read {label}: {err}")))
    }
}

/// Raw add-torrent input as typed by the user.
#[derive(Debug, Clone, Default)]
pub(crate) struct TorrentForm {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) size: Option<String>,
    pub(crate) categories: Option<String>,
    pub(crate) file_url: String,
    pub(crate) images: Option<String>,
}

impl TorrentForm {
    pub(crate) fn into_request(self) -> CliResult<TorrentCreateRequest> {
        let title = self.title.trim();
        let description = self.description.trim();
        let file_url = self.file_url.trim();

        let missing: Vec<&str> = [
            ("title", title),
            ("description", description),
            ("file URL", file_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(CliError::validation(format!(
                "{} must not be empty",
                missing.join(", ")
            )));
        }

        Ok(TorrentCreateRequest {
            title: title.to_string(),
            description: description.to_string(),
            size: self.size.as_deref().and_then(parse_size),
            categories: self.categories.unwrap_or_default().trim().to_string(),
            file_url: file_url.to_string(),
            images: self.images.unwrap_or_default().trim().to_string(),
        })
    }
}

/// Size in MB, or `None` when blank or not a number.
fn parse_size(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(size) if size.is_finite() => Some(size),
        _ => {
            tracing::warn!(size = raw, "size is not a number; sending without it");
            None
        }
    }
}

/// Parse a rating as an integer in `1..=5`.
pub(crate) fn parse_rating(raw: &str) -> CliResult<u8> {
    let raw = raw.trim();
    raw.parse::<u8>()
        .ok()
        .filter(|rating| RATING_RANGE.contains(rating))
        .ok_or_else(|| {
            CliError::validation(format!(
                "rating must be a whole number between {} and {} (got '{raw}')",
                RATING_RANGE.start(),
                RATING_RANGE.end()
            ))
        })
}

fn require_text(text: &str) -> CliResult<String> {
    let text = text.trim();
    if text.is_empty() {
        Err(CliError::validation("comment text must not be empty"))
    } else {
        Ok(text.to_string())
    }
}

pub(crate) fn comment_request(
    author_name: String,
    text: &str,
    rating: Option<&str>,
) -> CliResult<CommentCreateRequest> {
    let text = require_text(text)?;
    let rating = rating
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(parse_rating)
        .transpose()?;
    Ok(CommentCreateRequest {
        author_name,
        rating,
        text,
    })
}

/// Collect the edit form, prompting for whichever field was not passed.
pub(crate) fn edit_request(
    text: Option<String>,
    rating: Option<String>,
    prompt: &mut dyn Prompt,
) -> CliResult<CommentUpdateRequest> {
    let text = match text {
        Some(text) => text,
        None => prompt.ask("new text")?,
    };
    let rating = match rating {
        Some(rating) => rating,
        None => prompt.ask("new rating (1-5)")?,
    };
    Ok(CommentUpdateRequest {
        text: require_text(&text)?,
        rating: parse_rating(&rating)?,
    })
}

/// Deletion proceeds only with `--yes` or an explicit interactive yes.
pub(crate) fn confirm_delete(
    assume_yes: bool,
    comment_id: &str,
    prompt: &mut dyn Prompt,
) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }
    prompt.confirm(&format!("delete comment {comment_id}?"))
}
