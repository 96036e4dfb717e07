//! View models for the torrent list and the detail/comment thread.
//!
//! # Design
//! - Views are plain data built from API responses; rendering lives in
//!   `output.rs` so the shaping rules are testable without a terminal.
//! - Every render starts from fresh server data; nothing here is cached.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use seedshelf_api_models::{ANONYMOUS_AUTHOR, Comment, RATING_RANGE, Torrent};

use crate::session::Session;

pub(crate) const NOT_FOUND_NOTICE: &str = "No torrents found.";
pub(crate) const NO_COMMENTS_NOTICE: &str = "No comments yet. Be the first to leave one.";
const STAR: char = '★';
const MISSING: &str = "N/A";

/// Rendered torrent collection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ListView {
    NotFound,
    Cards(Vec<TorrentCard>),
}

impl ListView {
    pub(crate) fn from_torrents(torrents: &[Torrent]) -> Self {
        if torrents.is_empty() {
            Self::NotFound
        } else {
            Self::Cards(torrents.iter().map(TorrentCard::from).collect())
        }
    }
}

/// One torrent summary in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TorrentCard {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) size: String,
    pub(crate) categories: String,
}

impl From<&Torrent> for TorrentCard {
    fn from(torrent: &Torrent) -> Self {
        Self {
            id: torrent.id.clone(),
            title: torrent.title.clone(),
            description: torrent.description.clone(),
            size: format_size(torrent.size),
            categories: format_categories(&torrent.categories),
        }
    }
}

/// Torrent metadata plus its comment thread, as shown by `show`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetailView {
    pub(crate) torrent: Torrent,
    pub(crate) comments: Vec<Comment>,
    pub(crate) header: DetailHeader,
    pub(crate) thread: CommentThread,
}

impl DetailView {
    pub(crate) fn build(torrent: Torrent, comments: Vec<Comment>) -> Self {
        Self::build_in(torrent, comments, &Local)
    }

    pub(crate) fn build_in<Tz>(torrent: Torrent, comments: Vec<Comment>, zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let header = DetailHeader::from(&torrent);
        let thread = CommentThread::build(&comments, zone);
        Self {
            torrent,
            comments,
            header,
            thread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetailHeader {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) size: String,
    pub(crate) categories: String,
    pub(crate) average_rating: String,
    pub(crate) ratings_count: u32,
    pub(crate) file_url: Option<String>,
    pub(crate) images: Vec<String>,
}

impl From<&Torrent> for DetailHeader {
    fn from(torrent: &Torrent) -> Self {
        Self {
            id: torrent.id.clone(),
            title: torrent.title.clone(),
            description: torrent.description.clone(),
            size: format_size(torrent.size),
            categories: format_categories(&torrent.categories),
            average_rating: format_rating(torrent.average_rating),
            ratings_count: torrent.ratings_count,
            file_url: torrent.file_url.clone(),
            images: torrent.images.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommentThread {
    Empty,
    Entries(Vec<CommentEntry>),
}

impl CommentThread {
    fn build<Tz>(comments: &[Comment], zone: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if comments.is_empty() {
            return Self::Empty;
        }
        Self::Entries(
            comments
                .iter()
                .map(|comment| CommentEntry {
                    id: comment.id.clone(),
                    author: display_author(comment.author_name.as_deref()),
                    stars: stars(comment.rating),
                    timestamp: format_timestamp(comment.created_at.as_deref(), zone),
                    text: comment.text.clone(),
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommentEntry {
    pub(crate) id: String,
    pub(crate) author: String,
    pub(crate) stars: String,
    pub(crate) timestamp: String,
    pub(crate) text: String,
}

/// `"<n> MB"`, or `?` when the size is unknown or zero.
pub(crate) fn format_size(size: Option<f64>) -> String {
    match size {
        Some(size) if size.is_finite() && size > 0.0 => format!("{size} MB"),
        _ => "?".to_string(),
    }
}

pub(crate) fn format_categories(categories: &[String]) -> String {
    let joined = categories
        .iter()
        .map(|category| category.trim())
        .filter(|category| !category.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        MISSING.to_string()
    } else {
        joined
    }
}

/// Average rating to two decimals, or `N/A` when the torrent has none.
pub(crate) fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(value) if value.is_finite() => format!("{value:.2}"),
        _ => MISSING.to_string(),
    }
}

/// One star glyph per rating point.
pub(crate) fn stars(rating: Option<u8>) -> String {
    let count = rating.unwrap_or(0).min(*RATING_RANGE.end());
    std::iter::repeat_n(STAR, usize::from(count)).collect()
}

fn display_author(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(ANONYMOUS_AUTHOR)
        .to_string()
}

/// Author for a new comment: the typed name, else the signed-in user, else `Anonimo`.
pub(crate) fn resolve_author(typed: Option<&str>, session: Option<&Session>) -> String {
    typed
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| session.map(|session| session.user.username.as_str()))
        .unwrap_or(ANONYMOUS_AUTHOR)
        .to_string()
}

/// Render a server timestamp in `zone`; blank when absent, verbatim when unparseable.
pub(crate) fn format_timestamp<Tz>(raw: Option<&str>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return String::new();
    };
    parse_timestamp(raw).map_or_else(
        || raw.to_string(),
        |instant| {
            instant
                .with_timezone(zone)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        },
    )
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
