#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Seedshelf catalogue API.
//!
//! The catalogue backend speaks plain JSON: documents carry their identifier
//! under `_id`, optional fields may be absent or `null`, and failures come back
//! as `{"error": ...}` or `{"errors": ...}` bodies. These types keep that
//! contract in one place so the client never has to poke at raw `Value`s.

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Author name shown when a comment carries none.
pub const ANONYMOUS_AUTHOR: &str = "Anonimo";

/// Inclusive bounds accepted for comment ratings.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A catalogued torrent record as returned by `GET /torrents` and `GET /torrents/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Opaque identifier assigned by the server.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display title.
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Payload size in megabytes, when known.
    #[serde(default)]
    pub size: Option<f64>,
    /// Ordered category labels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    /// Mean of all comment ratings, when any exist.
    #[serde(default)]
    pub average_rating: Option<f64>,
    /// Number of ratings that contributed to the average.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ratings_count: u32,
    /// Download location of the `.torrent` payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Preview image URLs.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<String>,
    /// Server-side creation timestamp, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Identifier of the uploading user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

/// A user comment attached to a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Opaque identifier assigned by the server.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Identifier of the parent torrent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_id: Option<String>,
    /// Display name chosen by the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    /// Identifier of the authoring user, for authenticated comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Star rating between 1 and 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Comment body.
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Server-side creation timestamp, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Role granted to an account by the server.
///
/// Unknown role names are preserved verbatim so a persisted user reads back
/// exactly as it was written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Anonymous visitor.
    Guest,
    /// Regular registered account.
    #[default]
    User,
    /// Account allowed to moderate comments.
    Moderator,
    /// Full administrative access.
    Admin,
    /// Any role name this client does not know about.
    Other(String),
}

impl Role {
    /// Wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "guest" => Self::Guest,
            "user" => Self::User,
            "moderator" => Self::Moderator,
            "admin" => Self::Admin,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Account summary returned alongside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-side identifier, when exposed.
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Login name.
    pub username: String,
    /// Contact address, when exposed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Granted role.
    #[serde(default)]
    pub role: Role,
}

/// Successful `POST /login` or `POST /register` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token.
    pub token: String,
    /// Authenticated account.
    pub user: User,
}

/// Body for `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Body for `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Body for `POST /torrents`.
///
/// `categories` and `images` are sent as the raw comma-separated strings the
/// user typed; the server splits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentCreateRequest {
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Size in megabytes; serialised as `null` when unknown.
    pub size: Option<f64>,
    /// Comma-separated category labels.
    pub categories: String,
    /// Download location of the `.torrent` payload.
    pub file_url: String,
    /// Comma-separated preview image URLs.
    pub images: String,
}

/// Body for `POST /torrents/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreateRequest {
    /// Display name for the author.
    pub author_name: String,
    /// Optional star rating between 1 and 5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Comment body.
    pub text: String,
}

/// Body for `PUT /comments/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentUpdateRequest {
    /// Replacement comment body.
    pub text: String,
    /// Replacement star rating between 1 and 5.
    pub rating: u8,
}

/// Response to a create call.
///
/// Older server builds answer with `{"inserted_id": ...}`, newer ones echo
/// the created document; either identifier is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    /// Identifier reported by insert-style responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_id: Option<String>,
    /// Identifier reported by document-echo responses.
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl CreatedResource {
    /// Identifier of the created resource, whichever shape the server used.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.inserted_id.as_deref().or(self.id.as_deref())
    }
}

/// Generic `{"status": ...}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Status keyword such as `ok`, `updated` or `deleted`.
    pub status: String,
}

/// Error document returned with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Single error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured validation errors (string, list or field map).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl ApiErrorBody {
    /// Flatten the body into a single human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref().map(str::trim)
            && !error.is_empty()
        {
            return Some(error.to_string());
        }
        self.errors
            .as_ref()
            .map(flatten_errors)
            .filter(|message| !message.is_empty())
    }
}

fn flatten_errors(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_errors)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(fields) => fields
            .iter()
            .map(|(field, detail)| format!("{field}: {}", flatten_errors(detail)))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Sortable columns accepted by `GET /torrents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Upload timestamp (server default).
    CreatedAt,
    /// Payload size.
    Size,
    /// Title, lexicographic.
    Title,
}

impl SortField {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Size => "size",
            Self::Title => "title",
        }
    }
}

/// Sort direction accepted by `GET /torrents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending (server default).
    Desc,
}

impl SortOrder {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Optional constraints narrowing `GET /torrents`.
///
/// Only fields that are present (and, for text, non-blank) are serialised, so
/// an empty filter produces a request without a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TorrentFilter {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    /// Case-insensitive description substring.
    pub description: Option<String>,
    /// Comma-separated category names; any match qualifies.
    pub categories: Option<String>,
    /// Earliest creation date, inclusive.
    pub from_date: Option<NaiveDate>,
    /// Latest creation date, inclusive.
    pub to_date: Option<NaiveDate>,
    /// Minimum size in megabytes.
    pub min_size: Option<f64>,
    /// Maximum size in megabytes.
    pub max_size: Option<f64>,
    /// Column to sort by.
    pub sort: Option<SortField>,
    /// Sort direction.
    pub order: Option<SortOrder>,
}

impl TorrentFilter {
    /// Query parameters in the order the server documents them.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "title", self.title.as_deref());
        push_text(&mut pairs, "description", self.description.as_deref());
        push_text(&mut pairs, "categories", self.categories.as_deref());
        if let Some(date) = self.from_date {
            pairs.push(("fromDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.to_date {
            pairs.push(("toDate", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(size) = self.min_size {
            pairs.push(("minSize", size.to_string()));
        }
        if let Some(size) = self.max_size {
            pairs.push(("maxSize", size.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        pairs
    }

    /// Whether no constraint would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
        pairs.push((name, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_has_no_pairs() {
        let filter = TorrentFilter::default();
        assert!(filter.query_pairs().is_empty());
        assert!(filter.is_empty());
    }

    #[test]
    fn blank_text_fields_are_skipped() {
        let filter = TorrentFilter {
            title: Some("   ".into()),
            description: Some(String::new()),
            categories: Some("\t".into()),
            ..TorrentFilter::default()
        };
        assert!(filter.is_empty());
    }

    #[test]
    fn present_fields_use_server_parameter_names() {
        let filter = TorrentFilter {
            title: Some(" matrix ".into()),
            categories: Some("Film,Thriller".into()),
            from_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            max_size: Some(700.0),
            order: Some(SortOrder::Asc),
            ..TorrentFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("title", "matrix".to_string()),
                ("categories", "Film,Thriller".to_string()),
                ("fromDate", "2024-01-02".to_string()),
                ("maxSize", "700".to_string()),
                ("order", "asc".to_string()),
            ]
        );
    }

    #[test]
    fn full_filter_serialises_every_field() {
        let filter = TorrentFilter {
            title: Some("a".into()),
            description: Some("b".into()),
            categories: Some("c".into()),
            from_date: NaiveDate::from_ymd_opt(2023, 5, 1),
            to_date: NaiveDate::from_ymd_opt(2023, 6, 30),
            min_size: Some(1.5),
            max_size: Some(2048.0),
            sort: Some(SortField::Size),
            order: Some(SortOrder::Desc),
        };
        let names: Vec<_> = filter.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "description",
                "categories",
                "fromDate",
                "toDate",
                "minSize",
                "maxSize",
                "sort",
                "order"
            ]
        );
    }

    #[test]
    fn torrent_accepts_backend_document_shape() -> Result<(), serde_json::Error> {
        let torrent: Torrent = serde_json::from_value(json!({
            "_id": "65a1",
            "title": "Big Buck Bunny",
            "description": null,
            "size": 276.5,
            "categories": ["Film", "Animation"],
            "average_rating": 4.333,
            "ratings_count": 3,
            "uploaded_by": "u1",
            "created_at": "Tue, 02 Jan 2024 10:00:00 GMT"
        }))?;
        assert_eq!(torrent.id, "65a1");
        assert_eq!(torrent.description, "");
        assert_eq!(torrent.size, Some(276.5));
        assert_eq!(torrent.categories, vec!["Film", "Animation"]);
        assert_eq!(torrent.ratings_count, 3);
        assert!(torrent.images.is_empty());
        Ok(())
    }

    #[test]
    fn torrent_tolerates_missing_optional_fields() -> Result<(), serde_json::Error> {
        let torrent: Torrent = serde_json::from_value(json!({"id": "x", "title": "only"}))?;
        assert_eq!(torrent.size, None);
        assert!(torrent.categories.is_empty());
        assert_eq!(torrent.average_rating, None);
        assert_eq!(torrent.ratings_count, 0);
        Ok(())
    }

    #[test]
    fn comment_accepts_backend_document_shape() -> Result<(), serde_json::Error> {
        let comment: Comment = serde_json::from_value(json!({
            "_id": "c1",
            "torrent_id": "65a1",
            "author_id": null,
            "author_name": "mario",
            "rating": 3,
            "text": "ottimo",
        }))?;
        assert_eq!(comment.id, "c1");
        assert_eq!(comment.rating, Some(3));
        assert_eq!(comment.author_id, None);
        assert_eq!(comment.created_at, None);
        Ok(())
    }

    #[test]
    fn role_round_trips_unknown_names() -> Result<(), serde_json::Error> {
        let user: User = serde_json::from_value(json!({
            "username": "ops",
            "role": "superuser"
        }))?;
        assert_eq!(user.role, Role::Other("superuser".into()));
        let encoded = serde_json::to_value(&user)?;
        assert_eq!(encoded["role"], "superuser");
        Ok(())
    }

    #[test]
    fn missing_role_defaults_to_user() -> Result<(), serde_json::Error> {
        let user: User = serde_json::from_value(json!({"username": "ann"}))?;
        assert_eq!(user.role, Role::User);
        Ok(())
    }

    #[test]
    fn torrent_create_request_keeps_null_size() -> Result<(), serde_json::Error> {
        let request = TorrentCreateRequest {
            title: "t".into(),
            description: "d".into(),
            size: None,
            categories: "Film, Drama".into(),
            file_url: "https://example.test/t.torrent".into(),
            images: String::new(),
        };
        let encoded = serde_json::to_value(&request)?;
        assert!(encoded["size"].is_null());
        assert_eq!(encoded["categories"], "Film, Drama");
        Ok(())
    }

    #[test]
    fn created_resource_reads_either_identifier() -> Result<(), serde_json::Error> {
        let inserted: CreatedResource = serde_json::from_value(json!({"inserted_id": "a"}))?;
        assert_eq!(inserted.identifier(), Some("a"));
        let echoed: CreatedResource =
            serde_json::from_value(json!({"_id": "b", "title": "x"}))?;
        assert_eq!(echoed.identifier(), Some("b"));
        Ok(())
    }

    #[test]
    fn error_body_prefers_single_error() {
        let body = ApiErrorBody {
            error: Some("Invalid id".into()),
            errors: Some(json!(["ignored"])),
        };
        assert_eq!(body.message().as_deref(), Some("Invalid id"));
    }

    #[test]
    fn error_body_flattens_structured_errors() {
        let list = ApiErrorBody {
            error: None,
            errors: Some(json!(["title is required", "file_url is required"])),
        };
        assert_eq!(
            list.message().as_deref(),
            Some("title is required; file_url is required")
        );

        let map = ApiErrorBody {
            error: Some("  ".into()),
            errors: Some(json!({"email": "already taken"})),
        };
        assert_eq!(map.message().as_deref(), Some("email: already taken"));

        assert_eq!(ApiErrorBody::default().message(), None);
    }
}
