use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::comment::policy::Projection;
use crate::comment::status::CommentStatus;

/// The stored comment record. `author_id` is the authoritative identity when
/// present; the guest metadata fields are kept historically either way.
/// `date` and `date_gmt` form a floating local/UTC pair derived from one
/// authoritative instant at creation time.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub parent_id: Option<u64>,
    pub author_id: Option<u64>,
    pub author_name: String,
    pub author_email: String,
    pub author_url: String,
    pub author_ip: String,
    pub author_user_agent: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub date_gmt: NaiveDateTime,
    pub status: CommentStatus,
    pub karma: i64,
}

/// Field set for inserting a comment; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: u64,
    pub parent_id: Option<u64>,
    pub author_id: Option<u64>,
    pub author_name: String,
    pub author_email: String,
    pub author_url: String,
    pub author_ip: String,
    pub author_user_agent: String,
    pub content: String,
    pub date: NaiveDateTime,
    pub date_gmt: NaiveDateTime,
    pub status: CommentStatus,
    pub karma: i64,
}

#[derive(Debug, Serialize)]
pub struct CommentContent {
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// The comment as returned to clients. The view projection omits the
/// moderation metadata (e-mail, IP, user agent, GMT date, karma, raw
/// content); the edit projection carries everything.
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: u64,
    pub post: u64,
    pub parent: u64,
    pub author: u64,
    pub author_name: String,
    pub author_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_user_agent: Option<String>,
    pub content: CommentContent,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_gmt: Option<String>,
    pub status: CommentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub karma: Option<i64>,
    pub link: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CommentView {
    pub fn project(comment: &Comment, projection: Projection) -> CommentView {
        let edit = projection == Projection::Edit;

        CommentView {
            id: comment.id,
            post: comment.post_id,
            parent: comment.parent_id.unwrap_or(0),
            author: comment.author_id.unwrap_or(0),
            author_name: comment.author_name.clone(),
            author_url: comment.author_url.clone(),
            author_email: edit.then(|| comment.author_email.clone()),
            author_ip: edit.then(|| comment.author_ip.clone()),
            author_user_agent: edit.then(|| comment.author_user_agent.clone()),
            content: CommentContent {
                rendered: render_content(&comment.content),
                raw: edit.then(|| comment.content.clone()),
            },
            date: format_date(comment.date),
            date_gmt: edit.then(|| format_date(comment.date_gmt)),
            status: comment.status,
            karma: edit.then(|| comment.karma),
            link: comment_link(comment),
            kind: "comment".to_string(),
        }
    }
}

/// ISO-8601 without a timezone offset; the pair is a floating local/UTC
/// representation of the same instant.
pub fn format_date(date: NaiveDateTime) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}

// Paragraph-wrapping derivation of the raw text. The raw form stays the
// single source of truth.
fn render_content(raw: &str) -> String {
    raw.trim()
        .split("\n\n")
        .map(|paragraph| format!("<p>{}</p>", paragraph.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn comment_link(comment: &Comment) -> String {
    let base =
        std::env::var("SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    format!("{}/posts/{}#comment-{}", base, comment.post_id, comment.id)
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post: Option<u64>,
    pub author: Option<u64>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_url: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub parent: Option<u64>,
    pub status: Option<String>,
}

/// Same field surface as create; any subset may be supplied.
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub post: Option<u64>,
    pub author: Option<u64>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_url: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub parent: Option<u64>,
    pub status: Option<String>,
}
