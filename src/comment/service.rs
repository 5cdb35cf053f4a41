use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};

use crate::comment::model::{
    CommentView, CreateCommentRequest, NewComment, UpdateCommentRequest,
};
use crate::comment::policy::{self, Projection};
use crate::comment::query::{self, ListParams};
use crate::comment::status::{self, CommentStatus};
use crate::database::DataStore;
use crate::user::model::Caller;
use crate::utils::error::CustomError;
use crate::utils::validation::{validate_author_email, validate_author_url};

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MAX_CONTENT_LENGTH: usize = 65_525;
const MAX_AUTHOR_NAME_LENGTH: usize = 100;

pub struct DeleteOutcome {
    /// True when the comment was removed permanently; false when it was
    /// moved to trash and can still be restored.
    pub deleted: bool,
    pub comment: CommentView,
}

pub struct CommentService {
    store: Arc<DataStore>,
    auto_approve_trusted: bool,
}

impl CommentService {
    pub fn new(store: Arc<DataStore>) -> Self {
        let auto_approve_trusted = std::env::var("AUTO_APPROVE_TRUSTED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        CommentService {
            store,
            auto_approve_trusted,
        }
    }

    /// Policy hook: when enabled, an author with a previously approved
    /// comment skips the moderation queue.
    pub fn with_auto_approve(store: Arc<DataStore>, auto_approve_trusted: bool) -> Self {
        CommentService {
            store,
            auto_approve_trusted,
        }
    }

    /// List the comments the caller may see, in the requested projection.
    pub fn list(
        &self,
        caller: &Caller,
        params: &ListParams,
        projection: Projection,
    ) -> Result<Vec<CommentView>, CustomError> {
        let caps = policy::resolve(caller, None, None);

        // Edit context on a collection is a moderator-only request; it fails
        // for the whole listing rather than downgrading per item.
        if projection == Projection::Edit && !caps.can_moderate {
            return Err(CustomError::ForbiddenContext(
                "sorry, you are not allowed to view comments with edit context".into(),
            ));
        }

        let query = query::build(params, caps.can_moderate)?;
        let rows = self.store.query_comments(&query);

        let views = rows
            .into_iter()
            .filter(|c| self.store.find_post(c.post_id).is_some())
            .filter(|c| policy::is_visible(caller, c))
            .skip((query.page - 1) * query.per_page)
            .take(query.per_page)
            .map(|c| CommentView::project(&c, projection))
            .collect();

        Ok(views)
    }

    /// Fetch one comment. Existence is checked first, then the parent post
    /// reference, then the requested projection, then visibility.
    pub fn get(
        &self,
        caller: &Caller,
        id: u64,
        projection: Projection,
    ) -> Result<CommentView, CustomError> {
        let comment = self.store.find_comment(id).ok_or_else(|| {
            CustomError::CommentNotFound(format!("No comment found with id `{}`", id))
        })?;

        if self.store.find_post(comment.post_id).is_none() {
            return Err(CustomError::PostNotFound(format!(
                "No post found with id `{}`",
                comment.post_id
            )));
        }

        policy::ensure_projection(caller, Some(&comment), projection)?;

        if !policy::is_visible(caller, &comment) {
            return Err(CustomError::CannotRead(
                "sorry, you cannot read this comment".into(),
            ));
        }

        Ok(CommentView::project(&comment, projection))
    }

    /// Create a comment. All validation happens before anything is written.
    pub fn create(
        &self,
        caller: &Caller,
        req: &CreateCommentRequest,
        client_ip: &str,
        user_agent: &str,
    ) -> Result<CommentView, CustomError> {
        let post_id = req.post.ok_or_else(|| {
            CustomError::ValidationError("missing required parameter `post`".into())
        })?;

        let post = self.store.find_post(post_id).ok_or_else(|| {
            CustomError::PostNotFound(format!("No post found with id `{}`", post_id))
        })?;

        if !post.comments_open {
            return Err(CustomError::CommentsClosed(
                "sorry, comments are closed for this post".into(),
            ));
        }

        let caps = policy::resolve(caller, Some(&post), None);

        let author_id = self.resolve_author(caller, caps.can_moderate, req.author)?;

        // An explicit status on submission is a moderation action.
        let comment_status = match req.status.as_deref() {
            Some(raw) => {
                let wanted = CommentStatus::parse(raw)?;
                if !caps.can_moderate {
                    return Err(CustomError::ForbiddenStatusChange(
                        "sorry, you are not allowed to set the status of a new comment".into(),
                    ));
                }
                wanted
            }
            None => {
                let previously_approved = author_id
                    .map(|a| self.store.has_approved_comment_by(a))
                    .unwrap_or(false);
                status::initial_status(&caps, self.auto_approve_trusted, previously_approved)
            }
        };

        let content = validate_content(req.content.as_deref())?;
        let author_name = validate_author_name(req.author_name.as_deref())?;
        let author_email = req.author_email.clone().unwrap_or_default();
        validate_author_email(&author_email)?;
        let author_url = req.author_url.clone().unwrap_or_default();
        validate_author_url(&author_url)?;

        let parent_id = self.resolve_parent(post_id, req.parent)?;

        // An explicit date is honored verbatim as the stored instant.
        let date = parse_date(req.date.as_deref())?.unwrap_or_else(|| Utc::now().naive_utc());

        let comment = self.store.insert_comment(NewComment {
            post_id,
            parent_id,
            author_id,
            author_name,
            author_email,
            author_url,
            author_ip: client_ip.to_string(),
            author_user_agent: user_agent.to_string(),
            content,
            date,
            date_gmt: date,
            status: comment_status,
            karma: 0,
        });

        Ok(CommentView::project(&comment, Projection::View))
    }

    /// Apply a partial update. Everything is validated before the first
    /// write; the status change, when present, goes through the state
    /// machine last.
    pub fn update(
        &self,
        caller: &Caller,
        id: u64,
        req: &UpdateCommentRequest,
    ) -> Result<CommentView, CustomError> {
        let comment = self.store.find_comment(id).ok_or_else(|| {
            CustomError::CommentNotFound(format!("No comment found with id `{}`", id))
        })?;

        let caps = policy::resolve(caller, None, Some(&comment));

        if !caps.can_moderate && !caps.can_edit {
            return Err(CustomError::CannotEdit(
                "sorry, you are not allowed to edit this comment".into(),
            ));
        }

        if let Some(post) = req.post {
            if post != comment.post_id {
                return Err(CustomError::ValidationError(
                    "invalid value for parameter `post`: a comment cannot be moved to another post"
                        .into(),
                ));
            }
        }

        let mut updated = comment.clone();

        if let Some(author) = req.author {
            updated.author_id = self.resolve_author(caller, caps.can_moderate, Some(author))?;
        }

        if req.content.is_some() {
            updated.content = validate_content(req.content.as_deref())?;
        }

        if let Some(name) = req.author_name.as_deref() {
            updated.author_name = validate_author_name(Some(name))?;
        }

        if let Some(email) = req.author_email.as_deref() {
            validate_author_email(email)?;
            updated.author_email = email.to_string();
        }

        if let Some(url) = req.author_url.as_deref() {
            validate_author_url(url)?;
            updated.author_url = url.to_string();
        }

        if let Some(parent) = req.parent {
            updated.parent_id = self.resolve_parent(comment.post_id, Some(parent))?;
        }

        if let Some(date) = parse_date(req.date.as_deref())? {
            updated.date = date;
            updated.date_gmt = date;
        }

        let status_change = match req.status.as_deref() {
            Some(raw) => {
                let wanted = CommentStatus::parse(raw)?;
                status::authorize_transition(&caps, comment.status, wanted)?;
                Some(wanted)
            }
            None => None,
        };

        let saved = self.store.update_comment(&updated).ok_or_else(|| {
            CustomError::CommentNotFound(format!("No comment found with id `{}`", id))
        })?;

        let current = match status_change {
            Some(new_status) => self.store.apply_status_change(id, new_status)?,
            None => saved,
        };

        Ok(CommentView::project(&current, Projection::View))
    }

    /// Trash or permanently remove a comment. Trash goes through the state
    /// machine so the approved counter stays right; force skips the trash
    /// can entirely.
    pub fn delete(
        &self,
        caller: &Caller,
        id: u64,
        force: bool,
    ) -> Result<DeleteOutcome, CustomError> {
        let comment = self.store.find_comment(id).ok_or_else(|| {
            CustomError::CommentNotFound(format!("No comment found with id `{}`", id))
        })?;

        let caps = policy::resolve(caller, None, Some(&comment));

        if !caps.can_moderate && !caps.can_delete {
            return Err(CustomError::CannotEdit(
                "sorry, you are not allowed to delete this comment".into(),
            ));
        }

        if force {
            let removed = self.store.remove_comment(id).ok_or_else(|| {
                CustomError::CommentNotFound(format!("No comment found with id `{}`", id))
            })?;
            Ok(DeleteOutcome {
                deleted: true,
                comment: CommentView::project(&removed, Projection::View),
            })
        } else {
            let trashed = self.store.apply_status_change(id, CommentStatus::Trash)?;
            Ok(DeleteOutcome {
                deleted: false,
                comment: CommentView::project(&trashed, Projection::View),
            })
        }
    }

    /// Decide the stored author reference. Only moderators may attribute a
    /// comment to somebody else (or detach it to anonymous with `0`).
    fn resolve_author(
        &self,
        caller: &Caller,
        can_moderate: bool,
        requested: Option<u64>,
    ) -> Result<Option<u64>, CustomError> {
        match requested {
            None => Ok(caller.id()),
            Some(author) => {
                if !can_moderate && caller.id() != Some(author) {
                    return Err(CustomError::CannotEdit(
                        "sorry, you are not allowed to comment as another user".into(),
                    ));
                }
                if author == 0 {
                    return Ok(None);
                }
                if self.store.find_user(author).is_none() {
                    return Err(CustomError::ValidationError(format!(
                        "invalid value for parameter `author`: no user with id `{}`",
                        author
                    )));
                }
                Ok(Some(author))
            }
        }
    }

    /// A parent must be an existing comment on the same post. `0` means
    /// top-level.
    fn resolve_parent(
        &self,
        post_id: u64,
        requested: Option<u64>,
    ) -> Result<Option<u64>, CustomError> {
        match requested {
            None | Some(0) => Ok(None),
            Some(parent) => {
                let parent_comment = self.store.find_comment(parent).ok_or_else(|| {
                    CustomError::ValidationError(format!(
                        "invalid value for parameter `parent`: no comment with id `{}`",
                        parent
                    ))
                })?;
                if parent_comment.post_id != post_id {
                    return Err(CustomError::ValidationError(
                        "invalid value for parameter `parent`: comment belongs to another post"
                            .into(),
                    ));
                }
                Ok(Some(parent))
            }
        }
    }
}

fn validate_content(raw: Option<&str>) -> Result<String, CustomError> {
    let content = raw.unwrap_or("").trim().to_string();

    if content.is_empty() {
        return Err(CustomError::ValidationError(
            "missing required parameter `content`".into(),
        ));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `content`: too long".into(),
        ));
    }

    Ok(content)
}

fn validate_author_name(raw: Option<&str>) -> Result<String, CustomError> {
    let name = raw.unwrap_or("").trim().to_string();

    if name.len() > MAX_AUTHOR_NAME_LENGTH {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `author_name`: too long".into(),
        ));
    }

    Ok(name)
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDateTime>, CustomError> {
    match raw {
        None => Ok(None),
        Some(value) => NaiveDateTime::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                CustomError::ValidationError(format!(
                    "invalid value for parameter `date`: `{}`",
                    value
                ))
            }),
    }
}
