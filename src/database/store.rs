use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::comment::model::{Comment, NewComment};
use crate::comment::query::{CommentQuery, Order, OrderBy};
use crate::comment::status::{self, CommentStatus};
use crate::post::post_model::Post;
use crate::user::model::{Role, User};
use crate::utils::error::CustomError;

/// In-memory datastore backing the API. All mutations go through a single
/// lock, so a status transition and its counter adjustment are one atomic
/// unit with respect to concurrent requests.
pub struct DataStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<u64, User>,
    posts: BTreeMap<u64, Post>,
    comments: BTreeMap<u64, Comment>,
    next_user_id: u64,
    next_post_id: u64,
    next_comment_id: u64,
}

impl DataStore {
    pub fn new() -> Self {
        DataStore {
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_user(&self, username: &str, email: &str, role: Role) -> User {
        let mut inner = self.write();
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        user
    }

    pub fn find_user(&self, id: u64) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn insert_post(
        &self,
        title: &str,
        content: &str,
        author_id: u64,
        comments_open: bool,
    ) -> Post {
        let mut inner = self.write();
        inner.next_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: inner.next_post_id,
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            comments_open,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.posts.insert(post.id, post.clone());
        post
    }

    pub fn find_post(&self, id: u64) -> Option<Post> {
        self.read().posts.get(&id).cloned()
    }

    /// Remove a post. Its comments keep their post reference; the dangling
    /// reference is what the visibility policy filters on.
    pub fn delete_post(&self, id: u64) -> bool {
        self.write().posts.remove(&id).is_some()
    }

    pub fn insert_comment(&self, new: NewComment) -> Comment {
        let mut inner = self.write();
        inner.next_comment_id += 1;
        let comment = Comment {
            id: inner.next_comment_id,
            post_id: new.post_id,
            parent_id: new.parent_id,
            author_id: new.author_id,
            author_name: new.author_name,
            author_email: new.author_email,
            author_url: new.author_url,
            author_ip: new.author_ip,
            author_user_agent: new.author_user_agent,
            content: new.content,
            date: new.date,
            date_gmt: new.date_gmt,
            status: new.status,
            karma: new.karma,
        };

        if comment.status == CommentStatus::Approved {
            if let Some(post) = inner.posts.get_mut(&comment.post_id) {
                post.comment_count += 1;
            }
        }

        inner.comments.insert(comment.id, comment.clone());
        comment
    }

    pub fn find_comment(&self, id: u64) -> Option<Comment> {
        self.read().comments.get(&id).cloned()
    }

    /// Replace a comment's fields. The stored status is preserved; status
    /// belongs to [`DataStore::apply_status_change`] so the approved counter
    /// stays consistent.
    pub fn update_comment(&self, updated: &Comment) -> Option<Comment> {
        let mut inner = self.write();
        let slot = inner.comments.get_mut(&updated.id)?;
        let status = slot.status;
        *slot = updated.clone();
        slot.status = status;
        Some(slot.clone())
    }

    /// Move a comment to a new status and adjust the parent post's approved
    /// counter in the same critical section.
    pub fn apply_status_change(
        &self,
        id: u64,
        new_status: CommentStatus,
    ) -> Result<Comment, CustomError> {
        let mut inner = self.write();

        let (old_status, post_id) = match inner.comments.get(&id) {
            Some(comment) => (comment.status, comment.post_id),
            None => {
                return Err(CustomError::CommentNotFound(format!(
                    "No comment found with id `{}`",
                    id
                )));
            }
        };

        let delta = status::approved_delta(old_status, new_status);

        if delta != 0 {
            if let Some(post) = inner.posts.get_mut(&post_id) {
                post.comment_count += delta;
            }
        }

        let comment = inner
            .comments
            .get_mut(&id)
            .ok_or_else(|| CustomError::InternalServerError("comment vanished mid-update".into()))?;
        comment.status = new_status;
        Ok(comment.clone())
    }

    /// Permanently remove a comment, adjusting the approved counter when it
    /// was publicly counted.
    pub fn remove_comment(&self, id: u64) -> Option<Comment> {
        let mut inner = self.write();
        let comment = inner.comments.remove(&id)?;

        if comment.status == CommentStatus::Approved {
            if let Some(post) = inner.posts.get_mut(&comment.post_id) {
                post.comment_count -= 1;
            }
        }

        Some(comment)
    }

    pub fn has_approved_comment_by(&self, author_id: u64) -> bool {
        self.read().comments.values().any(|c| {
            c.author_id == Some(author_id) && c.status == CommentStatus::Approved
        })
    }

    /// Run a validated query. Filtering and ordering happen here; pagination
    /// is left to the caller since visibility trimming happens after.
    pub fn query_comments(&self, query: &CommentQuery) -> Vec<Comment> {
        let inner = self.read();

        let needle = query.search.as_deref().map(str::to_lowercase);

        let mut rows: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| query.post.is_none_or(|p| c.post_id == p))
            .filter(|c| query.status.is_none_or(|s| c.status == s))
            .filter(|c| match query.author {
                None => true,
                Some(0) => c.author_id.is_none(),
                Some(a) => c.author_id == Some(a),
            })
            .filter(|c| {
                needle
                    .as_deref()
                    .is_none_or(|n| c.content.to_lowercase().contains(n))
            })
            .cloned()
            .collect();

        match query.orderby {
            OrderBy::Date => rows.sort_by_key(|c| (c.date, c.id)),
            OrderBy::Id => rows.sort_by_key(|c| c.id),
        }

        if query.order == Order::Desc {
            rows.reverse();
        }

        rows
    }
}

impl Default for DataStore {
    fn default() -> Self {
        DataStore::new()
    }
}
