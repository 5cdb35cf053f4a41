use crate::comment::model::Comment;
use crate::comment::status::CommentStatus;
use crate::post::post_model::Post;
use crate::user::model::Caller;
use crate::utils::error::CustomError;

/// Capabilities a caller holds towards a target post/comment. Resolution is
/// total and side-effect-free; every handler derives its authorization
/// decisions from this one place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub can_read_public: bool,
    pub can_read_private: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_moderate: bool,
    pub can_delete: bool,
}

impl CapabilitySet {
    pub fn full() -> Self {
        CapabilitySet {
            can_read_public: true,
            can_read_private: true,
            can_create: true,
            can_edit: true,
            can_moderate: true,
            can_delete: true,
        }
    }
}

/// Derive the caller's capability set. Administrators get everything;
/// other callers act only on comments they authored, and may create
/// comments only where the target post accepts them.
pub fn resolve(caller: &Caller, post: Option<&Post>, comment: Option<&Comment>) -> CapabilitySet {
    if caller.is_administrator() {
        return CapabilitySet::full();
    }

    let owns = comment.is_some_and(|c| caller.owns(c.author_id));

    CapabilitySet {
        can_read_public: true,
        can_read_private: owns,
        can_create: post.is_some_and(|p| p.comments_open),
        can_edit: owns,
        can_moderate: false,
        can_delete: owns,
    }
}

/// The shape of the comment fields returned to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    View,
    Edit,
}

impl Projection {
    pub fn parse(raw: Option<&str>) -> Result<Projection, CustomError> {
        match raw {
            None | Some("") | Some("view") => Ok(Projection::View),
            Some("edit") => Ok(Projection::Edit),
            Some(other) => Err(CustomError::ValidationError(format!(
                "invalid value for parameter `context`: `{}`",
                other
            ))),
        }
    }
}

/// The edit projection exposes moderation metadata and raw content, so it is
/// reserved for moderators and, on a specific comment, its author. There is
/// no silent downgrade; an unentitled request is an error.
pub fn ensure_projection(
    caller: &Caller,
    comment: Option<&Comment>,
    projection: Projection,
) -> Result<(), CustomError> {
    if projection == Projection::View {
        return Ok(());
    }

    let caps = resolve(caller, None, comment);
    if caps.can_moderate || caps.can_read_private {
        Ok(())
    } else {
        Err(CustomError::ForbiddenContext(
            "sorry, you are not allowed to view comments with edit context".into(),
        ))
    }
}

/// Whether the caller may see the comment at all. Approved comments are
/// public; anything else is reserved for moderators and the author.
pub fn is_visible(caller: &Caller, comment: &Comment) -> bool {
    if comment.status == CommentStatus::Approved {
        return true;
    }

    let caps = resolve(caller, None, Some(comment));
    caps.can_moderate || caps.can_read_private
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::model::Role;
    use chrono::NaiveDate;

    fn comment_by(author_id: Option<u64>, status: CommentStatus) -> Comment {
        let date = NaiveDate::from_ymd_opt(2015, 3, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Comment {
            id: 1,
            post_id: 1,
            parent_id: None,
            author_id,
            author_name: "Lisa".into(),
            author_email: "lisa@example.com".into(),
            author_url: String::new(),
            author_ip: "127.0.0.1".into(),
            author_user_agent: String::new(),
            content: "First!".into(),
            date,
            date_gmt: date,
            status,
            karma: 0,
        }
    }

    fn open_post() -> Post {
        Post {
            id: 1,
            title: "Hello".into(),
            content: String::new(),
            author_id: 1,
            comments_open: true,
            comment_count: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn administrator_gets_the_full_set_unconditionally() {
        let admin = Caller::User { id: 1, role: Role::Administrator };
        assert_eq!(resolve(&admin, None, None), CapabilitySet::full());
    }

    #[test]
    fn author_gets_private_capabilities_on_own_comment() {
        let caller = Caller::User { id: 7, role: Role::Subscriber };
        let caps = resolve(&caller, None, Some(&comment_by(Some(7), CommentStatus::Hold)));
        assert!(caps.can_read_private && caps.can_edit && caps.can_delete);
        assert!(!caps.can_moderate);
    }

    #[test]
    fn subscriber_has_no_private_capabilities_on_foreign_comment() {
        let caller = Caller::User { id: 7, role: Role::Subscriber };
        let caps = resolve(&caller, None, Some(&comment_by(Some(8), CommentStatus::Hold)));
        assert!(!caps.can_read_private && !caps.can_edit && !caps.can_delete);
    }

    #[test]
    fn anonymous_never_owns_an_anonymous_comment() {
        let caps = resolve(
            &Caller::Anonymous,
            None,
            Some(&comment_by(None, CommentStatus::Hold)),
        );
        assert!(!caps.can_read_private);
    }

    #[test]
    fn create_follows_the_post_comment_policy() {
        let caller = Caller::Anonymous;
        let mut post = open_post();
        assert!(resolve(&caller, Some(&post), None).can_create);
        post.comments_open = false;
        assert!(!resolve(&caller, Some(&post), None).can_create);
    }

    #[test]
    fn approved_comments_are_visible_to_everyone() {
        assert!(is_visible(
            &Caller::Anonymous,
            &comment_by(Some(8), CommentStatus::Approved)
        ));
    }

    #[test]
    fn held_comments_are_visible_only_to_author_and_moderators() {
        let comment = comment_by(Some(7), CommentStatus::Hold);
        assert!(!is_visible(&Caller::Anonymous, &comment));
        assert!(!is_visible(
            &Caller::User { id: 8, role: Role::Subscriber },
            &comment
        ));
        assert!(is_visible(
            &Caller::User { id: 7, role: Role::Subscriber },
            &comment
        ));
        assert!(is_visible(
            &Caller::User { id: 9, role: Role::Administrator },
            &comment
        ));
    }

    #[test]
    fn edit_projection_requires_entitlement() {
        let comment = comment_by(Some(7), CommentStatus::Approved);
        let err = ensure_projection(&Caller::Anonymous, Some(&comment), Projection::Edit)
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN_CONTEXT");

        assert!(
            ensure_projection(
                &Caller::User { id: 7, role: Role::Subscriber },
                Some(&comment),
                Projection::Edit
            )
            .is_ok()
        );
    }

    #[test]
    fn view_projection_is_always_permitted() {
        assert!(ensure_projection(&Caller::Anonymous, None, Projection::View).is_ok());
    }

    #[test]
    fn context_parameter_is_validated() {
        assert_eq!(Projection::parse(None).unwrap(), Projection::View);
        assert_eq!(Projection::parse(Some("view")).unwrap(), Projection::View);
        assert_eq!(Projection::parse(Some("edit")).unwrap(), Projection::Edit);
        let err = Projection::parse(Some("embed")).unwrap_err();
        assert!(err.to_string().contains("`context`"));
    }
}
