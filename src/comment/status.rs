use serde::{Deserialize, Serialize};

use crate::comment::policy::CapabilitySet;
use crate::utils::error::CustomError;

/// Approval lifecycle of a comment. `Trash` is a reversible soft-delete;
/// permanent removal is a separate store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Hold,
    Approved,
    Spam,
    Trash,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Hold => "hold",
            CommentStatus::Approved => "approved",
            CommentStatus::Spam => "spam",
            CommentStatus::Trash => "trash",
        }
    }

    /// Parse a requested status. Accepts the canonical names plus the
    /// historical aliases: `approve`, and the numeric approval flags
    /// `1`/`0`. Only the canonical names are ever serialized back out.
    pub fn parse(raw: &str) -> Result<CommentStatus, CustomError> {
        match raw {
            "approved" | "approve" | "1" => Ok(CommentStatus::Approved),
            "hold" | "unapproved" | "0" => Ok(CommentStatus::Hold),
            "spam" => Ok(CommentStatus::Spam),
            "trash" => Ok(CommentStatus::Trash),
            other => Err(CustomError::ValidationError(format!(
                "invalid value for parameter `status`: `{}`",
                other
            ))),
        }
    }
}

/// Status of a freshly submitted comment. Moderators publish directly;
/// everyone else lands in the moderation queue unless the trusted-author
/// policy is enabled and the author already has an approved comment.
pub fn initial_status(
    caps: &CapabilitySet,
    auto_approve_trusted: bool,
    author_previously_approved: bool,
) -> CommentStatus {
    if caps.can_moderate || (auto_approve_trusted && author_previously_approved) {
        CommentStatus::Approved
    } else {
        CommentStatus::Hold
    }
}

/// Authorize a commanded transition. Setting the current status again is a
/// no-op and allowed for anyone; an actual change is a moderation action.
pub fn authorize_transition(
    caps: &CapabilitySet,
    from: CommentStatus,
    to: CommentStatus,
) -> Result<(), CustomError> {
    if from == to || caps.can_moderate {
        Ok(())
    } else {
        Err(CustomError::ForbiddenStatusChange(
            "sorry, you are not allowed to change the status of this comment".into(),
        ))
    }
}

/// Adjustment to the parent post's approved-comment counter when a comment
/// moves between statuses.
pub fn approved_delta(from: CommentStatus, to: CommentStatus) -> i64 {
    match (from == CommentStatus::Approved, to == CommentStatus::Approved) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_and_aliases() {
        assert_eq!(CommentStatus::parse("approved").unwrap(), CommentStatus::Approved);
        assert_eq!(CommentStatus::parse("approve").unwrap(), CommentStatus::Approved);
        assert_eq!(CommentStatus::parse("1").unwrap(), CommentStatus::Approved);
        assert_eq!(CommentStatus::parse("hold").unwrap(), CommentStatus::Hold);
        assert_eq!(CommentStatus::parse("0").unwrap(), CommentStatus::Hold);
        assert_eq!(CommentStatus::parse("spam").unwrap(), CommentStatus::Spam);
        assert_eq!(CommentStatus::parse("trash").unwrap(), CommentStatus::Trash);
    }

    #[test]
    fn rejects_unknown_status_naming_the_parameter() {
        let err = CommentStatus::parse("published").unwrap_err();
        assert!(err.to_string().contains("`status`"));
    }

    #[test]
    fn moderator_submissions_are_approved_immediately() {
        let moderator = CapabilitySet::full();
        assert_eq!(
            initial_status(&moderator, false, false),
            CommentStatus::Approved
        );
    }

    #[test]
    fn anonymous_submissions_are_held() {
        let caps = CapabilitySet::default();
        assert_eq!(initial_status(&caps, false, false), CommentStatus::Hold);
    }

    #[test]
    fn trusted_author_bypasses_hold_only_when_enabled() {
        let caps = CapabilitySet::default();
        assert_eq!(initial_status(&caps, true, true), CommentStatus::Approved);
        assert_eq!(initial_status(&caps, true, false), CommentStatus::Hold);
        assert_eq!(initial_status(&caps, false, true), CommentStatus::Hold);
    }

    #[test]
    fn moderator_may_command_any_transition() {
        let moderator = CapabilitySet::full();
        for from in [
            CommentStatus::Hold,
            CommentStatus::Approved,
            CommentStatus::Spam,
            CommentStatus::Trash,
        ] {
            for to in [
                CommentStatus::Hold,
                CommentStatus::Approved,
                CommentStatus::Spam,
                CommentStatus::Trash,
            ] {
                assert!(authorize_transition(&moderator, from, to).is_ok());
            }
        }
    }

    #[test]
    fn non_moderator_change_is_rejected_but_same_status_is_a_noop() {
        let caps = CapabilitySet::default();
        assert!(authorize_transition(&caps, CommentStatus::Hold, CommentStatus::Hold).is_ok());
        let err =
            authorize_transition(&caps, CommentStatus::Hold, CommentStatus::Approved).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN_STATUS_CHANGE");
    }

    #[test]
    fn counter_delta_tracks_approved_membership() {
        assert_eq!(approved_delta(CommentStatus::Hold, CommentStatus::Approved), 1);
        assert_eq!(approved_delta(CommentStatus::Approved, CommentStatus::Trash), -1);
        assert_eq!(approved_delta(CommentStatus::Hold, CommentStatus::Spam), 0);
        assert_eq!(approved_delta(CommentStatus::Approved, CommentStatus::Approved), 0);
    }

    #[test]
    fn approve_round_trip_nets_to_zero() {
        let there = approved_delta(CommentStatus::Hold, CommentStatus::Approved);
        let back = approved_delta(CommentStatus::Approved, CommentStatus::Hold);
        assert_eq!(there + back, 0);
    }
}
