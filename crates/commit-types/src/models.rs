use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::requirement::RequirementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    CheckIn,
    Comment,
}

impl PostKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "check_in" => Some(Self::CheckIn),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::Comment => "comment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CheckIn => "Check-in",
            Self::Comment => "Comment",
        }
    }
}

/// A post as the evaluator sees it. Display pages work with DB rows directly;
/// this typed form exists for the daily status rollup.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub author_user_id: Uuid,
    pub kind: PostKind,
    pub body_text: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// A requirement attached to a commitment. `kind` is None when the stored
/// type or params fail to parse; the raw type string is kept for display.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub id: Uuid,
    pub type_name: String,
    pub kind: Option<RequirementKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_kind_round_trip() {
        assert_eq!(PostKind::parse("check_in"), Some(PostKind::CheckIn));
        assert_eq!(PostKind::parse("comment"), Some(PostKind::Comment));
        assert_eq!(PostKind::parse("like"), None);
        assert_eq!(PostKind::CheckIn.as_str(), "check_in");
        assert_eq!(PostKind::Comment.as_str(), "comment");
    }
}
