//! Daily requirement rollup for a commitment.
//!
//! A post counts toward today's requirements iff it is a check-in, authored
//! by the commitment owner, and created on the calendar date the caller
//! passes in. The fold is pure: no clock, no I/O.

use chrono::NaiveDate;
use uuid::Uuid;

use commit_types::models::{Post, PostKind, Requirement};
use commit_types::requirement::RequirementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentStatus {
    OnTrack,
    NeedsAttention,
    NoRequirements,
}

impl CommitmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnTrack => "On track",
            Self::NeedsAttention => "Needs attention",
            Self::NoRequirements => "No requirements yet",
        }
    }
}

/// One pass/fail line per requirement, in the order the requirements were
/// supplied.
#[derive(Debug, Clone)]
pub struct RequirementOutcome {
    pub requirement_id: Uuid,
    pub label: String,
    pub passed: bool,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub status: CommitmentStatus,
    pub outcomes: Vec<RequirementOutcome>,
}

pub fn evaluate(
    owner_id: Uuid,
    requirements: &[Requirement],
    posts: &[Post],
    today: NaiveDate,
) -> StatusReport {
    if requirements.is_empty() {
        return StatusReport {
            status: CommitmentStatus::NoRequirements,
            outcomes: Vec::new(),
        };
    }

    let counting: Vec<&Post> = posts
        .iter()
        .filter(|p| {
            p.kind == PostKind::CheckIn
                && p.author_user_id == owner_id
                && p.created_at.date_naive() == today
        })
        .collect();

    let outcomes: Vec<RequirementOutcome> = requirements
        .iter()
        .map(|req| outcome_for(req, &counting))
        .collect();

    let status = if outcomes.iter().all(|o| o.passed) {
        CommitmentStatus::OnTrack
    } else {
        CommitmentStatus::NeedsAttention
    };

    StatusReport { status, outcomes }
}

fn outcome_for(req: &Requirement, counting: &[&Post]) -> RequirementOutcome {
    let Some(kind) = &req.kind else {
        // Broken rows stay visible to the owner instead of silently passing.
        return RequirementOutcome {
            requirement_id: req.id,
            label: format!("Unrecognized requirement \"{}\"", req.type_name),
            passed: false,
            note: "This requirement could not be read.".to_string(),
        };
    };

    let (passed, note) = match kind {
        RequirementKind::PostFrequency { count } => {
            let have = counting.len() as u32;
            (
                have >= *count,
                format!("{} of {} check-ins today", have, count),
            )
        }
        RequirementKind::TextUpdate => {
            let passed = counting.iter().any(|p| !p.body_text.trim().is_empty());
            let note = if passed {
                "Written update posted".to_string()
            } else {
                "No written update yet".to_string()
            };
            (passed, note)
        }
        RequirementKind::ImageRequired => {
            let passed = counting.iter().any(|p| !p.image_url.trim().is_empty());
            let note = if passed {
                "Photo attached".to_string()
            } else {
                "No photo yet".to_string()
            };
            (passed, note)
        }
    };

    RequirementOutcome {
        requirement_id: req.id,
        label: kind.label(),
        passed,
        note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn owner() -> Uuid {
        Uuid::from_u128(1)
    }

    fn requirement(kind: RequirementKind) -> Requirement {
        Requirement {
            id: Uuid::new_v4(),
            type_name: kind.type_str().to_string(),
            kind: Some(kind),
        }
    }

    fn post(author: Uuid, kind: PostKind, body: &str, image: &str, date: NaiveDate) -> Post {
        let created_at = Utc
            .from_utc_datetime(&date.and_hms_opt(9, 30, 0).unwrap());
        Post {
            id: Uuid::new_v4(),
            author_user_id: author,
            kind,
            body_text: body.to_string(),
            image_url: image.to_string(),
            created_at,
        }
    }

    fn check_in(body: &str, image: &str) -> Post {
        post(owner(), PostKind::CheckIn, body, image, day())
    }

    #[test]
    fn test_no_requirements_is_neutral() {
        let report = evaluate(owner(), &[], &[check_in("hi", "")], day());
        assert_eq!(report.status, CommitmentStatus::NoRequirements);
        assert_eq!(report.status.label(), "No requirements yet");
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_post_frequency_short_falls_behind() {
        let reqs = vec![requirement(RequirementKind::PostFrequency { count: 2 })];
        let report = evaluate(owner(), &reqs, &[check_in("one", "")], day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
        assert_eq!(report.status.label(), "Needs attention");
        assert!(!report.outcomes[0].passed);
        assert_eq!(report.outcomes[0].note, "1 of 2 check-ins today");
    }

    #[test]
    fn test_post_frequency_met_is_on_track() {
        let reqs = vec![requirement(RequirementKind::PostFrequency { count: 2 })];
        let posts = vec![check_in("one", ""), check_in("two", "")];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::OnTrack);
        assert_eq!(report.status.label(), "On track");
        assert!(report.outcomes[0].passed);
    }

    #[test]
    fn test_text_update_needs_non_empty_body() {
        let reqs = vec![requirement(RequirementKind::TextUpdate)];

        let report = evaluate(owner(), &reqs, &[check_in("", "")], day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);

        // Whitespace-only bodies don't count either.
        let report = evaluate(owner(), &reqs, &[check_in("   ", "")], day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);

        let report = evaluate(owner(), &reqs, &[check_in("wrote 500 words", "")], day());
        assert_eq!(report.status, CommitmentStatus::OnTrack);
    }

    #[test]
    fn test_image_required_needs_non_empty_url() {
        let reqs = vec![requirement(RequirementKind::ImageRequired)];

        let report = evaluate(owner(), &reqs, &[check_in("text only", "")], day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);

        let posts = vec![check_in("", "https://example.com/p.jpg")];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::OnTrack);
    }

    #[test]
    fn test_comments_never_count() {
        let reqs = vec![requirement(RequirementKind::PostFrequency { count: 1 })];
        let posts = vec![post(owner(), PostKind::Comment, "nice going", "", day())];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
    }

    #[test]
    fn test_other_authors_never_count() {
        let reqs = vec![requirement(RequirementKind::PostFrequency { count: 1 })];
        let stranger = Uuid::from_u128(2);
        let posts = vec![post(stranger, PostKind::CheckIn, "covering for you", "", day())];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
    }

    #[test]
    fn test_previous_days_never_count() {
        let reqs = vec![requirement(RequirementKind::TextUpdate)];
        let yesterday = day().pred_opt().unwrap();
        let posts = vec![post(owner(), PostKind::CheckIn, "yesterday's entry", "", yesterday)];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
    }

    #[test]
    fn test_all_requirements_must_pass() {
        let reqs = vec![
            requirement(RequirementKind::PostFrequency { count: 1 }),
            requirement(RequirementKind::TextUpdate),
            requirement(RequirementKind::ImageRequired),
        ];
        let posts = vec![check_in("progress update", "")];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
        let passed: Vec<bool> = report.outcomes.iter().map(|o| o.passed).collect();
        assert_eq!(passed, vec![true, true, false]);

        let posts = vec![check_in("progress update", "https://example.com/p.jpg")];
        let report = evaluate(owner(), &reqs, &posts, day());
        assert_eq!(report.status, CommitmentStatus::OnTrack);
    }

    #[test]
    fn test_unrecognized_requirement_fails_visibly() {
        let reqs = vec![Requirement {
            id: Uuid::new_v4(),
            type_name: "step_count".to_string(),
            kind: None,
        }];
        let report = evaluate(owner(), &reqs, &[check_in("hi", "")], day());
        assert_eq!(report.status, CommitmentStatus::NeedsAttention);
        assert!(report.outcomes[0].label.contains("step_count"));
    }
}
