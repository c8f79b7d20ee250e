use serde::Deserialize;

/// The three requirement kinds a commitment can carry. Stored in SQLite as a
/// type string plus a JSON params column (`{"count": N}` for post_frequency,
/// `{}` for the rest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementKind {
    PostFrequency { count: u32 },
    TextUpdate,
    ImageRequired,
}

#[derive(Debug, Deserialize)]
struct FrequencyParams {
    #[serde(default = "default_count")]
    count: u32,
}

fn default_count() -> u32 {
    1
}

impl RequirementKind {
    /// Parse the stored (type, params) pair. Returns None for unknown types;
    /// a missing or unparsable `count` falls back to 1.
    pub fn parse(type_name: &str, params: &str) -> Option<Self> {
        match type_name {
            "post_frequency" => {
                let parsed: FrequencyParams = serde_json::from_str(params)
                    .unwrap_or(FrequencyParams { count: default_count() });
                Some(Self::PostFrequency { count: parsed.count })
            }
            "text_update" => Some(Self::TextUpdate),
            "image_required" => Some(Self::ImageRequired),
            _ => None,
        }
    }

    pub fn type_str(&self) -> &'static str {
        match self {
            Self::PostFrequency { .. } => "post_frequency",
            Self::TextUpdate => "text_update",
            Self::ImageRequired => "image_required",
        }
    }

    pub fn params_json(&self) -> String {
        match self {
            Self::PostFrequency { count } => serde_json::json!({ "count": count }).to_string(),
            Self::TextUpdate | Self::ImageRequired => "{}".to_string(),
        }
    }

    /// Short human label shown on the commitment detail page.
    pub fn label(&self) -> String {
        match self {
            Self::PostFrequency { count: 1 } => "At least 1 check-in today".to_string(),
            Self::PostFrequency { count } => format!("At least {} check-ins today", count),
            Self::TextUpdate => "A written update today".to_string(),
            Self::ImageRequired => "A photo attached today".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_frequency() {
        assert_eq!(
            RequirementKind::parse("post_frequency", r#"{"count": 3}"#),
            Some(RequirementKind::PostFrequency { count: 3 })
        );
    }

    #[test]
    fn test_parse_post_frequency_defaults_to_one() {
        // Missing count, empty object, and garbage all fall back to 1.
        assert_eq!(
            RequirementKind::parse("post_frequency", "{}"),
            Some(RequirementKind::PostFrequency { count: 1 })
        );
        assert_eq!(
            RequirementKind::parse("post_frequency", "not json"),
            Some(RequirementKind::PostFrequency { count: 1 })
        );
    }

    #[test]
    fn test_parse_simple_kinds_ignore_params() {
        assert_eq!(
            RequirementKind::parse("text_update", "{}"),
            Some(RequirementKind::TextUpdate)
        );
        assert_eq!(
            RequirementKind::parse("image_required", r#"{"count": 9}"#),
            Some(RequirementKind::ImageRequired)
        );
    }

    #[test]
    fn test_parse_unknown_type() {
        assert_eq!(RequirementKind::parse("step_count", "{}"), None);
    }

    #[test]
    fn test_params_round_trip() {
        let kind = RequirementKind::PostFrequency { count: 2 };
        let reparsed = RequirementKind::parse(kind.type_str(), &kind.params_json());
        assert_eq!(reparsed, Some(kind));
    }
}
