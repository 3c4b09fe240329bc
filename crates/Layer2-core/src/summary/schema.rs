//! Summary schema and result shape

use serde::{Deserialize, Serialize};

// ============================================================================
// Summary Schema
// ============================================================================

/// Which summary fields to populate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySchema {
    #[serde(default)]
    pub modified_files: bool,
    #[serde(default)]
    pub user_goal: bool,
    #[serde(default)]
    pub last_stop_point: bool,
    #[serde(default)]
    pub key_decisions: bool,
    #[serde(default)]
    pub unresolved_issues: bool,
    #[serde(default)]
    pub next_steps: bool,
}

impl SummarySchema {
    /// Every field requested
    pub fn all() -> Self {
        Self {
            modified_files: true,
            user_goal: true,
            last_stop_point: true,
            key_decisions: true,
            unresolved_issues: true,
            next_steps: true,
        }
    }

    /// No field requested
    pub fn none() -> Self {
        Self {
            modified_files: false,
            user_goal: false,
            last_stop_point: false,
            key_decisions: false,
            unresolved_issues: false,
            next_steps: false,
        }
    }

    pub fn with_modified_files(mut self, on: bool) -> Self {
        self.modified_files = on;
        self
    }

    pub fn with_user_goal(mut self, on: bool) -> Self {
        self.user_goal = on;
        self
    }

    pub fn with_last_stop_point(mut self, on: bool) -> Self {
        self.last_stop_point = on;
        self
    }

    pub fn with_key_decisions(mut self, on: bool) -> Self {
        self.key_decisions = on;
        self
    }

    pub fn with_unresolved_issues(mut self, on: bool) -> Self {
        self.unresolved_issues = on;
        self
    }

    pub fn with_next_steps(mut self, on: bool) -> Self {
        self.next_steps = on;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    /// Requested field names, in summary field order
    pub fn requested_fields(&self) -> Vec<&'static str> {
        [
            (self.modified_files, "modifiedFiles"),
            (self.user_goal, "userGoal"),
            (self.last_stop_point, "lastStopPoint"),
            (self.key_decisions, "keyDecisions"),
            (self.unresolved_issues, "unresolvedIssues"),
            (self.next_steps, "nextSteps"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

impl Default for SummarySchema {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// Conversation Summary
// ============================================================================

/// Structured snapshot of the conversation
///
/// All six fields are always present; fields the schema did not request stay
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(default)]
    pub modified_files: Vec<String>,
    #[serde(default)]
    pub user_goal: String,
    #[serde(default)]
    pub last_stop_point: String,
    #[serde(default)]
    pub key_decisions: Vec<String>,
    #[serde(default)]
    pub unresolved_issues: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl ConversationSummary {
    /// Clear every field the schema did not request
    pub fn masked(mut self, schema: &SummarySchema) -> Self {
        if !schema.modified_files {
            self.modified_files.clear();
        }
        if !schema.user_goal {
            self.user_goal.clear();
        }
        if !schema.last_stop_point {
            self.last_stop_point.clear();
        }
        if !schema.key_decisions {
            self.key_decisions.clear();
        }
        if !schema.unresolved_issues {
            self.unresolved_issues.clear();
        }
        if !schema.next_steps {
            self.next_steps.clear();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Markdown rendering for prompt injection
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("## Conversation Summary\n");

        if !self.user_goal.is_empty() {
            out.push_str(&format!("\n**Goal:** {}\n", self.user_goal));
        }
        if !self.last_stop_point.is_empty() {
            out.push_str(&format!("\n**Stopped at:** {}\n", self.last_stop_point));
        }

        for (title, items) in [
            ("Modified files", &self.modified_files),
            ("Key decisions", &self.key_decisions),
            ("Unresolved issues", &self.unresolved_issues),
            ("Next steps", &self.next_steps),
        ] {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("\n### {}\n", title));
            for item in items {
                out.push_str(&format!("- {}\n", item));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> ConversationSummary {
        ConversationSummary {
            modified_files: vec!["a.rs".into()],
            user_goal: "goal".into(),
            last_stop_point: "stop".into(),
            key_decisions: vec!["d".into()],
            unresolved_issues: vec!["i".into()],
            next_steps: vec!["n".into()],
        }
    }

    #[test]
    fn test_mask_none_empties_everything() {
        let masked = full().masked(&SummarySchema::none());
        assert!(masked.is_empty());
    }

    #[test]
    fn test_mask_partial() {
        let schema = SummarySchema::none().with_user_goal(true).with_next_steps(true);
        let masked = full().masked(&schema);

        assert_eq!(masked.user_goal, "goal");
        assert_eq!(masked.next_steps, vec!["n"]);
        assert!(masked.modified_files.is_empty());
        assert!(masked.last_stop_point.is_empty());
    }

    #[test]
    fn test_empty_summary_serializes_every_field() {
        let value = serde_json::to_value(ConversationSummary::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        assert_eq!(obj["userGoal"], "");
        assert_eq!(obj["nextSteps"], serde_json::json!([]));
    }

    #[test]
    fn test_requested_fields() {
        assert_eq!(SummarySchema::all().requested_fields().len(), 6);
        assert!(SummarySchema::none().requested_fields().is_empty());
        assert!(SummarySchema::none().is_empty());
        assert_eq!(
            SummarySchema::none().with_key_decisions(true).requested_fields(),
            vec!["keyDecisions"]
        );
    }

    #[test]
    fn test_markdown_skips_empty_sections() {
        let md = ConversationSummary {
            user_goal: "ship it".into(),
            ..Default::default()
        }
        .to_markdown();

        assert!(md.contains("**Goal:** ship it"));
        assert!(!md.contains("### Next steps"));
    }
}
