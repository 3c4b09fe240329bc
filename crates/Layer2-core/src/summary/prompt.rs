//! Prompt-driven summary strategy
//!
//! 요청된 필드만 묻는 프롬프트를 만들어 `SummaryBackend`(보통 LLM)에 보내고,
//! 응답에서 JSON 객체를 추출해 `ConversationSummary`로 파싱합니다.

use async_trait::async_trait;
use keel_foundation::{CharEstimator, Error, Result, Tokenizer};
use serde::Deserialize;
use std::sync::Arc;

use super::engine::SummaryStrategy;
use super::schema::{ConversationSummary, SummarySchema};
use crate::context::ConversationContext;

/// Text completion backend
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub const DEFAULT_MESSAGE_BUDGET: usize = 500;

/// Summarizer that delegates generation to a completion backend
pub struct PromptSummarizer<B: SummaryBackend> {
    backend: B,
    tokenizer: Arc<dyn Tokenizer>,
    /// Per-message token cap inside the transcript
    message_budget: usize,
}

impl<B: SummaryBackend> PromptSummarizer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tokenizer: Arc::new(CharEstimator::new()),
            message_budget: DEFAULT_MESSAGE_BUDGET,
        }
    }

    /// Estimator used to cap transcript entries (use the manager's)
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_message_budget(mut self, tokens: usize) -> Self {
        self.message_budget = tokens;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the summarization prompt
    ///
    /// Only the fields requested by `schema` are described.
    pub fn build_prompt(&self, context: &ConversationContext, schema: &SummarySchema) -> String {
        let mut transcript = String::new();
        for msg in &context.messages {
            let head = self.tokenizer.fit(&msg.content, self.message_budget);
            let cut = if head.len() < msg.content.len() { " [...]" } else { "" };
            transcript.push_str(&format!("[{}]: {}{}\n\n", msg.role, head, cut));
        }

        // 압축으로 사라진 내용은 이전 요약에만 남아 있음
        let previous = context
            .summary
            .as_ref()
            .filter(|summary| !summary.is_empty())
            .map(|summary| format!("---\nPREVIOUS SUMMARY:\n{}\n", summary.to_markdown()))
            .unwrap_or_default();

        let mut tool_lines = String::new();
        for call in &context.tool_calls {
            tool_lines.push_str(&format!(
                "- {} {}{}\n",
                call.name,
                call.arguments,
                if call.is_error { " (failed)" } else { "" }
            ));
        }

        let mut fields = String::new();
        for name in schema.requested_fields() {
            fields.push_str(&format!("- \"{}\": {}\n", name, field_instruction(name)));
        }

        format!(
            r#"Summarize the following agent conversation as a JSON object.
Include exactly these keys:
{}
Use "" for unknown text fields and [] for empty lists.
Output only the JSON object, no preamble.

{}---
TOOL CALLS:
{}
---
CONVERSATION:
{}
---

JSON:"#,
            fields, previous, tool_lines, transcript
        )
    }

    /// Extract the JSON object from a completion
    pub fn parse_response(&self, response: &str) -> Result<ConversationSummary> {
        let start = response.find('{');
        let end = response.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &response[start..=end],
            _ => {
                return Err(Error::summarization_failed(
                    self.name(),
                    Error::Internal("response contains no JSON object".into()),
                ))
            }
        };

        let reply: SummaryReply = serde_json::from_str(json)
            .map_err(|e| Error::summarization_failed(self.name(), e.into()))?;
        Ok(reply.into())
    }
}

/// Backend reply; absent and `null` fields both become empty
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReply {
    modified_files: Option<Vec<String>>,
    user_goal: Option<String>,
    last_stop_point: Option<String>,
    key_decisions: Option<Vec<String>>,
    unresolved_issues: Option<Vec<String>>,
    next_steps: Option<Vec<String>>,
}

impl From<SummaryReply> for ConversationSummary {
    fn from(reply: SummaryReply) -> Self {
        Self {
            modified_files: reply.modified_files.unwrap_or_default(),
            user_goal: reply.user_goal.unwrap_or_default(),
            last_stop_point: reply.last_stop_point.unwrap_or_default(),
            key_decisions: reply.key_decisions.unwrap_or_default(),
            unresolved_issues: reply.unresolved_issues.unwrap_or_default(),
            next_steps: reply.next_steps.unwrap_or_default(),
        }
    }
}

fn field_instruction(name: &str) -> &'static str {
    match name {
        "modifiedFiles" => "list of file paths that were created or changed",
        "userGoal" => "one sentence describing what the user wants",
        "lastStopPoint" => "where the work stopped",
        "keyDecisions" => "list of decisions that were made",
        "unresolvedIssues" => "list of open problems or failures",
        "nextSteps" => "list of the next concrete actions",
        _ => "value",
    }
}

#[async_trait]
impl<B: SummaryBackend> SummaryStrategy for PromptSummarizer<B> {
    fn name(&self) -> &str {
        "prompt"
    }

    async fn generate(
        &self,
        context: &ConversationContext,
        schema: &SummarySchema,
    ) -> Result<ConversationSummary> {
        if schema.is_empty() {
            return Ok(ConversationSummary::default());
        }

        let prompt = self.build_prompt(context, schema);
        tracing::debug!(prompt_chars = prompt.len(), "Requesting summary from backend");

        let response = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| Error::summarization_failed(self.name(), e))?;

        self.parse_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, MessageRole};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Canned {
        reply: String,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SummaryBackend for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn context() -> ConversationContext {
        let mut ctx = ConversationContext::empty("s");
        ctx.messages.push(Message {
            id: "1".into(),
            role: MessageRole::User,
            content: "Refactor the parser".into(),
            timestamp: 1,
            tool_call_id: None,
        });
        ctx
    }

    #[test]
    fn test_prompt_lists_only_requested_fields() {
        let summarizer = PromptSummarizer::new(Canned::new("{}"));
        let prompt = summarizer.build_prompt(
            &context(),
            &SummarySchema::none().with_user_goal(true).with_next_steps(true),
        );

        assert!(prompt.contains("\"userGoal\""));
        assert!(prompt.contains("\"nextSteps\""));
        assert!(!prompt.contains("\"modifiedFiles\""));
        assert!(prompt.contains("[user]: Refactor the parser"));
    }

    #[tokio::test]
    async fn test_parses_json_with_surrounding_text() {
        let summarizer = PromptSummarizer::new(Canned::new(
            "Sure!\n```json\n{\"userGoal\": \"refactor parser\", \"nextSteps\": [\"split lexer\"]}\n```",
        ));

        let summary = summarizer
            .generate(&context(), &SummarySchema::all())
            .await
            .unwrap();

        assert_eq!(summary.user_goal, "refactor parser");
        assert_eq!(summary.next_steps, vec!["split lexer"]);
        assert!(summary.modified_files.is_empty());
    }

    #[test]
    fn test_prompt_caps_long_messages_by_tokens() {
        let mut ctx = context();
        ctx.messages[0].content = "x".repeat(100);

        let summarizer = PromptSummarizer::new(Canned::new("{}")).with_message_budget(5);
        let prompt = summarizer.build_prompt(&ctx, &SummarySchema::all());

        assert!(prompt.contains(&format!("[user]: {} [...]", "x".repeat(20))));
        assert!(!prompt.contains(&"x".repeat(21)));
    }

    #[test]
    fn test_prompt_carries_previous_summary() {
        let summarizer = PromptSummarizer::new(Canned::new("{}"));
        let mut ctx = context();
        assert!(!summarizer
            .build_prompt(&ctx, &SummarySchema::all())
            .contains("PREVIOUS SUMMARY"));

        ctx.summary = Some(ConversationSummary {
            key_decisions: vec!["keep the hand-written lexer".into()],
            ..Default::default()
        });
        let prompt = summarizer.build_prompt(&ctx, &SummarySchema::all());
        assert!(prompt.contains("PREVIOUS SUMMARY"));
        assert!(prompt.contains("- keep the hand-written lexer"));
    }

    #[tokio::test]
    async fn test_null_fields_become_empty() {
        let summarizer = PromptSummarizer::new(Canned::new(
            "{\"userGoal\": null, \"modifiedFiles\": null, \"nextSteps\": [\"ship\"]}",
        ));

        let summary = summarizer
            .generate(&context(), &SummarySchema::all())
            .await
            .unwrap();

        assert!(summary.user_goal.is_empty());
        assert!(summary.modified_files.is_empty());
        assert_eq!(summary.next_steps, vec!["ship"]);
    }

    #[tokio::test]
    async fn test_malformed_reply_fails() {
        let summarizer = PromptSummarizer::new(Canned::new("I cannot do that"));
        let err = summarizer
            .generate(&context(), &SummarySchema::all())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SummarizationFailed { .. }));

        let summarizer = PromptSummarizer::new(Canned::new("{\"nextSteps\": \"not a list\"}"));
        assert!(summarizer
            .generate(&context(), &SummarySchema::all())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_empty_schema_skips_backend() {
        let summarizer = PromptSummarizer::new(Canned::new("{}"));
        let summary = summarizer
            .generate(&context(), &SummarySchema::none())
            .await
            .unwrap();

        assert!(summary.is_empty());
        assert_eq!(summarizer.backend().calls.load(Ordering::SeqCst), 0);
    }
}
