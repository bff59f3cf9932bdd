//! Completion-service client: natural language in, SQL text out
//!
//! The service is an injected capability behind [`SqlGenerator`] so the
//! rest of the shell is testable with a deterministic stub. The production
//! implementation talks to OpenAI via `async-openai`; no retries, no
//! streaming.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use thiserror::Error;

/// System prompt teaching the model to generate plain SQL
const SYSTEM_PROMPT: &str = "You are an expert SQL query generator. Your task is to:
1. Analyze the given database schema
2. Generate precise SQL queries that match the user's intent
3. Include only SELECT statements (no CREATE, INSERT, UPDATE, or DELETE)
4. Always qualify column names with table names to avoid ambiguity
5. Use appropriate JOIN conditions based on likely relationships
6. Include proper WHERE clauses to filter results
7. When doing a text search always search using ignore case
8. Return ONLY the SQL query with no explanations or markdown

Common patterns to follow:
- Use table_name.column_name syntax for all column references
- Include INNER JOIN only when you're certain about relationships
- Use LEFT JOIN when relationships might be optional
- Add appropriate GROUP BY clauses for aggregate functions
- Include ORDER BY for better result presentation";

/// The completion service failed or returned unusable content.
///
/// Reported at the loop boundary; the session continues.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion service failed: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("completion service returned no content")]
    EmptyResponse,
}

/// One method: request text plus schema description in, raw SQL text out.
///
/// The raw text may carry code fences and mixed-case keywords; callers run
/// [`normalize_sql`] before treating the query as final.
#[async_trait]
pub trait SqlGenerator {
    async fn generate_sql(&self, request: &str, schema_text: &str) -> Result<String, LlmError>;
}

/// Production generator backed by the OpenAI chat completions API.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl SqlGenerator for OpenAiGenerator {
    async fn generate_sql(&self, request: &str, schema_text: &str) -> Result<String, LlmError> {
        let user_prompt = format!(
            "Database Schema:\n{schema_text}\n\nRequest: {request}\n\nImportant:\n\
             - Return only the SQL query\n\
             - No explanations or markdown\n\
             - Use proper table/column qualification\n\
             - Ensure syntactically valid SQL\n\
             - Consider NULL values in comparisons\n\
             - Use appropriate JOIN types"
        );

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()?,
            ),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(chat_request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(model = %self.model, "received completion");
        Ok(content.to_string())
    }
}

/// Keywords canonicalized to uppercase by [`normalize_sql`].
const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "JOIN", "LEFT", "RIGHT", "INNER", "GROUP BY", "ORDER BY", "HAVING",
    "LIMIT", "AND", "OR", "IN", "NOT", "AS",
];

/// Normalize a raw completion into a single-line query.
///
/// Strips a leading and trailing code-fence line, joins the remaining
/// non-blank lines with single spaces, then uppercases space-delimited
/// lowercase and Title Case occurrences of the fixed keyword list. All
/// other content is preserved.
pub fn normalize_sql(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.trim().lines().collect();

    if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.pop();
    }

    let joined = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    // Pad so keywords at the start or end of the query still match the
    // space-delimited replacement.
    let mut query = format!(" {joined} ");
    for keyword in KEYWORDS {
        let lower = format!(" {} ", keyword.to_lowercase());
        let title = format!(" {} ", title_case(keyword));
        let upper = format!(" {keyword} ");
        query = query.replace(&lower, &upper).replace(&title, &upper);
    }

    query.trim().to_string()
}

fn title_case(keyword: &str) -> String {
    keyword
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic stand-in for the completion service.
    struct StubGenerator(String);

    #[async_trait]
    impl SqlGenerator for StubGenerator {
        async fn generate_sql(&self, _request: &str, _schema: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_stub_generator_round_trip() {
        let stub = StubGenerator("```sql\nselect * from users\n```".to_string());
        let raw = stub.generate_sql("all users", "schema").await.unwrap();
        assert_eq!(normalize_sql(&raw), "SELECT * FROM users");
    }

    #[test]
    fn test_normalize_strips_code_fences() {
        let raw = "```sql\nSELECT * FROM users\n```";
        assert_eq!(normalize_sql(raw), "SELECT * FROM users");
    }

    #[test]
    fn test_normalize_joins_lines_dropping_blanks() {
        let raw = "SELECT users.name\n\nFROM users\nWHERE users.age > 25";
        assert_eq!(
            normalize_sql(raw),
            "SELECT users.name FROM users WHERE users.age > 25"
        );
    }

    #[test]
    fn test_normalize_uppercases_lowercase_keywords() {
        assert_eq!(
            normalize_sql("select name from users where age > 25 order by name"),
            "SELECT name FROM users WHERE age > 25 ORDER BY name"
        );
    }

    #[test]
    fn test_normalize_uppercases_title_case_keywords() {
        assert_eq!(
            normalize_sql("Select name From users Group By name"),
            "SELECT name FROM users GROUP BY name"
        );
    }

    #[test]
    fn test_normalize_preserves_non_keyword_content() {
        // Identifiers that merely contain keyword text stay untouched.
        assert_eq!(
            normalize_sql("SELECT orders.total FROM orders"),
            "SELECT orders.total FROM orders"
        );
    }

    #[test]
    fn test_normalize_fence_and_keywords_together() {
        let raw = "```\nselect users.name\nfrom users\nleft join orders\n  on users.id = orders.user_id\n```";
        assert_eq!(
            normalize_sql(raw),
            "SELECT users.name FROM users LEFT JOIN orders on users.id = orders.user_id"
        );
    }

    #[test]
    fn test_normalize_plain_text_passthrough() {
        assert_eq!(normalize_sql("SELECT 1"), "SELECT 1");
        assert_eq!(normalize_sql(""), "");
    }

    #[test]
    fn test_system_prompt_demands_select_only() {
        assert!(SYSTEM_PROMPT.contains("only SELECT statements"));
        assert!(SYSTEM_PROMPT.contains("ONLY the SQL query"));
    }
}
