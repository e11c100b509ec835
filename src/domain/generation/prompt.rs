//! Prompt shapes used by generation backends

use crate::domain::llm::LlmRequest;

/// System message prefix carrying retrieved context to chat models
pub const CONTEXT_SYSTEM_PREFIX: &str = "Use the following context to answer the question:";

/// Chat request for a query, with retrieved context as a system message
pub fn chat_request(query: &str, context: Option<&str>) -> LlmRequest {
    let builder = LlmRequest::builder();

    let builder = match context {
        Some(context) if !context.is_empty() => {
            builder.system(format!("{}\n\n{}", CONTEXT_SYSTEM_PREFIX, context))
        }
        _ => builder,
    };

    builder.user(query).build()
}

/// Single-string prompt for completion-style endpoints
pub fn completion_prompt(query: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => {
            format!("Context:\n{}\n\nQuestion: {}\n\nAnswer:", context, query)
        }
        _ => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MessageRole;

    #[test]
    fn test_chat_request_without_context() {
        let request = chat_request("What is Rust?", None);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[0].content, "What is Rust?");
    }

    #[test]
    fn test_chat_request_with_context() {
        let request = chat_request("What is Rust?", Some("Document 1 (Relevance: 0.90):\nRust"));

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(
            request.messages[0].content,
            "Use the following context to answer the question:\n\nDocument 1 (Relevance: 0.90):\nRust"
        );
        assert_eq!(request.messages[1].content, "What is Rust?");
    }

    #[test]
    fn test_chat_request_ignores_empty_context() {
        assert_eq!(chat_request("q", Some("")).messages.len(), 1);
    }

    #[test]
    fn test_completion_prompt() {
        assert_eq!(completion_prompt("q", None), "q");
        assert_eq!(
            completion_prompt("q", Some("ctx")),
            "Context:\nctx\n\nQuestion: q\n\nAnswer:"
        );
    }
}
