//! Custom HTTP endpoint generation binding

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::domain::DomainError;
use crate::domain::generation::completion_prompt;
use crate::infrastructure::llm::HttpClientTrait;

const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Home-grown completion endpoint reached over HTTP
///
/// Requests are `POST {prompt, temperature, ...extra}`; the reply shape is
/// sniffed by [`extract_text`].
#[derive(Clone)]
pub struct EndpointBinding {
    url: String,
    api_key: Option<String>,
    temperature: f64,
    extra: Map<String, Value>,
    headers: Vec<(String, String)>,
    client: Arc<dyn HttpClientTrait>,
}

impl fmt::Debug for EndpointBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBinding")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("temperature", &self.temperature)
            .field("extra", &self.extra)
            .field("headers", &self.headers.len())
            .finish()
    }
}

impl EndpointBinding {
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClientTrait>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            extra: Map::new(),
            headers: Vec::new(),
            client,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extra body fields; `prompt` and `temperature` cannot be overridden
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_body(&self, query: &str, context: Option<&str>) -> Value {
        let mut body = self.extra.clone();
        body.insert("prompt".to_string(), json!(completion_prompt(query, context)));
        body.insert("temperature".to_string(), json!(self.temperature));
        Value::Object(body)
    }

    pub async fn generate(&self, query: &str, context: Option<&str>) -> Result<String, DomainError> {
        let body = self.build_body(query, context);
        let auth = self.api_key.as_ref().map(|key| format!("Bearer {}", key));

        let mut headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if let Some(ref auth) = auth {
            headers.push(("Authorization", auth.as_str()));
        }

        let response = self.client.post_json(&self.url, headers, &body).await?;
        Ok(extract_text(&response))
    }
}

/// Pulls the generated text out of the common completion reply shapes.
///
/// Tried in order: a bare JSON string, the `response`, `text` and `output`
/// keys, `choices[0].message.content`, `choices[0].text`. Anything else is
/// returned as serialized JSON.
pub fn extract_text(response: &Value) -> String {
    if let Some(text) = response.as_str() {
        return text.to_string();
    }

    for key in ["response", "text", "output"] {
        if let Some(value) = response.get(key) {
            return value_text(value);
        }
    }

    if let Some(choice) = response.get("choices").and_then(|c| c.get(0)) {
        if let Some(content) = choice.get("message").and_then(|m| m.get("content")) {
            return value_text(content);
        }
        if let Some(text) = choice.get("text") {
            return value_text(text);
        }
    }

    response.to_string()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::HttpClient;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_text_shapes() {
        assert_eq!(extract_text(&json!("plain")), "plain");
        assert_eq!(extract_text(&json!({"response": "r"})), "r");
        assert_eq!(extract_text(&json!({"text": "t"})), "t");
        assert_eq!(extract_text(&json!({"output": "o"})), "o");
        assert_eq!(
            extract_text(&json!({"choices": [{"message": {"content": "chat"}}]})),
            "chat"
        );
        assert_eq!(extract_text(&json!({"choices": [{"text": "completion"}]})), "completion");
    }

    #[test]
    fn test_extract_text_prefers_response_key() {
        let value = json!({"text": "t", "response": "r", "choices": [{"text": "c"}]});
        assert_eq!(extract_text(&value), "r");
    }

    #[test]
    fn test_extract_text_falls_back_to_raw_json() {
        assert_eq!(extract_text(&json!({"answer": 42})), r#"{"answer":42}"#);
        assert_eq!(extract_text(&json!({"choices": []})), r#"{"choices":[]}"#);
    }

    #[test]
    fn test_body_keeps_prompt_and_temperature() {
        let mut extra = Map::new();
        extra.insert("max_tokens".to_string(), json!(64));
        extra.insert("prompt".to_string(), json!("overridden"));

        let binding = EndpointBinding::new("http://x", Arc::new(HttpClient::new()))
            .with_temperature(0.5)
            .with_extra(extra);

        let body = binding.build_body("q", Some("ctx"));

        assert_eq!(body["prompt"], "Context:\nctx\n\nQuestion: q\n\nAnswer:");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let binding =
            EndpointBinding::new("http://x", Arc::new(HttpClient::new())).with_api_key("secret");

        assert!(!format!("{:?}", binding).contains("secret"));
    }

    #[tokio::test]
    async fn test_generate_against_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("Authorization", "Bearer key-1"))
            .and(header("X-Team", "search"))
            .and(body_json(json!({"prompt": "What is Rust?", "temperature": 0.5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": "A language"})))
            .expect(1)
            .mount(&server)
            .await;

        let binding = EndpointBinding::new(
            format!("{}/generate", server.uri()),
            Arc::new(HttpClient::new()),
        )
        .with_api_key("key-1")
        .with_header("X-Team", "search")
        .with_temperature(0.5);

        let text = binding.generate("What is Rust?", None).await.unwrap();

        assert_eq!(text, "A language");
    }

    #[tokio::test]
    async fn test_generate_propagates_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let binding = EndpointBinding::new(server.uri(), Arc::new(HttpClient::new()));
        let err = binding.generate("q", None).await.unwrap_err();

        assert!(err.to_string().contains("HTTP 500"));
    }
}
