use futures::FutureExt;
use reqwest::Client as HttpClient;
use santa_core::{Adjective, Category};
use serde_json::{json, Value};

use super::{AiClient, AiError, AiFuture};
use crate::config::OpenAiConfig;

const SYSTEM_PROMPT: &str = "You help run a Secret Santa gift exchange. \
Answer with valid JSON only: no prose, no markdown.";

/// Chat-completions and image-generation client for any OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: HttpClient::new(),
            config,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, AiError> {
        let res = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| AiError::Malformed(e.to_string()))
    }

    async fn chat(&self, prompt: String) -> Result<String, AiError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.9
        });

        let v = self.post("chat/completions", body).await?;
        v.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AiError::Malformed("missing message content".into()))
    }
}

impl AiClient for OpenAiClient {
    fn adjectives(&self, category: Category, count: usize) -> AiFuture<'_, Vec<String>> {
        async move {
            let prompt = format!(
                "List {count} distinct single-word adjectives about {}. \
                 They should hint at gift preferences. \
                 Reply with a JSON array of lowercase strings.",
                category.hint()
            );
            let mut words = parse_string_list(&self.chat(prompt).await?)?;
            words.truncate(count);
            Ok(words)
        }
        .boxed()
    }

    fn pair_words(
        &self,
        pool: Vec<Adjective>,
        participants: usize,
    ) -> AiFuture<'_, Option<Vec<[String; 3]>>> {
        async move {
            let listing = pool
                .iter()
                .map(|a| format!("{} ({})", a.word, a.category))
                .collect::<Vec<_>>()
                .join(", ");
            let prompt = format!(
                "Here is a pool of adjectives with their categories: {listing}. \
                 Build exactly {participants} groups of 3 adjectives from the pool. \
                 Inside a group the three words must differ, and should come from \
                 different categories when possible. Use each word at most once overall. \
                 Reply with a JSON array of {participants} arrays of 3 strings, \
                 words spelled exactly as in the pool."
            );
            let triplets = parse_triplets(&self.chat(prompt).await?)?;
            Ok(Some(triplets))
        }
        .boxed()
    }

    fn gift_ideas(&self, adjectives: Vec<Adjective>) -> AiFuture<'_, Vec<String>> {
        async move {
            let words = adjectives
                .iter()
                .map(|a| a.word.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let prompt = format!(
                "Suggest 3 gift ideas for someone described as: {words}. \
                 Each idea is a short title under 8 words. \
                 Reply with a JSON array of strings."
            );
            parse_string_list(&self.chat(prompt).await?)
        }
        .boxed()
    }

    fn illustrate(&self, idea: String) -> AiFuture<'_, Option<String>> {
        async move {
            let body = json!({
                "model": self.config.image_model,
                "prompt": format!("A festive, gift-wrapped product photo of: {idea}"),
                "n": 1,
                "size": "1024x1024"
            });
            let v = self.post("images/generations", body).await?;
            let url = v
                .pointer("/data/0/url")
                .and_then(Value::as_str)
                .ok_or_else(|| AiError::Malformed("missing image url".into()))?;
            Ok(Some(url.to_string()))
        }
        .boxed()
    }
}

/// Models like to wrap JSON in markdown fences even when told not to.
fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

pub(crate) fn parse_string_list(content: &str) -> Result<Vec<String>, AiError> {
    let items: Vec<String> = serde_json::from_str(strip_fences(content))
        .map_err(|e| AiError::Malformed(format!("expected a list of strings: {e}")))?;
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

pub(crate) fn parse_triplets(content: &str) -> Result<Vec<[String; 3]>, AiError> {
    serde_json::from_str(strip_fences(content))
        .map_err(|e| AiError::Malformed(format!("expected a list of word triples: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(OpenAiConfig {
            api_key: "sk-test".into(),
            base_url: base_url.into(),
            model: "gpt-test".into(),
            image_model: "img-test".into(),
        })
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            client("https://api.example.com/v1/").endpoint("chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn parses_plain_and_fenced_lists() {
        assert_eq!(
            parse_string_list(r#"["cozy", " bold ", ""]"#).unwrap(),
            vec!["cozy", "bold"]
        );
        assert_eq!(
            parse_string_list("```json\n[\"fuzzy\"]\n```").unwrap(),
            vec!["fuzzy"]
        );
        assert!(matches!(
            parse_string_list("here you go: cozy"),
            Err(AiError::Malformed(_))
        ));
    }

    #[test]
    fn parses_triplets_and_rejects_wrong_arity() {
        let triplets = parse_triplets(r#"[["a","b","c"],["d","e","f"]]"#).unwrap();
        assert_eq!(triplets.len(), 2);
        assert_eq!(triplets[1][2], "f");

        assert!(parse_triplets(r#"[["a","b"]]"#).is_err());
    }

    async fn chat_reply(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
            return Err(StatusCode::UNAUTHORIZED);
        }
        if body["model"] != "gpt-test" {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(Json(json!({
            "choices": [{ "message": { "content": "```json\n[\"cozy\", \"calm\", \"bold\"]\n```" } }]
        })))
    }

    /// Serves a stand-in API on a free local port and returns its base url.
    async fn fake_api() -> String {
        let router = Router::new()
            .route("/v1/chat/completions", post(chat_reply))
            .route(
                "/v1/images/generations",
                post(|| async { Json(json!({ "data": [] })) }),
            )
            .route(
                "/down/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn adjectives_come_from_the_chat_reply() {
        let base = fake_api().await;
        let words = client(&format!("{base}/v1"))
            .adjectives(Category::Mood, 2)
            .await
            .unwrap();
        assert_eq!(words, vec!["cozy", "calm"]);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let base = fake_api().await;
        let err = client(&format!("{base}/down"))
            .adjectives(Category::Mood, 2)
            .await
            .unwrap_err();
        match err {
            AiError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_image_url_is_malformed() {
        let base = fake_api().await;
        let err = client(&format!("{base}/v1"))
            .illustrate("a mug".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Malformed(_)));
    }

    #[tokio::test]
    async fn wrong_key_is_rejected_by_the_service() {
        let base = fake_api().await;
        let mut config = client(&format!("{base}/v1")).config;
        config.api_key = "sk-other".into();
        let err = OpenAiClient::new(config)
            .gift_ideas(Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Status { status: 401, .. }));
    }
}
