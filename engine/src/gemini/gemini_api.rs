use color_eyre::Result;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod error;
pub use error::{GeminiError, GeminiErrorKind};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            ..Self::text(text)
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: usize,
    #[serde(default)]
    pub candidates_token_count: usize,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// All text parts of the first candidate, joined. `None` if there is no text.
    pub fn text(&self) -> Option<String> {
        let text = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<String>();
        (!text.is_empty()).then_some(text)
    }

    /// Why the first candidate stopped, e.g. `STOP` or `SAFETY`.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }

    /// The first part of the first candidate that carries image bytes.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.data.as_deref().is_some_and(|d| !d.is_empty()))
    }
}

pub async fn generate_content(
    client: &Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    req: &GenerateContentRequest,
) -> Result<GenerateContentResponse> {
    let url = format!(
        "{}/v1beta/models/{model}:generateContent",
        base_url.trim_end_matches('/')
    );
    debug!("POST {url}");

    let res = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(req)
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(GeminiError::from_response(status.as_u16(), &body).into());
    }

    let response = serde_json::from_str::<GenerateContentResponse>(&body)
        .map_err(|e| GeminiError::malformed(format!("{e}: {body}")))?;

    if let Some(usage) = &response.usage_metadata {
        debug!(
            "{model} usage: input: {}, output: {}",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    Ok(response)
}

#[cfg(test)]
mod test {
    use expect_test::expect;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serialization() {
        let req = GenerateContentRequest {
            contents: vec![Content::user_text("Some user msg")],
            system_instruction: Some(Content::text("Be weird")),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(json!({"type": "STRING"})),
                temperature: Some(0.5),
            }),
        };

        let expect = expect![[r#"{"contents":[{"role":"user","parts":[{"text":"Some user msg"}]}],"systemInstruction":{"parts":[{"text":"Be weird"}]},"generationConfig":{"responseMimeType":"application/json","responseSchema":{"type":"STRING"},"temperature":0.5}}"#]];
        expect.assert_eq(&serde_json::to_string(&req).unwrap());
    }

    #[test]
    fn response_text_joins_parts() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(res.text().as_deref(), Some("{\"a\":1}"));
        assert!(res.first_inline_data().is_none());
        assert_eq!(res.finish_reason(), Some("STOP"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let res: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(res.text().is_none());
        assert_eq!(res.finish_reason(), None);
    }

    #[test]
    fn blocked_response_keeps_its_finish_reason() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        }))
        .unwrap();
        assert!(res.text().is_none());
        assert_eq!(res.finish_reason(), Some("SAFETY"));
    }

    #[test]
    fn finds_first_non_empty_inline_image() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": ""}},
                    {"inlineData": {"mimeType": "image/jpeg", "data": "AAAA"}}
                ]}
            }]
        }))
        .unwrap();
        let data = res.first_inline_data().unwrap();
        assert_eq!(data.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(data.data.as_deref(), Some("AAAA"));
    }
}
