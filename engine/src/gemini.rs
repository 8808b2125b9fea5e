use std::pin::Pin;

use color_eyre::Result;
use log::{debug, info, warn};

use crate::{
    DEFAULT_TEMPERATURE, IMAGE_MODEL_NAME, TEXT_MODEL_NAME,
    image_model::{GeneratedImage, ImageModel},
    location::{self, LocationData},
    text_model::TextModel,
};

pub mod gemini_api;
use gemini_api::{
    Content, GeminiError, GenerateContentRequest, GenerationConfig, generate_content,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Generative Language API, serving both the text and the
/// image model.
#[derive(Clone)]
pub struct Gemini {
    api_key: Option<String>,
    base_url: String,
    text_model: String,
    image_model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.into(),
            text_model: TEXT_MODEL_NAME.into(),
            image_model: IMAGE_MODEL_NAME.into(),
            temperature: DEFAULT_TEMPERATURE,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn location_request(&self, theme: Option<&str>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(location::user_prompt(theme))],
            system_instruction: Some(Content::text(location::LOCATION_SYSTEM_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(location::response_schema()),
                temperature: Some(self.temperature),
            }),
        }
    }

    fn image_request(prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            ..Default::default()
        }
    }
}

impl TextModel for Gemini {
    fn generate_location<'a>(
        &'a self,
        theme: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<LocationData>> + Send + 'a>> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
            let req = self.location_request(theme);

            let response =
                generate_content(&self.client, &self.base_url, &self.text_model, api_key, &req)
                    .await?;
            let Some(text) = response.text() else {
                warn!(
                    "{} returned no text, finish reason: {}",
                    self.text_model,
                    response.finish_reason().unwrap_or("none")
                );
                return Err(GeminiError::EmptyResponse.into());
            };
            debug!("Location json:\n{text}");

            let location = serde_json::from_str::<LocationData>(&text).map_err(|e| {
                warn!("Unparsable location from {}: {e}", self.text_model);
                GeminiError::malformed(format!("{e}: {text}"))
            })?;
            info!("Discovered location: {}", location.name);
            Ok(location)
        })
    }

    fn clone(&self) -> Box<dyn TextModel + Send + Sync + 'static> {
        Box::new(Clone::clone(self))
    }
}

impl ImageModel for Gemini {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GeneratedImage>>> + Send + 'a>> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                debug!("No API key, skipping image generation");
                return Ok(None);
            };

            let req = Self::image_request(prompt);
            let response =
                generate_content(&self.client, &self.base_url, &self.image_model, api_key, &req)
                    .await?;

            let image = response.first_inline_data().and_then(|inline| {
                let data = inline.data.clone()?;
                Some(GeneratedImage::new(inline.mime_type.clone(), data))
            });

            if image.is_none() {
                info!("{} returned no image", self.image_model);
            }
            Ok(image)
        })
    }

    fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static> {
        Box::new(Clone::clone(self))
    }
}
