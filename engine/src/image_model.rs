use std::pin::Pin;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use color_eyre::{Result, eyre::WrapErr as _};

pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// An inline image as returned by the model: MIME type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String,
}

impl GeneratedImage {
    pub fn new(mime_type: Option<String>, data: String) -> Self {
        Self {
            mime_type: mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.into()),
            data,
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.trim())
            .wrap_err("image payload is not valid base64")
    }

    pub fn file_extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpeg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

pub trait ImageModel {
    /// `Ok(None)` means the model produced no image, which is not an error.
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<GeneratedImage>>> + Send + 'a>>;

    fn clone(&self) -> Box<dyn ImageModel + Send + Sync + 'static>;
}
