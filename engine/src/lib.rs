use crate::{image_model::ImageModel, text_model::TextModel};

pub mod gemini;
pub mod generation;
pub mod image_model;
pub mod location;
pub mod text_model;

pub type TextModBox = Box<dyn TextModel + Send + Sync>;
pub type ImgModBox = Box<dyn ImageModel + Send + Sync>;

pub const TEXT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const IMAGE_MODEL_NAME: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEMPERATURE: f32 = 0.9;
