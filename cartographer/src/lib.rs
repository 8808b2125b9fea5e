use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use engine::{
    DEFAULT_TEMPERATURE, IMAGE_MODEL_NAME, TEXT_MODEL_NAME,
    gemini::{DEFAULT_BASE_URL, Gemini},
    generation::{Generator, Session},
    image_model::GeneratedImage,
    location::LocationData,
};
use log::{error, info};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::IntoEnumIterator;

use crate::{
    cli::{Cli, Command, Explore, Preset},
    present::{ImageView, render_card},
};

pub mod cli;
pub mod interactive;
pub mod present;

const APP_NAME: &str = "Mystic Cartographer";
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub text_model: String,
    pub image_model: String,
    pub temperature: f32,
    pub base_url: String,
    pub image_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_model: TEXT_MODEL_NAME.into(),
            image_model: IMAGE_MODEL_NAME.into(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.into(),
            image_dir: None,
        }
    }
}

impl Config {
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(m) = &cli.text_model {
            self.text_model = m.clone();
        }
        if let Some(m) = &cli.image_model {
            self.image_model = m.clone();
        }
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(dir) = &cli.image_dir {
            self.image_dir = Some(dir.clone());
        }
    }

    pub fn make_generator(&self, api_key: Option<String>) -> Generator {
        let gemini = Gemini::new(api_key)
            .with_base_url(&self.base_url)
            .with_text_model(&self.text_model)
            .with_image_model(&self.image_model)
            .with_temperature(self.temperature);
        Generator::new(Box::new(Clone::clone(&gemini)), Box::new(gemini))
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut cfg = load_config()?.unwrap_or_default();
    cfg.apply_cli(&cli);
    let api_key = if cli.generates() {
        api_key_from_env(cli.api_key)
    } else {
        None
    };

    match cli.command {
        Some(Command::Presets) => {
            for (i, preset) in Preset::iter().enumerate() {
                println!("{}. {preset}", i + 1);
            }
            Ok(())
        }
        Some(Command::Config) => {
            save_config(&cfg)?;
            println!("Saved {}", config_path()?.display());
            Ok(())
        }
        Some(Command::Explore(explore)) => explore_once(&cfg, api_key, explore).await,
        None => interactive::run(cfg.make_generator(api_key), cfg.image_dir.clone()).await,
    }
}

fn api_key_from_env(flag: Option<String>) -> Option<String> {
    let api_key = resolve_api_key(flag, |var| std::env::var(var).ok());
    if api_key.is_none() {
        error!("API_KEY is missing from environment variables.");
    }
    api_key
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExploreOutput<'a> {
    status: String,
    location: Option<&'a LocationData>,
    image_mime_type: Option<&'a str>,
    image_path: Option<&'a Path>,
    error: Option<&'a str>,
}

async fn explore_once(cfg: &Config, api_key: Option<String>, explore: Explore) -> Result<()> {
    let generator = cfg.make_generator(api_key);
    let session = Session::new().set_theme(explore.theme());
    let session = generator
        .run(session, |s| {
            if let Some(label) = s.status().progress_label() {
                eprintln!("{label}");
            }
        })
        .await;

    let image_path = save_result_image(
        &session,
        explore.save_image.clone(),
        cfg.image_dir.as_deref(),
    );
    println!(
        "{}",
        render_result(&session, image_path.as_deref(), explore.json)?
    );

    match session.error() {
        Some(e) => Err(eyre!("{e}")),
        None => Ok(()),
    }
}

/// Writes the session's image to `target`, or into `image_dir` under a name
/// derived from the location. Export failures are logged, never fatal: the
/// location is still worth showing.
pub fn save_result_image(
    session: &Session,
    target: Option<PathBuf>,
    image_dir: Option<&Path>,
) -> Option<PathBuf> {
    let (location, image) = (session.location()?, session.image()?);
    let path =
        target.or_else(|| image_dir.map(|dir| dir.join(image_file_name(location, image))))?;
    match export_image(image, &path) {
        Ok(()) => Some(path),
        Err(e) => {
            error!("Couldn't save image to {}: {e:?}", path.display());
            None
        }
    }
}

pub fn render_result(session: &Session, image_path: Option<&Path>, json: bool) -> Result<String> {
    if json {
        let output = ExploreOutput {
            status: session.status().to_string(),
            location: session.location(),
            image_mime_type: session.image().map(|i| i.mime_type.as_str()),
            image_path,
            error: session.error(),
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(session
            .location()
            .map(|location| render_card(location, ImageView::for_session(session, image_path)))
            .unwrap_or_default())
    }
}

/// The first non-empty key out of the flag and the environment variables.
pub fn resolve_api_key(
    flag: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    flag.into_iter()
        .chain(API_KEY_VARS.into_iter().filter_map(|var| env(var)))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

pub fn export_image(image: &GeneratedImage, path: &Path) -> Result<()> {
    let bytes = image.decode()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes).wrap_err_with(|| format!("Couldn't write {}", path.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

pub fn image_file_name(location: &LocationData, image: &GeneratedImage) -> String {
    let mut slug = String::new();
    for ch in location.name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "location" } else { slug };
    format!("{slug}.{}", image.file_extension())
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(path, ron::to_string(x)?)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join("mystic_cartographer.ron"))
}

pub fn load_config() -> Result<Option<Config>> {
    let path = config_path()?;
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(&path)
            .wrap_err_with(|| format!("Invalid {APP_NAME} config at {}", path.display()))
            .map(Some)
    }
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let path = config_path()?;
    save_ron_file(&path, cfg)?;
    Ok(())
}
