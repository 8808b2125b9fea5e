use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, clap::Parser)]
#[command(name = "mystic-cartographer", about = "Infinite World Generator")]
pub struct Cli {
    /// Overrides the API_KEY environment variable
    #[arg(short, long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub text_model: Option<String>,

    #[arg(long)]
    pub image_model: Option<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory discovered images are written to
    #[arg(long)]
    pub image_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Discover a single location and exit
    Explore(Explore),
    /// List the preset themes
    Presets,
    /// Write the effective configuration to the config file
    Config,
}

impl Cli {
    /// Whether this invocation talks to the models, and so needs an API key.
    pub fn generates(&self) -> bool {
        matches!(self.command, None | Some(Command::Explore(_)))
    }
}

#[derive(Debug, clap::Args)]
pub struct Explore {
    /// Leave empty for serendipity
    pub theme: Option<String>,

    #[arg(long, conflicts_with = "theme")]
    pub preset: Option<Preset>,

    /// Where to write the image, if one is generated
    #[arg(short, long)]
    pub save_image: Option<PathBuf>,

    /// Print the location as JSON instead of a card
    #[arg(long)]
    pub json: bool,
}

impl Explore {
    pub fn theme(&self) -> String {
        match (&self.theme, self.preset) {
            (Some(theme), _) => theme.trim().to_string(),
            (None, Some(preset)) => preset.to_string(),
            (None, None) => String::new(),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
)]
pub enum Preset {
    #[strum(to_string = "Ancient Ruins")]
    AncientRuins,
    #[strum(to_string = "Space Station")]
    SpaceStation,
    #[strum(to_string = "Fey Wilds")]
    FeyWilds,
    #[strum(to_string = "Dystopian City")]
    DystopianCity,
}

impl Preset {
    /// 1-based, as listed to the user.
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::iter().nth(i))
    }
}
