use clap::Parser;
use color_eyre::Result;
use engine::{TEXT_MODEL_NAME, gemini::Gemini, text_model::TextModel};

#[derive(clap::Parser)]
pub struct Cli {
    api_key: String,
    theme: Option<String>,
    #[arg(long, default_value = TEXT_MODEL_NAME)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    pretty_env_logger::init();
    color_eyre::install()?;

    let gemini = Gemini::new(Some(args.api_key)).with_text_model(args.model);
    let location = gemini.generate_location(args.theme.as_deref()).await?;

    println!("{}", serde_json::to_string_pretty(&location)?);
    println!("# Image prompt\n{}", location.image_prompt());
    Ok(())
}
