use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use engine::{IMAGE_MODEL_NAME, gemini::Gemini, image_model::ImageModel};

#[derive(clap::Parser)]
struct Arg {
    key: String,
    description: String,
    #[arg(long, default_value = IMAGE_MODEL_NAME)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let Arg {
        key,
        description,
        model,
    } = Arg::parse();
    let gemini = Gemini::new(Some(key)).with_image_model(model);

    let image = gemini
        .get_image(&description)
        .await?
        .ok_or(eyre!("The model returned no image"))?;
    let path = format!("output.{}", image.file_extension());
    let bytes = image.decode()?;
    std::fs::write(&path, &bytes)?;
    println!("Saved {path}, {} bytes", bytes.len());

    Ok(())
}
