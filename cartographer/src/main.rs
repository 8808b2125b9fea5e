use clap::Parser;
use color_eyre::Result;
use mystic_cartographer::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let cli = Cli::parse();
    mystic_cartographer::run(cli).await
}
