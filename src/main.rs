use clap::Parser;
use fitsheet::{app, config::Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let settings = Settings::parse();

    // Start the web application
    app::run(settings).await?;

    Ok(())
}
