//! Checks that the service-account key can reach Google and lists the
//! spreadsheets it has been shared on.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use fitsheet::config::{DEFAULT_CREDENTIALS_FILE, DEFAULT_SHEET_NAME};
use fitsheet::credentials::ServiceAccountKey;
use fitsheet::error::SheetsError;
use fitsheet::google::{GoogleSheets, SpreadsheetFile, SpreadsheetRef};

#[derive(Parser, Debug)]
#[command(name = "gsheet-debug", about = "Test Google Sheets connectivity")]
struct Args {
    /// Service-account key file
    #[arg(long, env = "FITSHEET_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials: PathBuf,
}

async fn list(args: &Args) -> Result<Vec<SpreadsheetFile>, SheetsError> {
    let key = ServiceAccountKey::from_file(&args.credentials)?;
    let client =
        GoogleSheets::authorize(key, SpreadsheetRef::Title(DEFAULT_SHEET_NAME.to_string())).await?;
    client.list_spreadsheets().await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match list(&args).await {
        Ok(files) => {
            println!("✅ Connected! Found {} sheets:", files.len());
            for file in &files {
                println!("{}", file.name);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("❌ Failed: {e}");
            ExitCode::FAILURE
        }
    }
}
