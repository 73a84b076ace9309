//! Runtime settings for the dashboard server.

use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::google::SpreadsheetRef;

pub const DEFAULT_CREDENTIALS_FILE: &str = "service_account.json";
pub const DEFAULT_SHEET_NAME: &str = "FitSheet";
pub const DEFAULT_WORKOUT_TAB: &str = "Workout Log";
pub const DEFAULT_METRICS_TAB: &str = "Body Metrics";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fitsheet", version, about = "Fitness log dashboard backed by Google Sheets")]
pub struct Settings {
    /// Service-account key file
    #[arg(long, env = "FITSHEET_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_FILE)]
    pub credentials: PathBuf,

    /// Title of the spreadsheet document
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet_name: String,

    /// Spreadsheet id; skips the lookup by title when set
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    #[arg(long, default_value = DEFAULT_WORKOUT_TAB)]
    pub workout_tab: String,

    #[arg(long, default_value = DEFAULT_METRICS_TAB)]
    pub metrics_tab: String,

    /// Address the dashboard listens on
    #[arg(long, default_value_t = SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)))]
    pub bind: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            spreadsheet_id: None,
            workout_tab: DEFAULT_WORKOUT_TAB.to_string(),
            metrics_tab: DEFAULT_METRICS_TAB.to_string(),
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

impl Settings {
    pub fn spreadsheet(&self) -> SpreadsheetRef {
        match &self.spreadsheet_id {
            Some(id) => SpreadsheetRef::Id(id.clone()),
            None => SpreadsheetRef::Title(self.sheet_name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::try_parse_from([
            "fitsheet",
            "--credentials",
            "/etc/fitsheet/key.json",
            "--spreadsheet-id",
            "abc123",
            "--bind",
            "0.0.0.0:8080",
        ])
        .unwrap();

        assert_eq!(settings.credentials, PathBuf::from("/etc/fitsheet/key.json"));
        assert_eq!(settings.spreadsheet(), SpreadsheetRef::Id("abc123".into()));
        assert_eq!(settings.bind.port(), 8080);
        assert_eq!(settings.workout_tab, DEFAULT_WORKOUT_TAB);
    }

    #[test]
    fn spreadsheet_is_opened_by_title_by_default() {
        assert_eq!(
            Settings::default().spreadsheet(),
            SpreadsheetRef::Title("FitSheet".into())
        );
    }
}
