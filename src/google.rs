//! Google Sheets v4 / Drive v3 client authorized with a service account.

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::credentials::{SCOPES, ServiceAccountKey};
use crate::error::SheetsError;
use crate::sheets::{CellValue, Connector, Records, SheetStore};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens this close to expiry are replaced before use.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// How the dashboard's spreadsheet document is located.
#[derive(Clone, Debug, PartialEq)]
pub enum SpreadsheetRef {
    /// Looked up by title through the Drive listing on every call.
    Title(String),
    Id(String),
}

/// A spreadsheet visible to the service account.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SpreadsheetFile {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<SpreadsheetFile>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// An authorized client bound to one spreadsheet document.
pub struct GoogleSheets {
    http: reqwest::Client,
    key: ServiceAccountKey,
    spreadsheet: SpreadsheetRef,
    sheets_api: String,
    drive_files_api: String,
    token: Mutex<Option<AccessToken>>,
}

impl GoogleSheets {
    pub fn new(key: ServiceAccountKey, spreadsheet: SpreadsheetRef) -> Self {
        Self {
            http: reqwest::Client::new(),
            key,
            spreadsheet,
            sheets_api: SHEETS_API.to_string(),
            drive_files_api: DRIVE_FILES_API.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Points the client at other Sheets and Drive base URLs, such as a
    /// regional endpoint or a local stand-in.
    pub fn with_endpoints(
        mut self,
        sheets_api: impl Into<String>,
        drive_files_api: impl Into<String>,
    ) -> Self {
        self.sheets_api = sheets_api.into();
        self.drive_files_api = drive_files_api.into();
        self
    }

    /// Builds a client and performs the first token exchange, so bad
    /// credentials surface here rather than on the first read.
    pub async fn authorize(
        key: ServiceAccountKey,
        spreadsheet: SpreadsheetRef,
    ) -> Result<Self, SheetsError> {
        let client = Self::new(key, spreadsheet);
        client.access_token().await?;
        Ok(client)
    }

    /// Returns a bearer token, minting a new one when the cached token is
    /// missing or about to expire.
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut token = self.token.lock().await;
        if let Some(current) = token.as_ref().filter(|t| t.is_fresh()) {
            return Ok(current.value.clone());
        }

        let now = chrono::Utc::now().timestamp();
        let assertion = self.key.signed_assertion(&SCOPES, now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SheetsError::from_response(response).await);
        }

        let granted: TokenResponse = response.json().await?;
        debug!("Access token granted, expires in {}s", granted.expires_in);
        let value = granted.access_token.clone();
        *token = Some(AccessToken {
            value: granted.access_token,
            expires_at: Instant::now() + Duration::from_secs(granted.expires_in),
        });
        Ok(value)
    }

    async fn list_files(&self, query: &str) -> Result<Vec<SpreadsheetFile>, SheetsError> {
        let token = self.access_token().await?;
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(&self.drive_files_api).bearer_auth(&token).query(&[
                ("q", query),
                ("fields", "nextPageToken, files(id, name)"),
                ("pageSize", "1000"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(SheetsError::from_response(response).await);
            }
            let page: FileList = response.json().await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(files),
            }
        }
    }

    /// Every spreadsheet the service account can see.
    pub async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetFile>, SheetsError> {
        self.list_files(&format!("mimeType='{SPREADSHEET_MIME}'")).await
    }

    async fn spreadsheet_id(&self) -> Result<String, SheetsError> {
        let title = match &self.spreadsheet {
            SpreadsheetRef::Id(id) => return Ok(id.clone()),
            SpreadsheetRef::Title(title) => title,
        };

        let files = self.list_files(&title_query(title)).await?;
        files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetsError::SpreadsheetNotFound(title.clone()))
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn append_row(&self, tab: &str, row: Vec<CellValue>) -> Result<(), SheetsError> {
        let id = self.spreadsheet_id().await?;
        let token = self.access_token().await?;
        let url = format!("{}:append", values_url(&self.sheets_api, &id, tab));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SheetsError::from_response(response).await);
        }

        info!("Appended row to '{tab}'");
        Ok(())
    }

    async fn get_all_records(&self, tab: &str) -> Result<Records, SheetsError> {
        let id = self.spreadsheet_id().await?;
        let token = self.access_token().await?;

        let response = self
            .http
            .get(values_url(&self.sheets_api, &id, tab))
            .bearer_auth(&token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SheetsError::from_response(response).await);
        }

        let range: ValueRange = response.json().await?;
        debug!("Read {} rows from '{tab}'", range.values.len());
        let grid = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Records::from_grid(grid)
    }
}

/// Loads the key file and authorizes; the dashboard memoizes the result.
pub struct GoogleConnector {
    pub credentials: PathBuf,
    pub spreadsheet: SpreadsheetRef,
}

#[async_trait]
impl Connector for GoogleConnector {
    async fn connect(&self) -> Result<Arc<dyn SheetStore>, SheetsError> {
        info!("🔐 Starting credential loading...");
        let key = ServiceAccountKey::from_file(&self.credentials)?;
        info!("✅ Credentials loaded for {}, authorizing...", key.client_email);
        let client = GoogleSheets::authorize(key, self.spreadsheet.clone()).await?;
        info!("📄 Sheets client initialized");
        Ok(Arc::new(client))
    }
}

/// A1 range covering a whole tab: the title in single quotes, inner quotes doubled.
pub fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

fn values_url(sheets_api: &str, spreadsheet_id: &str, tab: &str) -> String {
    format!(
        "{sheets_api}/{}/values/{}",
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(&tab_range(tab))
    )
}

/// Drive query for a spreadsheet by exact title.
pub fn title_query(title: &str) -> String {
    let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("mimeType='{SPREADSHEET_MIME}' and name = '{escaped}'")
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
