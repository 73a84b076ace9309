use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fitsheet::credentials::ServiceAccountKey;
use fitsheet::entries::{WorkoutEntry, WorkoutForm};
use fitsheet::error::SheetsError;
use fitsheet::google::{GoogleSheets, SpreadsheetFile, SpreadsheetRef};
use fitsheet::sheets::{CellValue, SheetStore};

const KEY_JSON: &str = include_str!("fixtures/service_account.json");

fn client(server: &MockServer, spreadsheet: SpreadsheetRef) -> GoogleSheets {
    let mut key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
    key.token_uri = format!("{}/token", server.uri());
    GoogleSheets::new(key, spreadsheet).with_endpoints(
        format!("{}/v4/spreadsheets", server.uri()),
        format!("{}/drive/v3/files", server.uri()),
    )
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=ey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn append_posts_one_raw_row_in_column_order() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-1/values/.*Workout.*Log.*:append$"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_json(json!({
            "values": [["2024-05-01", "Bench Press", 3, 10, 60.0]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "sheet-1",
            "updates": { "updatedRows": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = WorkoutEntry::try_from(WorkoutForm {
        date: "2024-05-01".to_string(),
        exercise: "Bench Press".to_string(),
        sets: "3".to_string(),
        reps: "10".to_string(),
        weight: "60".to_string(),
    })
    .unwrap();

    let sheets = client(&server, SpreadsheetRef::Id("sheet-1".to_string()));
    sheets.append_row("Workout Log", entry.to_row()).await.unwrap();
}

#[tokio::test]
async fn records_are_read_from_values_get() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-1/values/.*Body.*Metrics.*$"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "'Body Metrics'!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [
                ["Date", "Body Weight", "Body Fat", "Muscle Mass", "Fat Mass"],
                ["2024-05-01", "80.5", "18", "36.1", "14.5"],
                ["2024-05-02", "80.1"]
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Id("sheet-1".to_string()));
    let records = sheets.get_all_records("Body Metrics").await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.headers()[1], "Body Weight");
    assert_eq!(records.rows()[0][1], CellValue::Float(80.5));
    assert_eq!(records.rows()[0][2], CellValue::Int(18));
    assert!(records.rows()[1][4].is_empty());

    // The cached token serves the second read.
    sheets.get_all_records("Body Metrics").await.unwrap();
}

#[tokio::test]
async fn spreadsheet_listing_follows_page_tokens() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "sheet-2", "name": "Old Log" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "mimeType='application/vnd.google-apps.spreadsheet'"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "sheet-1", "name": "FitSheet" }],
            "nextPageToken": "page-2"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Title("FitSheet".to_string()));
    let files = sheets.list_spreadsheets().await.unwrap();

    assert_eq!(
        files,
        vec![
            SpreadsheetFile { id: "sheet-1".into(), name: "FitSheet".into() },
            SpreadsheetFile { id: "sheet-2".into(), name: "Old Log".into() },
        ]
    );
}

#[tokio::test]
async fn spreadsheet_is_opened_by_title() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            "mimeType='application/vnd.google-apps.spreadsheet' and name = 'FitSheet'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "sheet-9", "name": "FitSheet" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-9/values/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["Date", "Exercise", "Sets", "Reps", "Weight (kg)"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Title("FitSheet".to_string()));
    let records = sheets.get_all_records("Workout Log").await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn missing_title_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Title("FitSheet".to_string()));
    let err = sheets.get_all_records("Workout Log").await.unwrap_err();
    assert!(matches!(err, SheetsError::SpreadsheetNotFound(title) if title == "FitSheet"));
}

#[tokio::test]
async fn api_errors_carry_status_and_google_message() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-1/values/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Unable to parse range: 'Nope'",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Id("sheet-1".to_string()));
    let err = sheets.get_all_records("Nope").await.unwrap_err();
    match err {
        SheetsError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Unable to parse range: 'Nope'");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn rejected_assertion_fails_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let sheets = client(&server, SpreadsheetRef::Id("sheet-1".to_string()));
    let err = sheets.append_row("Workout Log", vec![CellValue::from("x")]).await.unwrap_err();
    assert!(matches!(
        err,
        SheetsError::Api { status: 400, ref message } if message == "Invalid JWT Signature."
    ));
}
