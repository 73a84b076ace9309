//! HTTP routes, shared application state and the memoized sheet client.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use handlebars::{Handlebars, TemplateError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tower_http::services::ServeDir;

use crate::config::Settings;
use crate::dashboard::{
    Section, Tabs, show_data_preview, show_progress_charts, show_workout_volume_chart,
};
use crate::downloader::{to_csv, to_xlsx};
use crate::entries::{BodyMetricEntry, MetricsForm, WorkoutEntry, WorkoutForm};
use crate::error::{DashboardError, SheetsError};
use crate::google::GoogleConnector;
use crate::sheets::{CellValue, Connector, SheetStore};

const DASHBOARD_TEMPLATE: &str = "dashboard";

pub struct AppState {
    settings: Settings,
    connector: Box<dyn Connector>,
    client: OnceCell<Arc<dyn SheetStore>>,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(settings: Settings, connector: Box<dyn Connector>) -> Result<Self, TemplateError> {
        let mut templates = Handlebars::new();
        templates.register_template_string(
            DASHBOARD_TEMPLATE,
            include_str!("./templates/dashboard.hbs"),
        )?;

        Ok(AppState {
            settings,
            connector,
            client: OnceCell::new(),
            templates,
        })
    }

    /// The memoized sheet client. A failed initialization is not stored, so
    /// the next request tries again.
    pub async fn client(&self) -> Result<Arc<dyn SheetStore>, SheetsError> {
        self.client
            .get_or_try_init(|| self.connector.connect())
            .await
            .cloned()
    }

    fn tabs(&self) -> Tabs {
        Tabs {
            workouts: self.settings.workout_tab.clone(),
            metrics: self.settings.metrics_tab.clone(),
        }
    }

    async fn append(&self, tab: &str, row: Vec<CellValue>) -> Result<(), SheetsError> {
        self.client().await?.append_row(tab, row).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    workout_notice: Option<String>,
    workout_error: Option<String>,
    metrics_notice: Option<String>,
    metrics_error: Option<String>,
}

#[derive(Serialize)]
struct FormFeedback {
    notice: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct DashboardPage {
    title: &'static str,
    caption: &'static str,
    footer: &'static str,
    today: String,
    workout: FormFeedback,
    metrics: FormFeedback,
    sections: Vec<Section>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/workouts", post(log_workout))
        .route("/metrics", post(log_metrics))
        .route("/export/:dataset/:format", get(export_tab))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}

pub async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let connector = GoogleConnector {
        credentials: settings.credentials.clone(),
        spreadsheet: settings.spreadsheet(),
    };
    let bind = settings.bind;
    let app_state = Arc::new(AppState::new(settings, Box::new(connector))?);

    let app = router(app_state);

    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{bind}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn store_ref(
    client: &Result<Arc<dyn SheetStore>, SheetsError>,
) -> Result<&dyn SheetStore, DashboardError> {
    client
        .as_deref()
        .map_err(|e| DashboardError::Unavailable(e.to_string()))
}

async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let tabs = state.tabs();
    let client = state.client().await;

    let sections = vec![
        show_data_preview(store_ref(&client), &tabs).await,
        show_progress_charts(store_ref(&client), &tabs).await,
        show_workout_volume_chart(store_ref(&client), &tabs).await,
    ];

    let page = DashboardPage {
        title: "🏋️‍♂️ FitSheet – Fitness Tracker",
        caption: "Track your workouts and body metrics easily, synced to Google Sheets.",
        footer: "Made with 💪 using Rust, axum & Google Sheets",
        today: chrono::Local::now().date_naive().to_string(),
        workout: FormFeedback {
            notice: query.workout_notice,
            error: query.workout_error,
        },
        metrics: FormFeedback {
            notice: query.metrics_notice,
            error: query.metrics_error,
        },
        sections,
    };

    match state.templates.render(DASHBOARD_TEMPLATE, &page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render dashboard: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render dashboard").into_response()
        }
    }
}

/// Back to the dashboard with a message for the form identified by `anchor`.
fn back_to_form(key: &str, anchor: &str, message: &str) -> Redirect {
    Redirect::to(&format!(
        "/?{key}={}#{anchor}",
        urlencoding::encode(message)
    ))
}

async fn log_workout(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WorkoutForm>,
) -> Redirect {
    let entry = match WorkoutEntry::try_from(form) {
        Ok(entry) => entry,
        Err(e) => return back_to_form("workout_error", "log-workout", &format!("❌ {e}")),
    };

    match state.append(&state.settings.workout_tab, entry.to_row()).await {
        Ok(()) => back_to_form(
            "workout_notice",
            "log-workout",
            &format!("✅ Workout logged: {}", entry.summary()),
        ),
        Err(e) => {
            error!("Failed to log workout: {e}");
            back_to_form(
                "workout_error",
                "log-workout",
                &format!("❌ Failed to log workout: {e}"),
            )
        }
    }
}

async fn log_metrics(
    State(state): State<Arc<AppState>>,
    Form(form): Form<MetricsForm>,
) -> Redirect {
    let entry = match BodyMetricEntry::try_from(form) {
        Ok(entry) => entry,
        Err(e) => return back_to_form("metrics_error", "track-metrics", &format!("❌ {e}")),
    };

    match state.append(&state.settings.metrics_tab, entry.to_row()).await {
        Ok(()) => back_to_form(
            "metrics_notice",
            "track-metrics",
            "✅ Body metrics logged successfully.",
        ),
        Err(e) => {
            error!("Failed to log body metrics: {e}");
            back_to_form(
                "metrics_error",
                "track-metrics",
                &format!("❌ Failed to log body metrics: {e}"),
            )
        }
    }
}

async fn export_tab(
    State(state): State<Arc<AppState>>,
    Path((dataset, format)): Path<(String, String)>,
) -> Response {
    let tab = match dataset.as_str() {
        "workouts" => state.settings.workout_tab.as_str(),
        "metrics" => state.settings.metrics_tab.as_str(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let content_type = match format.as_str() {
        "csv" => "text/csv; charset=utf-8",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let records = match state.client().await {
        Ok(client) => client.get_all_records(tab).await,
        Err(e) => Err(e),
    };
    let records = match records {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to export '{tab}': {e}");
            return (
                StatusCode::BAD_GATEWAY,
                format!("❌ Failed to export {tab}: {e}"),
            )
                .into_response();
        }
    };

    let body = if format == "csv" {
        to_csv(&records).into_bytes()
    } else {
        match to_xlsx(&records, tab) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to build workbook for '{tab}': {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        }
    };

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{dataset}.{format}\""),
        ),
    ];
    (headers, body).into_response()
}
