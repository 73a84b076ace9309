//! The page sections. Each one does its own round trip to the sheet service
//! and turns any failure into a message inside the section.

use log::warn;
use serde::Serialize;

use crate::entries::DATE_COLUMN;
use crate::error::DashboardError;
use crate::frame::Frame;
use crate::graph::{GraphOptions, Series, create_line_chart, is_blank};
use crate::sheets::SheetStore;
use crate::volume::daily_volume;

/// Tab names the sections read from.
#[derive(Clone, Debug)]
pub struct Tabs {
    pub workouts: String,
    pub metrics: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl From<&Frame> for TableView {
    fn from(frame: &Frame) -> Self {
        TableView {
            headers: frame.headers().to_vec(),
            rows: frame.display_rows(),
        }
    }
}

/// One piece of rendered output, in page order.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Subheader(String),
    Table(TableView),
    /// Inline SVG markup.
    Chart(String),
    Download { csv: String, xlsx: String },
    Info(String),
    Error(String),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Section {
    pub header: String,
    pub blocks: Vec<Block>,
}

impl Section {
    fn new(header: &str) -> Self {
        Section {
            header: header.to_string(),
            blocks: Vec::new(),
        }
    }

    /// Blocks pushed before a failure stay; the failure is appended after them.
    fn fail(&mut self, prefix: &str, err: &DashboardError) {
        warn!("{} section failed: {err}", self.header);
        self.blocks.push(Block::Error(format!("❌ {prefix}: {err}")));
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Error(e) => Some(e.as_str()),
            _ => None,
        })
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Info(i) => Some(i.as_str()),
            _ => None,
        })
    }
}

fn chart(title: &str, y_label: &str, series: &[Series]) -> Result<Block, DashboardError> {
    if is_blank(series) {
        return Ok(Block::Info("No numeric values to plot.".to_string()));
    }
    let options = GraphOptions {
        title: title.to_string(),
        y_label: y_label.to_string(),
        ..GraphOptions::default()
    };
    create_line_chart(series, &options)
        .map(Block::Chart)
        .map_err(|e| DashboardError::Chart(e.to_string()))
}

async fn fill_history(
    store: &dyn SheetStore,
    tabs: &Tabs,
    blocks: &mut Vec<Block>,
) -> Result<(), DashboardError> {
    let workouts = store.get_all_records(&tabs.workouts).await?;
    if workouts.is_empty() {
        blocks.push(Block::Info("No workout logs yet.".to_string()));
    } else {
        let mut frame = Frame::with_dates(workouts, DATE_COLUMN)?;
        frame.sort_by_date(true);
        blocks.push(Block::Subheader("🏋️ Workout Log".to_string()));
        blocks.push(Block::Table(TableView::from(&frame)));
        blocks.push(Block::Download {
            csv: "/export/workouts/csv".to_string(),
            xlsx: "/export/workouts/xlsx".to_string(),
        });
    }

    let metrics = store.get_all_records(&tabs.metrics).await?;
    if metrics.is_empty() {
        blocks.push(Block::Info("No body metrics logged yet.".to_string()));
    } else {
        let mut frame = Frame::with_dates(metrics, DATE_COLUMN)?;
        frame.sort_by_date(true);
        blocks.push(Block::Subheader("📈 Body Metrics Log".to_string()));
        blocks.push(Block::Table(TableView::from(&frame)));
        blocks.push(Block::Download {
            csv: "/export/metrics/csv".to_string(),
            xlsx: "/export/metrics/xlsx".to_string(),
        });
    }

    Ok(())
}

/// "Workout & Progress History": both tabs as tables, newest first.
pub async fn show_data_preview(store: Result<&dyn SheetStore, DashboardError>, tabs: &Tabs) -> Section {
    let mut section = Section::new("📜 Workout & Progress History");
    let result = match store {
        Ok(store) => fill_history(store, tabs, &mut section.blocks).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        section.fail("Failed to load history", &e);
    }
    section
}

async fn fill_progress(
    store: &dyn SheetStore,
    tabs: &Tabs,
    blocks: &mut Vec<Block>,
) -> Result<(), DashboardError> {
    let metrics = store.get_all_records(&tabs.metrics).await?;
    if metrics.is_empty() {
        blocks.push(Block::Info("No body metrics data to plot.".to_string()));
        return Ok(());
    }

    let mut frame = Frame::with_dates(metrics, DATE_COLUMN)?;
    frame.sort_by_date(false);

    let weight = [Series::new("Body Weight", frame.series("Body Weight")?)];
    blocks.push(Block::Subheader("📈 Body Weight Over Time".to_string()));
    blocks.push(chart("Body Weight", "kg", &weight)?);

    let composition = [
        Series::new("Muscle Mass", frame.series("Muscle Mass")?),
        Series::new("Fat Mass", frame.series("Fat Mass")?),
    ];
    blocks.push(Block::Subheader("💪 Muscle Mass & Fat Mass".to_string()));
    blocks.push(chart("Muscle Mass & Fat Mass", "kg", &composition)?);

    Ok(())
}

/// "Visualize Progress": body weight and body composition over time.
pub async fn show_progress_charts(
    store: Result<&dyn SheetStore, DashboardError>,
    tabs: &Tabs,
) -> Section {
    let mut section = Section::new("📉 Visualize Progress");
    let result = match store {
        Ok(store) => fill_progress(store, tabs, &mut section.blocks).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        section.fail("Failed to load charts", &e);
    }
    section
}

async fn fill_volume(
    store: &dyn SheetStore,
    tabs: &Tabs,
    blocks: &mut Vec<Block>,
) -> Result<(), DashboardError> {
    let workouts = store.get_all_records(&tabs.workouts).await?;
    if workouts.is_empty() {
        blocks.push(Block::Info("No workout data to plot.".to_string()));
        return Ok(());
    }

    let frame = Frame::with_dates(workouts, DATE_COLUMN)?;
    let points = daily_volume(&frame)?
        .into_iter()
        .map(|v| (v.date, v.total))
        .collect();

    blocks.push(Block::Subheader("📆 Daily Total Training Volume".to_string()));
    blocks.push(chart(
        "Daily Total Training Volume",
        "Total Volume",
        &[Series::new("Total Volume", points)],
    )?);
    Ok(())
}

/// "Workout Volume Over Time": sets x reps x weight summed per day.
pub async fn show_workout_volume_chart(
    store: Result<&dyn SheetStore, DashboardError>,
    tabs: &Tabs,
) -> Section {
    let mut section = Section::new("🏋️ Workout Volume Over Time");
    let result = match store {
        Ok(store) => fill_volume(store, tabs, &mut section.blocks).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        section.fail("Failed to load volume chart", &e);
    }
    section
}
