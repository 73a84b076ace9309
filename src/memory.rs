//! A sheet store that keeps its tabs in process memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::SheetsError;
use crate::sheets::{CellValue, Connector, Records, SheetStore};

/// An in-process spreadsheet. Cells are kept as the formatted strings the
/// real service would hand back, so reads go through the same numericising.
#[derive(Clone, Default)]
pub struct MemorySheets {
    tabs: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tab whose first row is `header`.
    pub fn with_tab(self, name: &str, header: &[&str]) -> Self {
        self.lock().insert(
            name.to_string(),
            vec![header.iter().map(|h| h.to_string()).collect()],
        );
        self
    }

    /// Adds a tab with no rows at all.
    pub fn with_blank_tab(self, name: &str) -> Self {
        self.lock().insert(name.to_string(), Vec::new());
        self
    }

    /// Appends a row of already formatted cells.
    pub fn push_raw(&self, tab: &str, row: &[&str]) {
        if let Some(grid) = self.lock().get_mut(tab) {
            grid.push(row.iter().map(|c| c.to_string()).collect());
        }
    }

    /// Every row of the tab, header included.
    pub fn grid(&self, tab: &str) -> Option<Vec<Vec<String>>> {
        self.lock().get(tab).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Vec<String>>>> {
        self.tabs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SheetStore for MemorySheets {
    async fn append_row(&self, tab: &str, row: Vec<CellValue>) -> Result<(), SheetsError> {
        let mut tabs = self.lock();
        let grid = tabs
            .get_mut(tab)
            .ok_or_else(|| SheetsError::TabNotFound(tab.to_string()))?;
        grid.push(row.iter().map(CellValue::to_string).collect());
        Ok(())
    }

    async fn get_all_records(&self, tab: &str) -> Result<Records, SheetsError> {
        let grid = self
            .grid(tab)
            .ok_or_else(|| SheetsError::TabNotFound(tab.to_string()))?;
        Records::from_grid(grid)
    }
}

#[async_trait]
impl Connector for MemorySheets {
    async fn connect(&self) -> Result<Arc<dyn SheetStore>, SheetsError> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appended_rows_read_back_numericised() {
        let sheets = MemorySheets::new().with_tab("Log", &["Date", "Sets", "Weight"]);
        sheets
            .append_row(
                "Log",
                vec![CellValue::from("2024-05-01"), CellValue::from(3u32), CellValue::from(22.5)],
            )
            .await
            .unwrap();

        let records = sheets.get_all_records("Log").await.unwrap();
        assert_eq!(
            records.rows(),
            [vec![CellValue::Text("2024-05-01".into()), CellValue::Int(3), CellValue::Float(22.5)]]
        );
    }

    #[tokio::test]
    async fn unknown_tab_is_an_error() {
        let sheets = MemorySheets::new();
        let err = sheets.get_all_records("Nope").await.unwrap_err();
        assert!(matches!(err, SheetsError::TabNotFound(t) if t == "Nope"));
    }

    #[tokio::test]
    async fn connected_handle_shares_the_same_tabs() {
        let sheets = MemorySheets::new().with_tab("Log", &["Date"]);
        let handle = sheets.connect().await.unwrap();
        handle.append_row("Log", vec![CellValue::from("2024-05-01")]).await.unwrap();
        assert_eq!(sheets.grid("Log").unwrap().len(), 2);
    }
}
