//! Checkbox maintenance on the counselor tracking sheets.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::SheetsConfig;
use crate::error::NotifyError;

/// One cell of the tabular store, as far as checkbox maintenance cares:
/// either already a boolean control or something that needs stamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Bool(bool),
    Text(String),
    Empty,
}

impl Cell {
    pub fn is_bool(&self) -> bool {
        matches!(self, Cell::Bool(_))
    }
}

/// Seam to the external tabular store. Rows and columns are 1-based,
/// matching how the sheets are addressed by their operators.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Last populated row, or `None` when the sheet does not exist.
    async fn last_row(&self, sheet: &str) -> Result<Option<u32>, NotifyError>;

    /// Cells of one column across `first_row..=last_row`.
    async fn read_column(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<Vec<Cell>, NotifyError>;

    /// Install unchecked boolean controls across the whole range.
    async fn insert_checkboxes(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<(), NotifyError>;
}

/// Ensure every data row of every configured sheet carries a checkbox in
/// the target column. Missing sheets are logged and skipped; a store
/// error on one sheet never aborts the remaining sheets, but the first
/// one is reported so the pipeline can alert the administrator.
pub async fn ensure_checkboxes(
    store: &dyn SheetStore,
    config: &SheetsConfig,
) -> Result<(), NotifyError> {
    let mut first_error: Option<NotifyError> = None;

    for sheet in &config.names {
        if let Err(error) = ensure_sheet(store, sheet, config).await {
            tracing::error!(sheet = %sheet, error = %error, "Checkbox maintenance failed for sheet");
            first_error.get_or_insert(error);
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => {
            tracing::info!("Checkbox setup completed for all counselor sheets");
            Ok(())
        }
    }
}

async fn ensure_sheet(
    store: &dyn SheetStore,
    sheet: &str,
    config: &SheetsConfig,
) -> Result<(), NotifyError> {
    let Some(last_row) = store.last_row(sheet).await? else {
        tracing::warn!(sheet = %sheet, "Sheet not found, skipping");
        return Ok(());
    };

    if last_row < config.first_data_row {
        tracing::debug!(sheet = %sheet, "No data rows found");
        return Ok(());
    }

    let cells = store
        .read_column(sheet, config.checkbox_column, config.first_data_row, last_row)
        .await?;

    // The whole range is re-stamped as soon as one cell needs it; the
    // original behaves the same way, so a partially stamped column loses
    // any checked state it had.
    if cells.iter().any(|cell| !cell.is_bool()) {
        store
            .insert_checkboxes(sheet, config.checkbox_column, config.first_data_row, last_row)
            .await?;
        tracing::info!(
            sheet = %sheet,
            rows = last_row - config.first_data_row + 1,
            "Added checkboxes to sheet"
        );
    } else {
        tracing::debug!(sheet = %sheet, "Checkboxes already exist");
    }

    Ok(())
}

/// In-memory workbook, used by the tests and available for dry runs.
#[derive(Default)]
pub struct MemorySheetStore {
    sheets: Mutex<BTreeMap<String, Vec<Vec<Cell>>>>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets
            .lock()
            .expect("sheet store lock poisoned")
            .insert(name.to_string(), rows);
        self
    }

    pub fn rows(&self, name: &str) -> Option<Vec<Vec<Cell>>> {
        self.sheets
            .lock()
            .expect("sheet store lock poisoned")
            .get(name)
            .cloned()
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn last_row(&self, sheet: &str) -> Result<Option<u32>, NotifyError> {
        let sheets = self.sheets.lock().expect("sheet store lock poisoned");
        Ok(sheets.get(sheet).map(|rows| rows.len() as u32))
    }

    async fn read_column(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<Vec<Cell>, NotifyError> {
        let sheets = self.sheets.lock().expect("sheet store lock poisoned");
        let rows = sheets
            .get(sheet)
            .ok_or_else(|| NotifyError::Sheet(format!("no such sheet: {sheet}")))?;

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            let cell = rows
                .get(row as usize - 1)
                .and_then(|r| r.get(column as usize - 1))
                .cloned()
                .unwrap_or(Cell::Empty);
            cells.push(cell);
        }
        Ok(cells)
    }

    async fn insert_checkboxes(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<(), NotifyError> {
        let mut sheets = self.sheets.lock().expect("sheet store lock poisoned");
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| NotifyError::Sheet(format!("no such sheet: {sheet}")))?;

        for row in first_row..=last_row {
            let row_cells = rows
                .get_mut(row as usize - 1)
                .ok_or_else(|| NotifyError::Sheet(format!("row {row} out of range")))?;
            let index = column as usize - 1;
            if row_cells.len() <= index {
                row_cells.resize(index + 1, Cell::Empty);
            }
            row_cells[index] = Cell::Bool(false);
        }
        Ok(())
    }
}

/// File-backed workbook: a JSON object of sheet name to row arrays, with
/// booleans standing in for checkbox cells. The store the CLI runs over.
pub struct JsonWorkbookStore {
    path: PathBuf,
    sheets: Mutex<BTreeMap<String, Vec<Vec<serde_json::Value>>>>,
}

impl JsonWorkbookStore {
    /// Open a workbook file; a missing file is an empty workbook.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NotifyError> {
        let path = path.as_ref().to_path_buf();
        let sheets = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| NotifyError::Sheet(format!("read {}: {e}", path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| NotifyError::Sheet(format!("parse {}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            sheets: Mutex::new(sheets),
        })
    }

    fn persist(
        &self,
        sheets: &BTreeMap<String, Vec<Vec<serde_json::Value>>>,
    ) -> Result<(), NotifyError> {
        let raw = serde_json::to_string_pretty(sheets)
            .map_err(|e| NotifyError::Sheet(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| NotifyError::Sheet(format!("write {}: {e}", self.path.display())))
    }

    fn cell_from_value(value: &serde_json::Value) -> Cell {
        match value {
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::Null => Cell::Empty,
            serde_json::Value::String(s) if s.is_empty() => Cell::Empty,
            other => Cell::Text(other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string())),
        }
    }
}

#[async_trait]
impl SheetStore for JsonWorkbookStore {
    async fn last_row(&self, sheet: &str) -> Result<Option<u32>, NotifyError> {
        let sheets = self.sheets.lock().expect("workbook lock poisoned");
        Ok(sheets.get(sheet).map(|rows| rows.len() as u32))
    }

    async fn read_column(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<Vec<Cell>, NotifyError> {
        let sheets = self.sheets.lock().expect("workbook lock poisoned");
        let rows = sheets
            .get(sheet)
            .ok_or_else(|| NotifyError::Sheet(format!("no such sheet: {sheet}")))?;

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            let cell = rows
                .get(row as usize - 1)
                .and_then(|r| r.get(column as usize - 1))
                .map(Self::cell_from_value)
                .unwrap_or(Cell::Empty);
            cells.push(cell);
        }
        Ok(cells)
    }

    async fn insert_checkboxes(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
        last_row: u32,
    ) -> Result<(), NotifyError> {
        let mut sheets = self.sheets.lock().expect("workbook lock poisoned");
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| NotifyError::Sheet(format!("no such sheet: {sheet}")))?;

        for row in first_row..=last_row {
            let row_cells = rows
                .get_mut(row as usize - 1)
                .ok_or_else(|| NotifyError::Sheet(format!("row {row} out of range")))?;
            let index = column as usize - 1;
            if row_cells.len() <= index {
                row_cells.resize(index + 1, serde_json::Value::Null);
            }
            row_cells[index] = serde_json::Value::Bool(false);
        }

        self.persist(&sheets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets_config(names: &[&str]) -> SheetsConfig {
        SheetsConfig {
            names: names.iter().map(|n| n.to_string()).collect(),
            ..SheetsConfig::default()
        }
    }

    fn data_row(name: &str) -> Vec<Cell> {
        // Columns A..K populated, column L (12) absent
        let mut row = vec![Cell::Text(name.to_string())];
        row.resize(11, Cell::Text("x".to_string()));
        row
    }

    fn header_row() -> Vec<Cell> {
        vec![Cell::Text("Timestamp".to_string())]
    }

    #[tokio::test]
    async fn test_stamps_missing_checkboxes() {
        let store = MemorySheetStore::new().with_sheet(
            "Gomez",
            vec![header_row(), data_row("Doe"), data_row("Roe")],
        );

        ensure_checkboxes(&store, &sheets_config(&["Gomez"]))
            .await
            .unwrap();

        let rows = store.rows("Gomez").unwrap();
        assert_eq!(rows[1][11], Cell::Bool(false));
        assert_eq!(rows[2][11], Cell::Bool(false));
        // Header row untouched
        assert_eq!(rows[0].len(), 1);
    }

    #[tokio::test]
    async fn test_skips_sheet_with_checkboxes_in_place() {
        let mut checked = data_row("Doe");
        checked.push(Cell::Bool(true));
        let store = MemorySheetStore::new().with_sheet("Gomez", vec![header_row(), checked]);

        ensure_checkboxes(&store, &sheets_config(&["Gomez"]))
            .await
            .unwrap();

        // Checked state survives because the range was already all-boolean
        let rows = store.rows("Gomez").unwrap();
        assert_eq!(rows[1][11], Cell::Bool(true));
    }

    #[tokio::test]
    async fn test_restamps_whole_range_when_one_cell_needs_it() {
        let mut checked = data_row("Doe");
        checked.push(Cell::Bool(true));
        let store = MemorySheetStore::new()
            .with_sheet("Gomez", vec![header_row(), checked, data_row("Roe")]);

        ensure_checkboxes(&store, &sheets_config(&["Gomez"]))
            .await
            .unwrap();

        // Whole-range re-stamp resets the previously checked cell too
        let rows = store.rows("Gomez").unwrap();
        assert_eq!(rows[1][11], Cell::Bool(false));
        assert_eq!(rows[2][11], Cell::Bool(false));
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let store = MemorySheetStore::new()
            .with_sheet("Gomez", vec![header_row(), data_row("Doe"), data_row("Roe")]);
        let config = sheets_config(&["Gomez"]);

        ensure_checkboxes(&store, &config).await.unwrap();
        let after_first = store.rows("Gomez").unwrap();

        ensure_checkboxes(&store, &config).await.unwrap();
        assert_eq!(store.rows("Gomez").unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_skipped_not_fatal() {
        let store = MemorySheetStore::new()
            .with_sheet("Gomez", vec![header_row(), data_row("Doe")]);

        ensure_checkboxes(&store, &sheets_config(&["Jempty", "Gomez"]))
            .await
            .unwrap();

        assert_eq!(store.rows("Gomez").unwrap()[1][11], Cell::Bool(false));
    }

    #[tokio::test]
    async fn test_header_only_sheet_is_skipped() {
        let store = MemorySheetStore::new().with_sheet("Gomez", vec![header_row()]);

        ensure_checkboxes(&store, &sheets_config(&["Gomez"]))
            .await
            .unwrap();

        assert_eq!(store.rows("Gomez").unwrap(), vec![header_row()]);
    }

    #[tokio::test]
    async fn test_json_workbook_roundtrip() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("sheets.json");
        std::fs::write(
            &path,
            r#"{"Gomez": [["Timestamp"], ["Doe", "John"], ["Roe", "Jane"]]}"#,
        )
        .unwrap();

        let store = JsonWorkbookStore::open(&path).unwrap();
        ensure_checkboxes(&store, &sheets_config(&["Gomez"]))
            .await
            .unwrap();

        // Reopen to confirm the stamp was persisted
        let reopened = JsonWorkbookStore::open(&path).unwrap();
        let cells = reopened.read_column("Gomez", 12, 2, 3).await.unwrap();
        assert_eq!(cells, vec![Cell::Bool(false), Cell::Bool(false)]);
    }

    #[tokio::test]
    async fn test_json_workbook_missing_file_is_empty() {
        let dir = temp_dir::TempDir::new().unwrap();
        let store = JsonWorkbookStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.last_row("Gomez").await.unwrap(), None);
    }
}
