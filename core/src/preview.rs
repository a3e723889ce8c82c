use crate::model::PreviewResponse;
use crate::render::escape_text;
use serde::Serialize;

pub const EMPTY_CELL_LABEL: &str = "(Empty cell)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    pub label: String,
    pub text: String,
    pub is_empty: bool,
}

/// Summary block plus row listing for a staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewView {
    pub filename: String,
    pub total_rows: u32,
    pub non_empty_rows: usize,
    pub empty_rows: usize,
    pub truncation_notice: Option<String>,
    pub rows: Vec<PreviewLine>,
}

impl PreviewView {
    /// Counts cover the returned rows only; `total_rows` is the server's figure.
    pub fn from_response(response: &PreviewResponse) -> Self {
        let empty_rows = response.content.iter().filter(|row| row.is_empty).count();
        let non_empty_rows = response.content.len() - empty_rows;
        let shown = response.content.len();
        let truncation_notice = (response.total_rows as usize > shown)
            .then(|| format!("Showing first {shown} rows for preview"));

        let rows = response
            .content
            .iter()
            .map(|row| PreviewLine {
                label: format!("Row {}", row.row),
                text: if row.is_empty {
                    EMPTY_CELL_LABEL.to_string()
                } else {
                    escape_text(&row.text)
                },
                is_empty: row.is_empty,
            })
            .collect();

        Self {
            filename: response.filename.clone(),
            total_rows: response.total_rows,
            non_empty_rows,
            empty_rows,
            truncation_notice,
            rows,
        }
    }
}
