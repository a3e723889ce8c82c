use crate::error::{ClientError, ClientResult};
use std::fs;
use std::path::Path;

const ALLOWED_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];
pub const INVALID_FILE_TYPE_MESSAGE: &str = "Please select an Excel file (.xlsx or .xls)";

/// Extension check on the file name only; the content is never sniffed.
pub fn is_excel_file_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

pub fn validate_file_name(name: &str) -> ClientResult<()> {
    if is_excel_file_name(name) {
        Ok(())
    } else {
        Err(ClientError::validation(INVALID_FILE_TYPE_MESSAGE))
    }
}

/// Human readable size, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// A file accepted by intake and held in memory until it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    bytes: Vec<u8>,
}

impl StagedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> ClientResult<Self> {
        let name = name.into();
        validate_file_name(&name)?;
        Ok(Self {
            name,
            bytes,
        })
    }

    /// Validates the name before touching the disk.
    pub fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        validate_file_name(&name)?;
        let bytes = fs::read(path)
            .map_err(|e| ClientError::Storage(format!("read {}: {e}", path.display())))?;
        Ok(Self {
            name,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Text shown in place of the drop area once a file is staged.
    pub fn descriptor(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size()))
    }
}
