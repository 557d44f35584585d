use crate::utils::error::Result;
use std::path::PathBuf;

/// Destination for rendered manifests.
pub trait Storage {
    /// Writes `data` under `file_name` and returns where it landed.
    fn write_file(&self, file_name: &str, data: &[u8]) -> Result<PathBuf>;
}
