//! Graph sources: where job stage graphs come from

pub mod json;
pub mod memory;
pub mod parquet;
pub mod source;

pub use json::JsonStageSource;
pub use memory::InMemorySource;
pub use parquet::ParquetStageSource;
pub use source::{GraphSource, JobId, SourceError};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// On-disk layout of a stage-link file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    Parquet,
    Json,
}

impl SourceFormat {
    /// Guess the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "parquet" | "pq" => Some(Self::Parquet),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown source format '{}'", other)),
        }
    }
}

/// Open a file-backed source; the returned value owns the underlying data
pub fn open_source(
    path: &Path,
    format: Option<SourceFormat>,
) -> Result<Box<dyn GraphSource>, SourceError> {
    let format = format
        .or_else(|| SourceFormat::from_path(path))
        .ok_or_else(|| {
            SourceError::Unavailable(format!(
                "cannot infer the format of {}; pass it explicitly",
                path.display()
            ))
        })?;

    Ok(match format {
        SourceFormat::Parquet => Box::new(ParquetStageSource::open(path)?),
        SourceFormat::Json => Box::new(JsonStageSource::open(path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_inference() {
        assert_eq!(SourceFormat::from_path(Path::new("runs/links.parquet")), Some(SourceFormat::Parquet));
        assert_eq!(SourceFormat::from_path(Path::new("jobs.JSON")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("jobs.csv")), None);
        assert_eq!("json".parse::<SourceFormat>(), Ok(SourceFormat::Json));
    }

    #[test]
    fn unknown_extension_without_format_is_unavailable() {
        assert!(matches!(
            open_source(Path::new("jobs.csv"), None),
            Err(SourceError::Unavailable(_))
        ));
    }
}
