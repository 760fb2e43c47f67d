//! Parquet file handling for stage-link data

use crate::data::source::{GraphSource, JobId, SourceError};
use crate::graph::{GraphBuilder, JobGraph};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const JOB_COLUMN: &str = "JobId";
pub const STAGE_COLUMN: &str = "StageId";
/// Downstream stage of a link; null rows declare a stage without links
pub const LINK_COLUMN: &str = "LinkedTo";

/// Graph source over a Parquet table of `(JobId, StageId, LinkedTo)` rows.
///
/// The table is read and checked when the source is opened and released
/// when it is dropped.
pub struct ParquetStageSource {
    path: PathBuf,
    frame: DataFrame,
    /// Jobs in first-appearance order
    jobs: Vec<JobId>,
    /// Row numbers of every job, grouped once at open time
    rows: HashMap<JobId, Vec<usize>>,
}

impl ParquetStageSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        log::info!("Reading parquet file: {}", path.display());

        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let mut lazy = LazyFrame::scan_parquet(path, Default::default())?;
        let schema = lazy.collect_schema()?;
        for column in [JOB_COLUMN, STAGE_COLUMN, LINK_COLUMN] {
            if !schema.contains(column) {
                return Err(SourceError::Schema(format!(
                    "{} has no '{}' column (found: {:?})",
                    path.display(),
                    column,
                    schema.iter_names().collect::<Vec<_>>()
                )));
            }
        }

        let frame = lazy
            .select([
                col(JOB_COLUMN).cast(DataType::String),
                col(STAGE_COLUMN).cast(DataType::String),
                col(LINK_COLUMN).cast(DataType::String),
            ])
            .collect()?;

        let (jobs, rows) = group_rows(&frame)?;
        log::info!("Loaded {} stage rows for {} jobs", frame.height(), jobs.len());

        Ok(Self {
            path: path.to_path_buf(),
            frame,
            jobs,
            rows,
        })
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }
}

type RowIndex = (Vec<JobId>, HashMap<JobId, Vec<usize>>);

/// Single pass over the job column; rows without a job id are ignored
fn group_rows(frame: &DataFrame) -> Result<RowIndex, SourceError> {
    let jobs = frame.column(JOB_COLUMN)?.str()?;

    let mut order = Vec::new();
    let mut rows: HashMap<JobId, Vec<usize>> = HashMap::new();
    for (i, job) in jobs.into_iter().enumerate() {
        if let Some(job) = job {
            let id = JobId::new(job);
            rows.entry(id.clone())
                .or_insert_with(|| {
                    order.push(id);
                    Vec::new()
                })
                .push(i);
        }
    }
    Ok((order, rows))
}

impl GraphSource for ParquetStageSource {
    fn list_job_ids(&self) -> Result<Vec<JobId>, SourceError> {
        Ok(self.jobs.clone())
    }

    fn load_graph(&self, job: &JobId) -> Result<JobGraph, SourceError> {
        let rows = self
            .rows
            .get(job)
            .ok_or_else(|| SourceError::UnknownJob(job.clone()))?;

        let stages = self.frame.column(STAGE_COLUMN)?.str()?;
        let links = self.frame.column(LINK_COLUMN)?.str()?;

        let mut builder = GraphBuilder::with_capacity(rows.len());
        let mut skipped = 0;
        for &i in rows {
            match (stages.get(i), links.get(i)) {
                (Some(src), Some(dst)) => builder.add_edge(src, dst),
                (Some(src), None) => {
                    builder.add_stage(src);
                }
                (None, _) => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("Job {}: skipped {} rows without a stage id", job, skipped);
        }

        Ok(builder.build())
    }
}

impl Drop for ParquetStageSource {
    fn drop(&mut self) {
        log::debug!("Closing stage source {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(frame: &mut DataFrame) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        ParquetWriter::new(file.reopen().unwrap()).finish(frame).unwrap();
        file
    }

    #[test]
    fn loads_interleaved_jobs_in_file_order() {
        let mut frame = df!(
            JOB_COLUMN => &["j2", "j1", "j2", "j3"],
            STAGE_COLUMN => &["1", "a", "2", "solo"],
            LINK_COLUMN => &[Some("2"), Some("b"), Some("3"), None::<&str>]
        )
        .unwrap();
        let file = write_fixture(&mut frame);

        let source = ParquetStageSource::open(file.path()).unwrap();
        assert_eq!(source.row_count(), 4);
        assert_eq!(
            source.list_job_ids().unwrap(),
            vec![JobId::new("j2"), JobId::new("j1"), JobId::new("j3")]
        );

        let j2 = source.load_graph(&JobId::new("j2")).unwrap();
        assert_eq!((j2.node_count(), j2.edge_count()), (3, 2));

        let j3 = source.load_graph(&JobId::new("j3")).unwrap();
        assert_eq!((j3.node_count(), j3.edge_count()), (1, 0));

        assert!(matches!(
            source.load_graph(&JobId::new("missing")),
            Err(SourceError::UnknownJob(_))
        ));
    }

    #[test]
    fn integer_stage_ids_are_accepted() {
        let mut frame = df!(
            JOB_COLUMN => &[7i64, 7],
            STAGE_COLUMN => &[1i64, 2],
            LINK_COLUMN => &[Some(2i64), Some(3)]
        )
        .unwrap();
        let file = write_fixture(&mut frame);

        let source = ParquetStageSource::open(file.path()).unwrap();
        let job = source.list_job_ids().unwrap().remove(0);
        assert_eq!(job.as_str(), "7");
        assert_eq!(source.load_graph(&job).unwrap().edge_count(), 2);
    }

    #[test]
    fn missing_columns_are_a_schema_error() {
        let mut frame = df!("job" => &["1"], "stage" => &["2"]).unwrap();
        let file = write_fixture(&mut frame);

        assert!(matches!(
            ParquetStageSource::open(file.path()),
            Err(SourceError::Schema(_))
        ));
    }
}
