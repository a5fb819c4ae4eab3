// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::catalog::models::{CourseRecord, DepartmentCode};
use crate::runner::RunReport;
use crate::utils::error::StorageError;

const COURSE_COLUMNS: [&str; 6] = ["index", "code", "name", "units", "description", "prerequisites"];
const SUMMARY_FILENAME: &str = "scrape_summary.json";

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Path of a department's course table: `<base>/<CODE>_courses.csv`
    pub fn courses_path(&self, department: &DepartmentCode) -> PathBuf {
        self.base_dir.join(format!("{}_courses.csv", department))
    }

    /// Writes a department's courses, replacing any previous file.
    /// The header row is written even when there are no courses.
    pub fn save_courses(
        &self,
        department: &DepartmentCode,
        courses: &[CourseRecord],
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.courses_path(department);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&file_path)?;
        writer.write_record(COURSE_COLUMNS)?;

        for (index, course) in courses.iter().enumerate() {
            // index column first, then the record's fields in declaration order
            writer.serialize((index, course))?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} rows to {}", courses.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves the outcome of a run in JSON format
    pub fn save_run_summary(&self, report: &RunReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(SUMMARY_FILENAME);

        let completed: Vec<_> = report.completed.iter()
            .map(|outcome| serde_json::json!({
                "department": outcome.department.as_str(),
                "courses": outcome.courses,
                "path": outcome.path.display().to_string(),
            }))
            .collect();
        let failed: Vec<_> = report.failed.iter()
            .map(|failure| serde_json::json!({
                "department": failure.department.as_str(),
                "error": failure.error,
            }))
            .collect();

        let summary = serde_json::json!({
            "finished_at": chrono::Utc::now().to_rfc3339(),
            "total_courses": report.total_courses(),
            "completed": completed,
            "failed": failed,
        });

        let summary_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, summary_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved run summary to {}", file_path.display());

        Ok(file_path)
    }
}

#[cfg(test)]
impl StorageManager {
    /// Reads a department's course table back in file order, dropping the index column.
    pub fn load_courses(&self, department: &DepartmentCode) -> Result<Vec<CourseRecord>, StorageError> {
        let mut reader = csv::Reader::from_path(self.courses_path(department))?;

        let mut courses = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |i: usize| row.get(i).unwrap_or_default().to_string();
            courses.push(CourseRecord {
                code: field(1),
                name: field(2),
                units: field(3),
                description: field(4),
                prerequisites: field(5),
            });
        }
        Ok(courses)
    }
}
