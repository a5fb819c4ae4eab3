// src/runner.rs
use std::path::PathBuf;

use crate::catalog::client::Fetcher;
use crate::catalog::models::{CatalogSite, DepartmentCode};
use crate::extractors::courses::CourseExtractor;
use crate::extractors::departments::extract_department_codes;
use crate::storage::StorageManager;
use crate::utils::error::AppError;

/// What to do when one department cannot be fetched or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next department.
    #[default]
    Continue,
    /// Abort the whole run on the first failure.
    FailFast,
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub site: CatalogSite,
    /// Restricts the run to these departments; empty means all.
    pub only: Vec<DepartmentCode>,
    pub policy: FailurePolicy,
}

#[derive(Debug, Clone)]
pub struct DepartmentOutcome {
    pub department: DepartmentCode,
    pub courses: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DepartmentFailure {
    pub department: DepartmentCode,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub completed: Vec<DepartmentOutcome>,
    pub failed: Vec<DepartmentFailure>,
}

impl RunReport {
    pub fn total_courses(&self) -> usize {
        self.completed.iter().map(|o| o.courses).sum()
    }
}

pub struct Runner<'a, F: Fetcher> {
    fetcher: &'a F,
    extractor: &'a CourseExtractor,
    storage: &'a StorageManager,
    config: RunConfig,
}

impl<'a, F: Fetcher> Runner<'a, F> {
    pub fn new(
        fetcher: &'a F,
        extractor: &'a CourseExtractor,
        storage: &'a StorageManager,
        config: RunConfig,
    ) -> Self {
        Self { fetcher, extractor, storage, config }
    }

    /// Scrapes the index and then every selected department, one at a time.
    /// A failed index fetch is always fatal.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        tracing::info!("Fetching catalog index: {}", self.config.site.index_url);
        let index_html = self.fetcher.fetch(&self.config.site.index_url).await?;

        let mut departments = extract_department_codes(&index_html);
        tracing::info!("Found {} departments with course listings", departments.len());

        if !self.config.only.is_empty() {
            for wanted in &self.config.only {
                if !departments.contains(wanted) {
                    tracing::warn!("Department {} is not listed in the catalog index", wanted);
                }
            }
            departments.retain(|d| self.config.only.contains(d));
        }

        let mut report = RunReport::default();
        for department in departments {
            match self.scrape_department(&department).await {
                Ok(outcome) => {
                    tracing::info!("Created {} ({} courses)", outcome.path.display(), outcome.courses);
                    report.completed.push(outcome);
                }
                Err(e) => {
                    tracing::error!("Failed to scrape {}: {}", department, e);
                    if self.config.policy == FailurePolicy::FailFast {
                        return Err(e);
                    }
                    report.failed.push(DepartmentFailure {
                        department,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Processing finished. Departments: {}, Failures: {}, Courses: {}",
            report.completed.len(),
            report.failed.len(),
            report.total_courses()
        );
        Ok(report)
    }

    /// Fetch, extract and write a single department.
    async fn scrape_department(&self, department: &DepartmentCode) -> Result<DepartmentOutcome, AppError> {
        let url = self.config.site.department_url(department);
        let html = self.fetcher.fetch(&url).await?;

        let courses = self.extractor.extract(&html, department);
        let path = self.storage.save_courses(department, &courses)?;

        Ok(DepartmentOutcome {
            department: department.clone(),
            courses: courses.len(),
            path,
        })
    }
}
