// src/catalog/models.rs
use serde::Serialize;
use std::fmt;

pub const DEFAULT_INDEX_URL: &str = "https://catalog.ucsd.edu/front/courses.html#jsoe";
pub const DEFAULT_COURSES_URL: &str = "https://catalog.ucsd.edu/courses/";

/// Location of the catalog: the front index page and the directory holding
/// one `<CODE>.html` listing per department.
#[derive(Debug, Clone)]
pub struct CatalogSite {
    pub index_url: String,
    pub courses_url: String,
}

impl Default for CatalogSite {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            courses_url: DEFAULT_COURSES_URL.to_string(),
        }
    }
}

impl CatalogSite {
    /// Constructs the URL of a department's course listing page
    pub fn department_url(&self, department: &DepartmentCode) -> String {
        let base = self.courses_url.trim_end_matches('/');
        format!("{}/{}.html", base, department)
    }
}

/// Uppercase subject identifier such as `CSE` or `MATH`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartmentCode(String);

impl DepartmentCode {
    /// Accepts one or more ASCII uppercase letters, nothing else.
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_uppercase()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog entry as extracted from a department page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    pub code: String,          // e.g., "CSE 101"
    pub name: String,          // e.g., "Design and Analysis of Algorithms"
    pub units: String,         // single digit, kept as text
    pub description: String,
    pub prerequisites: String, // empty when the description had no marker
}
