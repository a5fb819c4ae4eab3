// src/extractors/departments.rs
use crate::catalog::models::DepartmentCode;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to compile LINK_SELECTOR")
});

// Whole-href match: a sibling `courses` directory entry and nothing else.
static DEPARTMENT_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\.\./courses/([A-Z]+)\.html$").expect("Failed to compile DEPARTMENT_HREF_RE")
});

/// Collects the departments linked from the catalog index page,
/// deduplicated and sorted ascending.
pub fn extract_department_codes(html_content: &str) -> Vec<DepartmentCode> {
    let document = Html::parse_document(html_content);

    let codes: BTreeSet<DepartmentCode> = document
        .select(&LINK_SELECTOR)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| DEPARTMENT_HREF_RE.captures(href))
        .filter_map(|caps| DepartmentCode::parse(&caps[1]))
        .collect();

    tracing::debug!("Index page links {} departments", codes.len());
    codes.into_iter().collect()
}
