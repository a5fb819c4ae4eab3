// src/extractors/courses.rs

// --- Imports ---
use crate::catalog::models::{CourseRecord, DepartmentCode};
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- Markup Shape ---
pub const COURSE_HEADER_SELECTOR: &str = "p.course-name";
pub const COURSE_DESCRIPTION_SELECTOR: &str = "p.course-descriptions";

const PREREQUISITES_MARKER: &str = "Prerequisites:";

// --- Header Pattern ---
// "<DEPT> <number>. <title> (<units>)", anchored at the start of the header text.
// Course numbers may carry a letter suffix ("8A", "198R").
pub const DEFAULT_HEADER_PATTERN: &str = r"^([A-Z]+\s+\d+[A-Z]*)\.\s*(.*?)\s*\((\d)\)";

static DEFAULT_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_HEADER_PATTERN).expect("Failed to compile DEFAULT_HEADER_RE")
});

/// The three fields a course header carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseHeader {
    pub code: String,
    pub name: String,
    pub units: String,
}

/// Decides whether a header's text is a course of `department` and, if so,
/// splits it into its fields.
pub trait HeaderRule: Send + Sync {
    fn parse(&self, department: &DepartmentCode, text: &str) -> Option<CourseHeader>;
}

/// Regex-driven header rule. The pattern must expose three groups:
/// code, name and units. The first word of the code must equal the
/// department being processed.
#[derive(Debug, Clone)]
pub struct PatternHeaderRule {
    pattern: Regex,
}

impl PatternHeaderRule {
    pub fn new(pattern: &str) -> Result<Self, ExtractError> {
        let pattern = Regex::new(pattern).map_err(|e| ExtractError::Pattern(e.to_string()))?;
        // captures_len counts the implicit whole-match group
        if pattern.captures_len() < 4 {
            return Err(ExtractError::Pattern(format!(
                "'{}' needs three capture groups (code, name, units)",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }
}

impl Default for PatternHeaderRule {
    fn default() -> Self {
        Self { pattern: DEFAULT_HEADER_RE.clone() }
    }
}

impl HeaderRule for PatternHeaderRule {
    fn parse(&self, department: &DepartmentCode, text: &str) -> Option<CourseHeader> {
        let caps = self.pattern.captures(text)?;
        let code = caps.get(1)?.as_str().trim();
        if code.split_whitespace().next() != Some(department.as_str()) {
            return None;
        }
        Some(CourseHeader {
            code: code.to_string(),
            name: caps.get(2)?.as_str().trim().to_string(),
            units: caps.get(3)?.as_str().to_string(),
        })
    }
}

// --- Extractor ---
pub struct CourseExtractor {
    header_selector: Selector,
    description_selector: Selector,
    rule: Box<dyn HeaderRule>,
}

impl Default for CourseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseExtractor {
    /// Extractor for the catalog's `p.course-name` / `p.course-descriptions` markup.
    pub fn new() -> Self {
        Self {
            header_selector: Selector::parse(COURSE_HEADER_SELECTOR)
                .expect("Failed to compile COURSE_HEADER_SELECTOR"),
            description_selector: Selector::parse(COURSE_DESCRIPTION_SELECTOR)
                .expect("Failed to compile COURSE_DESCRIPTION_SELECTOR"),
            rule: Box::new(PatternHeaderRule::default()),
        }
    }

    /// Replaces the CSS selectors used to find headers and descriptions.
    pub fn with_selectors(mut self, header: &str, description: &str) -> Result<Self, ExtractError> {
        self.header_selector = Selector::parse(header)
            .map_err(|_| ExtractError::Selector(header.to_string()))?;
        self.description_selector = Selector::parse(description)
            .map_err(|_| ExtractError::Selector(description.to_string()))?;
        Ok(self)
    }

    /// Replaces the header matching rule.
    pub fn with_rule(mut self, rule: impl HeaderRule + 'static) -> Self {
        self.rule = Box::new(rule);
        self
    }

    /// Extracts every course of `department` from its listing page, in document order.
    /// Headers the rule rejects are skipped.
    pub fn extract(&self, html_content: &str, department: &DepartmentCode) -> Vec<CourseRecord> {
        let document = Html::parse_document(html_content);
        let mut courses = Vec::new();

        for header in document.select(&self.header_selector) {
            let header_text = clean_text(header);
            let Some(CourseHeader { code, name, units }) = self.rule.parse(department, &header_text) else {
                tracing::trace!("Skipping header that is not a {} course: '{}'", department, header_text);
                continue;
            };

            let raw_description = self
                .find_description(header)
                .map(clean_text)
                .unwrap_or_default();
            let (description, prerequisites) = split_prerequisites(&raw_description);

            courses.push(CourseRecord {
                code,
                name,
                units,
                description,
                prerequisites,
            });
        }

        tracing::debug!("Extracted {} courses for {}", courses.len(), department);
        courses
    }

    /// The description belonging to `header`: the first description element
    /// among its following siblings, before the next header.
    /// The walk never leaves the header's own block, so a course without a
    /// description is not credited with the next course's text.
    fn find_description<'a>(&self, header: ElementRef<'a>) -> Option<ElementRef<'a>> {
        for sibling in header.next_siblings().filter_map(ElementRef::wrap) {
            if self.header_selector.matches(&sibling) {
                return None;
            }
            if self.description_selector.matches(&sibling) {
                return Some(sibling);
            }
        }
        None
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
fn clean_text(element: ElementRef) -> String {
    let text = element.text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits on the first prerequisites marker into (description, prerequisites).
fn split_prerequisites(raw: &str) -> (String, String) {
    match raw.split_once(PREREQUISITES_MARKER) {
        Some((description, prerequisites)) => {
            (description.trim().to_string(), prerequisites.trim().to_string())
        }
        None => (raw.trim().to_string(), String::new()),
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn dept(code: &str) -> DepartmentCode {
        DepartmentCode::parse(code).unwrap()
    }

    #[test]
    fn extracts_header_and_description() {
        let html = r#"
            <html><body>
            <p class="course-name">CSE 8A. Intro to programming (4)</p>
            <p class="course-descriptions">Basic programming concepts. Prerequisites: none.</p>
            </body></html>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses, vec![CourseRecord {
            code: "CSE 8A".to_string(),
            name: "Intro to programming".to_string(),
            units: "4".to_string(),
            description: "Basic programming concepts.".to_string(),
            prerequisites: "none.".to_string(),
        }]);
    }

    #[test]
    fn missing_description_yields_empty_fields() {
        let html = r#"<body><div><p class="course-name">CSE 101. Design and Analysis of Algorithms (4)</p></div></body>"#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "Design and Analysis of Algorithms");
        assert_eq!(courses[0].description, "");
        assert_eq!(courses[0].prerequisites, "");
    }

    #[test]
    fn description_without_marker_keeps_full_text() {
        let html = r#"
            <p class="course-name">MATH 20A. Calculus for Science and Engineering (4)</p>
            <p class="course-descriptions">
                Foundations of differential and integral calculus.
            </p>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("MATH"));
        assert_eq!(courses[0].description, "Foundations of differential and integral calculus.");
        assert_eq!(courses[0].prerequisites, "");
    }

    #[test]
    fn only_first_marker_splits() {
        let (description, prerequisites) =
            split_prerequisites("Topics. Prerequisites: CSE 12. Prerequisites: waived by consent.");
        assert_eq!(description, "Topics.");
        assert_eq!(prerequisites, "CSE 12. Prerequisites: waived by consent.");
    }

    #[test]
    fn non_matching_headers_are_skipped_in_document_order() {
        let html = r#"
            <body>
            <p class="course-name">CSE 11. Accelerated Intro to Programming (4)</p>
            <p class="course-descriptions">Fast-paced. Prerequisites: AP CS.</p>
            <p class="course-name">CSE 199. Independent Study (2-4)</p>
            <p class="course-descriptions">Independent reading.</p>
            <p class="course-name">CSE 12. Basic Data Structures (4)</p>
            <p class="course-descriptions">Lists, trees.</p>
            </body>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["CSE 11", "CSE 12"]);
        assert_eq!(courses[0].prerequisites, "AP CS.");
        assert_eq!(courses[1].description, "Lists, trees.");
    }

    #[test]
    fn headers_of_other_departments_are_skipped() {
        let html = r#"
            <p class="course-name">MATH 18. Linear Algebra (4)</p>
            <p class="course-name">CSES 1. Not CSE (4)</p>
            <p class="course-name">CSE 20. Discrete Mathematics (4)</p>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code, "CSE 20");
    }

    #[test]
    fn description_is_not_borrowed_from_next_course() {
        let html = r#"
            <p class="course-name">CSE 3. Fluency in Information Technology (4)</p>
            <p class="course-name">CSE 4GS. Mathematical Beauty in Rome (4)</p>
            <p class="course-descriptions">Exploration of topics in mathematics.</p>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses[0].description, "");
        assert_eq!(courses[1].code, "CSE 4GS");
        assert_eq!(courses[1].description, "Exploration of topics in mathematics.");
    }

    #[test]
    fn description_found_past_unrelated_siblings() {
        let html = r#"
            <p class="course-name">CSE 30. Computer Organization (4)</p>
            <p class="anchor-parent"><a id="cse30"></a></p>
            <p class="course-descriptions">Introduction to assembly. Prerequisites: <a href="x">CSE 15L</a> or <a href="y">CSE 29</a>.</p>
        "#;
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses[0].description, "Introduction to assembly.");
        assert_eq!(courses[0].prerequisites, "CSE 15L or CSE 29.");
    }

    #[test]
    fn header_whitespace_is_normalised() {
        let html = "<p class=\"course-name\">\n  CSE\u{a0}100.\n   Advanced   Data Structures\n (4)\n</p>";
        let courses = CourseExtractor::new().extract(html, &dept("CSE"));
        assert_eq!(courses[0].code, "CSE 100");
        assert_eq!(courses[0].name, "Advanced Data Structures");
    }

    #[test]
    fn custom_selectors_and_rule() {
        let html = r#"
            <h4 class="title">BILD 1 - The Cell [4]</h4>
            <div class="desc">Cell structure.</div>
        "#;
        let rule = PatternHeaderRule::new(r"^([A-Z]+\s+\d+)\s*-\s*(.*?)\s*\[(\d)\]").unwrap();
        let extractor = CourseExtractor::new()
            .with_selectors("h4.title", "div.desc")
            .unwrap()
            .with_rule(rule);
        let courses = extractor.extract(html, &dept("BILD"));
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "The Cell");
        assert_eq!(courses[0].units, "4");
        assert_eq!(courses[0].description, "Cell structure.");
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        assert!(matches!(PatternHeaderRule::new(r"^(\w+)"), Err(ExtractError::Pattern(_))));
        assert!(matches!(PatternHeaderRule::new(r"(unclosed"), Err(ExtractError::Pattern(_))));
        assert!(matches!(
            CourseExtractor::new().with_selectors("p..bad", "p"),
            Err(ExtractError::Selector(_))
        ));
    }
}
