// src/extractors/mod.rs
pub mod courses;
pub mod departments;

// Re-export key extraction types for convenience
pub use courses::{CourseExtractor, PatternHeaderRule};
