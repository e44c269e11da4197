#![allow(dead_code, unused_imports)]

pub use genflow_test_utils::{init_tracing, with_timeout};

/// Shared result object used across the integration tests: the artifact
/// document a generation run fills in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDoc {
    pub slides: Vec<String>,
    pub quiz_questions: Vec<String>,
    pub study_sections: Vec<String>,
    pub summary: Option<String>,
    pub notes: Vec<String>,
}
