pub mod narrator;
pub mod prompts;
pub mod report;

pub use narrator::{NarrativeOutcome, Narrator};
pub use report::{parse_report, Category, Report, NO_DIFFERENCES_SUMMARY, UNSTRUCTURED_SUMMARY};
