//! Label naming for generated code
//!
//! All units of a job share one output file, so generated labels must be
//! unique across the whole job. Counters here are never reset.

use log::trace;

/// Jump targets for one comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonLabels {
    pub true_label: String,
    pub end_label: String,
}

/// Job-wide label generator
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next_comparison: u32,
    next_return: u32,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh `TRUE_n`/`END_n` pair
    pub fn comparison_labels(&mut self) -> ComparisonLabels {
        let id = self.next_comparison;
        self.next_comparison += 1;
        trace!("Allocated comparison labels #{id}");
        ComparisonLabels {
            true_label: format!("TRUE_{id}"),
            end_label: format!("END_{id}"),
        }
    }

    /// Fresh `RETURN_n` label for a call site
    pub fn return_label(&mut self) -> String {
        let id = self.next_return;
        self.next_return += 1;
        trace!("Allocated return label #{id}");
        format!("RETURN_{id}")
    }

    /// Number of comparison label pairs handed out so far
    pub fn comparison_count(&self) -> u32 {
        self.next_comparison
    }

    /// Number of return labels handed out so far
    pub fn call_count(&self) -> u32 {
        self.next_return
    }
}

/// Qualify a user label with its enclosing function, if any
pub fn scoped_label(function: Option<&str>, label: &str) -> String {
    match function {
        Some(function) => format!("{function}.{label}"),
        None => label.to_string(),
    }
}
