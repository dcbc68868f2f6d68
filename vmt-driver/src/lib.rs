//! Hack VM Translator Driver
//!
//! Resolves the inputs and output of a translation job and runs the
//! frontend and code writer over every unit.

pub mod config;
pub mod job;

pub use config::{default_output_path, discover_inputs, JobConfig};
pub use job::{instructions_json, load_units, run_job, write_units, JobSummary, Unit};
