//! Submission judging.
//!
//! A submission moves through three stages: [`validate`] rejects it cheaply
//! without running anything, [`runner::execute`] runs it against the
//! question's inputs in a subprocess, and [`evaluate`] compares what came
//! back with the expected outputs. [`worker::worker`] drives queued jobs
//! through all three and records the outcome on the submission row.

pub mod runner;
pub mod worker;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::JudgeConfig;
use crate::questions::TestCases;

static DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"def\s+([A-Za-z_]\w*)\s*\(").expect("valid regex"));

/// One queued submission together with the question snapshot it runs
/// against.
#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: String,
    pub problem_id: String,
    pub user_id: Option<String>,
    pub language: String,
    pub code: String,
    /// True for ranked submissions; plain runs do not touch the standings.
    pub is_submit: bool,
    pub starter_code: String,
    pub test_cases: TestCases,
}

/// Per-case comparison of an expected versus a produced output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub input: Vec<Value>,
    pub expected: Value,
    pub actual: Value,
    pub passed: bool,
}

/// The judge's structured result for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: usize,
    pub total: usize,
    pub cases: Vec<CaseResult>,
}

impl Verdict {
    pub fn all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

/// First function name defined by the starter code; the judged entry point.
pub fn entry_point(starter_code: &str) -> Option<String> {
    DEF_RE
        .captures(starter_code)
        .map(|caps| caps[1].to_string())
}

/// Checks a job before anything is executed. Returns the entry-point
/// function name on success and a rejection reason otherwise.
pub fn validate(job: &Job, config: &JudgeConfig) -> std::result::Result<String, String> {
    if !job.language.eq_ignore_ascii_case("python") {
        return Err(format!(
            "unsupported language {}: only python submissions are judged",
            job.language
        ));
    }
    if job.code.trim().is_empty() {
        return Err("submission is empty".to_string());
    }
    if job.code.len() as u64 > config.max_code_bytes {
        return Err(format!(
            "submission exceeds {} bytes",
            config.max_code_bytes
        ));
    }
    if job.test_cases.is_empty() || job.test_cases.inputs.len() != job.test_cases.outputs.len() {
        return Err("question has no usable test cases".to_string());
    }

    let entry = match entry_point(&job.starter_code) {
        Some(entry) => entry,
        None => return Err("starter code defines no entry point".to_string()),
    };

    let defines_entry = Regex::new(&format!(r"def\s+{}\s*\(", regex::escape(&entry)))
        .map(|re| re.is_match(&job.code))
        .unwrap_or(false);
    if !defines_entry {
        return Err(format!("submission must define {entry}(...)"));
    }

    Ok(entry)
}

/// Compares produced outputs with the expected ones, case by case. A
/// missing output fails its case.
pub fn evaluate(test_cases: &TestCases, actual: &[Value]) -> Verdict {
    let mut cases = Vec::with_capacity(test_cases.inputs.len());
    for (i, (input, expected)) in test_cases
        .inputs
        .iter()
        .zip(test_cases.outputs.iter())
        .enumerate()
    {
        let passed = actual.get(i) == Some(expected);
        cases.push(CaseResult {
            input: input.clone(),
            expected: expected.clone(),
            actual: actual.get(i).cloned().unwrap_or(Value::Null),
            passed,
        });
    }

    let passed = cases.iter().filter(|case| case.passed).count();
    Verdict {
        passed,
        total: cases.len(),
        cases,
    }
}
