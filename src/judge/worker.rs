//! Queue worker driving submissions through the judge.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{KataError, Result};
use crate::storage::{Store, SubmissionStatus};

use super::{evaluate, runner, validate, Job};

/// Drains the submission queue until every sender is dropped.
///
/// A failing job never stops the loop: failures land on the submission row
/// as error verdicts and are logged.
pub async fn worker(mut rx: mpsc::Receiver<Job>, store: Arc<Store>, config: Config) {
    info!("judge worker started");
    while let Some(job) = rx.recv().await {
        let job_id = job.job_id.clone();
        if let Err(err) = process(&job, &store, &config).await {
            error!(job_id = %job_id, error = %err, "judge run failed");
            let verdict = json!({ "error": err.to_string() });
            if let Err(err) = store.finish_submission(&job_id, &verdict) {
                error!(job_id = %job_id, error = %err, "failed to record error verdict");
            }
        }
    }
    info!("judge worker stopped");
}

async fn process(job: &Job, store: &Store, config: &Config) -> Result<()> {
    store.set_submission_status(&job.job_id, SubmissionStatus::Running)?;

    let entry = match validate(job, &config.judge) {
        Ok(entry) => entry,
        Err(reason) => {
            info!(job_id = %job.job_id, reason = %reason, "submission rejected");
            return store.finish_submission(&job.job_id, &json!({ "error": reason }));
        }
    };

    let outcome = runner::execute(
        &config.judge.python_bin,
        &job.code,
        &entry,
        &job.test_cases.inputs,
        Duration::from_secs(config.judge.timeout_secs),
    )
    .await;

    let verdict = match outcome {
        Ok(outputs) => {
            let verdict = evaluate(&job.test_cases, &outputs);
            if job.is_submit {
                if let Some(user_id) = job.user_id.as_deref() {
                    store.record_attempt(user_id, verdict.all_passed(), Utc::now().naive_utc())?;
                }
            }
            info!(
                job_id = %job.job_id,
                passed = verdict.passed,
                total = verdict.total,
                "submission judged"
            );
            serde_json::to_value(&verdict)?
        }
        // User-visible failures (timeouts, tracebacks, bad harness output)
        // complete the submission; anything else bubbles to the loop.
        Err(KataError::Judge(reason)) => {
            info!(job_id = %job.job_id, reason = %reason, "submission failed to run");
            json!({ "error": reason })
        }
        Err(err) => return Err(err),
    };

    store.finish_submission(&job.job_id, &verdict)
}
