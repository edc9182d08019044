use std::sync::Arc;

use kata::config::Config;
use kata::judge::worker::worker;
use kata::judge::Job;
use kata::leaderboard;
use kata::questions::Question;
use kata::storage::{Store, Submission, SubmissionStatus};
use tokio::sync::mpsc;

use super::common::{python_available, temp_store};

/// Queues a submission against the built-in question and returns the job.
fn queued_job(store: &Store, job_id: &str, code: &str, is_submit: bool) -> Job {
    let question = Question::fallback();
    store
        .insert_submission(&Submission::queued(
            job_id,
            &question.problem_id,
            Some("alice"),
            "python",
        ))
        .expect("insert submission");
    Job {
        job_id: job_id.to_string(),
        problem_id: question.problem_id,
        user_id: Some("alice".to_string()),
        language: "python".to_string(),
        code: code.to_string(),
        is_submit,
        starter_code: question.starter_code,
        test_cases: question.test_cases,
    }
}

async fn run_to_completion(store: Arc<Store>, config: Config, jobs: Vec<Job>) {
    let (tx, rx) = mpsc::channel(jobs.len().max(1));
    for job in jobs {
        tx.send(job).await.expect("queue job");
    }
    drop(tx);
    worker(rx, store, config).await;
}

#[tokio::test]
async fn correct_solution_solves_and_ranks() {
    if !python_available() {
        return;
    }
    let (_dir, store) = temp_store();
    let store = Arc::new(store);
    let job = queued_job(
        &store,
        "job-1",
        "def add_ten(num):\n    return num + 10\n",
        true,
    );

    run_to_completion(Arc::clone(&store), Config::default(), vec![job]).await;

    let done = store.get_submission("job-1").expect("submission");
    assert_eq!(done.status, SubmissionStatus::Completed);
    let verdict = done.verdict.expect("verdict");
    assert_eq!(verdict["passed"], 3);
    assert_eq!(verdict["total"], 3);

    let board = leaderboard::current(&store, 5).expect("leaderboard");
    assert_eq!(board.standings.len(), 1);
    assert_eq!(board.standings[0].user_id, "alice");
    assert_eq!(board.standings[0].solved, 1);
}

#[tokio::test]
async fn wrong_answers_count_per_case() {
    if !python_available() {
        return;
    }
    let (_dir, store) = temp_store();
    let store = Arc::new(store);
    // Wrong for negative inputs only.
    let job = queued_job(
        &store,
        "job-1",
        "def add_ten(num):\n    return abs(num) + 10\n",
        true,
    );

    run_to_completion(Arc::clone(&store), Config::default(), vec![job]).await;

    let verdict = store
        .get_submission("job-1")
        .expect("submission")
        .verdict
        .expect("verdict");
    assert_eq!(verdict["passed"], 2);
    assert_eq!(verdict["total"], 3);
    assert_eq!(verdict["cases"][0]["passed"], false);

    // Attempted but not solved.
    let standings = store.top_standings(5).expect("standings");
    assert_eq!(standings[0].solved, 0);
    assert_eq!(standings[0].attempts, 1);
}

#[tokio::test]
async fn missing_interpreter_completes_with_error_verdict() {
    let (_dir, store) = temp_store();
    let store = Arc::new(store);
    let job = queued_job(
        &store,
        "job-1",
        "def add_ten(num):\n    return num + 10\n",
        false,
    );

    let mut config = Config::default();
    config.judge.python_bin = "kata-no-such-python".to_string();
    run_to_completion(Arc::clone(&store), config, vec![job]).await;

    let done = store.get_submission("job-1").expect("submission");
    assert_eq!(done.status, SubmissionStatus::Completed);
    let verdict = done.verdict.expect("verdict");
    assert!(
        verdict["error"].as_str().expect("reason").contains("spawn"),
        "got: {verdict}"
    );
}

#[tokio::test]
async fn hung_submission_times_out_and_completes() {
    if !python_available() {
        return;
    }
    let (_dir, store) = temp_store();
    let store = Arc::new(store);
    let job = queued_job(
        &store,
        "job-1",
        "def add_ten(num):\n    while True:\n        pass\n",
        false,
    );

    let mut config = Config::default();
    config.judge.timeout_secs = 1;
    run_to_completion(Arc::clone(&store), config, vec![job]).await;

    let verdict = store
        .get_submission("job-1")
        .expect("submission")
        .verdict
        .expect("verdict");
    assert!(
        verdict["error"]
            .as_str()
            .expect("reason")
            .contains("timed out"),
        "got: {verdict}"
    );
}

#[tokio::test]
async fn queue_order_is_preserved() {
    let (_dir, store) = temp_store();
    let store = Arc::new(store);
    let jobs = vec![
        queued_job(&store, "job-1", "", false),
        queued_job(&store, "job-2", "not python at all", false),
    ];

    let mut config = Config::default();
    config.judge.python_bin = "kata-no-such-python".to_string();
    run_to_completion(Arc::clone(&store), config, jobs).await;

    let first = store.get_submission("job-1").expect("first");
    let second = store.get_submission("job-2").expect("second");
    assert_eq!(first.status, SubmissionStatus::Completed);
    assert_eq!(second.status, SubmissionStatus::Completed);
    // Both rejected before anything ran: one empty, one missing the entry
    // point.
    assert!(first.verdict.expect("verdict")["error"]
        .as_str()
        .expect("reason")
        .contains("empty"));
    assert!(second.verdict.expect("verdict")["error"]
        .as_str()
        .expect("reason")
        .contains("add_ten"));
}
