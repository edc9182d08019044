use std::sync::Arc;
use std::time::{Duration, Instant};

use kata::config::Config;
use kata::judge;
use kata::server::{ServerState, router};
use kata::storage::Store;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::common::python_available;

/// Boots the full stack (router plus judge worker) on an ephemeral port and
/// returns its base URL.
async fn spawn_server(config: Config) -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(Store::open(dir.path().join("kata.db")).expect("open store"));

    let queue_depth = config.server.queue_depth.max(1) as usize;
    let (tx, rx) = mpsc::channel(queue_depth);
    tokio::spawn(judge::worker::worker(rx, Arc::clone(&store), config.clone()));

    let state = ServerState {
        store,
        config: Arc::new(config),
        queue: tx,
        started_at: Instant::now(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });

    (dir, format!("http://{addr}"))
}

async fn get_json(client: &reqwest::Client, url: &str) -> Value {
    client
        .get(url)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body")
}

async fn wait_for_completion(client: &reqwest::Client, base: &str, job_id: &str) -> Value {
    let deadline = Instant::now() + Duration::from_secs(15);
    loop {
        let submission = get_json(client, &format!("{base}/api/submission/{job_id}")).await;
        if submission["status"] == "completed" {
            return submission;
        }
        assert!(
            Instant::now() < deadline,
            "submission {job_id} never completed"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn index_and_health_respond() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let index = get_json(&client, &base).await;
    assert_eq!(index["message"], "Welcome to the kata API!");

    let health = get_json(&client, &format!("{base}/api/health")).await;
    assert_eq!(health["status"], "ok");
    assert!(health["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn daily_question_route_serves_inputs_only() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let payload = get_json(&client, &format!("{base}/api/daily-question?difficulty=hard")).await;
    assert_eq!(payload["problem_id"], "123");
    assert_eq!(payload["difficulty"], "hard");
    assert_eq!(payload["test_cases"], json!([[-10], [10], [7]]));
    assert!(payload.get("outputs").is_none(), "outputs must stay hidden");
    assert!(payload["prompt"]["description"].is_array());
}

#[tokio::test]
async fn test_cases_route_renders_display_strings() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let payload = get_json(&client, &format!("{base}/api/get-test-cases")).await;
    assert_eq!(payload["testCases"], json!(["-10", "10", "7"]));
}

#[tokio::test]
async fn unknown_submission_is_not_found() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/api/submission/no-such-job"))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_problem_id_is_not_found() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/submit-code"))
        .json(&json!({
            "code": "def f():\n    pass\n",
            "language": "python",
            "problem_id": "no-such-question"
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submission_without_interpreter_completes_with_error() {
    let mut config = Config::default();
    config.judge.python_bin = "kata-no-such-python".to_string();
    let (_dir, base) = spawn_server(config).await;
    let client = reqwest::Client::new();

    let reply: Value = client
        .post(format!("{base}/api/submit-code"))
        .json(&json!({
            "code": "def add_ten(num):\n    return num + 10\n",
            "language": "python",
            "problem_id": "123",
            "user_id": "alice",
            "is_submit": true
        }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    assert_eq!(reply["status"], "queued");
    let job_id = reply["job_id"].as_str().expect("job id");

    let done = wait_for_completion(&client, &base, job_id).await;
    assert!(
        done["verdict"]["error"]
            .as_str()
            .expect("reason")
            .contains("spawn"),
        "got: {done}"
    );

    // The failed run never touched the standings.
    let board = get_json(&client, &format!("{base}/api/leaderboard")).await;
    assert!(board["standings"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn submit_judge_and_rank_roundtrip() {
    if !python_available() {
        return;
    }
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let reply: Value = client
        .post(format!("{base}/api/submit-code"))
        .json(&json!({
            "code": "def add_ten(num):\n    return num + 10\n",
            "language": "python",
            "problem_id": "123",
            "user_id": "alice",
            "is_submit": true
        }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let job_id = reply["job_id"].as_str().expect("job id");

    let done = wait_for_completion(&client, &base, job_id).await;
    assert_eq!(done["verdict"]["passed"], 3);
    assert_eq!(done["verdict"]["total"], 3);

    let board = get_json(&client, &format!("{base}/api/leaderboard")).await;
    let standings = board["standings"].as_array().expect("array");
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0]["user_id"], "alice");
    assert_eq!(standings[0]["solved"], 1);
}

#[tokio::test]
async fn unsupported_language_is_rejected_by_the_judge() {
    let (_dir, base) = spawn_server(Config::default()).await;
    let client = reqwest::Client::new();

    let reply: Value = client
        .post(format!("{base}/api/submit-code"))
        .json(&json!({
            "code": "fn add_ten(num: i64) -> i64 { num + 10 }",
            "language": "rust",
            "problem_id": "123"
        }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json body");
    let job_id = reply["job_id"].as_str().expect("job id");

    let done = wait_for_completion(&client, &base, job_id).await;
    assert!(
        done["verdict"]["error"]
            .as_str()
            .expect("reason")
            .contains("unsupported language"),
        "got: {done}"
    );
}
