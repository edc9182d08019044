use chrono::{NaiveDate, NaiveTime};
use httpmock::prelude::*;
use kata::config::{Config, UpstreamConfig};
use kata::error::KataError;
use kata::questions::{
    self, ACTIVE_QUESTIONS_KEY, ActiveQuestions, Difficulty, Question, TestCases, UpstreamClient,
};
use kata::storage::Store;
use serde_json::json;
use tempfile::TempDir;

fn upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: Some(base_url.to_string()),
        count: 2,
        ..UpstreamConfig::default()
    }
}

fn question_body(id: &str) -> serde_json::Value {
    json!({
        "problem_id": id,
        "title": format!("Question {id}"),
        "difficulty": "introductory",
        "description": "Do the thing.\n\nExample 1:\nInput: 1\nOutput: 2\n",
        "starter_code": "def solve(n):\n    pass\n",
        "test_cases": { "inputs": [[1]], "outputs": [2] }
    })
}

fn cached_question(id: &str) -> Question {
    Question {
        problem_id: id.to_string(),
        title: None,
        difficulty: None,
        description: format!("cached {id}"),
        starter_code: String::new(),
        test_cases: TestCases::default(),
    }
}

#[tokio::test]
async fn fetch_random_sends_count_and_difficulty() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/random-questions")
                .query_param("count", "2")
                .query_param("difficulty", "introductory");
            then.status(200)
                .json_body(json!({ "questions": [question_body("q-1"), question_body("q-2")] }));
        })
        .await;

    let config = upstream_config(&server.base_url());
    let client = UpstreamClient::new(&config).expect("client");
    let fetched = client
        .fetch_random(2, "introductory")
        .await
        .expect("fetch succeeds");

    mock.assert_async().await;
    assert_eq!(fetched.len(), 2);
    assert_eq!(fetched[0].problem_id, "q-1");
    assert_eq!(fetched[0].test_cases.len(), 1);
}

#[tokio::test]
async fn fetch_random_tolerates_empty_envelope() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/random-questions");
            then.status(200).json_body(json!({}));
        })
        .await;

    let config = upstream_config(&server.base_url());
    let client = UpstreamClient::new(&config).expect("client");
    let fetched = client
        .fetch_random(2, "introductory")
        .await
        .expect("fetch succeeds");
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn fetch_random_maps_http_errors_to_upstream() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/random-questions");
            then.status(502);
        })
        .await;

    let config = upstream_config(&server.base_url());
    let client = UpstreamClient::new(&config).expect("client");
    let err = client.fetch_random(2, "introductory").await.unwrap_err();

    assert!(matches!(err, KataError::Upstream(_)));
    assert!(err.to_string().contains("status"), "got: {err}");
}

#[tokio::test]
async fn fetch_random_rejects_malformed_bodies() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/random-questions");
            then.status(200)
                .header("content-type", "application/json")
                .body("not json");
        })
        .await;

    let config = upstream_config(&server.base_url());
    let client = UpstreamClient::new(&config).expect("client");
    let err = client.fetch_random(2, "introductory").await.unwrap_err();

    assert!(err.to_string().contains("invalid question API response"));
}

#[tokio::test]
async fn fetch_active_fills_both_difficulties() {
    let server = MockServer::start_async().await;
    let easy = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/random-questions")
                .query_param("difficulty", "introductory");
            then.status(200)
                .json_body(json!({ "questions": [question_body("e-1")] }));
        })
        .await;
    let hard = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/random-questions")
                .query_param("difficulty", "interview");
            then.status(200)
                .json_body(json!({ "questions": [question_body("h-1")] }));
        })
        .await;

    let config = upstream_config(&server.base_url());
    let client = UpstreamClient::new(&config).expect("client");
    let set = client.fetch_active(&config).await.expect("active set");

    easy.assert_async().await;
    hard.assert_async().await;
    assert_eq!(set.easy[0].problem_id, "e-1");
    assert_eq!(set.hard[0].problem_id, "h-1");
    assert_eq!(set.timestamp.time(), NaiveTime::MIN, "stamped at day start");
}

#[tokio::test]
async fn daily_question_falls_back_when_unconfigured() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("kata.db")).unwrap();
    let config = Config::default();

    let question = questions::daily_question(&store, &config, Difficulty::Easy)
        .await
        .expect("question");

    assert_eq!(question.problem_id, "123");
    assert_eq!(question.test_cases.len(), 3);
}

#[tokio::test]
async fn daily_question_serves_stale_cache_when_refresh_fails() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("kata.db")).unwrap();

    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET).path("/random-questions");
            then.status(500);
        })
        .await;

    let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_time(NaiveTime::MIN);
    let stale = ActiveQuestions::new(vec![cached_question("stale-1")], Vec::new(), long_ago);
    store.set_json(ACTIVE_QUESTIONS_KEY, &stale).unwrap();

    let config = Config {
        upstream: upstream_config(&server.base_url()),
        ..Config::default()
    };
    let question = questions::daily_question(&store, &config, Difficulty::Easy)
        .await
        .expect("question");

    // The stale set triggered a refetch attempt, and the failing upstream
    // left the cached data serving.
    assert!(upstream.hits_async().await >= 1);
    assert_eq!(question.problem_id, "stale-1");
}

#[tokio::test]
async fn refresh_active_replaces_the_cached_set() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("kata.db")).unwrap();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/random-questions")
                .query_param("difficulty", "introductory");
            then.status(200)
                .json_body(json!({ "questions": [question_body("new-e")] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/random-questions")
                .query_param("difficulty", "interview");
            then.status(200)
                .json_body(json!({ "questions": [question_body("new-h")] }));
        })
        .await;

    let old = ActiveQuestions::new(
        vec![cached_question("old-e")],
        vec![cached_question("old-h")],
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN),
    );
    store.set_json(ACTIVE_QUESTIONS_KEY, &old).unwrap();

    let config = Config {
        upstream: upstream_config(&server.base_url()),
        ..Config::default()
    };
    let set = questions::refresh_active(&store, &config)
        .await
        .expect("refresh");
    assert_eq!(set.easy[0].problem_id, "new-e");

    let cached: Option<ActiveQuestions> = store.get_json(ACTIVE_QUESTIONS_KEY).unwrap();
    assert_eq!(cached.expect("cached set").hard[0].problem_id, "new-h");
}
