//! HTTP-level gateway tests against an ephemeral listener.

use std::path::Path;
use std::sync::Arc;

use helpline::conversation::ConversationManager;
use helpline::gateway::Gateway;
use helpline::knowledge::KnowledgeBase;
use helpline::memory::{ConversationMemory, UserMemory};
use helpline::workflow::AdmissionWorkflow;
use helpline::Settings;

struct TestServer {
    base_url: String,
    _memory_dir: tempfile::TempDir,
}

async fn spawn_server() -> TestServer {
    let memory_dir = tempfile::tempdir().unwrap();

    let mut settings = Settings::default();
    settings.livekit_api_key = "test-key".to_string();
    settings.livekit_api_secret = "test-secret".to_string();
    settings.livekit_url = "wss://media.test".to_string();

    let kb = Arc::new(
        KnowledgeBase::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("../data")).unwrap(),
    );
    let manager = Arc::new(ConversationManager::new(
        AdmissionWorkflow::new(kb.clone(), None),
        ConversationMemory::new(memory_dir.path().join("conversations.json")).unwrap(),
        UserMemory::new(memory_dir.path().join("users.json")).unwrap(),
    ));

    let router = Gateway::new(settings, kb, manager).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        _memory_dir: memory_dir,
    }
}

#[tokio::test]
async fn health_and_root() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let root: serde_json::Value = client
        .get(&server.base_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["status"], "running");
    assert!(root["endpoints"]["voice"].is_string());
}

#[tokio::test]
async fn course_routes() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let listing: serde_json::Value = client
        .get(format!("{}/api/courses", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listing["count"].as_u64().unwrap() >= 5);

    let course = client
        .get(format!("{}/api/courses/BTECH_CSE", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(course.status().is_success());
    let course: serde_json::Value = course.json().await.unwrap();
    assert_eq!(course["id"], "BTECH_CSE");

    let missing = client
        .get(format!("{}/api/courses/NOPE", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fees_and_scholarship_routes() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let fees: serde_json::Value = client
        .get(format!("{}/api/fees/MBA", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fees["course_id"], "MBA");
    assert!(fees["annual_fee"].as_u64().unwrap() > 0);

    let missing = client
        .get(format!("{}/api/fees/NOPE", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let scholarship: serde_json::Value = client
        .get(format!(
            "{}/api/scholarship/calculate?course_id=BTECH_CSE&percentage=92",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(scholarship["eligible"], true);
    assert!(scholarship["final_tuition"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn token_mint_and_validate() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let token: serde_json::Value = client
        .post(format!("{}/api/auth/token/generate", server.base_url))
        .json(&serde_json::json!({ "participant_name": "kapil" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(token["participant_name"], "kapil");
    assert_eq!(token["room_name"], "parul-admission");
    let jwt = token["token"].as_str().unwrap();
    assert_eq!(jwt.split('.').count(), 3);

    let validation: serde_json::Value = client
        .get(format!(
            "{}/api/auth/token/validate?token={}",
            server.base_url, jwt
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(validation["valid"], true);

    let garbage: serde_json::Value = client
        .get(format!(
            "{}/api/auth/token/validate?token=not.a.token",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(garbage["valid"], false);
}

#[tokio::test]
async fn voice_session_lifecycle() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/api/voice/session/create", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session_id = created["session_id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "active");

    let reply: serde_json::Value = client
        .post(format!(
            "{}/api/voice/session/{}/message",
            server.base_url, session_id
        ))
        .json(&serde_json::json!({ "message": "hello" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["success"], true);
    assert!(reply["data"]["response"]
        .as_str()
        .unwrap()
        .contains("May I know your name?"));

    let session: serde_json::Value = client
        .get(format!(
            "{}/api/voice/session/{}",
            server.base_url, session_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["message_count"], 2);

    let history: serde_json::Value = client
        .get(format!(
            "{}/api/voice/session/{}/history?limit=1",
            server.base_url, session_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["count"], 1);
    assert_eq!(history["history"][0]["role"], "assistant");

    let ended: serde_json::Value = client
        .post(format!(
            "{}/api/voice/session/{}/end",
            server.base_url, session_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ended["success"], true);

    let session: serde_json::Value = client
        .get(format!(
            "{}/api/voice/session/{}",
            server.base_url, session_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["state"]["ended"], true);

    let missing = client
        .get(format!("{}/api/voice/session/unknown-id", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}
