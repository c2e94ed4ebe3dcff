use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use promptparty::api;
use promptparty::broadcast::{Frame, Subscriber};
use promptparty::config::GameRules;
use promptparty::prompts::StaticPromptSource;
use promptparty::protocol::ServerEvent;
use promptparty::state::AppState;
use promptparty::types::Advance;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

fn new_state(rounds_per_game: usize) -> Arc<AppState> {
    let prompts = StaticPromptSource::new(vec![
        "Name a terrible superpower".to_string(),
        "Worst pizza topping".to_string(),
    ])
    .expect("prompts");
    Arc::new(AppState::in_memory(
        Arc::new(prompts),
        GameRules {
            rounds_per_game,
            ..GameRules::default()
        },
    ))
}

async fn attach(state: &AppState, code: &str) -> UnboundedReceiver<Frame> {
    let (subscriber, rx) = Subscriber::channel();
    state.subscribe(code, subscriber).await.expect("subscribe");
    rx
}

fn drain(rx: &mut UnboundedReceiver<Frame>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).expect("valid event"));
    }
    events
}

/// End-to-end game flow through the controller
#[tokio::test]
async fn test_full_game_flow() {
    let state = new_state(5);

    // 1. Create a session with two subscribers
    let code = state.create_session().await.code;
    let mut host_rx = attach(&state, &code).await;
    let mut guest_rx = attach(&state, &code).await;

    // 2. Players join, the first one leads
    assert!(state.join_session(&code, "p1").await.unwrap().leader);
    assert!(!state.join_session(&code, "p2").await.unwrap().leader);

    // 3. Start the game
    let round = state.start_game(&code).await.unwrap();
    let r1 = round.id.clone();

    // 4. Responses: the second one completes the round
    let first = state.submit_response(&code, &r1, "p1", "a").await.unwrap();
    assert!(!first.completed);
    let second = state.submit_response(&code, &r1, "p2", "b").await.unwrap();
    assert!(second.completed);

    // 5. Votes: the second one completes the tally
    state.submit_vote(&code, &r1, "p1").await.unwrap();
    let last_vote = state.submit_vote(&code, &r1, "p2").await.unwrap();
    assert!(last_vote.completed);

    let expected = vec![
        ServerEvent::Joined {
            player_id: "p1".to_string(),
        },
        ServerEvent::Joined {
            player_id: "p2".to_string(),
        },
        ServerEvent::Prompt {
            id: r1.clone(),
            prompt: round.prompt.clone(),
        },
        ServerEvent::ResponsesSubmitted {
            id: r1.clone(),
            responses: HashMap::from([
                ("p1".to_string(), "a".to_string()),
                ("p2".to_string(), "b".to_string()),
            ]),
        },
        ServerEvent::VotesSubmitted {
            id: r1.clone(),
            votes: HashMap::from([("p1".to_string(), 1), ("p2".to_string(), 1)]),
        },
    ];

    // Both subscribers see the same events in the same order
    assert_eq!(drain(&mut host_rx), expected);
    assert_eq!(drain(&mut guest_rx), expected);

    // 6. Scores reflect the round
    let scores = state.scores(&code).await.unwrap();
    assert_eq!(scores.get("p1"), Some(&1));
    assert_eq!(scores.get("p2"), Some(&1));
}

/// Playing every round and advancing once more ends the game
#[tokio::test]
async fn test_game_ends_after_configured_rounds() {
    let state = new_state(2);
    let code = state.create_session().await.code;
    let mut rx = attach(&state, &code).await;

    state.join_session(&code, "p1").await.unwrap();
    state.start_game(&code).await.unwrap();
    assert!(matches!(
        state.advance_game(&code).await.unwrap(),
        Advance::Started { .. }
    ));
    assert_eq!(state.advance_game(&code).await.unwrap(), Advance::Ended);

    let events = drain(&mut rx);
    assert_eq!(events.last(), Some(&ServerEvent::End { id: code.clone() }));
    let prompts = events
        .iter()
        .filter(|e| matches!(e, ServerEvent::Prompt { .. }))
        .count();
    assert_eq!(prompts, 2);
}

/// A subscriber that went away does not disturb the others
#[tokio::test]
async fn test_dropped_subscriber_is_isolated() {
    let state = new_state(5);
    let code = state.create_session().await.code;
    let gone = attach(&state, &code).await;
    let mut live = attach(&state, &code).await;
    drop(gone);

    state.join_session(&code, "p1").await.unwrap();
    state.join_session(&code, "p2").await.unwrap();

    assert_eq!(drain(&mut live).len(), 2);
    assert_eq!(state.session_view(&code).await.unwrap().subscribers, 1);
}

// ========== HTTP ==========

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn test_http_game_flow() {
    let state = new_state(5);
    let app = api::router(state.clone());

    let (status, body) = call(&app, "GET", "/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "pong"}));

    // Create
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/games")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let code = location.trim_start_matches("/games/").to_string();
    assert_eq!(code.len(), 4);

    // Join
    let (status, body) = call(&app, "POST", &location, Some(json!({"player_id": "p1"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"leader": true}));
    let (_, body) = call(&app, "POST", &location, Some(json!({"player_id": "p2"}))).await;
    assert_eq!(body, json!({"leader": false}));

    // Start
    let (status, body) = call(&app, "POST", &format!("{}/start", location), None).await;
    assert_eq!(status, StatusCode::OK);
    let round_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["prompt"], "Name a terrible superpower");

    // Respond
    let response_uri = format!("{}/rounds/{}/response", location, round_id);
    let (_, body) = call(
        &app,
        "POST",
        &response_uri,
        Some(json!({"player_id": "p1", "response": "a"})),
    )
    .await;
    assert_eq!(body, json!({"count": 1, "completed": false}));
    let (_, body) = call(
        &app,
        "POST",
        &response_uri,
        Some(json!({"player_id": "p2", "response": "b"})),
    )
    .await;
    assert_eq!(body, json!({"count": 2, "completed": true}));

    // Vote
    let vote_uri = format!("{}/rounds/{}/vote", location, round_id);
    call(&app, "POST", &vote_uri, Some(json!({"vote": "p2"}))).await;
    let (_, body) = call(&app, "POST", &vote_uri, Some(json!({"vote": "p2"}))).await;
    assert_eq!(body, json!({"count": 2, "completed": true}));

    // Scores
    let (status, body) = call(&app, "GET", &format!("{}/scores", location), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"p2": 2}));

    // Next round
    let (_, body) = call(&app, "POST", &format!("{}/next", location), None).await;
    assert_eq!(body["ended"], false);
    assert_eq!(body["round"]["prompt"], "Worst pizza topping");

    // Session view
    let (_, body) = call(&app, "GET", &location, None).await;
    assert_eq!(body["id"], code.as_str());
    assert_eq!(body["player_ids"], json!(["p1", "p2"]));
    assert_eq!(body["round_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_http_errors() {
    let state = new_state(5);
    let app = api::router(state.clone());
    let code = state.create_session().await.code;

    let (status, body) = call(&app, "POST", "/games/zzzzzz", Some(json!({"player_id": "p1"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "game zzzzzz does not exist"}));

    let (status, body) = call(
        &app,
        "POST",
        &format!("/games/{}", code),
        Some(json!({"player_id": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "player_id must be non-empty"}));

    let (status, _) = call(&app, "POST", &format!("/games/{}/next", code), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/games/{}/rounds/unknown/vote", code),
        Some(json!({"vote": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

}

#[tokio::test]
async fn test_http_malformed_bodies_are_bad_requests() {
    let state = new_state(5);
    let app = api::router(state.clone());
    let code = state.create_session().await.code;

    // Missing field
    let (status, body) = call(&app, "POST", &format!("/games/{}", code), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Not JSON at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/games/{}", code))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    // Wrong field type on a round endpoint
    let round = state.start_game(&code).await.unwrap();
    let (status, body) = call(
        &app,
        "POST",
        &format!("/games/{}/rounds/{}/vote", code, round.id),
        Some(json!({"vote": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Nothing was recorded by the rejected requests
    assert!(state.session_view(&code).await.unwrap().player_ids.is_empty());
    assert!(state.scores(&code).await.unwrap().is_empty());
}

fn ws_handshake(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::CONNECTION, "upgrade")
        .header(header::UPGRADE, "websocket")
        .header(header::SEC_WEBSOCKET_VERSION, "13")
        .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_ws_unknown_game_is_not_found() {
    let state = new_state(5);
    let app = api::router(state.clone());

    let response = app
        .clone()
        .oneshot(ws_handshake("/ws/games/zzzzzz"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "game zzzzzz does not exist"}));

    // A known game gets past the lookup; without a real connection the
    // upgrade itself is refused
    let code = state.create_session().await.code;
    let response = app
        .oneshot(ws_handshake(&format!("/ws/games/{}", code)))
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(state.session_view(&code).await.unwrap().subscribers, 0);
}
