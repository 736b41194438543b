// Integration tests for the FPL assistant.
//
// These tests exercise the full system end-to-end using the library
// crate's public API: a mock upstream server stands in for the FPL API,
// a mock advisory server stands in for the Messages API, and the service
// operations (and the HTTP boundary above them) run unmodified against
// both.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use fpl_assistant::advisory::client::{AdvisoryClient, ClaudeAdvisor};
use fpl_assistant::error::CoreError;
use fpl_assistant::fpl::client::FplClient;
use fpl_assistant::server;
use fpl_assistant::service::{self, AppState, RecommendationParams};
use fpl_assistant::squad::enrich::total_event_points;

// ===========================================================================
// Test fixtures
// ===========================================================================

/// Catalog with a 15-man squad across teams 1-2, pool players on teams 3-4,
/// and one player on team 5 whose side has no upcoming fixture.
fn bootstrap_json() -> Value {
    let mut elements = Vec::new();
    for i in 1..=15u32 {
        let element_type = match i {
            1 => 1,
            2..=5 => 2,
            6..=10 => 3,
            _ => 4,
        };
        elements.push(json!({
            "id": i,
            "first_name": "Squad",
            "second_name": format!("Player{i}"),
            "web_name": format!("Player{i}"),
            "team": if i <= 8 { 1 } else { 2 },
            "element_type": element_type,
            "now_cost": 50,
            "total_points": 30,
            "event_points": 2,
            "form": "3.0",
            "minutes": 900,
            "selected_by_percent": "10.0",
            "status": "a"
        }));
    }
    elements.push(json!({
        "id": 100,
        "first_name": "Mohamed",
        "second_name": "Salah",
        "web_name": "M.Salah",
        "team": 3,
        "element_type": 3,
        "now_cost": 130,
        "total_points": 211,
        "event_points": 12,
        "form": "8.0",
        "minutes": 2900,
        "selected_by_percent": "45.3",
        "status": "a"
    }));
    elements.push(json!({
        "id": 101,
        "first_name": "Son",
        "second_name": "Heungmin",
        "web_name": "Son",
        "team": 4,
        "element_type": 3,
        "now_cost": 55,
        "total_points": 150,
        "event_points": 6,
        "form": "5.5",
        "minutes": 2500,
        "selected_by_percent": "22.0",
        "status": "a"
    }));
    elements.push(json!({
        "id": 102,
        "first_name": "Idle",
        "second_name": "Winger",
        "web_name": "Idle",
        "team": 5,
        "element_type": 3,
        "now_cost": 60,
        "total_points": 40,
        "event_points": 1,
        "form": "2.0",
        "minutes": 800,
        "selected_by_percent": "3.0",
        "status": "a"
    }));

    json!({
        "events": [
            { "id": 8, "is_current": false, "finished": true },
            { "id": 9, "is_current": true, "finished": false },
            { "id": 10, "is_current": false, "finished": false }
        ],
        "elements": elements,
        "teams": [
            { "id": 1, "code": 3, "name": "Arsenal", "short_name": "ARS" },
            { "id": 2, "code": 8, "name": "Chelsea", "short_name": "CHE" },
            { "id": 3, "code": 14, "name": "Liverpool", "short_name": "LIV" },
            { "id": 4, "code": 6, "name": "Spurs", "short_name": "TOT" },
            { "id": 5, "code": 11, "name": "Everton", "short_name": "EVE" }
        ],
        "element_types": [
            { "id": 1, "singular_name": "Goalkeeper" },
            { "id": 2, "singular_name": "Defender" },
            { "id": 3, "singular_name": "Midfielder" },
            { "id": 4, "singular_name": "Forward" }
        ]
    })
}

/// Gameweek 9 is current; gameweek 10 is the one advice targets. Team 5
/// plays in neither.
fn fixtures_json() -> Value {
    json!([
        {
            "id": 1, "event": 9, "team_h": 1, "team_a": 2,
            "team_h_difficulty": 3, "team_a_difficulty": 3,
            "kickoff_time": "2025-10-18T14:00:00Z",
            "started": true, "finished": false,
            "team_h_score": 1, "team_a_score": 0
        },
        {
            "id": 2, "event": 10, "team_h": 3, "team_a": 4,
            "team_h_difficulty": 2, "team_a_difficulty": 4,
            "kickoff_time": "2025-10-25T14:00:00Z",
            "started": false, "finished": false,
            "team_h_score": null, "team_a_score": null
        },
        {
            "id": 3, "event": 10, "team_h": 1, "team_a": 2,
            "team_h_difficulty": 3, "team_a_difficulty": 2,
            "kickoff_time": "2025-10-25T16:30:00Z",
            "started": false, "finished": false,
            "team_h_score": null, "team_a_score": null
        }
    ])
}

/// 15 picks: player 1 captained (2x), players 2-11 starters, 12-15 bench.
fn picks_json() -> Value {
    let picks: Vec<Value> = (1..=15u32)
        .map(|i| {
            json!({
                "element": i,
                "is_captain": i == 1,
                "is_vice_captain": i == 2,
                "multiplier": if i == 1 { 2 } else if i <= 11 { 1 } else { 0 }
            })
        })
        .collect();
    json!({
        "picks": picks,
        "entry_history": { "bank": 5, "event_transfers": 1 }
    })
}

fn entry_json() -> Value {
    json!({
        "id": 4242,
        "name": "Test FC",
        "last_deadline_bank": 15,
        "last_deadline_value": 1003
    })
}

/// Live stats for event 9: captain on 10, other starters on 4, bench on 3.
fn live_json() -> Value {
    let elements: Vec<Value> = (1..=15u32)
        .map(|i| {
            let points = if i == 1 {
                10
            } else if i <= 11 {
                4
            } else {
                3
            };
            json!({ "id": i, "stats": { "total_points": points, "minutes": 90 } })
        })
        .collect();
    json!({ "elements": elements })
}

/// A legal recommendation against the canned data: sell a 5.0m bench
/// player, buy Son (5.5m) with 0.5m bank, exact budget equality.
fn legal_recommendation() -> Value {
    json!({
        "transfers_out": ["Squad Player12"],
        "transfers_in": ["Son Heungmin"],
        "captain": "Squad Player1",
        "vice_captain": "Squad Player2",
        "chips": [],
        "notes": "Son has the kinder fixture."
    })
}

// ===========================================================================
// Mock servers
// ===========================================================================

async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Mock FPL API serving the canned season snapshot.
async fn spawn_upstream() -> SocketAddr {
    let bootstrap = bootstrap_json();
    let fixtures = fixtures_json();
    let picks = picks_json();
    let entry = entry_json();
    let live = live_json();

    let router = Router::new()
        .route(
            "/bootstrap-static/",
            get(move || {
                let v = bootstrap.clone();
                async move { Json(v) }
            }),
        )
        .route(
            "/fixtures/",
            get(move || {
                let v = fixtures.clone();
                async move { Json(v) }
            }),
        )
        .route(
            "/entry/:id/event/:event/picks/",
            get(move |Path((_, _)): Path<(u64, u32)>| {
                let v = picks.clone();
                async move { Json(v) }
            }),
        )
        .route(
            "/entry/:id/",
            get(move |Path(_): Path<u64>| {
                let v = entry.clone();
                async move { Json(v) }
            }),
        )
        .route(
            "/event/:id/live/",
            get(move |Path(_): Path<u32>| {
                let v = live.clone();
                async move { Json(v) }
            }),
        );

    spawn_router(router).await
}

/// Mock FPL API whose every endpoint answers 503.
async fn spawn_broken_upstream() -> SocketAddr {
    let router = Router::new().fallback(|| async { StatusCode::SERVICE_UNAVAILABLE });
    spawn_router(router).await
}

/// Mock advisory endpoint wrapping `completion_text` in a Messages API
/// response envelope.
async fn spawn_advisory_with_text(completion_text: String) -> SocketAddr {
    let payload = json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": completion_text }],
        "model": "test",
        "usage": { "input_tokens": 900, "output_tokens": 120 }
    });
    let router = Router::new().route(
        "/",
        post(move || {
            let v = payload.clone();
            async move { Json(v) }
        }),
    );
    spawn_router(router).await
}

async fn spawn_advisory_with_status(status: StatusCode) -> SocketAddr {
    let router = Router::new().route(
        "/",
        post(move || async move { (status, Json(json!({ "error": { "type": "test" } }))) }),
    );
    spawn_router(router).await
}

fn fpl_client(addr: SocketAddr) -> FplClient {
    FplClient::new(format!("http://{addr}"), Duration::from_secs(5))
}

fn advisory_client(addr: SocketAddr) -> AdvisoryClient {
    AdvisoryClient::Active(
        ClaudeAdvisor::new(
            "test-key".to_string(),
            "claude-sonnet-4-5-20250929".to_string(),
            1024,
            Duration::from_secs(5),
        )
        .with_base_url(format!("http://{addr}")),
    )
}

async fn state_with_advisory(advisory_addr: SocketAddr) -> Arc<AppState> {
    let upstream = spawn_upstream().await;
    Arc::new(AppState {
        fpl: fpl_client(upstream),
        advisory: advisory_client(advisory_addr),
    })
}

// ===========================================================================
// Enriched team
// ===========================================================================

#[tokio::test]
async fn enriched_team_resolves_current_event_and_live_points() {
    let upstream = spawn_upstream().await;
    let state = AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    };

    let result = service::enriched_team(&state, 4242, None).await.unwrap();

    // Event 9 carries the is_current flag.
    assert_eq!(result.event, 9);
    assert_eq!(result.team.len(), 15);

    // Join results: names, teams, positions all resolved.
    let captain = &result.team[0];
    assert_eq!(captain.name, "Squad Player1");
    assert_eq!(captain.team, "Arsenal");
    assert_eq!(captain.position, "Goalkeeper");
    assert!(captain.is_captain);
    assert_eq!(captain.multiplier, 2);

    // Live points replace the catalog snapshot (2 everywhere in catalog).
    assert_eq!(captain.event_points, 10);
    assert_eq!(result.team[1].event_points, 4);

    // Every entry has a non-empty team name.
    assert!(result.team.iter().all(|e| !e.team.is_empty()));

    // Captain doubled, ten starters at 4, bench excluded.
    assert_eq!(total_event_points(&result.team), 20 + 40);
}

#[tokio::test]
async fn enriched_team_honors_event_override() {
    let upstream = spawn_upstream().await;
    let state = AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    };

    let result = service::enriched_team(&state, 4242, Some(8)).await.unwrap();
    assert_eq!(result.event, 8);
}

#[tokio::test]
async fn enriched_team_fails_when_upstream_down() {
    let upstream = spawn_broken_upstream().await;
    let state = AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    };

    let err = service::enriched_team(&state, 4242, None).await.unwrap_err();
    assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
}

// ===========================================================================
// Enriched fixtures
// ===========================================================================

#[tokio::test]
async fn fixtures_carry_resolved_names_and_badges() {
    let upstream = spawn_upstream().await;
    let state = AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    };

    let fixtures = service::enriched_fixtures(&state).await.unwrap();
    assert_eq!(fixtures.len(), 3);

    let first = &fixtures[0];
    assert_eq!(first.home_team, "Arsenal");
    assert_eq!(first.away_team, "Chelsea");
    assert!(first.home_badge.ends_with("/t3.png"));
    assert!(first.away_badge.ends_with("/t8.png"));
    assert_eq!(first.status_label(), "LIVE");
    assert_eq!(first.home_score, Some(1));

    assert_eq!(fixtures[1].home_team, "Liverpool");
    assert_eq!(fixtures[1].status_label(), "UPCOMING");
}

// ===========================================================================
// Recommendation flow
// ===========================================================================

#[tokio::test]
async fn recommendation_round_trips_legal_advice_without_warnings() {
    let advisory = spawn_advisory_with_text(legal_recommendation().to_string()).await;
    let state = state_with_advisory(advisory).await;

    let outcome = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 9,
            bank: None,
            free_transfers: None,
            notes: Some("happy to take a hit".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.next_gw, 10);
    assert_eq!(outcome.recommendations.transfers_out, vec!["Squad Player12"]);
    assert_eq!(outcome.recommendations.transfers_in, vec!["Son Heungmin"]);
    assert_eq!(
        outcome.recommendations.captain.as_deref(),
        Some("Squad Player1")
    );
    assert!(
        outcome.warnings.is_empty(),
        "legal advice at exact budget equality: {:?}",
        outcome.warnings
    );
}

#[tokio::test]
async fn recommendation_reports_illegal_advice_as_warnings() {
    // Salah costs 13.0m against 0.5m bank plus a 5.0m sale; the second
    // buy is a name outside the relevant pool entirely.
    let illegal = json!({
        "transfers_out": ["Squad Player12"],
        "transfers_in": ["Mohamed Salah", "Erling Haaland"],
        "captain": "Squad Player1",
        "vice_captain": "Squad Player2",
        "chips": [],
        "notes": ""
    });
    let advisory = spawn_advisory_with_text(illegal.to_string()).await;
    let state = state_with_advisory(advisory).await;

    let outcome = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 9,
            bank: None,
            free_transfers: None,
            notes: None,
        },
    )
    .await
    .unwrap();

    // The advice still comes back; the problems ride alongside it.
    assert_eq!(outcome.recommendations.transfers_in.len(), 2);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.contains("Erling Haaland")));
    assert!(outcome.warnings.iter().any(|w| w.contains("tenths")));
}

#[tokio::test]
async fn recommendation_surfaces_rate_limiting_distinctly() {
    let advisory = spawn_advisory_with_status(StatusCode::TOO_MANY_REQUESTS).await;
    let state = state_with_advisory(advisory).await;

    let err = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 9,
            bank: None,
            free_transfers: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::AdvisoryRateLimited));
}

#[tokio::test]
async fn recommendation_rejects_prose_completions() {
    let advisory =
        spawn_advisory_with_text("You should definitely sign Haaland this week.".to_string()).await;
    let state = state_with_advisory(advisory).await;

    let err = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 9,
            bank: None,
            free_transfers: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::MalformedAdvisoryResponse(_)));
}

#[tokio::test]
async fn recommendation_fails_when_advisory_down() {
    let advisory = spawn_advisory_with_status(StatusCode::INTERNAL_SERVER_ERROR).await;
    let state = state_with_advisory(advisory).await;

    let err = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 9,
            bank: None,
            free_transfers: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::AdvisoryUnavailable(_)));
}

#[tokio::test]
async fn recommendation_with_no_next_fixtures_is_rejected() {
    // last_event 10 targets gameweek 11, which has no scheduled fixtures
    // in the canned data; there is nothing to reason about.
    let advisory = spawn_advisory_with_text(legal_recommendation().to_string()).await;
    let state = state_with_advisory(advisory).await;

    let err = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: 4242,
            last_event: 10,
            bank: None,
            free_transfers: None,
            notes: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidRequest(_)));
}

// ===========================================================================
// HTTP boundary
// ===========================================================================

async fn spawn_api(state: Arc<AppState>) -> SocketAddr {
    spawn_router(server::router(state)).await
}

#[tokio::test]
async fn http_team_endpoint_returns_team_and_event() {
    let upstream = spawn_upstream().await;
    let state = Arc::new(AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    });
    let api = spawn_api(state).await;

    let response = reqwest::get(format!("http://{api}/api/fpl/team/4242"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["event"], 9);
    assert_eq!(body["team"].as_array().unwrap().len(), 15);
    assert_eq!(body["team"][0]["team"], "Arsenal");
}

#[tokio::test]
async fn http_fixtures_endpoint_returns_enriched_cards() {
    let upstream = spawn_upstream().await;
    let state = Arc::new(AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    });
    let api = spawn_api(state).await;

    let response = reqwest::get(format!("http://{api}/api/fpl/fixtures"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    let fixtures = body.as_array().unwrap();
    assert_eq!(fixtures.len(), 3);
    assert_eq!(fixtures[0]["home_team"], "Arsenal");
    assert!(fixtures[0]["home_badge"].as_str().unwrap().contains("badges"));
}

#[tokio::test]
async fn http_missing_required_fields_is_400() {
    let upstream = spawn_upstream().await;
    let state = Arc::new(AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    });
    let api = spawn_api(state).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{api}/api/ai/next-week"))
        .json(&json!({ "notes": "no ids supplied" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn http_rate_limited_advisory_is_429() {
    let advisory = spawn_advisory_with_status(StatusCode::TOO_MANY_REQUESTS).await;
    let state = state_with_advisory(advisory).await;
    let api = spawn_api(state).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{api}/api/ai/next-week"))
        .json(&json!({ "fpl_id": 4242, "last_event": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 429);
}

#[tokio::test]
async fn http_recommendation_happy_path() {
    let advisory = spawn_advisory_with_text(legal_recommendation().to_string()).await;
    let state = state_with_advisory(advisory).await;
    let api = spawn_api(state).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{api}/api/ai/next-week"))
        .json(&json!({ "fpl_id": 4242, "last_event": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["next_gw"], 10);
    assert_eq!(body["recommendations"]["transfers_in"][0], "Son Heungmin");
    assert_eq!(body["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn http_upstream_failure_is_500() {
    let upstream = spawn_broken_upstream().await;
    let state = Arc::new(AppState {
        fpl: fpl_client(upstream),
        advisory: AdvisoryClient::Disabled,
    });
    let api = spawn_api(state).await;

    let response = reqwest::get(format!("http://{api}/api/fpl/team/4242"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "failed to fetch and process FPL data");
}
