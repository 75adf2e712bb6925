//! Backend proxy routes driven in-process with fake upstreams.

mod support;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use grabapis::adapter::inbound::http::router::build_router;
use grabapis::adapter::inbound::http::state::{
    AppState, ServiceInfo, Upstreams, NASA_BREAKER, RICK_AND_MORTY_BREAKER,
};
use grabapis::application::circuit::CircuitBreakerRegistry;
use grabapis::error::{FetchError, NetworkErrorKind};
use grabapis::port::outbound::upstream::GifSource;
use support::fakes::Fakes;

const NASA_THRESHOLD: u32 = 2;

fn router(fakes: &Fakes, with_giphy: bool) -> Router {
    let registry = CircuitBreakerRegistry::new();
    registry.register(NASA_BREAKER, NASA_THRESHOLD, Duration::from_secs(300));
    registry.register(RICK_AND_MORTY_BREAKER, 5, Duration::from_secs(300));

    let upstreams = Upstreams {
        apods: fakes.apods.clone(),
        characters: fakes.characters.clone(),
        gifs: with_giphy.then(|| fakes.gifs.clone() as Arc<dyn GifSource>),
    };
    let state = AppState::new(upstreams, Arc::new(registry), ServiceInfo::new("test"));
    build_router(state, &["*".to_string()])
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

#[tokio::test]
async fn root_and_health_identify_the_service() {
    let app = router(&Fakes::default(), false);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["docs"], "/api/apis");

    let (status, body) = get(&app, "/api/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = router(&Fakes::default(), false);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn apod_by_date_is_forwarded() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);

    let (status, body) = get(&app, "/api/v1/nasa/apod?date=2024-01-15").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-01-15");
    assert_eq!(fakes.apods.script.calls(), 1);
}

#[tokio::test]
async fn apod_range_is_a_list() {
    let app = router(&Fakes::default(), false);
    let (status, body) = get(
        &app,
        "/api/v1/nasa/apod?start_date=2024-01-01&end_date=2024-01-03",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn invalid_apod_query_lists_every_problem() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);

    let (status, body) = get(&app, "/api/v1/nasa/apod?date=2024-13-45&count=5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().unwrap();
    let fields: Vec<&str> = details
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"date"), "{details:?}");
    assert!(fields.contains(&"count"), "{details:?}");
    assert_eq!(fakes.apods.script.calls(), 0);
}

#[tokio::test]
async fn apod_before_first_publication_is_rejected() {
    let app = router(&Fakes::default(), false);
    let (status, body) = get(&app, "/api/v1/nasa/apod?date=1995-06-15").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["details"][0]["message"].as_str().unwrap();
    assert!(message.contains("1995-06-16"), "{message}");
}

#[tokio::test]
async fn giphy_routes_need_a_key() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);

    for uri in [
        "/api/v1/giphy/trending",
        "/api/v1/giphy/search?q=cats",
        "/api/v1/giphy/random",
        "/api/v1/giphy/gif/abc123",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["detail"], "GIPHY API key not configured");
    }
    assert_eq!(fakes.gifs.script.calls(), 0);
}

#[tokio::test]
async fn giphy_search_requires_a_query() {
    let app = router(&Fakes::default(), true);
    let (status, body) = get(&app, "/api/v1/giphy/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "q");
}

#[tokio::test]
async fn giphy_trending_pages_by_offset() {
    let app = router(&Fakes::default(), true);
    let (status, body) = get(&app, "/api/v1/giphy/trending?limit=10&offset=20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["pagination"]["offset"], 20);
    assert_eq!(body["data"][0]["id"], "g20");
}

#[tokio::test]
async fn single_character_is_an_object_and_many_are_a_list() {
    let app = router(&Fakes::default(), false);

    let (status, body) = get(&app, "/api/v1/rickandmorty/character/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 2);

    let (status, body) = get(&app, "/api/v1/rickandmorty/character/3,1").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_u64())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn unknown_character_is_not_found_and_keeps_the_circuit_closed() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);

    for _ in 0..8 {
        let (status, body) = get(&app, "/api/v1/rickandmorty/character/5000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Character not found");
    }

    assert_eq!(fakes.characters.script.calls(), 8);
    let (_, summary) = get(&app, "/api/monitoring/circuit-breakers").await;
    assert_eq!(summary["summary"]["open_circuits"], 0);
}

#[tokio::test]
async fn bad_character_filter_is_rejected() {
    let app = router(&Fakes::default(), false);
    let (status, body) = get(&app, "/api/v1/rickandmorty/character?status=sleepy").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn network_failures_open_the_circuit_and_stop_upstream_calls() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);
    fakes
        .apods
        .script
        .fail_with(FetchError::network(NetworkErrorKind::Connect, "refused"));

    for _ in 0..NASA_THRESHOLD {
        let (status, body) = get(&app, "/api/v1/nasa/apod").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "NASA API temporarily unavailable");
    }
    assert_eq!(fakes.apods.script.calls(), NASA_THRESHOLD as usize);

    fakes.apods.script.recover();
    let (status, _) = get(&app, "/api/v1/nasa/apod").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        fakes.apods.script.calls(),
        NASA_THRESHOLD as usize,
        "open circuit must not reach the upstream"
    );

    let (status, body) = get(&app, "/api/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains(NASA_BREAKER));

    let (status, body) = get(&app, &format!("/api/monitoring/circuit-breakers/{NASA_BREAKER}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["state"], "OPEN");
    assert_eq!(body["metrics"]["rejected_requests"], 1);
    assert!(body["recommendations"].get("immediate").is_some());

    let (status, body) = get(&app, "/api/health/detailed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "unhealthy");
    assert_eq!(body["dependencies"][NASA_BREAKER]["status"], "unhealthy");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/monitoring/circuit-breakers/{NASA_BREAKER}/reset"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["circuit_name"], NASA_BREAKER);

    let (status, _) = get(&app, "/api/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/api/v1/nasa/apod").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fakes.apods.script.calls(), NASA_THRESHOLD as usize + 1);
}

#[tokio::test]
async fn reset_all_closes_every_circuit() {
    let fakes = Fakes::default();
    let app = router(&fakes, false);
    fakes
        .apods
        .script
        .fail_with(FetchError::api(502, "bad gateway"));
    for _ in 0..NASA_THRESHOLD {
        get(&app, "/api/v1/nasa/apod").await;
    }
    let (_, summary) = get(&app, "/api/monitoring/circuit-breakers").await;
    assert_eq!(summary["summary"]["open_circuits"], 1);
    assert_eq!(summary["open_circuit_names"][0], NASA_BREAKER);

    let (status, body) = send(&app, Method::POST, "/api/monitoring/circuit-breakers/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, summary) = get(&app, "/api/monitoring/circuit-breakers").await;
    assert_eq!(summary["summary"]["open_circuits"], 0);
}

#[tokio::test]
async fn unknown_circuit_lists_the_available_ones() {
    let app = router(&Fakes::default(), false);
    let (status, body) = get(&app, "/api/monitoring/circuit-breakers/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Circuit breaker 'nope' not found");
    let available = body["available_circuits"].as_array().unwrap();
    assert!(available.iter().any(|n| n == NASA_BREAKER));

    let (status, _) = send(&app, Method::POST, "/api/monitoring/circuit-breakers/nope/reset").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_filters_and_pages() {
    let app = router(&Fakes::default(), false);

    let (status, body) = get(&app, "/api/apis?category=entertainment").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (status, body) = get(&app, "/api/apis?per_page=2&page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["apis"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["page"], 2);

    let (status, _) = get(&app, "/api/apis?per_page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_detail_and_categories() {
    let app = router(&Fakes::default(), false);

    let (status, body) = get(&app, "/api/apis/giphy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "GIPHY");

    let (status, body) = get(&app, "/api/apis/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "API 'unknown' not found");

    let (_, body) = get(&app, "/api/apis/categories").await;
    assert!(body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "entertainment"));
}
