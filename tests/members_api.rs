//! End-to-end API tests
//!
//! These drive the full router over the in-memory repositories, so they
//! verify the HTTP surface without needing a database: pagination and
//! sorting of the member listing, DTO projection, parameter validation,
//! and the member/team write paths.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use roster_api::api::{app, AppState};
use roster_api::config::PageLimits;
use roster_api::domain::member::Member;
use roster_api::domain::team::Team;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

/// Fresh router plus the state backing it, for seeding
fn setup_app() -> (Router, AppState) {
    let state = AppState::in_memory(PageLimits::default());
    (app(state.clone()), state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    read_response(response).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

/// Saves five members with age 10, named member1..member5
async fn seed_five_members(state: &AppState) {
    for name in ["member1", "member2", "member3", "member4", "member5"] {
        state
            .members
            .save(&Member::new(name, 10).unwrap())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn health_check() {
    let (app, _) = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn first_page_sorted_by_username_desc() {
    let (app, state) = setup_app();
    seed_five_members(&state).await;

    let (status, body) = get(app, "/members?page=0&size=3&sort=username,desc").await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 3);
    assert_eq!(content[0]["username"], "member5");
    assert_eq!(content[1]["username"], "member4");
    assert_eq!(content[2]["username"], "member3");
    assert_eq!(body["page"], 0);
    assert_eq!(body["size"], 3);
    assert_eq!(body["first"], true);
    assert_eq!(body["hasNext"], true);
    assert_eq!(body["totalElements"], 5);
    assert_eq!(body["totalPages"], 2);
}

#[tokio::test]
async fn last_page_has_remainder_and_no_next() {
    let (app, state) = setup_app();
    seed_five_members(&state).await;

    let (status, body) = get(app, "/members?page=1&size=3&sort=username,desc").await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["username"], "member2");
    assert_eq!(content[1]["username"], "member1");
    assert_eq!(body["first"], false);
    assert_eq!(body["hasNext"], false);
}

#[tokio::test]
async fn multi_key_sort_repeats_the_sort_parameter() {
    let (app, state) = setup_app();
    for (name, age) in [("bbb", 20), ("aaa", 20), ("ccc", 10)] {
        state
            .members
            .save(&Member::new(name, age).unwrap())
            .await
            .unwrap();
    }

    let (status, body) = get(app, "/members?sort=age,desc&sort=username,asc").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["aaa", "bbb", "ccc"]);
}

#[tokio::test]
async fn age_filter_narrows_the_listing() {
    let (app, state) = setup_app();
    state
        .members
        .save(&Member::new("young", 10).unwrap())
        .await
        .unwrap();
    state
        .members
        .save(&Member::new("old", 40).unwrap())
        .await
        .unwrap();

    let (status, body) = get(app, "/members?age=10").await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["username"], "young");
    assert_eq!(body["totalElements"], 1);
}

#[tokio::test]
async fn listing_projects_team_names() {
    let (app, state) = setup_app();
    let mut team = Team::new("teamA").unwrap();
    state.teams.save(&team).await.unwrap();
    state
        .members
        .save(&Member::with_team("member1", 10, &mut team).unwrap())
        .await
        .unwrap();
    state
        .members
        .save(&Member::new("member2", 20).unwrap())
        .await
        .unwrap();

    let (status, body) = get(app, "/members?sort=username,asc").await;

    assert_eq!(status, StatusCode::OK);
    let content = body["content"].as_array().unwrap();
    assert_eq!(content[0]["teamName"], "teamA");
    assert_eq!(content[1]["teamName"], Value::Null);
}

#[tokio::test]
async fn zero_size_is_a_client_error() {
    let (app, _) = setup_app();

    let (status, body) = get(app, "/members?size=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("page size"));
}

#[tokio::test]
async fn unparseable_size_is_a_client_error() {
    let (app, _) = setup_app();

    let (status, _) = get(app, "/members?size=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_sort_field_is_a_client_error() {
    let (app, _) = setup_app();

    let (status, body) = get(app, "/members?sort=height,asc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("height"));
}

#[tokio::test]
async fn bad_sort_direction_is_a_client_error() {
    let (app, _) = setup_app();

    let (status, _) = get(app, "/members?sort=age,sideways").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_page_size_is_clamped() {
    let (app, state) = setup_app();
    seed_five_members(&state).await;

    let (status, body) = get(app, "/members?size=1000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], 100);
    assert_eq!(body["content"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn get_member_returns_dto_with_team_name() {
    let (app, state) = setup_app();
    let mut team = Team::new("teamA").unwrap();
    state.teams.save(&team).await.unwrap();
    let member = Member::with_team("member1", 10, &mut team).unwrap();
    state.members.save(&member).await.unwrap();

    let (status, body) = get(app, &format!("/members/{}", member.id())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], member.id().to_string());
    assert_eq!(body["username"], "member1");
    assert_eq!(body["teamName"], "teamA");
}

#[tokio::test]
async fn get_absent_member_is_404() {
    let (app, _) = setup_app();

    let (status, _) = get(app, &format!("/members/{}", Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_member_with_malformed_id_is_a_client_error() {
    let (app, _) = setup_app();

    let (status, _) = get(app, "/members/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_member_assigned_to_team() {
    let (app, state) = setup_app();
    let team = Team::new("teamA").unwrap();
    state.teams.save(&team).await.unwrap();

    let (status, body) = post(
        app.clone(),
        "/members",
        json!({ "username": "fresh", "age": 7, "teamId": team.id() }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "fresh");
    assert_eq!(body["teamName"], "teamA");

    // And it shows up in the listing
    let (_, listing) = get(app, "/members?username=fresh").await;
    assert_eq!(listing["totalElements"], 1);
}

#[tokio::test]
async fn create_member_with_empty_username_is_rejected() {
    let (app, _) = setup_app();

    let (status, _) = post(app, "/members", json!({ "username": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_member_with_unknown_team_is_rejected() {
    let (app, _) = setup_app();

    let (status, body) = post(
        app,
        "/members",
        json!({ "username": "orphan", "teamId": Uuid::new_v4() }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Team not found"));
}

#[tokio::test]
async fn create_team_then_duplicate_name_conflicts() {
    let (app, _) = setup_app();

    let (status, body) = post(app.clone(), "/teams", json!({ "name": "teamA" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "teamA");

    let (status, _) = post(app, "/teams", json!({ "name": "teamA" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_team_with_members_conflicts() {
    let (app, state) = setup_app();
    let mut team = Team::new("teamA").unwrap();
    state.teams.save(&team).await.unwrap();
    state
        .members
        .save(&Member::with_team("member1", 10, &mut team).unwrap())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/teams/{}", team.id()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_empty_team_succeeds_then_404s() {
    let (app, state) = setup_app();
    let team = Team::new("teamA").unwrap();
    state.teams.save(&team).await.unwrap();

    let request = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/teams/{}", team.id()))
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_listing_is_a_well_formed_page() {
    let (app, _) = setup_app();

    let (status, body) = get(app, "/members").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalElements"], 0);
    assert_eq!(body["first"], true);
    assert_eq!(body["hasNext"], false);
}
