mod common;

use axum::http::{Method, StatusCode};
use common::{Call, create_movie, movie, spawn_app, token, user_token};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

fn rate(id: Uuid, rating: i32) -> Call {
    Call::new(Method::PUT, &format!("/api/movies/{id}/ratings")).json(json!({ "rating": rating }))
}

#[tokio::test]
async fn rating_requires_a_user_id() {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;

    assert_eq!(rate(id, 4).send(&app).await.status, StatusCode::UNAUTHORIZED);

    let no_user_id = token(json!({ "trusted_member": true }));
    assert_eq!(rate(id, 4).bearer(&no_user_id).send(&app).await.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(0)]
#[case(6)]
#[case(-1)]
#[tokio::test]
async fn out_of_range_rating_is_rejected(#[case] rating: i32) {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;

    let response = rate(id, rating).bearer(&user_token(Uuid::new_v4())).send(&app).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["errors"]["rating"][0], "Rating must be between 1 and 5");
}

#[tokio::test]
async fn non_numeric_rating_is_a_validation_problem() {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;

    let response = Call::new(Method::PUT, &format!("/api/movies/{id}/ratings"))
        .bearer(&user_token(Uuid::new_v4()))
        .json(json!({ "rating": "five" }))
        .send(&app)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers["content-type"], "application/problem+json");
    assert!(response.body["errors"]["rating"].is_array(), "{}", response.body);
}

#[tokio::test]
async fn rating_unknown_movie_is_not_found() {
    let app = spawn_app().await;
    let response = rate(Uuid::new_v4(), 3).bearer(&user_token(Uuid::new_v4())).send(&app).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn average_and_own_rating_are_reported() {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;
    let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

    assert_eq!(rate(id, 4).bearer(&user_token(alice)).send(&app).await.status, StatusCode::OK);
    assert_eq!(rate(id, 5).bearer(&user_token(bob)).send(&app).await.status, StatusCode::OK);

    let anonymous = Call::get(&format!("/api/movies/{id}")).send(&app).await;
    assert_eq!(anonymous.body["rating"], json!(4.5));
    assert!(anonymous.body.get("userRating").is_none());

    let path = format!("/api/movies/{id}");
    let as_alice = Call::get(&path).bearer(&user_token(alice)).send(&app).await;
    assert_eq!(as_alice.body["userRating"], 4);

    // Rating again replaces the earlier score.
    rate(id, 1).bearer(&user_token(alice)).send(&app).await;
    let as_alice = Call::get(&path).bearer(&user_token(alice)).send(&app).await;
    assert_eq!(as_alice.body["userRating"], 1);
    assert_eq!(as_alice.body["rating"], json!(3.0));
}

#[tokio::test]
async fn my_ratings_lists_rated_movies() {
    let app = spawn_app().await;
    let heat = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;
    let alien = create_movie(&app, movie("Alien", 1979, &["Horror"])).await;
    let user = Uuid::new_v4();

    rate(heat, 5).bearer(&user_token(user)).send(&app).await;
    rate(alien, 3).bearer(&user_token(user)).send(&app).await;
    rate(alien, 1).bearer(&user_token(Uuid::new_v4())).send(&app).await;

    let response = Call::get("/api/ratings/me").bearer(&user_token(user)).send(&app).await;
    assert_eq!(response.status, StatusCode::OK);

    let mut ratings = response.body.as_array().unwrap().clone();
    ratings.sort_by_key(|r| r["slug"].as_str().unwrap().to_string());
    assert_eq!(
        ratings,
        vec![
            json!({ "movieId": alien.to_string(), "slug": "alien-1979", "rating": 3 }),
            json!({ "movieId": heat.to_string(), "slug": "heat-1995", "rating": 5 }),
        ]
    );

    assert_eq!(Call::get("/api/ratings/me").send(&app).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_a_rating_twice_is_not_found() {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;
    let user = Uuid::new_v4();
    rate(id, 4).bearer(&user_token(user)).send(&app).await;

    let path = format!("/api/movies/{id}/ratings");
    let first = Call::new(Method::DELETE, &path).bearer(&user_token(user)).send(&app).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = Call::new(Method::DELETE, &path).bearer(&user_token(user)).send(&app).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);

    let movie = Call::get(&format!("/api/movies/{id}")).send(&app).await;
    assert!(movie.body.get("rating").is_none());
}

#[tokio::test]
async fn rating_evicts_cached_movie() {
    let app = spawn_app().await;
    let id = create_movie(&app, movie("Heat", 1995, &["Crime"])).await;
    let path = format!("/api/movies/{id}");

    let before = Call::get(&path).version("2.0").send(&app).await;
    assert!(before.body.get("rating").is_none());

    rate(id, 5).bearer(&user_token(Uuid::new_v4())).send(&app).await;

    let after = Call::get(&path).version("2.0").send(&app).await;
    assert_eq!(after.body["rating"], json!(5.0));
}
