//! Status codes and JSON bodies produced by `AppError`.
use actix_web::{App, HttpResponse, http::StatusCode, test, web};
use sea_orm::DbErr;
use serde_json::Value;

use gig_agenda::error::AppError;

async fn respond(err: fn() -> AppError) -> (StatusCode, Value) {
    let app = test::init_service(App::new().route(
        "/",
        web::get().to(move || async move { Err::<HttpResponse, _>(err()) }),
    ))
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn field_errors_are_keyed_by_field() {
    let (status, body) = respond(|| AppError::validation("hourly_rate", "Amount too large")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["hourly_rate"][0], "Amount too large");
}

#[actix_web::test]
async fn uniqueness_race_is_a_retryable_conflict() {
    let (status, body) =
        respond(|| AppError::UniquenessRace("contract number CT-2025-0004 is already taken".into()))
            .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["retryable"], true);
}

#[actix_web::test]
async fn database_errors_hide_their_details() {
    let (status, body) =
        respond(|| AppError::from(DbErr::Custom("relation contracts is locked".into()))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal database error");
}

#[actix_web::test]
async fn missing_contract_is_not_found() {
    let (status, body) = respond(|| AppError::not_found("Contract", uuid::Uuid::nil())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().starts_with("Contract"));
}
