// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Detail and results page tests.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{body_string, create_choice, create_question, get};

#[tokio::test]
async fn test_future_question_detail_is_404() {
    let (app, state) = common::create_test_app().await;
    let question = create_question(&state.db, "Future question", 30).await;

    let response = app
        .oneshot(get(&format!("/polls/{}/", question.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_past_question_detail() {
    let (app, state) = common::create_test_app().await;
    let question = create_question(&state.db, "Past question", -30).await;
    create_choice(&state.db, &question, "Not much").await;
    create_choice(&state.db, &question, "The sky").await;

    let response = app
        .oneshot(get(&format!("/polls/{}/", question.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Past question"));
    assert!(body.contains("Not much"));
    assert!(body.contains("The sky"));
    assert!(body.contains(&format!("action=\"/polls/{}/vote/\"", question.id)));
    assert!(!body.contains("Please pick a choice!"));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_404() {
    let (app, _) = common::create_test_app().await;

    for uri in ["/polls/999/", "/polls/abc/", "/polls/999/results/", "/polls/x/results/"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_results_show_vote_counts() {
    let (app, state) = common::create_test_app().await;
    let question = create_question(&state.db, "Past question", -1).await;
    let one = create_choice(&state.db, &question, "Alpha").await;
    create_choice(&state.db, &question, "Beta").await;
    state.db.record_vote(question.id, one.id).await.unwrap();

    let response = app
        .oneshot(get(&format!("/polls/{}/results/", question.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Alpha -- 1 vote<"));
    assert!(body.contains("Beta -- 0 votes"));
    assert!(body.contains(&format!("href=\"/polls/{}/\"", question.id)));
}

#[tokio::test]
async fn test_results_have_no_publish_date_filter() {
    let (app, state) = common::create_test_app().await;
    let question = create_question(&state.db, "Future question", 30).await;

    let response = app
        .oneshot(get(&format!("/polls/{}/results/", question.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Future question"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = common::create_test_app().await;

    let response = app.oneshot(get("/nope/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("Not Found"));
}
