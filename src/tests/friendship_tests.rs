// teamline-service/src/tests/friendship_tests.rs
use super::{register_user, test_app};
use actix_web::test;
use serde_json::json;

#[actix_rt::test]
async fn test_request_accept_and_symmetry() {
    let app = test_app!();
    let (alice_id, _, _, alice_token) = register_user!(app, "alice");
    let (bob_id, bob_username, _, bob_token) = register_user!(app, "bob");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username }))
        .to_request();
    let friendship: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(friendship["status"], "pending");
    let friendship_id = friendship["id"].as_str().unwrap().to_string();

    // Bob sees it in his pending list
    let request = test::TestRequest::get()
        .uri("/friends/requests/pending")
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let pending: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert!(pending
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == friendship_id.as_str()));

    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(json!({ "accept": true }))
        .to_request();
    let accepted: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(accepted["status"], "accepted");

    // Both sides see the other exactly once, direction is invisible
    let request = test::TestRequest::get()
        .uri("/friends")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .to_request();
    let alice_friends: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    let bob_entries = alice_friends
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["user_id"] == bob_id.as_str())
        .count();
    assert_eq!(bob_entries, 1);

    let request = test::TestRequest::get()
        .uri("/friends")
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let bob_friends: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    let alice_entries = bob_friends
        .as_array()
        .unwrap()
        .iter()
        .filter(|f| f["user_id"] == alice_id.as_str())
        .count();
    assert_eq!(alice_entries, 1);
}

#[actix_rt::test]
async fn test_reverse_direction_request_conflicts() {
    let app = test_app!();
    let (_, alice_username, _, alice_token) = register_user!(app, "alice");
    let (_, bob_username, _, bob_token) = register_user!(app, "bob");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username.clone() }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 201);

    // The reverse pair is the same relationship
    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(json!({ "addressee_username": alice_username }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 409);

    // And so is a straight duplicate
    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 409);
}

#[actix_rt::test]
async fn test_self_request_is_bad_request() {
    let app = test_app!();
    let (_, alice_username, _, alice_token) = register_user!(app, "alice");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": alice_username }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);
}

#[actix_rt::test]
async fn test_unknown_addressee_is_not_found() {
    let app = test_app!();
    let (_, _, _, alice_token) = register_user!(app, "alice");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": "nobody_here_by_that_name" }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);
}

#[actix_rt::test]
async fn test_decline_deletes_the_request() {
    let app = test_app!();
    let (_, _, _, alice_token) = register_user!(app, "alice");
    let (_, bob_username, _, bob_token) = register_user!(app, "bob");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username.clone() }))
        .to_request();
    let friendship: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    let friendship_id = friendship["id"].as_str().unwrap().to_string();

    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(json!({ "accept": false }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 204);

    // Gone: a second respond finds nothing
    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(json!({ "accept": true }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);

    // The pair may start over
    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 201);
}

#[actix_rt::test]
async fn test_only_the_addressee_can_respond() {
    let app = test_app!();
    let (_, _, _, alice_token) = register_user!(app, "alice");
    let (_, bob_username, _, _) = register_user!(app, "bob");
    let (_, _, _, carol_token) = register_user!(app, "carol");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username }))
        .to_request();
    let friendship: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    let friendship_id = friendship["id"].as_str().unwrap().to_string();

    // A third party sees nothing
    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", carol_token)))
        .set_json(json!({ "accept": true }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);

    // The requester cannot accept their own request either
    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "accept": true }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);
}

#[actix_rt::test]
async fn test_remove_friend_from_either_side() {
    let app = test_app!();
    let (alice_id, _, _, alice_token) = register_user!(app, "alice");
    let (bob_id, bob_username, _, bob_token) = register_user!(app, "bob");

    let request = test::TestRequest::post()
        .uri("/friends/request")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(json!({ "addressee_username": bob_username }))
        .to_request();
    let friendship: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    let friendship_id = friendship["id"].as_str().unwrap().to_string();

    // Removal needs an accepted row
    let request = test::TestRequest::delete()
        .uri(&format!("/friends/{}", bob_id))
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);

    let request = test::TestRequest::post()
        .uri(&format!("/friends/requests/{}/respond", friendship_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(json!({ "accept": true }))
        .to_request();
    test::call_service(&app, request).await;

    // Bob unfriends Alice even though Alice initiated
    let request = test::TestRequest::delete()
        .uri(&format!("/friends/{}", alice_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 204);

    let request = test::TestRequest::get()
        .uri("/friends")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .to_request();
    let friends: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert!(!friends
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f["user_id"] == bob_id.as_str()));

    let request = test::TestRequest::delete()
        .uri(&format!("/friends/{}", alice_id))
        .insert_header(("Authorization", format!("Bearer {}", bob_token)))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 404);
}

#[actix_rt::test]
async fn test_user_search() {
    let app = test_app!();
    let (_, _, _, alice_token) = register_user!(app, "alice");
    let (target_id, target_username, _, target_token) = register_user!(app, "findme");

    // Queries under two characters are rejected
    let request = test::TestRequest::get()
        .uri("/friends/search?username=f")
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 400);

    // Exact-substring search finds the target
    let request = test::TestRequest::get()
        .uri(&format!("/friends/search?username={}", target_username))
        .insert_header(("Authorization", format!("Bearer {}", alice_token)))
        .to_request();
    let results: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert!(results
        .as_array()
        .unwrap()
        .iter()
        .any(|u| u["user_id"] == target_id.as_str()));

    // The caller never shows up in their own results
    let request = test::TestRequest::get()
        .uri(&format!("/friends/search?username={}", target_username))
        .insert_header(("Authorization", format!("Bearer {}", target_token)))
        .to_request();
    let results: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert!(results.as_array().unwrap().is_empty());
}
