// teamline-service/src/tests/mod.rs
//
// End-to-end tests driving the service through the actix test harness:
// register real users, log in, and exercise the membership, friendship
// and resource flows over HTTP.
mod friendship_tests;

// Build the full application under test
macro_rules! test_app {
    () => {{
        crate::utils::storage::ensure_storage_dirs().unwrap();
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(crate::routes::auth_routes::init_routes)
                .configure(crate::routes::team_routes::init_routes)
                .configure(crate::routes::friend_routes::init_routes)
                .configure(crate::routes::project_routes::init_routes),
        )
        .await
    }};
}

// Register a fresh user with a unique username/email and log them in.
// Yields (user_id, username, email, token).
macro_rules! register_user {
    ($app:expr, $prefix:expr) => {{
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let username = format!("{}_{}", $prefix, &suffix[..12]);
        let email = format!("{}@example.com", username);

        let request = actix_web::test::TestRequest::post()
            .uri("/auth/register")
            .set_json(serde_json::json!({
                "username": username,
                "email": email,
                "password": "s3cret-pass",
            }))
            .to_request();
        let body: serde_json::Value =
            actix_web::test::call_and_read_body_json(&$app, request).await;
        let user_id = body["user_id"]
            .as_str()
            .expect("register response should contain user_id")
            .to_string();

        let request = actix_web::test::TestRequest::post()
            .uri("/auth/login")
            .set_json(serde_json::json!({
                "email": email,
                "password": "s3cret-pass",
            }))
            .to_request();
        let body: serde_json::Value =
            actix_web::test::call_and_read_body_json(&$app, request).await;
        let token = body["token"]
            .as_str()
            .expect("login response should contain token")
            .to_string();

        (user_id, username, email, token)
    }};
}

// Create a team and return its id
macro_rules! create_team {
    ($app:expr, $token:expr, $name:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri("/teams")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(serde_json::json!({ "name": $name, "description": null }))
            .to_request();
        let body: serde_json::Value =
            actix_web::test::call_and_read_body_json(&$app, request).await;
        body["id"]
            .as_str()
            .expect("create team response should contain id")
            .to_string()
    }};
}

// Invite a registered user into a team and accept on their behalf
macro_rules! add_member {
    ($app:expr, $admin_token:expr, $member_email:expr, $member_token:expr, $team_id:expr, $role:expr) => {{
        let request = actix_web::test::TestRequest::post()
            .uri(&format!("/teams/{}/members", $team_id))
            .insert_header(("Authorization", format!("Bearer {}", $admin_token)))
            .set_json(serde_json::json!({ "email": $member_email, "role": $role }))
            .to_request();
        let response = actix_web::test::call_service(&$app, request).await;
        assert_eq!(response.status(), 201);

        let request = actix_web::test::TestRequest::post()
            .uri(&format!("/teams/invitations/{}/respond", $team_id))
            .insert_header(("Authorization", format!("Bearer {}", $member_token)))
            .set_json(serde_json::json!({ "accept": true }))
            .to_request();
        let response = actix_web::test::call_service(&$app, request).await;
        assert_eq!(response.status(), 200);
    }};
}

pub(crate) use add_member;
pub(crate) use create_team;
pub(crate) use register_user;
pub(crate) use test_app;
