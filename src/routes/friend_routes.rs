// teamline-service/src/routes/friend_routes.rs
use crate::models::{FriendRequestCreate, RespondRequest, ServiceError};
use crate::utils::{friend_storage, get_user_id_from_request, user_storage};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct SearchQuery {
    username: String,
}

// Search for users by username, excluding the caller
#[get("/friends/search")]
async fn search_users(
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    if query.username.len() < 2 {
        return Err(ServiceError::BadRequest(
            "Search term must be at least 2 characters.".to_string(),
        ));
    }

    let users = user_storage::search_by_username(&query.username, &user_id, 10)?;

    Ok(HttpResponse::Ok().json(
        users
            .iter()
            .map(|user| {
                json!({
                    "user_id": user.id,
                    "username": user.username,
                    "full_name": user.full_name,
                })
            })
            .collect::<Vec<_>>(),
    ))
}

// Send a friend request to another user
#[post("/friends/request")]
async fn send_friend_request(
    req: HttpRequest,
    data: web::Json<FriendRequestCreate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!(
        "🤝 Friend request from user: {} to username: {}",
        user_id, data.addressee_username
    );

    let addressee = user_storage::find_user_by_username(&data.addressee_username)?
        .ok_or(ServiceError::NotFound)?;

    if addressee.id == user_id {
        return Err(ServiceError::BadRequest(
            "You cannot send a friend request to yourself.".to_string(),
        ));
    }

    let friendship = friend_storage::create_request(&user_id, &addressee.id)?;

    Ok(HttpResponse::Created().json(friendship))
}

// Pending friend requests addressed to the current user
#[get("/friends/requests/pending")]
async fn get_pending_requests(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let mut requests = Vec::new();
    for friendship in friend_storage::pending_for_user(&user_id)? {
        let requester_username = user_storage::find_user_by_id(&friendship.requester_id)?
            .map(|user| user.username);
        requests.push(json!({
            "id": friendship.id,
            "requester_id": friendship.requester_id,
            "requester_username": requester_username,
            "created_at": friendship.created_at.timestamp(),
        }));
    }

    info!("✅ Found {} pending friend requests for user: {}", requests.len(), user_id);

    Ok(HttpResponse::Ok().json(requests))
}

// Accept or decline a pending friend request
#[post("/friends/requests/{friendship_id}/respond")]
async fn respond_to_friend_request(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<RespondRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let friendship_id = path.into_inner();

    info!(
        "🔄 User: {} responding to friend request: {} (accept: {})",
        user_id, friendship_id, data.accept
    );

    // Decline deletes the row and surfaces as 204
    let friendship =
        friend_storage::respond_to_request(&friendship_id, &user_id, data.accept)?;

    Ok(HttpResponse::Ok().json(friendship))
}

// All accepted friends, resolved to the other party regardless of who
// sent the original request
#[get("/friends")]
async fn get_friends_list(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let mut friends = Vec::new();
    for friendship in friend_storage::accepted_for_user(&user_id)? {
        let other_id = friendship.other_side(&user_id);
        if let Some(user) = user_storage::find_user_by_id(other_id)? {
            friends.push(json!({
                "user_id": user.id,
                "username": user.username,
                "full_name": user.full_name,
            }));
        }
    }

    info!("✅ Found {} friends for user: {}", friends.len(), user_id);

    Ok(HttpResponse::Ok().json(friends))
}

// Remove a friendship connection, whichever side initiated it
#[delete("/friends/{friend_id}")]
async fn remove_friend(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let friend_id = path.into_inner();

    info!("🗑️ Removing friendship: {} <-> {}", user_id, friend_id);

    friend_storage::remove_friendship(&user_id, &friend_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// Register all friend routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(search_users)
        .service(send_friend_request)
        .service(get_pending_requests)
        .service(respond_to_friend_request)
        .service(get_friends_list)
        .service(remove_friend);
}
