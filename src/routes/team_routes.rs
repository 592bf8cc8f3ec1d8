// teamline-service/src/routes/team_routes.rs
use crate::models::{
    AccessLevel, InviteRequest, RespondRequest, RoleUpdate, ServiceError, Team, TeamData, TeamRole,
};
use crate::utils::{
    get_user_id_from_request, is_valid_email, notify, team_storage, user_storage,
};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde_json::json;
use uuid::Uuid;

// Create a new team; the creator becomes owner with an immediate
// accepted admin membership
#[post("/teams")]
async fn create_team(
    req: HttpRequest,
    team_data: web::Json<TeamData>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    info!("📝 Creating new team: {} for user: {}", team_data.name, user_id);

    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: team_data.name.clone(),
        description: team_data.description.clone(),
        owner_id: user_id,
        created_at: Utc::now(),
    };

    team_storage::create_team(&team)?;

    Ok(HttpResponse::Created().json(team))
}

// Get all teams the current user is an accepted member of
#[get("/teams")]
async fn get_user_teams(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let teams = team_storage::teams_for_user(&user_id)?;

    info!("✅ Found {} teams for user: {}", teams.len(), user_id);

    Ok(HttpResponse::Ok().json(teams))
}

// The current user's invitation inbox
#[get("/teams/invitations/pending")]
async fn get_pending_invitations(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let mut invitations = Vec::new();
    for membership in team_storage::pending_invitations_for_user(&user_id)? {
        let team_name =
            team_storage::find_team_by_id(&membership.team_id)?.map(|team| team.name);
        invitations.push(json!({
            "id": membership.id,
            "team_id": membership.team_id,
            "team_name": team_name,
            "role": membership.role,
            "status": membership.status,
            "invited_at": membership.joined_at.timestamp(),
        }));
    }

    info!("✅ Found {} pending invitations for user: {}", invitations.len(), user_id);

    Ok(HttpResponse::Ok().json(invitations))
}

// Accept or decline a pending invitation
#[post("/teams/invitations/{team_id}/respond")]
async fn respond_to_invitation(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<RespondRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!(
        "🔄 User: {} responding to invitation for team: {} (accept: {})",
        user_id, team_id, data.accept
    );

    // Decline deletes the row and surfaces as 204
    let membership = team_storage::respond_to_invitation(&team_id, &user_id, data.accept)?;

    Ok(HttpResponse::Ok().json(membership))
}

// Get a specific team with its accepted roster
#[get("/teams/{team_id}")]
async fn get_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Member)?;

    let members = roster_json(&team_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "id": team.id,
        "name": team.name,
        "description": team.description,
        "owner_id": team.owner_id,
        "created_at": team.created_at.timestamp(),
        "members": members,
    })))
}

// Get team members (accepted only)
#[get("/teams/{team_id}/members")]
async fn get_team_members(
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    team_storage::check_team_access(&team_id, &user_id, AccessLevel::Member)?;

    let members = roster_json(&team_id)?;

    info!("✅ Found {} team members", members.len());

    Ok(HttpResponse::Ok().json(members))
}

// Invite a user to the team by email. Admins only. The ledger write is
// the source of truth; the email is queued afterwards, best-effort.
#[post("/teams/{team_id}/members")]
async fn invite_team_member(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<InviteRequest>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("📧 Inviting {} to team: {}", data.email, team_id);

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Admin)?;

    if !is_valid_email(&data.email) {
        return Err(ServiceError::BadRequest(format!(
            "'{}' is not a valid email address.",
            data.email
        )));
    }

    let inviter = user_storage::find_user_by_id(&user_id)?.ok_or(ServiceError::Unauthorized)?;

    match user_storage::find_user_by_email(&data.email)? {
        Some(invited_user) => {
            if invited_user.id == user_id {
                return Err(ServiceError::BadRequest(
                    "You cannot invite yourself.".to_string(),
                ));
            }

            let membership =
                team_storage::create_invitation(&team.id, &invited_user.id, data.role)?;

            notify::send_invitation_to_existing_user(
                &invited_user.email,
                inviter.display_name(),
                &team.name,
                data.role,
            );

            Ok(HttpResponse::Created().json(json!({
                "message": format!("Invitation sent to existing user {}.", data.email),
                "membership": membership,
            })))
        }
        None => {
            // No account yet, so no ledger row; just ask them to sign up
            notify::send_invitation_to_new_user(
                &data.email,
                inviter.display_name(),
                &team.name,
                data.role,
            );

            Ok(HttpResponse::Created().json(json!({
                "message": format!(
                    "Invitation email sent to {}. They will need to sign up to join.",
                    data.email
                ),
            })))
        }
    }
}

// Update a team member's role. Admins only; never the owner, never
// yourself.
#[put("/teams/{team_id}/members/{member_id}/role")]
async fn update_member_role(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Json<RoleUpdate>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (team_id, member_id) = path.into_inner();

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Admin)?;

    if member_id == team.owner_id {
        return Err(ServiceError::Forbidden(
            "The team owner's role cannot be changed.".to_string(),
        ));
    }
    if member_id == user_id {
        return Err(ServiceError::Forbidden(
            "You cannot change your own role.".to_string(),
        ));
    }

    let updated = team_storage::update_member_role(&team_id, &member_id, data.role)?;

    Ok(HttpResponse::Ok().json(updated))
}

// Remove a member from the team. Admins only; the owner can never be
// removed, and self-removal goes through the leave endpoint.
#[delete("/teams/{team_id}/members/{member_id}")]
async fn remove_team_member(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let (team_id, member_id) = path.into_inner();

    info!("🗑️ Removing user: {} from team: {}", member_id, team_id);

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Admin)?;

    if member_id == team.owner_id {
        return Err(ServiceError::Forbidden(
            "The team owner cannot be removed.".to_string(),
        ));
    }
    if member_id == user_id {
        return Err(ServiceError::BadRequest(
            "You cannot remove yourself. Use leave team functionality instead.".to_string(),
        ));
    }

    team_storage::remove_membership(&team_id, &member_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// Leave a team. Open to any accepted member except the owner, who must
// transfer ownership or delete the team instead.
#[post("/teams/{team_id}/leave")]
async fn leave_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🚪 User: {} leaving team: {}", user_id, team_id);

    let (team, _) = team_storage::check_team_access(&team_id, &user_id, AccessLevel::Member)?;

    if team.owner_id == user_id {
        return Err(ServiceError::Forbidden(
            "The team owner cannot leave the team. Transfer ownership or delete the team instead."
                .to_string(),
        ));
    }

    team_storage::remove_membership(&team_id, &user_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// Get the current user's role and derived permissions in a team
#[get("/teams/{team_id}/my-role")]
async fn get_my_role(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    let (team, membership) =
        team_storage::check_team_access(&team_id, &user_id, AccessLevel::Member)?;

    let is_owner = team.owner_id == user_id;
    let is_admin = membership.role == TeamRole::Admin;

    Ok(HttpResponse::Ok().json(json!({
        "role": membership.role,
        "is_owner": is_owner,
        "is_admin": is_admin,
        "permissions": {
            "can_invite_members": is_admin,
            "can_remove_members": is_admin,
            "can_change_roles": is_admin,
            "can_delete_team": is_owner,
            "can_manage_settings": is_admin,
        },
    })))
}

// Delete a team. Owner only; cascades to memberships, projects,
// milestones and tasks.
#[delete("/teams/{team_id}")]
async fn delete_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;
    let team_id = path.into_inner();

    info!("🗑️ Deleting team: {}", team_id);

    team_storage::check_team_access(&team_id, &user_id, AccessLevel::Owner)?;

    team_storage::delete_team(&team_id)?;

    Ok(HttpResponse::NoContent().finish())
}

// Accepted roster resolved to user profiles
fn roster_json(team_id: &str) -> Result<Vec<serde_json::Value>, ServiceError> {
    let mut members = Vec::new();

    for membership in team_storage::accepted_members(team_id)? {
        let user = match user_storage::find_user_by_id(&membership.user_id)? {
            Some(user) => user,
            None => {
                error!("❌ Membership without user record: {}", membership.user_id);
                continue;
            }
        };

        members.push(json!({
            "user_id": membership.user_id,
            "username": user.username,
            "email": user.email,
            "full_name": user.full_name,
            "role": membership.role,
            "joined_at": membership.joined_at.timestamp(),
        }));
    }

    Ok(members)
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(get_pending_invitations)
        .service(respond_to_invitation)
        .service(get_team)
        .service(get_team_members)
        .service(invite_team_member)
        .service(update_member_role)
        .service(remove_team_member)
        .service(leave_team)
        .service(get_my_role)
        .service(delete_team);
}
