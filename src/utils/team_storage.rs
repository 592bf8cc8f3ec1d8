// teamline-service/src/utils/team_storage.rs
//
// The membership ledger: one JSON record per team and one per
// (user, team) pair. Membership records are keyed on disk by the natural
// key, so a second writer for the same pair loses at create time.
// Transitions (invite, respond, role change, removal) hold LEDGER while
// they read-validate-write so no interleaving is observable.
use crate::models::{
    AccessLevel, Membership, MembershipStatus, ServiceError, Team, TeamRole,
};
use crate::utils::storage;
use lazy_static::lazy_static;
use log::info;
use std::path::PathBuf;
use std::sync::Mutex;

lazy_static! {
    static ref LEDGER: Mutex<()> = Mutex::new(());
}

fn team_path(team_id: &str) -> PathBuf {
    storage::dir("teams").join(format!("{}.json", team_id))
}

fn membership_path(team_id: &str, user_id: &str) -> PathBuf {
    storage::dir("memberships").join(format!("{}__{}.json", team_id, user_id))
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    // A poisoned lock only means another request panicked mid-transition;
    // the ledger files themselves are still consistent.
    LEDGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// --- Teams ---

// Save a new team together with the creator's admin membership.
// Enforces per-owner team-name uniqueness.
pub fn create_team(team: &Team) -> Result<Membership, ServiceError> {
    let _guard = lock();

    let teams: Vec<Team> = storage::scan(&storage::dir("teams"))?;
    if teams
        .iter()
        .any(|t| t.owner_id == team.owner_id && t.name == team.name)
    {
        return Err(ServiceError::Conflict(format!(
            "You have already created a team with the name '{}'.",
            team.name
        )));
    }

    storage::write_json(&team_path(&team.id), team)?;

    // The creator joins immediately: no invitation step, admin role
    let membership = Membership::new(
        team.owner_id.clone(),
        team.id.clone(),
        TeamRole::Admin,
        MembershipStatus::Accepted,
    );
    storage::write_json(&membership_path(&team.id, &team.owner_id), &membership)?;

    info!("✅ Team created: {} (owner: {})", team.id, team.owner_id);
    Ok(membership)
}

pub fn find_team_by_id(team_id: &str) -> Result<Option<Team>, ServiceError> {
    storage::read_json(&team_path(team_id))
}

// Delete a team and everything hanging off it: memberships, projects,
// milestones, tasks.
pub fn delete_team(team_id: &str) -> Result<(), ServiceError> {
    let _guard = lock();

    for membership in memberships_for_team(team_id)? {
        storage::remove_json(&membership_path(team_id, &membership.user_id))?;
    }

    crate::utils::project_storage::delete_team_projects(team_id)?;
    storage::remove_json(&team_path(team_id))?;

    info!("✅ Team deleted: {}", team_id);
    Ok(())
}

// --- Membership ledger ---

// Create a pending membership for an invited user. Any existing row for
// the pair, pending or accepted, is a conflict; the on-disk natural key
// breaks ties between concurrent inviters.
pub fn create_invitation(
    team_id: &str,
    user_id: &str,
    role: TeamRole,
) -> Result<Membership, ServiceError> {
    let _guard = lock();

    if find_membership(team_id, user_id)?.is_some() {
        return Err(ServiceError::Conflict(
            "User is already a member of this team or has a pending invitation.".to_string(),
        ));
    }

    let membership = Membership::new(
        user_id.to_string(),
        team_id.to_string(),
        role,
        MembershipStatus::Pending,
    );

    if !storage::create_json(&membership_path(team_id, user_id), &membership)? {
        // Lost the race to a concurrent invite
        return Err(ServiceError::Conflict(
            "User is already a member of this team or has a pending invitation.".to_string(),
        ));
    }

    info!(
        "✅ Invitation created: user {} -> team {} as {}",
        user_id,
        team_id,
        role.label()
    );
    Ok(membership)
}

pub fn find_membership(team_id: &str, user_id: &str) -> Result<Option<Membership>, ServiceError> {
    storage::read_json(&membership_path(team_id, user_id))
}

pub fn memberships_for_team(team_id: &str) -> Result<Vec<Membership>, ServiceError> {
    let memberships: Vec<Membership> = storage::scan(&storage::dir("memberships"))?;
    Ok(memberships
        .into_iter()
        .filter(|m| m.team_id == team_id)
        .collect())
}

// Team roster: accepted rows only
pub fn accepted_members(team_id: &str) -> Result<Vec<Membership>, ServiceError> {
    Ok(memberships_for_team(team_id)?
        .into_iter()
        .filter(|m| m.status == MembershipStatus::Accepted)
        .collect())
}

// The user's invitation inbox
pub fn pending_invitations_for_user(user_id: &str) -> Result<Vec<Membership>, ServiceError> {
    let memberships: Vec<Membership> = storage::scan(&storage::dir("memberships"))?;
    Ok(memberships
        .into_iter()
        .filter(|m| m.user_id == user_id && m.status == MembershipStatus::Pending)
        .collect())
}

// Teams where the user holds an accepted membership
pub fn teams_for_user(user_id: &str) -> Result<Vec<Team>, ServiceError> {
    let memberships: Vec<Membership> = storage::scan(&storage::dir("memberships"))?;
    let mut teams = Vec::new();

    for membership in memberships
        .into_iter()
        .filter(|m| m.user_id == user_id && m.status == MembershipStatus::Accepted)
    {
        if let Some(team) = find_team_by_id(&membership.team_id)? {
            teams.push(team);
        }
    }

    Ok(teams)
}

// Accept or decline a pending invitation. Exactly one concurrent caller
// observes the pending row; everyone after it gets NotFound.
pub fn respond_to_invitation(
    team_id: &str,
    user_id: &str,
    accept: bool,
) -> Result<Membership, ServiceError> {
    let _guard = lock();

    let mut membership = match find_membership(team_id, user_id)? {
        Some(m) if m.status == MembershipStatus::Pending => m,
        _ => return Err(ServiceError::NotFound),
    };

    if accept {
        membership.status = MembershipStatus::Accepted;
        storage::write_json(&membership_path(team_id, user_id), &membership)?;
        info!("✅ Invitation accepted: user {} joined team {}", user_id, team_id);
        Ok(membership)
    } else {
        storage::remove_json(&membership_path(team_id, user_id))?;
        info!("✅ Invitation declined: user {} for team {}", user_id, team_id);
        Err(ServiceError::NoContent)
    }
}

// Change a member's role in place. Owner/self guards live with the
// callers, which hold the team record.
pub fn update_member_role(
    team_id: &str,
    user_id: &str,
    role: TeamRole,
) -> Result<Membership, ServiceError> {
    let _guard = lock();

    let mut membership = find_membership(team_id, user_id)?.ok_or(ServiceError::NotFound)?;
    membership.role = role;
    storage::write_json(&membership_path(team_id, user_id), &membership)?;

    info!(
        "✅ Role updated: user {} in team {} is now {}",
        user_id,
        team_id,
        role.label()
    );
    Ok(membership)
}

pub fn remove_membership(team_id: &str, user_id: &str) -> Result<(), ServiceError> {
    let _guard = lock();

    if !storage::remove_json(&membership_path(team_id, user_id))? {
        return Err(ServiceError::NotFound);
    }

    info!("✅ Membership removed: user {} from team {}", user_id, team_id);
    Ok(())
}

// --- Authorization gate ---

/// The single decision point every team-scoped operation passes through.
///
/// Callers without an accepted membership get NotFound, the same answer
/// as for a team that does not exist: non-members must not learn that a
/// team exists. Insufficient role on an accepted membership is Forbidden.
pub fn check_team_access(
    team_id: &str,
    user_id: &str,
    required: AccessLevel,
) -> Result<(Team, Membership), ServiceError> {
    let membership = match find_membership(team_id, user_id)? {
        Some(m) if m.status == MembershipStatus::Accepted => m,
        _ => return Err(ServiceError::NotFound),
    };

    let team = find_team_by_id(team_id)?.ok_or(ServiceError::NotFound)?;

    match required {
        AccessLevel::Member => {}
        AccessLevel::Manager if membership.role.meets(TeamRole::Manager) => {}
        AccessLevel::Admin if membership.role.meets(TeamRole::Admin) => {}
        // Owner is the team attribute, not a role
        AccessLevel::Owner if team.owner_id == user_id => {}
        AccessLevel::Manager => {
            return Err(ServiceError::Forbidden(
                "You must be a manager or admin to perform this action.".to_string(),
            ))
        }
        AccessLevel::Admin => {
            return Err(ServiceError::Forbidden(
                "You must be an admin to perform this action.".to_string(),
            ))
        }
        AccessLevel::Owner => {
            return Err(ServiceError::Forbidden(
                "Only the team owner can perform this action.".to_string(),
            ))
        }
    }

    Ok((team, membership))
}
