// teamline-service/src/utils/friend_storage.rs
//
// The social ledger: one JSON record per unordered pair of users. The
// record file is named by the canonical (min, max) ordering of the two
// ids, so a reverse-direction request maps to the same on-disk key and
// loses at create time. The stored record keeps the real direction.
use crate::models::{Friendship, FriendshipStatus, ServiceError};
use crate::utils::storage;
use lazy_static::lazy_static;
use log::info;
use std::path::PathBuf;
use std::sync::Mutex;

lazy_static! {
    static ref LEDGER: Mutex<()> = Mutex::new(());
}

fn pair_path(user_a: &str, user_b: &str) -> PathBuf {
    let (low, high) = if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    };
    storage::dir("friendships").join(format!("{}__{}.json", low, high))
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    LEDGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// Create a pending request requester -> addressee. Any existing row
// between the pair, in either direction, is a conflict.
pub fn create_request(requester_id: &str, addressee_id: &str) -> Result<Friendship, ServiceError> {
    let _guard = lock();

    if find_between(requester_id, addressee_id)?.is_some() {
        return Err(ServiceError::Conflict(
            "A friend request already exists between you and this user.".to_string(),
        ));
    }

    let friendship = Friendship::new(requester_id.to_string(), addressee_id.to_string());

    if !storage::create_json(&pair_path(requester_id, addressee_id), &friendship)? {
        // A concurrent request for the same pair got there first
        return Err(ServiceError::Conflict(
            "A friend request already exists between you and this user.".to_string(),
        ));
    }

    info!(
        "✅ Friend request created: {} -> {}",
        requester_id, addressee_id
    );
    Ok(friendship)
}

// Row between two users regardless of stored direction
pub fn find_between(user_a: &str, user_b: &str) -> Result<Option<Friendship>, ServiceError> {
    storage::read_json(&pair_path(user_a, user_b))
}

pub fn find_by_id(friendship_id: &str) -> Result<Option<Friendship>, ServiceError> {
    let friendships: Vec<Friendship> = storage::scan(&storage::dir("friendships"))?;
    Ok(friendships.into_iter().find(|f| f.id == friendship_id))
}

// All accepted rows touching the user
pub fn accepted_for_user(user_id: &str) -> Result<Vec<Friendship>, ServiceError> {
    let friendships: Vec<Friendship> = storage::scan(&storage::dir("friendships"))?;
    Ok(friendships
        .into_iter()
        .filter(|f| f.touches(user_id) && f.status == FriendshipStatus::Accepted)
        .collect())
}

// Pending rows addressed to the user
pub fn pending_for_user(user_id: &str) -> Result<Vec<Friendship>, ServiceError> {
    let friendships: Vec<Friendship> = storage::scan(&storage::dir("friendships"))?;
    Ok(friendships
        .into_iter()
        .filter(|f| f.addressee_id == user_id && f.status == FriendshipStatus::Pending)
        .collect())
}

// Accept or decline a pending request addressed to the caller. Only one
// concurrent respond observes the pending row.
pub fn respond_to_request(
    friendship_id: &str,
    addressee_id: &str,
    accept: bool,
) -> Result<Friendship, ServiceError> {
    let _guard = lock();

    let mut friendship = match find_by_id(friendship_id)? {
        Some(f)
            if f.addressee_id == addressee_id && f.status == FriendshipStatus::Pending =>
        {
            f
        }
        _ => return Err(ServiceError::NotFound),
    };

    let path = pair_path(&friendship.requester_id, &friendship.addressee_id);

    if accept {
        friendship.status = FriendshipStatus::Accepted;
        storage::write_json(&path, &friendship)?;
        info!(
            "✅ Friend request accepted: {} <-> {}",
            friendship.requester_id, friendship.addressee_id
        );
        Ok(friendship)
    } else {
        storage::remove_json(&path)?;
        info!(
            "✅ Friend request declined: {} -> {}",
            friendship.requester_id, friendship.addressee_id
        );
        Err(ServiceError::NoContent)
    }
}

// Unfriend: delete the accepted row between the pair, whichever way it
// was stored.
pub fn remove_friendship(user_id: &str, other_user_id: &str) -> Result<(), ServiceError> {
    let _guard = lock();

    match find_between(user_id, other_user_id)? {
        Some(f) if f.status == FriendshipStatus::Accepted => {
            storage::remove_json(&pair_path(user_id, other_user_id))?;
            info!("✅ Friendship removed: {} <-> {}", user_id, other_user_id);
            Ok(())
        }
        _ => Err(ServiceError::NotFound),
    }
}
