// teamline-service/src/utils/notify.rs
//
// Best-effort email notifications. Every send is queued on a detached
// task after the ledger write has committed; failures are logged and
// swallowed, never surfaced to the request that triggered them.
use crate::models::TeamRole;
use log::{info, warn};
use serde_json::json;
use std::env;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub fn send_invitation_to_existing_user(
    recipient_email: &str,
    inviter_name: &str,
    team_name: &str,
    role: TeamRole,
) {
    let subject = format!("You've been invited to join {}", team_name);
    let body = format!(
        "{} has invited you to join the team \"{}\" as a {}. \
         Log in to accept or decline the invitation.",
        inviter_name,
        team_name,
        role.label()
    );
    dispatch(recipient_email.to_string(), subject, body);
}

pub fn send_invitation_to_new_user(
    recipient_email: &str,
    inviter_name: &str,
    team_name: &str,
    role: TeamRole,
) {
    let subject = format!("{} invited you to collaborate on {}", inviter_name, team_name);
    let body = format!(
        "{} wants you to join the team \"{}\" as a {}. \
         Sign up with this email address to join.",
        inviter_name,
        team_name,
        role.label()
    );
    dispatch(recipient_email.to_string(), subject, body);
}

// Fire-and-forget: at most once, never awaited, never retried
fn dispatch(recipient: String, subject: String, body: String) {
    let api_key = env::var("SENDGRID_API_KEY").ok();
    let sender = env::var("SENDER_EMAIL").ok();

    let (api_key, sender) = match (api_key, sender) {
        (Some(key), Some(sender)) if !key.is_empty() && !sender.is_empty() => (key, sender),
        _ => {
            // Simulate the email for development
            info!(
                "📧 EMAIL SIMULATION (SendGrid not configured) to: {} subject: {}",
                recipient, subject
            );
            return;
        }
    };

    actix_web::rt::spawn(async move {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": recipient }] }],
            "from": { "email": sender },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }]
        });

        let client = reqwest::Client::new();
        match client
            .post(SENDGRID_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("📧 Email sent to {}", recipient);
            }
            Ok(response) => {
                warn!(
                    "📧 Email to {} rejected with status {}",
                    recipient,
                    response.status()
                );
            }
            Err(err) => {
                warn!("📧 Email to {} failed: {}", recipient, err);
            }
        }
    });
}
