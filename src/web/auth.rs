// Session middleware: stateless HMAC-SHA256 signed session cookies.
//
// Token format: {timestamp_secs}.{session_id}.{hmac_hex}
//
// The HMAC covers "{timestamp_secs}.{session_id}" signed with
// KEYALIGN_SESSION_SECRET. Tokens are valid for SESSION_TTL_SECS (24 hours).
// The session ID is the key into the session store; the signature keeps
// one browser from guessing its way into another browser's session.
//
// Every request gets a session:
//   valid keyalign_session cookie → reuse its session ID
//   missing / invalid / expired   → issue a new ID and set the cookie

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tracing::{debug, error};

use super::session_store::SessionId;
use super::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name.
pub const COOKIE_NAME: &str = "keyalign_session";

/// Session lifetime: 24 hours.
pub const SESSION_TTL_SECS: u64 = 86_400;

/// 16 random bytes, hex encoded. Used for session IDs and as the fallback
/// signing secret.
pub fn random_secret() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Start a new session: returns its ID and the signed cookie value.
pub fn issue_session(secret: &str) -> Result<(SessionId, String), InvalidLength> {
    let timestamp = now_secs();
    let id = random_secret();

    let payload = format!("{timestamp}.{id}");
    let sig = hmac_sign(secret, &payload)?;

    Ok((SessionId(id), format!("{payload}.{sig}")))
}

/// Verify a session token. Returns the session ID if the HMAC is valid and
/// the token is not older than `SESSION_TTL_SECS`.
pub fn verify_token(secret: &str, token: &str) -> Option<SessionId> {
    // Format: {timestamp}.{id}.{hmac}
    let parts: Vec<&str> = token.splitn(3, '.').collect();
    if parts.len() != 3 {
        return None;
    }
    let timestamp_str = parts[0];
    let id = parts[1];
    let provided_sig = parts[2];

    // Verify HMAC
    let payload = format!("{timestamp_str}.{id}");
    let expected_sig = hmac_sign(secret, &payload).ok()?;
    if !constant_time_eq(provided_sig, &expected_sig) {
        return None;
    }

    // Verify age
    let timestamp = timestamp_str.parse::<u64>().ok()?;
    if now_secs().saturating_sub(timestamp) >= SESSION_TTL_SECS {
        return None;
    }

    Some(SessionId(id.to_string()))
}

/// Axum middleware: attach a `SessionId` to every request, issuing a new
/// session cookie when the request doesn't carry a valid one.
pub async fn attach_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let secret = &state.config.session_secret;

    let existing = session_cookie(&request).and_then(|token| verify_token(secret, token));
    let (session_id, new_cookie) = match existing {
        Some(id) => (id, None),
        None => match issue_session(secret) {
            Ok((id, token)) => {
                debug!(session = %id, "Issued new session");
                (id, Some(set_cookie_header(&token)))
            }
            Err(e) => {
                error!(error = %e, "Failed to sign session token");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
    };

    request.extensions_mut().insert(session_id);
    let mut response = next.run(request).await;

    if let Some(cookie) = new_cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!(error = %e, "Invalid Set-Cookie header value"),
        }
    }
    response
}

/// Build the `Set-Cookie` header value for a new session.
pub fn set_cookie_header(token: &str) -> String {
    format!("{COOKIE_NAME}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_TTL_SECS}")
}

/// Build the `Set-Cookie` header value that clears the session cookie.
pub fn clear_cookie_header() -> String {
    format!("{COOKIE_NAME}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// --- Private helpers ---

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn hmac_sign(secret: &str, payload: &str) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Raw value of the session cookie, if the request carries one.
fn session_cookie(request: &Request) -> Option<&str> {
    let cookie_header = request.headers().get(header::COOKIE)?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name.trim() == COOKIE_NAME).then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let secret = "test_secret_32_bytes_long_enough!";
        let (id, token) = issue_session(secret).unwrap();
        assert_eq!(verify_token(secret, &token), Some(id));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (_, token) = issue_session("correct_secret").unwrap();
        assert!(verify_token("wrong_secret", &token).is_none());
    }

    #[test]
    fn test_swapped_session_id_rejected() {
        let secret = "my_secret";
        let (_, token) = issue_session(secret).unwrap();
        let parts: Vec<&str> = token.splitn(3, '.').collect();
        let forged = format!("{}.{}.{}", parts[0], "0".repeat(32), parts[2]);
        assert!(verify_token(secret, &forged).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "my_secret";
        let old = now_secs() - SESSION_TTL_SECS - 10;
        let payload = format!("{old}.abcdef");
        let token = format!("{payload}.{}", hmac_sign(secret, &payload).unwrap());
        assert!(verify_token(secret, &token).is_none());
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(verify_token("secret", "").is_none());
        assert!(verify_token("secret", "onlytwoparts.here").is_none());
    }

    #[test]
    fn test_random_secret_shape() {
        let a = random_secret();
        assert_eq!(a.len(), 32);
        assert_ne!(a, random_secret());
    }

    #[test]
    fn test_cookie_headers() {
        let set = set_cookie_header("tok");
        assert!(set.starts_with("keyalign_session=tok; HttpOnly;"));
        assert!(set.ends_with("Max-Age=86400"));
        assert!(clear_cookie_header().contains("Max-Age=0"));
    }
}
