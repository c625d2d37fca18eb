use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Length of a base64-encoded SHA-256 digest.
const HASH_LEN: usize = 44;

const REALM: &str = "Basic realm=\"Restricted\"";

/// Hashes a password the way `ACCESS_LIST` entries are stored.
pub fn hash_password(password: &str) -> String {
    STANDARD.encode(Sha256::digest(password.as_bytes()))
}

/// Users allowed through the Basic auth gate, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    users: HashMap<String, String>,
}

impl AccessList {
    /// Parses `user:hash|user2:hash2`.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        if raw.is_empty() {
            bail!("ACCESS_LIST environment variable is required");
        }

        let mut users = HashMap::new();
        for pair in raw.split('|') {
            let parts: Vec<&str> = pair.split(':').collect();
            let [username, hash] = parts.as_slice() else {
                bail!("Invalid ACCESS_LIST format. Expected format: user:hashedpass|user2:hashedpass2");
            };
            if hash.len() != HASH_LEN {
                bail!("Invalid hash length for user {}", username);
            }
            users.insert(username.to_string(), hash.to_string());
        }

        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| *stored == hash_password(password))
    }
}

/// Extracts `(username, password)` from a Basic `Authorization` header.
fn basic_credentials(req: &Request) -> Option<(String, String)> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

/// Rejects requests whose Basic credentials are not on the access list.
pub async fn require_basic_auth(
    State(access): State<Arc<AccessList>>,
    req: Request,
    next: Next,
) -> Response {
    let Some((username, password)) = basic_credentials(&req) else {
        return ([(header::WWW_AUTHENTICATE, REALM)], unauthorized()).into_response();
    };

    if !access.verify(&username, &password) {
        debug!(user = %username, "Rejected credentials");
        return unauthorized();
    }

    next.run(req).await
}
