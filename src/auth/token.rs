/// Session token generation and hashing
///
/// A login mints an opaque bearer token with the format `task_{32_chars}`
/// (base62 random part). Only the SHA-256 hash of the token is stored; the
/// plaintext is shown to the client once and never again.
///
/// # Example
///
/// ```
/// use taskdeck::auth::token::{generate_session_token, hash_session_token};
///
/// let (token, hash) = generate_session_token();
/// assert!(token.starts_with("task_"));
/// assert_eq!(hash, hash_session_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the token (characters)
const TOKEN_RANDOM_LENGTH: usize = 32;

/// Session token prefix
const TOKEN_PREFIX: &str = "task_";

/// Generates a new session token
///
/// Returns a tuple of (plaintext_token, sha256_hash). The hash is what goes
/// into the sessions table.
pub fn generate_session_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_session_token(&token);

    (token, hash)
}

/// Generates a random alphanumeric string
///
/// Uses base62 (A-Z, a-z, 0-9) so the token stays header-safe.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a session token using SHA-256
///
/// Deterministic, so the incoming bearer token can be matched against the
/// stored hash by equality.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
