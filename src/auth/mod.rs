/// Authentication and authorization
///
/// - `password`: Argon2id password hashing and verification
/// - `policy`: role-based visibility and mutation policy (pure functions)
/// - `token`: opaque session token generation and hashing

pub mod password;
pub mod policy;
pub mod token;
