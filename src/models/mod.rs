/// Database records
///
/// - `user`: user accounts with role strings
/// - `task`: tasks owned by users
/// - `session`: opaque session token bindings

pub mod session;
pub mod task;
pub mod user;
