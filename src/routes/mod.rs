/// Route handlers organized by resource
///
/// - `auth`: register, login, logout
/// - `tasks`: task list/filter, create, detail, update, delete
/// - `users`: administrative user management (master only)

pub mod auth;
pub mod tasks;
pub mod users;
