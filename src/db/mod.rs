/// Database utilities
///
/// - `pool`: SQLite connection pool management
/// - `schema`: idempotent startup schema creation

pub mod pool;
pub mod schema;
