/// Authorization and visibility policy
///
/// The decision core of the application: pure, state-free functions over
/// (requester, target) pairs. Handlers compose these with the persistence
/// layer; none of them touch the database.
///
/// # Rules
///
/// - A `master` sees and may mutate every task, and administers users.
/// - Everyone else sees tasks whose *owner's role* equals their own role
///   string. This is team visibility, not row-level ownership: two users
///   with role `"sales"` see each other's tasks.
/// - Update and delete of a task require ownership or the master role.
/// - A master may never edit or delete their own account through the
///   administrative paths.
///
/// # Example
///
/// ```no_run
/// use taskdeck::auth::policy::{can_mutate_task, visibility, Visibility};
/// # use taskdeck::models::{task::Task, user::User};
///
/// # fn example(user: &User, task: &Task) {
/// match visibility(user) {
///     Visibility::All => println!("master: every task"),
///     Visibility::Team(role) => println!("tasks owned by role {}", role),
/// }
///
/// if can_mutate_task(user, task) {
///     // proceed with update/delete
/// }
/// # }
/// ```

use crate::models::{task::Task, user::User};

/// The elevated role with unrestricted visibility and user administration
pub const MASTER_ROLE: &str = "master";

/// Role assigned by the self-registration flow
pub const DEFAULT_ROLE: &str = "common";

/// What a requester is allowed to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every task, regardless of owner (masters)
    All,

    /// Tasks owned by any user sharing this role string
    Team(String),
}

/// Error type for filter parsing
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// Priority filter was not an integer
    #[error("priority filter must be an integer")]
    InvalidPriority,

    /// Owner filter was not an integer
    #[error("owner filter must be an integer")]
    InvalidOwner,
}

/// Optional task-list filters, composed with the visibility rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Completed-state equality
    pub completed: Option<bool>,

    /// Priority equality
    pub priority: Option<i64>,

    /// Owner-id equality
    pub owner_id: Option<i64>,
}

impl TaskFilter {
    /// Parses raw query parameters into a filter
    ///
    /// The completed token is parsed leniently: absent or unrecognized means
    /// no filter. Priority and owner are strict: a present non-numeric value
    /// rejects the whole request with a validation error.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if priority or owner is present but not an
    /// integer.
    pub fn from_params(
        completed: Option<&str>,
        priority: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Self, FilterError> {
        let completed = completed.and_then(parse_bool_token);

        let priority = priority
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| FilterError::InvalidPriority))
            .transpose()?;

        let owner_id = owner
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| FilterError::InvalidOwner))
            .transpose()?;

        Ok(Self {
            completed,
            priority,
            owner_id,
        })
    }
}

/// Parses a two-valued completed token
///
/// Recognizes `"true"` and `"false"` case-insensitively; anything else is
/// `None`.
pub fn parse_bool_token(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Determines what the requester may see
pub fn visibility(requester: &User) -> Visibility {
    if requester.role == MASTER_ROLE {
        Visibility::All
    } else {
        Visibility::Team(requester.role.clone())
    }
}

/// Checks a single task's owner role against a visibility
///
/// An ownerless task (owner deleted) has no role and is visible only under
/// `Visibility::All`.
pub fn task_visible(visibility: &Visibility, owner_role: Option<&str>) -> bool {
    match visibility {
        Visibility::All => true,
        Visibility::Team(role) => owner_role == Some(role.as_str()),
    }
}

/// Checks whether the requester may update or delete a task
///
/// True iff the requester owns the task or holds the master role. Applies
/// identically to update and delete.
pub fn can_mutate_task(requester: &User, task: &Task) -> bool {
    task.user_id == Some(requester.id) || requester.role == MASTER_ROLE
}

/// Checks whether the requester may administer user accounts
pub fn can_administer_users(requester: &User) -> bool {
    requester.role == MASTER_ROLE
}

/// Checks whether the requester may update or delete a specific user
///
/// Requires the master role, and a master may never target their own
/// account (self-protection).
pub fn can_mutate_user(requester: &User, target: &User) -> bool {
    can_administer_users(requester) && requester.id != target.id
}
