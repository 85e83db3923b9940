//! Object-level access rules.
//!
//! Reads are open to everyone, anonymous callers included. Mutations are only
//! allowed to the principal that owns the record.

use tracing::debug;

use crate::entities::{review, user};

/// The operation a caller wants to perform on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Update,
    Delete,
}

impl Action {
    /// Safe actions never change state.
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// A record that belongs to exactly one user.
pub trait Owned {
    /// Id of the owning user.
    fn owner_id(&self) -> i32;
}

impl Owned for review::Model {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

/// An account is owned by itself.
impl Owned for user::Model {
    fn owner_id(&self) -> i32 {
        self.id
    }
}

/// Decides whether `principal` (a user id, `None` when anonymous) may perform
/// `action` on `resource`.
pub fn allow<R: Owned>(principal: Option<i32>, resource: &R, action: Action) -> bool {
    if action.is_safe() {
        return true;
    }

    let allowed = principal.is_some_and(|id| id == resource.owner_id());
    if !allowed {
        debug!(
            ?principal,
            owner_id = resource.owner_id(),
            ?action,
            "Access denied for non-owner"
        );
    }
    allowed
}
