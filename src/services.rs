//! Collection services.
//!
//! Each service owns the invariants of one collection and is the only place
//! that writes it. Handlers translate HTTP into calls on these functions and
//! never query the entities themselves.

pub mod movies;
pub mod reviews;
pub mod users;

use model::access::{self, Action, Owned};

use crate::auth::AuthUser;
use crate::error::AppError;

/// Consult the access policy for a mutation by `principal`.
pub(crate) fn authorize<R: Owned>(
    principal: &AuthUser,
    resource: &R,
    action: Action,
    kind: &str,
) -> Result<(), AppError> {
    if access::allow(Some(principal.id), resource, action) {
        return Ok(());
    }

    let verb = match action {
        Action::Update => "update",
        Action::Delete => "delete",
        Action::List | Action::Retrieve => "read",
    };
    Err(AppError::Forbidden(format!(
        "You do not have permission to {} this {}",
        verb, kind
    )))
}
