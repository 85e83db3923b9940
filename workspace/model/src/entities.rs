//! This file serves as the root for all SeaORM entity modules.
//! Movies are reviewed by users; a review belongs to exactly one movie and
//! exactly one user and disappears together with either of them.

pub mod movie;
pub mod review;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::movie::Entity as Movie;
    pub use super::review::Entity as Review;
    pub use super::user::Entity as User;
}
