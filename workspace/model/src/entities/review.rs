use sea_orm::entity::prelude::*;

use super::{movie, user};

/// Lowest rating a review may carry.
pub const MIN_RATING: i32 = 1;
/// Highest rating a review may carry.
pub const MAX_RATING: i32 = 5;

/// A user's opinion about a single movie.
///
/// `user_id` is always the principal that wrote the review and is never
/// taken from client input. `created_date` is assigned once on insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    /// Score between `MIN_RATING` and `MAX_RATING` inclusive.
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "movie::Entity",
        from = "Column::MovieId",
        to = "movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Returns true when `rating` lies within the accepted range.
pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
