use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{movie, review, user};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reviews go away together with their movie or their author
        manager
            .create_table(
                Table::create()
                    .table(Review::table())
                    .if_not_exists()
                    .col(pk_auto(Review::column(review::Column::Id)))
                    .col(integer(Review::column(review::Column::MovieId)))
                    .col(integer(Review::column(review::Column::UserId)))
                    .col(integer(Review::column(review::Column::Rating)))
                    .col(text(Review::column(review::Column::Content)))
                    .col(timestamp_with_time_zone(Review::column(
                        review::Column::CreatedDate,
                    )))
                    .check(
                        Expr::col(Review::column(review::Column::Rating))
                            .between(review::MIN_RATING, review::MAX_RATING),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_movie")
                            .from(Review::table(), Review::column(review::Column::MovieId))
                            .to(Movie::table(), Movie::column(movie::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_user")
                            .from(Review::table(), Review::column(review::Column::UserId))
                            .to(User::table(), User::column(user::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Review::table()).to_owned())
            .await?;

        Ok(())
    }
}
