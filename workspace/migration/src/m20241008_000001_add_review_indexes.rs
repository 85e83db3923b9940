use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::review;
use sea_orm_migration::prelude::*;

const CREATED_DATE_INDEX: &str = "idx_reviews_created_date";
const MOVIE_INDEX: &str = "idx_reviews_movie_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Review listings are always sorted newest first
        manager
            .create_index(
                Index::create()
                    .name(CREATED_DATE_INDEX)
                    .table(Review::table())
                    .col(Review::column(review::Column::CreatedDate))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(MOVIE_INDEX)
                    .table(Review::table())
                    .col(Review::column(review::Column::MovieId))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(MOVIE_INDEX)
                    .table(Review::table())
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name(CREATED_DATE_INDEX)
                    .table(Review::table())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
