use chrono::NaiveDate;
use common::{PageRequest, Paginated};
use model::entities::{movie, review};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
}

#[instrument(skip(db))]
pub async fn list_movies(
    db: &DatabaseConnection,
    page: PageRequest,
) -> Result<Paginated<movie::Model>, AppError> {
    trace!("Entering list_movies function");

    let paginator = movie::Entity::find()
        .order_by_asc(movie::Column::Id)
        .paginate(db, page.page_size);

    let totals = paginator.num_items_and_pages().await?;
    if page.is_out_of_range(totals.number_of_pages) {
        warn!(
            "Requested page {} but only {} pages exist",
            page.page, totals.number_of_pages
        );
        return Err(AppError::NotFound(format!("Invalid page {}", page.page)));
    }

    let movies = paginator.fetch_page(page.index()).await?;
    debug!("Retrieved {} movies on page {}", movies.len(), page.page);
    Ok(Paginated::new(
        page,
        totals.number_of_items,
        totals.number_of_pages,
        movies,
    ))
}

#[instrument(skip(db))]
pub async fn get_movie(db: &DatabaseConnection, movie_id: i32) -> Result<movie::Model, AppError> {
    movie::Entity::find_by_id(movie_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie with id {} not found", movie_id)))
}

#[instrument(skip(db))]
pub async fn create_movie(
    db: &DatabaseConnection,
    new_movie: NewMovie,
) -> Result<movie::Model, AppError> {
    let model = movie::ActiveModel {
        title: Set(new_movie.title),
        description: Set(new_movie.description),
        release_date: Set(new_movie.release_date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Movie created with ID: {}, title: {}", model.id, model.title);
    Ok(model)
}

#[instrument(skip(db))]
pub async fn update_movie(
    db: &DatabaseConnection,
    movie_id: i32,
    changes: MovieChanges,
) -> Result<movie::Model, AppError> {
    trace!("Entering update_movie function for movie_id: {}", movie_id);
    let existing = get_movie(db, movie_id).await?;

    let mut active: movie::ActiveModel = existing.clone().into();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(release_date) = changes.release_date {
        active.release_date = Set(release_date);
    }

    if !active.is_changed() {
        debug!("No fields to update for movie {}", movie_id);
        return Ok(existing);
    }

    let updated = active.update(db).await?;
    info!("Movie {} updated", movie_id);
    Ok(updated)
}

/// Delete a movie together with every review written about it.
///
/// Returns the number of reviews removed.
#[instrument(skip(db))]
pub async fn delete_movie(db: &DatabaseConnection, movie_id: i32) -> Result<u64, AppError> {
    let txn = db.begin().await?;

    movie::Entity::find_by_id(movie_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie with id {} not found", movie_id)))?;

    let removed = review::Entity::delete_many()
        .filter(review::Column::MovieId.eq(movie_id))
        .exec(&txn)
        .await?
        .rows_affected;
    movie::Entity::delete_by_id(movie_id).exec(&txn).await?;
    txn.commit().await?;

    info!("Movie {} deleted along with {} reviews", movie_id, removed);
    Ok(removed)
}
