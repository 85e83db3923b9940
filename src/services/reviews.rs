use chrono::{DateTime, Utc};
use common::{PageRequest, Paginated};
use model::access::Action;
use model::entities::{movie, review, user};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use tracing::{debug, info, instrument, trace, warn};

use super::authorize;
use crate::auth::AuthUser;
use crate::error::AppError;

/// A review joined with the title of its movie and the name of its author.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ReviewRecord {
    pub id: i32,
    pub movie_id: i32,
    pub movie_title: String,
    pub user_id: i32,
    pub username: String,
    pub rating: i32,
    pub content: String,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub movie_id: i32,
    pub rating: i32,
    pub content: String,
}

/// Field changes for an update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub movie_id: Option<i32>,
    pub rating: Option<i32>,
    pub content: Option<String>,
}

/// Optional narrowing of the review listing. Both filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    /// Case-insensitive substring of the movie title.
    ///
    /// Case folding is the database's `LOWER`. On SQLite that folds ASCII
    /// letters only, so `"émile"` does not match `"ÉMILE"` there; Postgres
    /// folds according to the database locale.
    pub movie_title: Option<String>,
    /// Exact rating
    pub rating: Option<i32>,
}

fn ensure_valid_rating(rating: i32) -> Result<(), AppError> {
    if review::is_valid_rating(rating) {
        Ok(())
    } else {
        warn!("Rejected rating {} outside of accepted range", rating);
        Err(AppError::Validation(format!(
            "Rating must be between {} and {}, got {}",
            review::MIN_RATING,
            review::MAX_RATING,
            rating
        )))
    }
}

async fn find_movie(db: &DatabaseConnection, movie_id: i32) -> Result<movie::Model, AppError> {
    movie::Entity::find_by_id(movie_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie with id {} does not exist", movie_id)))
}

async fn find_review(db: &DatabaseConnection, review_id: i32) -> Result<review::Model, AppError> {
    review::Entity::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", review_id)))
}

fn records() -> Select<review::Entity> {
    review::Entity::find()
        .select_only()
        .columns([
            review::Column::Id,
            review::Column::MovieId,
            review::Column::UserId,
            review::Column::Rating,
            review::Column::Content,
            review::Column::CreatedDate,
        ])
        .column_as(movie::Column::Title, "movie_title")
        .column_as(user::Column::Username, "username")
        .join(JoinType::InnerJoin, review::Relation::Movie.def())
        .join(JoinType::InnerJoin, review::Relation::User.def())
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn apply_filter(mut select: Select<review::Entity>, filter: &ReviewFilter) -> Select<review::Entity> {
    let title = filter
        .movie_title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty());

    if let Some(title) = title {
        let pattern = format!("%{}%", escape_like(&title.to_lowercase()));
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((movie::Entity, movie::Column::Title))))
                .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    if let Some(rating) = filter.rating {
        select = select.filter(review::Column::Rating.eq(rating));
    }

    select
}

/// Persist a new review owned by `principal`.
#[instrument(skip(db))]
pub async fn create_review(
    db: &DatabaseConnection,
    principal: &AuthUser,
    new_review: NewReview,
) -> Result<ReviewRecord, AppError> {
    trace!("Entering create_review function");
    ensure_valid_rating(new_review.rating)?;

    trace!("Validating movie_id: {}", new_review.movie_id);
    let movie = find_movie(db, new_review.movie_id).await?;

    let model = review::ActiveModel {
        movie_id: Set(movie.id),
        user_id: Set(principal.id),
        rating: Set(new_review.rating),
        content: Set(new_review.content),
        created_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Review {} created for movie {} by user {}",
        model.id, movie.id, principal.username
    );
    Ok(ReviewRecord {
        id: model.id,
        movie_id: movie.id,
        movie_title: movie.title,
        user_id: principal.id,
        username: principal.username.clone(),
        rating: model.rating,
        content: model.content,
        created_date: model.created_date,
    })
}

/// Reviews newest first, narrowed by `filter` and cut to one page.
#[instrument(skip(db))]
pub async fn list_reviews(
    db: &DatabaseConnection,
    filter: &ReviewFilter,
    page: PageRequest,
) -> Result<Paginated<ReviewRecord>, AppError> {
    trace!("Entering list_reviews function");

    let paginator = apply_filter(records(), filter)
        .order_by_desc(review::Column::CreatedDate)
        .order_by_desc(review::Column::Id)
        .into_model::<ReviewRecord>()
        .paginate(db, page.page_size);

    let totals = paginator.num_items_and_pages().await?;
    if page.is_out_of_range(totals.number_of_pages) {
        warn!(
            "Requested page {} but only {} pages exist",
            page.page, totals.number_of_pages
        );
        return Err(AppError::NotFound(format!("Invalid page {}", page.page)));
    }

    let results = paginator.fetch_page(page.index()).await?;
    debug!(
        "Fetched {} of {} reviews on page {}",
        results.len(),
        totals.number_of_items,
        page.page
    );
    Ok(Paginated::new(
        page,
        totals.number_of_items,
        totals.number_of_pages,
        results,
    ))
}

#[instrument(skip(db))]
pub async fn get_review(db: &DatabaseConnection, review_id: i32) -> Result<ReviewRecord, AppError> {
    records()
        .filter(review::Column::Id.eq(review_id))
        .into_model::<ReviewRecord>()
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", review_id)))
}

/// Apply `changes` to a review owned by `principal`.
#[instrument(skip(db))]
pub async fn update_review(
    db: &DatabaseConnection,
    principal: &AuthUser,
    review_id: i32,
    changes: ReviewChanges,
) -> Result<ReviewRecord, AppError> {
    trace!("Entering update_review function for review_id: {}", review_id);

    let existing = find_review(db, review_id).await?;
    authorize(principal, &existing, Action::Update, "review")?;

    if let Some(rating) = changes.rating {
        ensure_valid_rating(rating)?;
    }
    if let Some(movie_id) = changes.movie_id {
        find_movie(db, movie_id).await?;
    }

    let mut active: review::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();
    if let Some(movie_id) = changes.movie_id {
        active.movie_id = Set(movie_id);
        updated_fields.push("movie");
    }
    if let Some(rating) = changes.rating {
        active.rating = Set(rating);
        updated_fields.push("rating");
    }
    if let Some(content) = changes.content {
        active.content = Set(content);
        updated_fields.push("content");
    }

    if active.is_changed() {
        active.update(db).await?;
        info!(
            "Review {} updated by {}. Updated fields: {}",
            review_id,
            principal.username,
            updated_fields.join(", ")
        );
    } else {
        debug!("No fields to update for review {}", review_id);
    }

    get_review(db, review_id).await
}

/// Remove a review owned by `principal`.
#[instrument(skip(db))]
pub async fn delete_review(
    db: &DatabaseConnection,
    principal: &AuthUser,
    review_id: i32,
) -> Result<(), AppError> {
    let existing = find_review(db, review_id).await?;
    authorize(principal, &existing, Action::Delete, "review")?;

    review::Entity::delete_by_id(review_id).exec(db).await?;
    info!("Review {} deleted by {}", review_id, principal.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::movies::{self, NewMovie};
    use crate::test_utils::test_utils::{create_test_user, setup_test_db};
    use chrono::NaiveDate;

    async fn movie(db: &DatabaseConnection, title: &str) -> movie::Model {
        movies::create_movie(
            db,
            NewMovie {
                title: title.to_string(),
                description: format!("About {}", title),
                release_date: NaiveDate::from_ymd_opt(2022, 3, 4).unwrap(),
            },
        )
        .await
        .unwrap()
    }

    fn new_review(movie_id: i32, rating: i32) -> NewReview {
        NewReview {
            movie_id,
            rating,
            content: "Good".to_string(),
        }
    }

    async fn review_count(db: &DatabaseConnection) -> u64 {
        review::Entity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_succeeds_only_for_ratings_in_range() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let dune = movie(&db, "Dune").await;

        for rating in -1..=7 {
            let result = create_review(&db, &alice, new_review(dune.id, rating)).await;
            if (1..=5).contains(&rating) {
                let record = result.unwrap();
                assert_eq!(record.rating, rating);
                assert_eq!(record.user_id, alice.id);
                assert_eq!(record.username, "alice");
                assert_eq!(record.movie_title, "Dune");
            } else {
                assert!(matches!(result, Err(AppError::Validation(_))), "rating {}", rating);
            }
        }
        assert_eq!(review_count(&db).await, 5);
    }

    #[tokio::test]
    async fn test_create_for_missing_movie_creates_nothing() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;

        let result = create_review(&db, &alice, new_review(404, 3)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(review_count(&db).await, 0);
    }

    #[tokio::test]
    async fn test_only_owner_may_update_or_delete() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let bob = create_test_user(&db, "bob").await;
        let dune = movie(&db, "Dune").await;
        let record = create_review(&db, &alice, new_review(dune.id, 4)).await.unwrap();

        let changes = ReviewChanges {
            rating: Some(1),
            ..Default::default()
        };
        let result = update_review(&db, &bob, record.id, changes.clone()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        let result = delete_review(&db, &bob, record.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // Nothing changed for the non-owner attempts
        assert_eq!(get_review(&db, record.id).await.unwrap().rating, 4);

        let updated = update_review(&db, &alice, record.id, changes).await.unwrap();
        assert_eq!(updated.rating, 1);
        assert_eq!(updated.user_id, alice.id);
        assert_eq!(updated.created_date, record.created_date);

        delete_review(&db, &alice, record.id).await.unwrap();
        assert!(matches!(
            get_review(&db, record.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_review_is_not_found_before_permission_check() {
        let db = setup_test_db().await;
        let bob = create_test_user(&db, "bob").await;

        let result = update_review(&db, &bob, 77, ReviewChanges::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        let result = delete_review(&db, &bob, 77).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_rating_and_missing_movie() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let dune = movie(&db, "Dune").await;
        let record = create_review(&db, &alice, new_review(dune.id, 4)).await.unwrap();

        let result = update_review(
            &db,
            &alice,
            record.id,
            ReviewChanges {
                rating: Some(0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = update_review(
            &db,
            &alice,
            record.id,
            ReviewChanges {
                movie_id: Some(999),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let arrival = movie(&db, "Arrival").await;
        let moved = update_review(
            &db,
            &alice,
            record.id,
            ReviewChanges {
                movie_id: Some(arrival.id),
                content: Some("Even better on rewatch".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.movie_title, "Arrival");
        assert_eq!(moved.content, "Even better on rewatch");
        assert_eq!(moved.rating, 4);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filterable() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let batman = movie(&db, "The Batman").await;
        let batteries = movie(&db, "BATTERIES NOT INCLUDED").await;
        let dune = movie(&db, "Dune").await;

        create_review(&db, &alice, new_review(batman.id, 3)).await.unwrap();
        create_review(&db, &alice, new_review(dune.id, 3)).await.unwrap();
        create_review(&db, &alice, new_review(batteries.id, 5)).await.unwrap();
        create_review(&db, &alice, new_review(batman.id, 4)).await.unwrap();

        let all = list_reviews(&db, &ReviewFilter::default(), PageRequest::new(None, Some(10)))
            .await
            .unwrap();
        assert_eq!(all.count, 4);
        for pair in all.results.windows(2) {
            assert!(pair[0].created_date >= pair[1].created_date);
            assert!(pair[0].id > pair[1].id);
        }

        let by_rating = ReviewFilter {
            rating: Some(3),
            ..Default::default()
        };
        let page = list_reviews(&db, &by_rating, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 2);
        assert!(page.results.iter().all(|r| r.rating == 3));

        let by_title = ReviewFilter {
            movie_title: Some("bat".to_string()),
            ..Default::default()
        };
        let page = list_reviews(&db, &by_title, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 3);
        assert!(
            page.results
                .iter()
                .all(|r| r.movie_title.to_lowercase().contains("bat"))
        );

        let combined = ReviewFilter {
            movie_title: Some("bat".to_string()),
            rating: Some(3),
        };
        let page = list_reviews(&db, &combined, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].movie_title, "The Batman");
    }

    #[tokio::test]
    async fn test_title_filter_treats_wildcards_literally() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let dune = movie(&db, "Dune").await;
        create_review(&db, &alice, new_review(dune.id, 3)).await.unwrap();

        let filter = ReviewFilter {
            movie_title: Some("%".to_string()),
            ..Default::default()
        };
        let page = list_reviews(&db, &filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let db = setup_test_db().await;
        let alice = create_test_user(&db, "alice").await;
        let dune = movie(&db, "Dune").await;
        for _ in 0..12 {
            create_review(&db, &alice, new_review(dune.id, 4)).await.unwrap();
        }

        let first = list_reviews(&db, &ReviewFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(first.results.len(), 5);
        assert_eq!(first.total_pages, 3);

        let clamped = list_reviews(&db, &ReviewFilter::default(), PageRequest::new(Some(1), Some(100)))
            .await
            .unwrap();
        assert_eq!(clamped.page_size, 10);
        assert_eq!(clamped.results.len(), 10);

        let last = list_reviews(&db, &ReviewFilter::default(), PageRequest::new(Some(3), None))
            .await
            .unwrap();
        assert_eq!(last.results.len(), 2);

        let beyond = list_reviews(&db, &ReviewFilter::default(), PageRequest::new(Some(4), None)).await;
        assert!(matches!(beyond, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("bat"), "bat");
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }
}
