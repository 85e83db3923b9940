use common::{PageRequest, Paginated};
use model::access::Action;
use model::entities::{review, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::authorize;
use crate::auth::{AuthError, AuthUser, hash_password, verify_password};
use crate::error::AppError;

#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

// Keeps the plain password out of spans
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl std::fmt::Debug for UserChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserChanges")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("Username '{}' already exists", username))
}

async fn ensure_username_free(
    db: &DatabaseConnection,
    username: &str,
    except: Option<i32>,
) -> Result<(), AppError> {
    let holder = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    match holder {
        Some(holder) if Some(holder.id) != except => {
            warn!("Username '{}' is already taken", username);
            Err(username_taken(username))
        }
        _ => Ok(()),
    }
}

/// Register a new account.
#[instrument(skip(db))]
pub async fn signup(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model, AppError> {
    trace!("Entering signup function");
    ensure_username_free(db, &new_user.username, None).await?;

    let username = new_user.username.clone();
    let model = user::ActiveModel {
        username: Set(new_user.username),
        email: Set(new_user.email),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        password_hash: Set(hash_password(&new_user.password)),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|db_error| AppError::from_db_conflict(db_error, username_taken(&username).to_string()))?;

    info!("User created with ID: {}, username: {}", model.id, model.username);
    Ok(model)
}

/// Resolve a username and password pair to an account.
#[instrument(skip(db, password))]
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model, AppError> {
    let account = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    match account {
        Some(account) if verify_password(password, &account.password_hash) => {
            debug!("User {} authenticated", account.username);
            Ok(account)
        }
        _ => {
            warn!("Failed login attempt for username '{}'", username);
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

#[instrument(skip(db))]
pub async fn list_users(
    db: &DatabaseConnection,
    page: PageRequest,
) -> Result<Paginated<user::Model>, AppError> {
    let paginator = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .paginate(db, page.page_size);

    let totals = paginator.num_items_and_pages().await?;
    if page.is_out_of_range(totals.number_of_pages) {
        return Err(AppError::NotFound(format!("Invalid page {}", page.page)));
    }

    let users = paginator.fetch_page(page.index()).await?;
    debug!("Retrieved {} users on page {}", users.len(), page.page);
    Ok(Paginated::new(
        page,
        totals.number_of_items,
        totals.number_of_pages,
        users,
    ))
}

#[instrument(skip(db))]
pub async fn get_user(db: &DatabaseConnection, user_id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
}

/// Change an account. Only the account itself may do this.
#[instrument(skip(db))]
pub async fn update_user(
    db: &DatabaseConnection,
    principal: &AuthUser,
    user_id: i32,
    changes: UserChanges,
) -> Result<user::Model, AppError> {
    trace!("Entering update_user function for user_id: {}", user_id);
    let existing = get_user(db, user_id).await?;
    authorize(principal, &existing, Action::Update, "user")?;

    if let Some(username) = changes.username.as_deref() {
        ensure_username_free(db, username, Some(user_id)).await?;
    }

    let mut active: user::ActiveModel = existing.clone().into();
    if let Some(username) = changes.username {
        active.username = Set(username);
    }
    if let Some(email) = changes.email {
        active.email = Set(email);
    }
    if let Some(first_name) = changes.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(password) = changes.password {
        active.password_hash = Set(hash_password(&password));
    }

    if !active.is_changed() {
        debug!("No fields to update for user {}", user_id);
        return Ok(existing);
    }

    let updated = active
        .update(db)
        .await
        .map_err(|db_error| AppError::from_db_conflict(db_error, "Username already exists"))?;
    info!("User {} updated", user_id);
    Ok(updated)
}

/// Delete an account together with every review it wrote.
#[instrument(skip(db))]
pub async fn delete_user(
    db: &DatabaseConnection,
    principal: &AuthUser,
    user_id: i32,
) -> Result<(), AppError> {
    let existing = get_user(db, user_id).await?;
    authorize(principal, &existing, Action::Delete, "user")?;

    let txn = db.begin().await?;
    let removed = review::Entity::delete_many()
        .filter(review::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?
        .rows_affected;
    user::Entity::delete_by_id(user_id).exec(&txn).await?;
    txn.commit().await?;

    info!("User {} deleted along with {} reviews", user_id, removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::test_utils::setup_test_db;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "correct horse".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_signup_hashes_password_and_rejects_duplicates() {
        let db = setup_test_db().await;

        let alice = signup(&db, new_user("alice")).await.unwrap();
        assert_ne!(alice.password_hash, "correct horse");
        assert!(verify_password("correct horse", &alice.password_hash));

        let duplicate = signup(&db, new_user("alice")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = setup_test_db().await;
        signup(&db, new_user("alice")).await.unwrap();

        let account = authenticate(&db, "alice", "correct horse").await.unwrap();
        assert_eq!(account.username, "alice");

        assert!(matches!(
            authenticate(&db, "alice", "wrong").await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authenticate(&db, "nobody", "correct horse").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_account_changes_are_self_only() {
        let db = setup_test_db().await;
        let alice = signup(&db, new_user("alice")).await.unwrap();
        let bob = signup(&db, new_user("bob")).await.unwrap();
        let as_alice = AuthUser::from(&alice);
        let as_bob = AuthUser::from(&bob);

        let rename = UserChanges {
            first_name: Some("Mallory".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&db, &as_bob, alice.id, rename.clone()).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete_user(&db, &as_bob, alice.id).await,
            Err(AppError::Forbidden(_))
        ));

        let updated = update_user(&db, &as_alice, alice.id, rename).await.unwrap();
        assert_eq!(updated.first_name, "Mallory");

        let steal = UserChanges {
            username: Some("bob".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&db, &as_alice, alice.id, steal).await,
            Err(AppError::Conflict(_))
        ));

        let new_password = UserChanges {
            password: Some("a new secret".to_string()),
            ..Default::default()
        };
        update_user(&db, &as_alice, alice.id, new_password).await.unwrap();
        assert!(authenticate(&db, "alice", "a new secret").await.is_ok());
        assert!(authenticate(&db, "alice", "correct horse").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user_removes_their_reviews() {
        use crate::services::movies::{self, NewMovie};
        use crate::services::reviews::{self, NewReview};
        use chrono::NaiveDate;

        let db = setup_test_db().await;
        let alice = signup(&db, new_user("alice")).await.unwrap();
        let bob = signup(&db, new_user("bob")).await.unwrap();
        let movie = movies::create_movie(
            &db,
            NewMovie {
                title: "Dune".to_string(),
                description: String::new(),
                release_date: NaiveDate::from_ymd_opt(2021, 10, 22).unwrap(),
            },
        )
        .await
        .unwrap();

        for author in [&alice, &bob] {
            reviews::create_review(
                &db,
                &AuthUser::from(author),
                NewReview {
                    movie_id: movie.id,
                    rating: 3,
                    content: String::new(),
                },
            )
            .await
            .unwrap();
        }

        delete_user(&db, &AuthUser::from(&alice), alice.id).await.unwrap();
        assert!(matches!(get_user(&db, alice.id).await, Err(AppError::NotFound(_))));

        let remaining = review::Entity::find().all(&db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, bob.id);
    }

    #[tokio::test]
    async fn test_list_users() {
        let db = setup_test_db().await;
        for name in ["alice", "bob", "carol"] {
            signup(&db, new_user(name)).await.unwrap();
        }
        let page = list_users(&db, PageRequest::new(None, Some(2))).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.results[0].username, "alice");
    }
}
