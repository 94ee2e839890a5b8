//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Every statement is scoped to active rows (`deleted_at IS NULL`), so soft
//! deleted accounts can neither be read nor modified.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    NewUserRecord, RepositoryError, StoredApiKey, StoredCredentials, UserRepository,
};
use crate::domain::{ProfileUpdate, Role, User, UserFilter, UserId};

use super::diesel_helpers::{count_to_total, limit_offset, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

macro_rules! active_user {
    ($id:expr) => {
        users::table
            .filter(users::id.eq($id))
            .filter(users::deleted_at.is_null())
    };
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let role_filter = filter.role.map(Role::as_str);
        let mut count_query = users::table.filter(users::deleted_at.is_null()).into_boxed();
        let mut page_query = users::table.filter(users::deleted_at.is_null()).into_boxed();
        if let Some(role) = role_filter {
            count_query = count_query.filter(users::role.eq(role));
            page_query = page_query.filter(users::role.eq(role));
        }

        let total: i64 = count_query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<UserRow> = page_query
            .order_by((users::created_at.desc(), users::id.asc()))
            .select(UserRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(UserRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, count_to_total(total)))
    }

    async fn find_active(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = active_user!(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(UserRow, String)> = users::table
            .filter(users::username.eq(username))
            .filter(users::deleted_at.is_null())
            .select((UserRow::as_select(), users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|(user, password_hash)| {
            Ok(StoredCredentials {
                user: user.into_domain()?,
                password_hash,
            })
        })
        .transpose()
    }

    async fn find_by_api_key(&self, key_id: &str) -> Result<Option<StoredApiKey>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(UserRow, Option<String>)> = users::table
            .filter(users::api_key_id.eq(key_id))
            .filter(users::deleted_at.is_null())
            .select((UserRow::as_select(), users::api_key_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some((user, Some(secret_digest))) = row else {
            return Ok(None);
        };
        Ok(Some(StoredApiKey {
            user: user.into_domain()?,
            secret_digest,
        }))
    }

    async fn insert(&self, user: &NewUserRecord) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            role: user.role.as_str(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            username: user.username.as_ref(),
            password_hash: &user.password_hash,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row.into_domain()
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserProfileUpdate {
            first_name: update.first_name().map(AsRef::as_ref),
            last_name: update.last_name().map(AsRef::as_ref),
        };

        let row: Option<UserRow> = diesel::update(active_user!(*id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = diesel::update(active_user!(*id.as_uuid()))
            .set(users::role.eq(role.as_str()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn soft_delete(&self, id: UserId, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let marked = diesel::update(active_user!(*id.as_uuid()))
            .set((
                users::deleted_at.eq(Some(at)),
                users::api_key_id.eq(None::<String>),
                users::api_key_hash.eq(None::<String>),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(marked > 0)
    }

    async fn store_api_key(
        &self,
        id: UserId,
        key_id: &str,
        secret_digest: &str,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored = diesel::update(active_user!(*id.as_uuid()))
            .set((
                users::api_key_id.eq(Some(key_id)),
                users::api_key_hash.eq(Some(secret_digest)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(stored > 0)
    }
}
