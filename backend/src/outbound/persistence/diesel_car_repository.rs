//! PostgreSQL-backed `CarRepository` implementation using Diesel ORM.
//!
//! Every read filters on `deleted_at IS NULL` and joins the model and
//! manufacturer so listings carry their catalogue summary. Favourite toggles
//! and soft deletes are single statements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::catalog::{Car, CarChanges, CarFilter, CarId, CarSort, NewCar, SortOrder};
use crate::domain::ports::{CarRepository, RepositoryError};

use super::diesel_helpers::{
    count_to_total, escape_like, limit_offset, map_diesel_error, map_pool_error,
};
use super::models::{CarModelRow, CarRow, CarUpdate, ManufacturerRow, NewCarRow, NewFavoriteRow};
use super::pool::DbPool;
use super::schema::{car_manufacturers, car_models, cars, user_favorite_cars};

/// Diesel-backed implementation of the `CarRepository` port.
#[derive(Clone)]
pub struct DieselCarRepository {
    pool: DbPool,
}

impl DieselCarRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Active cars joined to their model and manufacturer, boxed for dynamic
/// filtering.
macro_rules! active_cars {
    () => {
        cars::table
            .inner_join(car_models::table.inner_join(car_manufacturers::table))
            .filter(cars::deleted_at.is_null())
            .into_boxed()
    };
}

/// Apply a [`CarFilter`] to a boxed query over the car join.
macro_rules! filter_cars {
    ($query:expr, $filter:expr) => {{
        let filter: &CarFilter = $filter;
        let mut query = $query;
        if let Some(manufacturer_id) = filter.manufacturer_id {
            query = query.filter(car_models::manufacturer_id.eq(*manufacturer_id.as_uuid()));
        }
        if let Some(model_id) = filter.model_id {
            query = query.filter(cars::model_id.eq(*model_id.as_uuid()));
        }
        if let Some(year_from) = filter.year_from {
            query = query.filter(cars::year.ge(year_from));
        }
        if let Some(year_to) = filter.year_to {
            query = query.filter(cars::year.le(year_to));
        }
        if let Some(price_min) = filter.price_min {
            query = query.filter(cars::price.ge(price_min));
        }
        if let Some(price_max) = filter.price_max {
            query = query.filter(cars::price.le(price_max));
        }
        if let Some(color) = &filter.color {
            query = query.filter(cars::color.ilike(escape_like(color)));
        }
        query
    }};
}

/// Order a boxed car query; ties break on id so pages are stable.
macro_rules! sort_cars {
    ($query:expr, $sort:expr, $order:expr) => {{
        let query = $query;
        let query = match ($sort, $order) {
            (CarSort::Price, SortOrder::Asc) => query.order_by(cars::price.asc()),
            (CarSort::Price, SortOrder::Desc) => query.order_by(cars::price.desc()),
            (CarSort::Year, SortOrder::Asc) => query.order_by(cars::year.asc()),
            (CarSort::Year, SortOrder::Desc) => query.order_by(cars::year.desc()),
            (CarSort::KmDriven, SortOrder::Asc) => query.order_by(cars::km_driven.asc()),
            (CarSort::KmDriven, SortOrder::Desc) => query.order_by(cars::km_driven.desc()),
            (CarSort::CreatedAt, SortOrder::Asc) => query.order_by(cars::created_at.asc()),
            (CarSort::CreatedAt, SortOrder::Desc) => query.order_by(cars::created_at.desc()),
        };
        query.then_order_by(cars::id.asc())
    }};
}

type CarJoinRow = (CarRow, CarModelRow, ManufacturerRow);

fn into_car((car, model, manufacturer): CarJoinRow) -> Result<Car, RepositoryError> {
    car.into_domain(model, manufacturer)
}

fn collect(rows: Vec<CarJoinRow>) -> Result<Vec<Car>, RepositoryError> {
    rows.into_iter().map(into_car).collect()
}

async fn load_active(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<Car>, RepositoryError> {
    let row: Option<CarJoinRow> = active_cars!()
        .filter(cars::id.eq(id))
        .select((
            CarRow::as_select(),
            CarModelRow::as_select(),
            ManufacturerRow::as_select(),
        ))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    row.map(into_car).transpose()
}

#[async_trait]
impl CarRepository for DieselCarRepository {
    async fn list(&self, filter: &CarFilter, page: PageRequest) -> Result<Page<Car>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filter_cars!(active_cars!(), filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<CarJoinRow> =
            sort_cars!(filter_cars!(active_cars!(), filter), filter.sort, filter.order)
                .select((
                    CarRow::as_select(),
                    CarModelRow::as_select(),
                    ManufacturerRow::as_select(),
                ))
                .limit(limit)
                .offset(offset)
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(Page::new(collect(rows)?, page, count_to_total(total)))
    }

    async fn find_active(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_active(&mut conn, *id.as_uuid()).await
    }

    async fn insert(&self, car: &NewCar, owner: UserId) -> Result<Car, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCarRow {
            id: Uuid::new_v4(),
            year: car.year.get(),
            color: car.color.as_ref(),
            km_driven: car.km_driven.get(),
            price: car.price.get(),
            model_id: *car.model_id.as_uuid(),
            created_by: *owner.as_uuid(),
        };

        let id: Uuid = diesel::insert_into(cars::table)
            .values(&new_row)
            .returning(cars::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_active(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::query("inserted car vanished before read-back"))
    }

    async fn update(
        &self,
        id: CarId,
        changes: &CarChanges,
    ) -> Result<Option<Car>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = CarUpdate {
            year: changes.year.map(|year| year.get()),
            color: changes.color.as_ref().map(AsRef::as_ref),
            km_driven: changes.km_driven.map(|km| km.get()),
            price: changes.price.map(|price| price.get()),
            model_id: changes.model_id.map(|model| *model.as_uuid()),
        };

        let updated: Option<Uuid> = diesel::update(
            cars::table
                .filter(cars::id.eq(*id.as_uuid()))
                .filter(cars::deleted_at.is_null()),
        )
        .set(&changeset)
        .returning(cars::id)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(car_id) => load_active(&mut conn, car_id).await,
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, id: CarId, at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let marked = diesel::update(
            cars::table
                .filter(cars::id.eq(*id.as_uuid()))
                .filter(cars::deleted_at.is_null()),
        )
        .set(cars::deleted_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(marked > 0)
    }

    async fn add_favorite(&self, user: UserId, car: CarId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(user_favorite_cars::table)
            .values(&NewFavoriteRow {
                user_id: *user.as_uuid(),
                car_id: *car.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove_favorite(&self, user: UserId, car: CarId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(
            user_favorite_cars::table
                .filter(user_favorite_cars::user_id.eq(*user.as_uuid()))
                .filter(user_favorite_cars::car_id.eq(*car.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn list_favorites(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<Car>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user.as_uuid();

        let total: i64 = user_favorite_cars::table
            .inner_join(cars::table)
            .filter(user_favorite_cars::user_id.eq(user_id))
            .filter(cars::deleted_at.is_null())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<CarJoinRow> = user_favorite_cars::table
            .inner_join(cars::table.inner_join(car_models::table.inner_join(car_manufacturers::table)))
            .filter(user_favorite_cars::user_id.eq(user_id))
            .filter(cars::deleted_at.is_null())
            .order_by((user_favorite_cars::created_at.desc(), cars::id.asc()))
            .select((
                CarRow::as_select(),
                CarModelRow::as_select(),
                ManufacturerRow::as_select(),
            ))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(collect(rows)?, page, count_to_total(total)))
    }
}
