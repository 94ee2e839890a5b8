//! PostgreSQL-backed `CarModelRepository` implementation using Diesel ORM.
//!
//! Reads join each model to its manufacturer so the domain always receives
//! the embedded manufacturer summary.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::catalog::{
    CarModel, CarModelChanges, CarModelFilter, CarModelId, NewCarModel,
};
use crate::domain::ports::{CarModelRepository, RepositoryError};

use super::diesel_helpers::{
    contains_pattern, count_to_total, limit_offset, map_diesel_error, map_pool_error,
};
use super::models::{CarModelRow, CarModelUpdate, ManufacturerRow, NewCarModelRow};
use super::pool::DbPool;
use super::schema::{car_manufacturers, car_models};

/// Diesel-backed implementation of the `CarModelRepository` port.
#[derive(Clone)]
pub struct DieselCarModelRepository {
    pool: DbPool,
}

impl DieselCarModelRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Apply a [`CarModelFilter`] to a boxed query over `car_models`.
macro_rules! filter_models {
    ($query:expr, $filter:expr) => {{
        let filter: &CarModelFilter = $filter;
        let mut query = $query;
        if let Some(manufacturer_id) = filter.manufacturer_id {
            query = query.filter(car_models::manufacturer_id.eq(*manufacturer_id.as_uuid()));
        }
        if let Some(term) = &filter.search {
            query = query.filter(car_models::name.ilike(contains_pattern(term)));
        }
        query
    }};
}

type ModelJoinRow = (CarModelRow, ManufacturerRow);

fn into_model((model, manufacturer): ModelJoinRow) -> Result<CarModel, RepositoryError> {
    model.into_domain(manufacturer)
}

async fn load_model(
    conn: &mut AsyncPgConnection,
    id: Uuid,
) -> Result<Option<CarModel>, RepositoryError> {
    let row: Option<ModelJoinRow> = car_models::table
        .inner_join(car_manufacturers::table)
        .filter(car_models::id.eq(id))
        .select((CarModelRow::as_select(), ManufacturerRow::as_select()))
        .first(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

    row.map(into_model).transpose()
}

#[async_trait]
impl CarModelRepository for DieselCarModelRepository {
    async fn list(
        &self,
        filter: &CarModelFilter,
        page: PageRequest,
    ) -> Result<Page<CarModel>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filter_models!(car_models::table.into_boxed(), filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<ModelJoinRow> = filter_models!(
            car_models::table.inner_join(car_manufacturers::table).into_boxed(),
            filter
        )
        .order_by((car_models::name.asc(), car_models::id.asc()))
        .select((CarModelRow::as_select(), ManufacturerRow::as_select()))
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, count_to_total(total)))
    }

    async fn find_by_id(&self, id: CarModelId) -> Result<Option<CarModel>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_model(&mut conn, *id.as_uuid()).await
    }

    async fn insert(&self, model: &NewCarModel) -> Result<CarModel, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCarModelRow {
            id: Uuid::new_v4(),
            name: model.name.as_ref(),
            slug: model.slug.as_ref(),
            manufacturer_id: *model.manufacturer_id.as_uuid(),
        };

        let id: Uuid = diesel::insert_into(car_models::table)
            .values(&new_row)
            .returning(car_models::id)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        load_model(&mut conn, id)
            .await?
            .ok_or_else(|| RepositoryError::query("inserted model vanished before read-back"))
    }

    async fn update(
        &self,
        id: CarModelId,
        changes: &CarModelChanges,
    ) -> Result<Option<CarModel>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = CarModelUpdate {
            name: changes.name().map(AsRef::as_ref),
            slug: changes.slug().map(AsRef::as_ref),
            manufacturer_id: changes.manufacturer_id().map(|m| *m.as_uuid()),
        };

        let updated: Option<Uuid> = diesel::update(car_models::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(car_models::id)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match updated {
            Some(model_id) => load_model(&mut conn, model_id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: CarModelId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(car_models::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
