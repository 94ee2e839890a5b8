//! PostgreSQL-backed `ManufacturerRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::catalog::{
    Manufacturer, ManufacturerChanges, ManufacturerFilter, ManufacturerId, ManufacturerSort,
    NewManufacturer, SortOrder,
};
use crate::domain::ports::{ManufacturerRepository, RepositoryError};

use super::diesel_helpers::{
    contains_pattern, count_to_total, limit_offset, map_diesel_error, map_pool_error,
};
use super::models::{ManufacturerRow, ManufacturerUpdate, NewManufacturerRow};
use super::pool::DbPool;
use super::schema::car_manufacturers;

/// Diesel-backed implementation of the `ManufacturerRepository` port.
#[derive(Clone)]
pub struct DieselManufacturerRepository {
    pool: DbPool,
}

impl DieselManufacturerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &ManufacturerFilter) -> car_manufacturers::BoxedQuery<'static, Pg> {
    let mut query = car_manufacturers::table.into_boxed();
    if let Some(term) = &filter.search {
        query = query.filter(car_manufacturers::name.ilike(contains_pattern(term)));
    }
    query
}

fn sorted(
    query: car_manufacturers::BoxedQuery<'static, Pg>,
    sort: ManufacturerSort,
    order: SortOrder,
) -> car_manufacturers::BoxedQuery<'static, Pg> {
    let query = match (sort, order) {
        (ManufacturerSort::Name, SortOrder::Asc) => query.order_by(car_manufacturers::name.asc()),
        (ManufacturerSort::Name, SortOrder::Desc) => {
            query.order_by(car_manufacturers::name.desc())
        }
        (ManufacturerSort::CreatedAt, SortOrder::Asc) => {
            query.order_by(car_manufacturers::created_at.asc())
        }
        (ManufacturerSort::CreatedAt, SortOrder::Desc) => {
            query.order_by(car_manufacturers::created_at.desc())
        }
    };
    query.then_order_by(car_manufacturers::id.asc())
}

fn collect(rows: Vec<ManufacturerRow>) -> Result<Vec<Manufacturer>, RepositoryError> {
    rows.into_iter().map(ManufacturerRow::into_domain).collect()
}

#[async_trait]
impl ManufacturerRepository for DieselManufacturerRepository {
    async fn list(
        &self,
        filter: &ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let (limit, offset) = limit_offset(page);
        let rows: Vec<ManufacturerRow> = sorted(filtered(filter), filter.sort, filter.order)
            .select(ManufacturerRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page::new(collect(rows)?, page, count_to_total(total)))
    }

    async fn find_by_id(
        &self,
        id: ManufacturerId,
    ) -> Result<Option<Manufacturer>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ManufacturerRow> = car_manufacturers::table
            .find(*id.as_uuid())
            .select(ManufacturerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(ManufacturerRow::into_domain).transpose()
    }

    async fn insert(&self, manufacturer: &NewManufacturer) -> Result<Manufacturer, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewManufacturerRow {
            id: Uuid::new_v4(),
            name: manufacturer.name.as_ref(),
            slug: manufacturer.slug.as_ref(),
        };

        let row: ManufacturerRow = diesel::insert_into(car_manufacturers::table)
            .values(&new_row)
            .returning(ManufacturerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row.into_domain()
    }

    async fn update(
        &self,
        id: ManufacturerId,
        changes: &ManufacturerChanges,
    ) -> Result<Option<Manufacturer>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ManufacturerUpdate {
            name: changes.name().map(AsRef::as_ref),
            slug: changes.slug().map(AsRef::as_ref),
        };

        let row: Option<ManufacturerRow> =
            diesel::update(car_manufacturers::table.find(*id.as_uuid()))
                .set(&changeset)
                .returning(ManufacturerRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;

        row.map(ManufacturerRow::into_domain).transpose()
    }

    async fn delete(&self, id: ManufacturerId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(car_manufacturers::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
