//! Generic Repository
//!
//! The data-access layer is split in two:
//!
//! - [`Database`] / [`Session`]: backend primitives. A session is one database
//!   transaction; nothing it writes is visible to others until
//!   [`Session::commit`], and dropping it uncommitted rolls everything back.
//!   Every read implicitly skips soft-deleted rows.
//! - [`BaseRepository`]: the create / find / update / soft-delete / paginate
//!   contract, written once against those primitives and specialised per
//!   entity through the [`Record`] trait.
//!
//! Two backends implement the primitives: [`PgDatabase`] (sqlx + Postgres)
//! and, with the `memory` feature, [`memory::MemoryDatabase`].

mod base;
mod error;
pub mod postgres;
mod query;
mod record;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

use chrono::{DateTime, Utc};
use kernel::order::OrderClause;

pub use base::BaseRepository;
pub use error::{StoreError, StoreResult};
pub use postgres::{PgDatabase, PgSession};
pub use query::{Condition, Filter, FindOptions, ListQuery, Preload};
pub use record::{Link, Record, RecordMeta, Value};

/// Opens transactional sessions
pub trait Database: Clone + Send + Sync + 'static {
    type Session: Session;

    fn begin(&self) -> impl Future<Output = StoreResult<Self::Session>> + Send;
}

/// Transactional data-access primitives
pub trait Session: Send + Sized {
    /// Insert `record`, then write back its new id and timestamps.
    fn insert<T: Record>(&mut self, record: &mut T)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Overwrite the writable columns of a live row, matched by id.
    fn update<T: Record>(&mut self, record: &mut T)
    -> impl Future<Output = StoreResult<()>> + Send;

    /// Set the deletion marker. Returns `None` if no live row had that id.
    fn mark_deleted<T: Record>(
        &mut self,
        id: i64,
        actor: Option<i64>,
    ) -> impl Future<Output = StoreResult<Option<DateTime<Utc>>>> + Send;

    fn fetch<T: Record>(&mut self, id: i64) -> impl Future<Output = StoreResult<Option<T>>> + Send;

    /// All live rows matching `filter`, ordered by id.
    fn fetch_all<T: Record>(
        &mut self,
        filter: &Filter,
    ) -> impl Future<Output = StoreResult<Vec<T>>> + Send;

    fn count<T: Record>(
        &mut self,
        filter: &Filter,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    fn fetch_page<T: Record>(
        &mut self,
        filter: &Filter,
        orders: &[OrderClause],
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = StoreResult<Vec<T>>> + Send;

    /// Live targets linked to any of `owners`, paired with their owner id.
    ///
    /// With `columns`, only `id` and those columns are loaded.
    fn fetch_linked<T: Record>(
        &mut self,
        link: &Link,
        owners: &[i64],
        columns: Option<&'static [&'static str]>,
    ) -> impl Future<Output = StoreResult<Vec<(i64, T)>>> + Send;

    /// Make `targets` the complete set linked to `owner`.
    fn replace_links(
        &mut self,
        link: &Link,
        owner: i64,
        targets: &[i64],
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Non-`Send` variant of [`Session`]
#[allow(async_fn_in_trait)]
pub trait LocalSession: Sized {
    async fn insert<T: Record>(&mut self, record: &mut T) -> StoreResult<()>;
    async fn update<T: Record>(&mut self, record: &mut T) -> StoreResult<()>;
    async fn mark_deleted<T: Record>(
        &mut self,
        id: i64,
        actor: Option<i64>,
    ) -> StoreResult<Option<DateTime<Utc>>>;
    async fn fetch<T: Record>(&mut self, id: i64) -> StoreResult<Option<T>>;
    async fn fetch_all<T: Record>(&mut self, filter: &Filter) -> StoreResult<Vec<T>>;
    async fn count<T: Record>(&mut self, filter: &Filter) -> StoreResult<i64>;
    async fn fetch_page<T: Record>(
        &mut self,
        filter: &Filter,
        orders: &[OrderClause],
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<T>>;
    async fn fetch_linked<T: Record>(
        &mut self,
        link: &Link,
        owners: &[i64],
        columns: Option<&'static [&'static str]>,
    ) -> StoreResult<Vec<(i64, T)>>;
    async fn replace_links(&mut self, link: &Link, owner: i64, targets: &[i64]) -> StoreResult<()>;
    async fn commit(self) -> StoreResult<()>;
}

impl<S: Session> LocalSession for S {
    async fn insert<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        <Self as Session>::insert::<T>(self, record).await
    }
    async fn update<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        <Self as Session>::update::<T>(self, record).await
    }
    async fn mark_deleted<T: Record>(
        &mut self,
        id: i64,
        actor: Option<i64>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        <Self as Session>::mark_deleted::<T>(self, id, actor).await
    }
    async fn fetch<T: Record>(&mut self, id: i64) -> StoreResult<Option<T>> {
        <Self as Session>::fetch::<T>(self, id).await
    }
    async fn fetch_all<T: Record>(&mut self, filter: &Filter) -> StoreResult<Vec<T>> {
        <Self as Session>::fetch_all::<T>(self, filter).await
    }
    async fn count<T: Record>(&mut self, filter: &Filter) -> StoreResult<i64> {
        <Self as Session>::count::<T>(self, filter).await
    }
    async fn fetch_page<T: Record>(
        &mut self,
        filter: &Filter,
        orders: &[OrderClause],
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<T>> {
        <Self as Session>::fetch_page::<T>(self, filter, orders, offset, limit).await
    }
    async fn fetch_linked<T: Record>(
        &mut self,
        link: &Link,
        owners: &[i64],
        columns: Option<&'static [&'static str]>,
    ) -> StoreResult<Vec<(i64, T)>> {
        <Self as Session>::fetch_linked::<T>(self, link, owners, columns).await
    }
    async fn replace_links(&mut self, link: &Link, owner: i64, targets: &[i64]) -> StoreResult<()> {
        <Self as Session>::replace_links(self, link, owner, targets).await
    }
    async fn commit(self) -> StoreResult<()> {
        <Self as Session>::commit(self).await
    }
}
