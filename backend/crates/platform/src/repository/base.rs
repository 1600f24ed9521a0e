use std::marker::PhantomData;

use kernel::id::UserId;
use kernel::order::OrderClause;
use kernel::pagination::PageRequest;

use super::{FindOptions, ListQuery, Record, Session, StoreError, StoreResult};

/// Create / find / update / soft-delete / paginate for one record type
///
/// Every method runs inside the caller's [`Session`], so entity services
/// compose several calls into one transaction.
pub struct BaseRepository<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> BaseRepository<T> {
    pub const fn new() -> Self {
        Self {
            _record: PhantomData,
        }
    }
}

impl<T> Default for BaseRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BaseRepository<T> {}

impl<T: Record> BaseRepository<T> {
    pub async fn create<S: Session>(&self, session: &mut S, record: &mut T) -> StoreResult<()> {
        session.insert(record).await
    }

    /// Fetch one live record, optionally with preloads.
    pub async fn find_by_id<S: Session>(
        &self,
        session: &mut S,
        id: i64,
        options: Option<&FindOptions>,
    ) -> StoreResult<T> {
        let not_found = StoreError::NotFound {
            table: T::TABLE,
            id,
        };
        if id == 0 {
            return Err(not_found);
        }

        let mut record = session.fetch::<T>(id).await?.ok_or(not_found)?;

        if let Some(options) = options {
            if options.is_debug() {
                tracing::debug!(table = T::TABLE, id, preloads = ?options.preloads(), "find_by_id");
            }
            record.preload(&mut *session, options).await?;
        }

        Ok(record)
    }

    /// True if a live record with `id` exists.
    pub async fn exists<S: Session>(&self, session: &mut S, id: i64) -> StoreResult<bool> {
        if id == 0 {
            return Ok(false);
        }
        Ok(session.fetch::<T>(id).await?.is_some())
    }

    pub async fn update<S: Session>(&self, session: &mut S, record: &mut T) -> StoreResult<()> {
        if record.id() == 0 {
            return Err(StoreError::Validation(format!(
                "cannot update {} without an id",
                T::TABLE
            )));
        }
        session.update(record).await
    }

    /// Mark `record` deleted and reflect the marker on the value itself.
    pub async fn soft_delete<S: Session>(
        &self,
        session: &mut S,
        record: &mut T,
        actor: Option<UserId>,
    ) -> StoreResult<()> {
        let id = record.id();
        if id == 0 {
            return Err(StoreError::Validation(format!(
                "cannot delete {} without an id",
                T::TABLE
            )));
        }

        let deleted_at = self.mark(session, id, actor).await?;
        record.meta_mut().stamp_deleted(actor, deleted_at);
        Ok(())
    }

    pub async fn soft_delete_by_id<S: Session>(
        &self,
        session: &mut S,
        id: i64,
        actor: Option<UserId>,
    ) -> StoreResult<()> {
        if id == 0 {
            return Err(StoreError::Validation(format!(
                "cannot delete {} without an id",
                T::TABLE
            )));
        }
        self.mark(session, id, actor).await.map(|_| ())
    }

    /// One page of live records plus the total count matching the filter.
    pub async fn find_all_with_query<S: Session>(
        &self,
        session: &mut S,
        query: &ListQuery,
        page: PageRequest,
        orders: &[OrderClause],
    ) -> StoreResult<(Vec<T>, i64)> {
        let total = session.count::<T>(&query.filter).await?;

        if query.options.is_debug() {
            tracing::debug!(
                table = T::TABLE,
                filter = ?query.filter,
                orders = ?orders,
                page = page.page(),
                page_size = page.page_size(),
                "find_all_with_query"
            );
        }

        let mut rows = session
            .fetch_page::<T>(&query.filter, orders, page.offset(), page.limit())
            .await?;

        if !query.options.is_empty() {
            for row in &mut rows {
                row.preload(&mut *session, &query.options).await?;
            }
        }

        Ok((rows, total))
    }

    async fn mark<S: Session>(
        &self,
        session: &mut S,
        id: i64,
        actor: Option<UserId>,
    ) -> StoreResult<chrono::DateTime<chrono::Utc>> {
        session
            .mark_deleted::<T>(id, actor.map(|a| a.get()))
            .await?
            .ok_or(StoreError::NotFound {
                table: T::TABLE,
                id,
            })
    }
}
