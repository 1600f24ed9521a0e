//! Postgres backend

use std::fmt::Display;

use chrono::{DateTime, Utc};
use kernel::order::OrderClause;
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};

use super::query::{Condition, Filter};
use super::record::{Link, Record, Value};
use super::{Database, Session, StoreError, StoreResult};

#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Database for PgDatabase {
    type Session = PgSession;

    async fn begin(&self) -> StoreResult<PgSession> {
        let tx = self.pool.begin().await?;
        Ok(PgSession { tx })
    }
}

/// One open Postgres transaction
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

impl Session for PgSession {
    async fn insert<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        let fields = record.fields();

        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(T::TABLE).push(" (");
        {
            let mut columns = qb.separated(", ");
            for (column, _) in &fields {
                columns.push(*column);
            }
            columns.push("created_by");
        }
        qb.push(") VALUES (");
        {
            let mut values = qb.separated(", ");
            for (_, value) in fields {
                bind_separated(&mut values, value);
            }
            values.push_bind(record.meta().created_by);
        }
        qb.push(") RETURNING id, created_at, updated_at");

        let row = qb.build().fetch_one(&mut *self.tx).await?;
        record.set_id(row.try_get("id")?);
        let meta = record.meta_mut();
        meta.created_at = row.try_get("created_at")?;
        meta.updated_at = row.try_get("updated_at")?;
        Ok(())
    }

    async fn update<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        let id = record.id();

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(T::TABLE).push(" SET ");
        {
            let mut set = qb.separated(", ");
            for (column, value) in record.fields() {
                set.push(format!("{column} = "));
                bind_unseparated(&mut set, value);
            }
            set.push("updated_by = ");
            set.push_bind_unseparated(record.meta().updated_by);
            set.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND deleted_at IS NULL RETURNING updated_at");

        let updated_at: DateTime<Utc> = qb
            .build_query_scalar::<DateTime<Utc>>()
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or(StoreError::NotFound {
                table: T::TABLE,
                id,
            })?;
        record.meta_mut().updated_at = Some(updated_at);
        Ok(())
    }

    async fn mark_deleted<T: Record>(
        &mut self,
        id: i64,
        actor: Option<i64>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let sql = format!(
            "UPDATE {} SET deleted_at = NOW(), deleted_by = $1 \
             WHERE id = $2 AND deleted_at IS NULL RETURNING deleted_at",
            T::TABLE
        );
        let deleted_at: Option<DateTime<Utc>> = sqlx::query_scalar(&sql)
            .bind(actor)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(deleted_at)
    }

    async fn fetch<T: Record>(&mut self, id: i64) -> StoreResult<Option<T>> {
        let sql = format!(
            "SELECT * FROM {} WHERE id = $1 AND deleted_at IS NULL",
            T::TABLE
        );
        let record = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(record)
    }

    async fn fetch_all<T: Record>(&mut self, filter: &Filter) -> StoreResult<Vec<T>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(T::TABLE);
        push_where(&mut qb, filter);
        qb.push(" ORDER BY id");

        let rows = qb.build_query_as::<T>().fetch_all(&mut *self.tx).await?;
        Ok(rows)
    }

    async fn count<T: Record>(&mut self, filter: &Filter) -> StoreResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        qb.push(T::TABLE);
        push_where(&mut qb, filter);

        let total = qb
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(total)
    }

    async fn fetch_page<T: Record>(
        &mut self,
        filter: &Filter,
        orders: &[OrderClause],
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<T>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM ");
        qb.push(T::TABLE);
        push_where(&mut qb, filter);

        if !orders.is_empty() {
            qb.push(" ORDER BY ");
            let mut clauses = qb.separated(", ");
            for order in orders {
                clauses.push(order.to_string());
            }
        }
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<T>().fetch_all(&mut *self.tx).await?;
        Ok(rows)
    }

    async fn fetch_linked<T: Record>(
        &mut self,
        link: &Link,
        owners: &[i64],
        columns: Option<&'static [&'static str]>,
    ) -> StoreResult<Vec<(i64, T)>> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }

        let projection = match columns {
            Some(columns) => std::iter::once("id")
                .chain(columns.iter().copied())
                .map(|c| format!("t.{c}"))
                .collect::<Vec<_>>()
                .join(", "),
            None => "t.*".to_owned(),
        };
        let sql = format!(
            "SELECT l.{owner} AS link_owner, {projection} FROM {target} t \
             JOIN {table} l ON l.{target_column} = t.id \
             WHERE t.deleted_at IS NULL AND l.{owner} = ANY($1) \
             ORDER BY t.id",
            owner = link.owner_column,
            target = T::TABLE,
            table = link.table,
            target_column = link.target_column,
        );

        let rows = sqlx::query(&sql)
            .bind(owners.to_vec())
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter()
            .map(|row| -> StoreResult<(i64, T)> {
                let owner: i64 = row.try_get("link_owner")?;
                Ok((owner, T::from_row(row)?))
            })
            .collect()
    }

    async fn replace_links(&mut self, link: &Link, owner: i64, targets: &[i64]) -> StoreResult<()> {
        let delete = format!(
            "DELETE FROM {} WHERE {} = $1",
            link.table, link.owner_column
        );
        sqlx::query(&delete)
            .bind(owner)
            .execute(&mut *self.tx)
            .await?;

        if targets.is_empty() {
            return Ok(());
        }

        let insert = format!(
            "INSERT INTO {} ({}, {}) SELECT $1, UNNEST($2::BIGINT[])",
            link.table, link.owner_column, link.target_column
        );
        sqlx::query(&insert)
            .bind(owner)
            .bind(targets.to_vec())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    qb.push(" WHERE deleted_at IS NULL");
    for condition in filter.conditions() {
        qb.push(" AND ");
        match condition {
            Condition::Eq(column, Value::Null) => {
                qb.push(*column).push(" IS NULL");
            }
            Condition::Eq(column, value) => {
                qb.push(*column).push(" = ");
                bind_value(qb, value.clone());
            }
            Condition::NotEq(column, Value::Null) => {
                qb.push(*column).push(" IS NOT NULL");
            }
            Condition::NotEq(column, value) => {
                qb.push(*column).push(" <> ");
                bind_value(qb, value.clone());
            }
            Condition::Contains(column, needle) => {
                qb.push(*column)
                    .push(" LIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)));
            }
            Condition::AnyOf(column, ids) => {
                qb.push(*column)
                    .push(" = ANY(")
                    .push_bind(ids.clone())
                    .push(")");
            }
        }
    }
}

fn bind_value(qb: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Null => {
            qb.push("NULL");
        }
        Value::Int(v) => {
            qb.push_bind(v);
        }
        Value::Text(v) => {
            qb.push_bind(v);
        }
        Value::Time(v) => {
            qb.push_bind(v);
        }
    }
}

fn bind_separated<Sep: Display>(sep: &mut Separated<'_, '_, Postgres, Sep>, value: Value) {
    match value {
        Value::Null => {
            sep.push("NULL");
        }
        Value::Int(v) => {
            sep.push_bind(v);
        }
        Value::Text(v) => {
            sep.push_bind(v);
        }
        Value::Time(v) => {
            sep.push_bind(v);
        }
    }
}

fn bind_unseparated<Sep: Display>(sep: &mut Separated<'_, '_, Postgres, Sep>, value: Value) {
    match value {
        Value::Null => {
            sep.push_unseparated("NULL");
        }
        Value::Int(v) => {
            sep.push_bind_unseparated(v);
        }
        Value::Text(v) => {
            sep.push_bind_unseparated(v);
        }
        Value::Time(v) => {
            sep.push_bind_unseparated(v);
        }
    }
}

/// Escape LIKE wildcards so keywords match literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_where_clause_shape() {
        let filter = Filter::new()
            .eq("to_do_list_id", 3_i64)
            .not_eq("id", 7_i64)
            .keyword("name", Some("milk"))
            .any_of("id", vec![1, 2]);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM to_do_list_details");
        push_where(&mut qb, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT * FROM to_do_list_details WHERE deleted_at IS NULL \
             AND to_do_list_id = $1 AND id <> $2 AND name LIKE $3 AND id = ANY($4)"
        );
    }

    #[test]
    fn test_null_conditions_avoid_binds() {
        let filter = Filter::new().eq("created_by", Value::Null);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM roles");
        push_where(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM roles WHERE deleted_at IS NULL AND created_by IS NULL"
        );
    }
}
