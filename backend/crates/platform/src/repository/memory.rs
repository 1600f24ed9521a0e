//! In-process backend for tests
//!
//! Sessions work on a private snapshot and a journal of writes. `commit`
//! replays the journal onto the shared state under one lock, re-checking
//! unique columns so that two sessions racing for the same name behave like
//! a partial unique index: the later commit fails and changes nothing.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use kernel::order::{Direction, OrderClause};

use super::query::{Condition, Filter};
use super::record::{Link, Record, Value};
use super::{Database, Session, StoreError, StoreResult};

#[derive(Clone)]
struct StoredRow {
    record: Arc<dyn Any + Send + Sync>,
    unique: Vec<(&'static str, Value)>,
    deleted: bool,
}

impl StoredRow {
    fn of<T: Record>(record: &T) -> Self {
        Self {
            record: Arc::new(record.clone()),
            unique: T::UNIQUE.iter().map(|c| (*c, record.value(c))).collect(),
            deleted: record.meta().is_deleted(),
        }
    }

    fn get<T: Record>(&self) -> Option<&T> {
        if self.deleted {
            return None;
        }
        self.record.downcast_ref::<T>()
    }
}

enum Op {
    Put {
        table: &'static str,
        id: i64,
        row: StoredRow,
    },
    Links {
        table: &'static str,
        owner: i64,
        targets: Vec<i64>,
    },
}

#[derive(Clone, Default)]
struct Tables {
    rows: HashMap<&'static str, BTreeMap<i64, StoredRow>>,
    links: HashMap<&'static str, BTreeSet<(i64, i64)>>,
}

impl Tables {
    fn live<T: Record>(&self) -> impl Iterator<Item = &T> {
        self.rows
            .get(T::TABLE)
            .into_iter()
            .flat_map(|rows| rows.values())
            .filter_map(StoredRow::get::<T>)
    }

    fn find<T: Record>(&self, id: i64) -> Option<&T> {
        self.rows.get(T::TABLE)?.get(&id)?.get::<T>()
    }

    fn check_unique(&self, table: &'static str, id: i64, row: &StoredRow) -> StoreResult<()> {
        if row.deleted {
            return Ok(());
        }
        let Some(rows) = self.rows.get(table) else {
            return Ok(());
        };
        for (column, value) in &row.unique {
            let taken = rows.iter().any(|(other_id, other)| {
                *other_id != id
                    && !other.deleted
                    && other.unique.contains(&(*column, value.clone()))
            });
            if taken {
                return Err(StoreError::UniqueViolation {
                    constraint: format!("{table}_{column}_key"),
                });
            }
        }
        Ok(())
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Put { table, id, row } => {
                self.rows
                    .entry(*table)
                    .or_default()
                    .insert(*id, row.clone());
            }
            Op::Links {
                table,
                owner,
                targets,
            } => {
                let links = self.links.entry(*table).or_default();
                links.retain(|(o, _)| o != owner);
                links.extend(targets.iter().map(|t| (*owner, *t)));
            }
        }
    }
}

#[derive(Default)]
struct Shared {
    tables: Tables,
    sequences: HashMap<&'static str, i64>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert and commit `record` in its own session.
    pub async fn seed<T: Record>(&self, mut record: T) -> StoreResult<T> {
        let mut session = self.begin().await?;
        session.insert(&mut record).await?;
        session.commit().await?;
        Ok(record)
    }

    /// Committed live rows of `T`.
    pub fn rows<T: Record>(&self) -> Vec<T> {
        lock(&self.shared).tables.live::<T>().cloned().collect()
    }

    /// Committed row of `T` by id, including soft-deleted ones.
    pub fn raw<T: Record>(&self, id: i64) -> Option<T> {
        lock(&self.shared)
            .tables
            .rows
            .get(T::TABLE)?
            .get(&id)?
            .record
            .downcast_ref::<T>()
            .cloned()
    }

    /// Committed targets linked to `owner`.
    pub fn linked(&self, link: &Link, owner: i64) -> Vec<i64> {
        lock(&self.shared)
            .tables
            .links
            .get(link.table)
            .map(|links| {
                links
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, t)| *t)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Database for MemoryDatabase {
    type Session = MemorySession;

    async fn begin(&self) -> StoreResult<MemorySession> {
        let view = lock(&self.shared).tables.clone();
        Ok(MemorySession {
            shared: Arc::clone(&self.shared),
            view,
            journal: Vec::new(),
        })
    }
}

pub struct MemorySession {
    shared: Arc<Mutex<Shared>>,
    view: Tables,
    journal: Vec<Op>,
}

impl MemorySession {
    fn next_id(&self, table: &'static str) -> i64 {
        let mut shared = lock(&self.shared);
        let seq = shared.sequences.entry(table).or_default();
        *seq += 1;
        *seq
    }

    fn put<T: Record>(&mut self, record: &T) -> StoreResult<()> {
        let row = StoredRow::of(record);
        self.view.check_unique(T::TABLE, record.id(), &row)?;
        let op = Op::Put {
            table: T::TABLE,
            id: record.id(),
            row,
        };
        self.view.apply(&op);
        self.journal.push(op);
        Ok(())
    }

    fn matching<T: Record>(&self, filter: &Filter) -> Vec<T> {
        self.view
            .live::<T>()
            .filter(|record| filter.conditions().iter().all(|c| matches(c, *record)))
            .cloned()
            .collect()
    }
}

impl Session for MemorySession {
    async fn insert<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        let id = self.next_id(T::TABLE);
        let now = Utc::now();
        record.set_id(id);
        let meta = record.meta_mut();
        meta.created_at = Some(now);
        meta.updated_at = Some(now);
        meta.deleted_at = None;
        self.put(&*record)
    }

    async fn update<T: Record>(&mut self, record: &mut T) -> StoreResult<()> {
        let id = record.id();
        let created_at = self
            .view
            .find::<T>(id)
            .ok_or(StoreError::NotFound {
                table: T::TABLE,
                id,
            })?
            .meta()
            .created_at;
        let meta = record.meta_mut();
        meta.created_at = created_at;
        meta.updated_at = Some(Utc::now());
        self.put(&*record)
    }

    async fn mark_deleted<T: Record>(
        &mut self,
        id: i64,
        actor: Option<i64>,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let Some(mut record) = self.view.find::<T>(id).cloned() else {
            return Ok(None);
        };
        let now = Utc::now();
        let meta = record.meta_mut();
        meta.deleted_at = Some(now);
        meta.deleted_by = actor;
        self.put(&record)?;
        Ok(Some(now))
    }

    async fn fetch<T: Record>(&mut self, id: i64) -> StoreResult<Option<T>> {
        Ok(self.view.find::<T>(id).cloned())
    }

    async fn fetch_all<T: Record>(&mut self, filter: &Filter) -> StoreResult<Vec<T>> {
        Ok(self.matching(filter))
    }

    async fn count<T: Record>(&mut self, filter: &Filter) -> StoreResult<i64> {
        Ok(self.matching::<T>(filter).len() as i64)
    }

    async fn fetch_page<T: Record>(
        &mut self,
        filter: &Filter,
        orders: &[OrderClause],
        offset: i64,
        limit: i64,
    ) -> StoreResult<Vec<T>> {
        let mut rows = self.matching::<T>(filter);
        rows.sort_by(|a, b| compare(a, b, orders));
        Ok(rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn fetch_linked<T: Record>(
        &mut self,
        link: &Link,
        owners: &[i64],
        columns: Option<&'static [&'static str]>,
    ) -> StoreResult<Vec<(i64, T)>> {
        let Some(links) = self.view.links.get(link.table) else {
            return Ok(Vec::new());
        };
        let mut found: Vec<(i64, T)> = links
            .iter()
            .filter(|(owner, _)| owners.contains(owner))
            .filter_map(|(owner, target)| {
                let mut record = self.view.find::<T>(*target)?.clone();
                if let Some(columns) = columns {
                    record.project(columns);
                }
                Some((*owner, record))
            })
            .collect();
        found.sort_by_key(|(owner, record)| (record.id(), *owner));
        Ok(found)
    }

    async fn replace_links(&mut self, link: &Link, owner: i64, targets: &[i64]) -> StoreResult<()> {
        let op = Op::Links {
            table: link.table,
            owner,
            targets: targets.to_vec(),
        };
        self.view.apply(&op);
        self.journal.push(op);
        Ok(())
    }

    async fn commit(self) -> StoreResult<()> {
        let mut shared = lock(&self.shared);
        let mut merged = shared.tables.clone();
        for op in &self.journal {
            if let Op::Put { table, id, row } = op {
                merged.check_unique(*table, *id, row)?;
            }
            merged.apply(op);
        }
        shared.tables = merged;
        Ok(())
    }
}

fn matches<T: Record>(condition: &Condition, record: &T) -> bool {
    match condition {
        Condition::Eq(column, value) => record.value(column) == *value,
        Condition::NotEq(column, value) => record.value(column) != *value,
        Condition::Contains(column, needle) => {
            matches!(record.value(column), Value::Text(text) if text.contains(needle.as_str()))
        }
        Condition::AnyOf(column, ids) => {
            matches!(record.value(column), Value::Int(id) if ids.contains(&id))
        }
    }
}

fn compare<T: Record>(a: &T, b: &T, orders: &[OrderClause]) -> Ordering {
    for order in orders {
        let ordering = a
            .value(order.column())
            .partial_cmp(&b.value(order.column()))
            .unwrap_or(Ordering::Equal);
        let ordering = match order.direction() {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
