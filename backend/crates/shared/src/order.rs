//! Ordering allow-lists
//!
//! List endpoints accept a free-form `order` query parameter such as
//! `"name asc, created_at desc"`. Only tokens present in an allow-list survive,
//! so the resulting [`OrderClause`]s are safe to splice into SQL.

use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

/// A validated `column direction` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    column: &'static str,
    direction: Direction,
}

impl OrderClause {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }

    pub const fn column(&self) -> &'static str {
        self.column
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Parse one token against the allowed columns.
    ///
    /// The token must be exactly `"<column> <asc|desc>"`.
    pub fn parse(token: &str, allowed_columns: &[&'static str]) -> Option<Self> {
        let (column, direction) = token.split_once(' ')?;
        let direction = Direction::parse(direction)?;
        let column = allowed_columns.iter().copied().find(|c| *c == column)?;
        Some(Self { column, direction })
    }
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction.as_sql())
    }
}

/// Columns todo entities may be sorted by
pub const TODO_ORDER_COLUMNS: &[&str] = &["created_at", "name", "id"];

/// Columns members may be sorted by
pub const MEMBER_ORDER_COLUMNS: &[&str] = &["created_at", "account", "id"];

/// Default ordering when nothing valid was requested
pub const DEFAULT_ORDER: OrderClause = OrderClause::desc("created_at");

/// Split `raw` on commas and keep the allowed clauses, in request order.
///
/// Unknown tokens are dropped silently; if none remain, `default` is used.
pub fn parse_orders(
    raw: &str,
    allowed_columns: &[&'static str],
    default: OrderClause,
) -> Vec<OrderClause> {
    let orders: Vec<OrderClause> = raw
        .split(',')
        .map(str::trim)
        .filter_map(|token| OrderClause::parse(token, allowed_columns))
        .collect();

    if orders.is_empty() {
        vec![default]
    } else {
        orders
    }
}
