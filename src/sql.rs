//! Statement Building Helpers
//!
//! Placeholder rebinding across dialects, `IN (?)` slice expansion and
//! named-parameter (`:name`) queries, plus the dynamic argument type the
//! dispatch layer binds through the `Any` driver.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder dialect of the underlying driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// `?` placeholders (MySQL, SQLite)
    Question,
    /// `$1..$N` placeholders (PostgreSQL)
    Dollar,
}

/// Supported driver families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    Postgres,
    MySql,
    Sqlite,
}

impl Driver {
    /// Resolve a driver from its registry name
    pub fn from_name(name: &str) -> Result<Driver> {
        match name.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::MySql),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(Error::Config(format!("unknown driver name: {other}"))),
        }
    }

    /// Placeholder dialect for this driver
    pub fn dialect(&self) -> Dialect {
        match self {
            Driver::Postgres => Dialect::Dollar,
            Driver::MySql | Driver::Sqlite => Dialect::Question,
        }
    }

    /// URL scheme understood by the driver registry
    pub fn scheme(&self) -> &'static str {
        match self {
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
            Driver::Sqlite => "sqlite",
        }
    }

    /// Whether the `wsrep_ready` health predicate applies (Galera runs on
    /// the MySQL wire protocol only)
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, Driver::MySql)
    }

    /// Turn a bare DSN into a URL the driver registry can resolve
    pub(crate) fn normalize_dsn(&self, dsn: &str) -> String {
        if dsn.contains("://") || dsn.starts_with("sqlite:") {
            dsn.to_string()
        } else {
            format!("{}://{}", self.scheme(), dsn)
        }
    }
}

/// Owned dynamic query argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Argument to [`bind_in`]: either a single value or a list that expands
/// one `?` into one placeholder per element
#[derive(Debug, Clone)]
pub enum Arg {
    One(Value),
    List(Vec<Value>),
}

impl Arg {
    pub fn one(value: impl Into<Value>) -> Arg {
        Arg::One(value.into())
    }

    pub fn list<T: Into<Value>>(values: Vec<T>) -> Arg {
        Arg::List(values.into_iter().map(Into::into).collect())
    }
}

/// Bind every [`Value`] in order onto a query or query-as builder.
/// A macro rather than a function so the same arm list serves both
/// builder types.
macro_rules! bind_all {
    ($query:expr, $args:expr) => {{
        let mut query = $query;
        for value in $args.iter() {
            query = match value {
                $crate::sql::Value::Null => query.bind(Option::<String>::None),
                $crate::sql::Value::Bool(v) => query.bind(*v),
                $crate::sql::Value::Int(v) => query.bind(*v),
                $crate::sql::Value::Float(v) => query.bind(*v),
                $crate::sql::Value::Text(v) => query.bind(v.clone()),
            };
        }
        query
    }};
}
pub(crate) use bind_all;

/// Tracks whether the scanner currently sits inside a quoted region
#[derive(Default)]
struct QuoteState {
    single: bool,
    double: bool,
    backtick: bool,
}

impl QuoteState {
    fn feed(&mut self, c: char) {
        match c {
            '\'' if !self.double && !self.backtick => self.single = !self.single,
            '"' if !self.single && !self.backtick => self.double = !self.double,
            '`' if !self.single && !self.double => self.backtick = !self.backtick,
            _ => {}
        }
    }

    fn quoted(&self) -> bool {
        self.single || self.double || self.backtick
    }
}

/// Translate `?` placeholders into the dialect's native form.
/// Placeholders inside quoted strings and identifiers are left alone.
pub fn rebind(dialect: Dialect, query: &str) -> String {
    if dialect == Dialect::Question {
        return query.to_string();
    }

    let mut out = String::with_capacity(query.len() + 8);
    let mut state = QuoteState::default();
    let mut n = 0usize;
    for c in query.chars() {
        if c == '?' && !state.quoted() {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            state.feed(c);
            out.push(c);
        }
    }
    out
}

/// Byte offsets of `?` placeholders outside quoted regions
fn placeholder_offsets(query: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut state = QuoteState::default();
    for (idx, c) in query.char_indices() {
        if c == '?' && !state.quoted() {
            offsets.push(idx);
        } else {
            state.feed(c);
        }
    }
    offsets
}

/// Expand list arguments in an `IN (?)` query.
///
/// Each `?` consumes one argument in order; a [`Arg::List`] replaces its
/// placeholder with one `?` per element. When no list argument is present
/// the query passes through untouched. Returns the rewritten query (still
/// in `?` form; run it through [`rebind`] for Postgres) and the flattened
/// argument vector.
///
/// Errors: an empty list, or a placeholder/argument count mismatch once a
/// list is involved.
pub fn bind_in(query: &str, args: &[Arg]) -> Result<(String, Vec<Value>)> {
    for arg in args {
        if matches!(arg, Arg::List(values) if values.is_empty()) {
            return Err(Error::Query("empty list argument in IN expansion".into()));
        }
    }

    if !args.iter().any(|a| matches!(a, Arg::List(_))) {
        let values = args
            .iter()
            .map(|a| match a {
                Arg::One(v) => v.clone(),
                Arg::List(_) => unreachable!(),
            })
            .collect();
        return Ok((query.to_string(), values));
    }

    let offsets = placeholder_offsets(query);
    if offsets.len() != args.len() {
        return Err(Error::Query(format!(
            "expected {} placeholders, query has {}",
            args.len(),
            offsets.len()
        )));
    }

    let mut out = String::with_capacity(query.len() + args.len() * 2);
    let mut values = Vec::new();
    let mut rest = 0usize;
    for (offset, arg) in offsets.iter().zip(args) {
        out.push_str(&query[rest..*offset]);
        match arg {
            Arg::One(v) => {
                out.push('?');
                values.push(v.clone());
            }
            Arg::List(list) => {
                let placeholders = vec!["?"; list.len()].join(", ");
                out.push_str(&placeholders);
                values.extend(list.iter().cloned());
            }
        }
        rest = offset + 1;
    }
    out.push_str(&query[rest..]);

    Ok((out, values))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Rewrite a `:name` query into positional `?` form, resolving each name
/// against the parameter list in occurrence order.
///
/// `::` (Postgres casts) and names inside quoted regions are left alone.
/// An unknown name is an error.
pub fn named(query: &str, params: &[(&str, Value)]) -> Result<(String, Vec<Value>)> {
    let mut out = String::with_capacity(query.len());
    let mut values = Vec::new();
    let mut state = QuoteState::default();
    let mut chars = query.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != ':' || state.quoted() {
            state.feed(c);
            out.push(c);
            continue;
        }

        if let Some((_, ':')) = chars.peek() {
            chars.next();
            out.push_str("::");
            continue;
        }

        let mut name = String::new();
        while let Some((_, nc)) = chars.peek() {
            if is_name_char(*nc) {
                name.push(*nc);
                chars.next();
            } else {
                break;
            }
        }

        if name.is_empty() {
            out.push(':');
            continue;
        }

        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::Query(format!("unknown named parameter :{name}")))?;
        out.push('?');
        values.push(value);
    }

    Ok((out, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_name() {
        assert_eq!(Driver::from_name("postgres").unwrap(), Driver::Postgres);
        assert_eq!(Driver::from_name("mysql").unwrap(), Driver::MySql);
        assert_eq!(Driver::from_name("sqlite3").unwrap(), Driver::Sqlite);
        assert!(Driver::from_name("oracle").is_err());
    }

    #[test]
    fn test_dialects() {
        assert_eq!(Driver::Postgres.dialect(), Dialect::Dollar);
        assert_eq!(Driver::MySql.dialect(), Dialect::Question);
        assert_eq!(Driver::Sqlite.dialect(), Dialect::Question);
    }

    #[test]
    fn test_rebind_question_is_identity() {
        let q = "INSERT INTO t (a, b) VALUES (?, ?)";
        assert_eq!(rebind(Dialect::Question, q), q);
    }

    #[test]
    fn test_rebind_dollar() {
        assert_eq!(
            rebind(Dialect::Dollar, "SELECT * FROM t WHERE a = ? AND b = ?"),
            "SELECT * FROM t WHERE a = $1 AND b = $2"
        );
    }

    #[test]
    fn test_rebind_skips_quoted() {
        assert_eq!(
            rebind(Dialect::Dollar, "SELECT '?' , v FROM t WHERE a = ?"),
            "SELECT '?' , v FROM t WHERE a = $1"
        );
    }

    #[test]
    fn test_bind_in_expands_list() {
        let (q, values) = bind_in(
            "SELECT * FROM foo WHERE x = ? AND v IN (?) AND y = ?",
            &[
                Arg::one("foo"),
                Arg::list(vec![0, 5, 7, 2, 9]),
                Arg::one("bar"),
            ],
        )
        .unwrap();
        assert_eq!(q.matches('?').count(), 7);
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], Value::Text("foo".into()));
        assert_eq!(values[6], Value::Text("bar".into()));
    }

    #[test]
    fn test_bind_in_three_elements() {
        let (q, values) =
            bind_in("SELECT * FROM t WHERE x IN (?)", &[Arg::list(vec![1, 2, 3])]).unwrap();
        assert_eq!(q.matches('?').count(), 3);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_bind_in_no_lists_passes_through() {
        let original = "SELECT * FROM foo WHERE x = ? AND y = ?";
        let (q, values) = bind_in(
            original,
            &[Arg::one("foo"), Arg::one("bar"), Arg::one("baz")],
        )
        .unwrap();
        assert_eq!(q, original);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_bind_in_empty_list_errors() {
        let result = bind_in("SELECT * FROM t WHERE x IN (?)", &[Arg::list(Vec::<i64>::new())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_in_count_mismatch_errors() {
        assert!(bind_in(
            "SELECT * FROM t WHERE x = ? AND y = ?",
            &[Arg::one("a"), Arg::list(vec![1, 2]), Arg::one("b")],
        )
        .is_err());

        assert!(bind_in(
            "SELECT * FROM t WHERE x = ? AND y IN (?)",
            &[Arg::list(vec![1, 2, 3])],
        )
        .is_err());
    }

    #[test]
    fn test_named_rewrites_in_order() {
        let params = [
            ("first_name", Value::from("ben")),
            ("last_name", Value::from("doe")),
        ];
        let (q, values) = named(
            "INSERT INTO person (first_name, last_name) VALUES (:first_name, :last_name)",
            &params,
        )
        .unwrap();
        assert_eq!(
            q,
            "INSERT INTO person (first_name, last_name) VALUES (?, ?)"
        );
        assert_eq!(values[0], Value::Text("ben".into()));
        assert_eq!(values[1], Value::Text("doe".into()));
    }

    #[test]
    fn test_named_reuses_parameter() {
        let params = [("name", Value::from("x"))];
        let (q, values) = named("SELECT * FROM t WHERE a = :name OR b = :name", &params).unwrap();
        assert_eq!(q, "SELECT * FROM t WHERE a = ? OR b = ?");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_named_unknown_parameter_errors() {
        assert!(named("SELECT * FROM t WHERE a = :missing", &[]).is_err());
    }

    #[test]
    fn test_named_leaves_casts_and_quotes() {
        let params = [("id", Value::from(7))];
        let (q, values) = named(
            "SELECT ':literal', v::text FROM t WHERE id = :id",
            &params,
        )
        .unwrap();
        assert_eq!(q, "SELECT ':literal', v::text FROM t WHERE id = ?");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(1i64), Value::Int(1));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn test_normalize_dsn() {
        assert_eq!(
            Driver::Sqlite.normalize_dsn("sqlite::memory:"),
            "sqlite::memory:"
        );
        assert_eq!(
            Driver::Postgres.normalize_dsn("postgres://u@h/db"),
            "postgres://u@h/db"
        );
        assert_eq!(Driver::MySql.normalize_dsn("u@h/db"), "mysql://u@h/db");
    }
}
