//! A small SQL builder for the repository layer.
//!
//! Covers exactly the statement shapes the repositories need (filtered
//! selects, `INSERT OR IGNORE`, targeted updates and deletes) and produces
//! positional-parameter SQL plus its argument list. Anything fancier is
//! written as plain SQL at the call site.

use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Builder for one statement.
#[derive(Debug)]
pub struct Query {
    kind: Kind,
    table: String,
    columns: Vec<String>,
    insert_values: usize,
    sets: Vec<String>,
    conds: Vec<String>,
    args: Vec<Value>,
    order: Option<String>,
    limit: Option<u32>,
    or_ignore: bool,
}

impl Query {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            table: String::new(),
            columns: Vec::new(),
            insert_values: 0,
            sets: Vec::new(),
            conds: Vec::new(),
            args: Vec::new(),
            order: None,
            limit: None,
            or_ignore: false,
        }
    }

    pub fn select(columns: &[&str]) -> Self {
        let mut q = Self::new(Kind::Select);
        q.columns = columns.iter().map(ToString::to_string).collect();
        q
    }

    pub fn insert_into(table: &str) -> Self {
        let mut q = Self::new(Kind::Insert);
        q.table = table.to_string();
        q
    }

    pub fn update(table: &str) -> Self {
        let mut q = Self::new(Kind::Update);
        q.table = table.to_string();
        q
    }

    pub fn delete_from(table: &str) -> Self {
        let mut q = Self::new(Kind::Delete);
        q.table = table.to_string();
        q
    }

    pub fn from(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns
            .extend(columns.iter().map(ToString::to_string));
        self
    }

    /// Append one positional value for an INSERT.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.insert_values += 1;
        self.args.push(value.into());
        self
    }

    pub fn or_ignore(mut self) -> Self {
        self.or_ignore = true;
        self
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.sets.push(format!("{column} = ?"));
        self.args.push(value.into());
        self
    }

    /// Set a column to a raw SQL expression (no bound argument), e.g.
    /// `CURRENT_TIMESTAMP`.
    pub fn set_expr(mut self, column: &str, expr: &str) -> Self {
        self.sets.push(format!("{column} = {expr}"));
        self
    }

    /// AND-composed condition with its arguments in order.
    pub fn filter<I>(mut self, cond: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.conds.push(cond.to_string());
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    /// Render SQL text and the argument list, in positional order.
    pub fn build(self) -> (String, Vec<Value>) {
        let sql = match self.kind {
            Kind::Select => self.build_select(),
            Kind::Insert => self.build_insert(),
            Kind::Update => self.build_update(),
            Kind::Delete => self.build_delete(),
        };
        (sql, self.args)
    }

    fn build_select(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);
        self.push_where(&mut sql);
        if let Some(order) = &self.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }

    fn build_insert(&self) -> String {
        let mut sql = String::from("INSERT ");
        if self.or_ignore {
            sql.push_str("OR IGNORE ");
        }
        sql.push_str("INTO ");
        sql.push_str(&self.table);
        if !self.columns.is_empty() {
            sql.push_str(" (");
            sql.push_str(&self.columns.join(", "));
            sql.push(')');
        }
        let placeholders = vec!["?"; self.insert_values].join(", ");
        sql.push_str(" VALUES (");
        sql.push_str(&placeholders);
        sql.push(')');
        sql
    }

    fn build_update(&self) -> String {
        let mut sql = String::from("UPDATE ");
        sql.push_str(&self.table);
        sql.push_str(" SET ");
        sql.push_str(&self.sets.join(", "));
        self.push_where(&mut sql);
        sql
    }

    fn build_delete(&self) -> String {
        let mut sql = String::from("DELETE FROM ");
        sql.push_str(&self.table);
        self.push_where(&mut sql);
        sql
    }

    fn push_where(&self, sql: &mut String) {
        if !self.conds.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conds.join(" AND "));
        }
    }
}
