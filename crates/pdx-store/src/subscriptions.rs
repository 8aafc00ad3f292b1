//! Saved subscription URLs. Uniqueness is the URL itself.

use crate::query::Query;
use crate::{Store, StoreError};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

impl Store {
    /// Returns `false` when the URL was already saved.
    pub fn add_subscription(&self, url: &str) -> Result<bool, StoreError> {
        let (sql, args) = Query::insert_into("subscriptions")
            .or_ignore()
            .columns(&["url"])
            .value(url.to_string())
            .build();
        self.with_conn(|conn| {
            let changed = conn
                .execute(&sql, params_from_iter(args))
                .map_err(StoreError::query("add subscription"))?;
            Ok(changed > 0)
        })
    }

    pub fn list_subscriptions(&self) -> Result<Vec<String>, StoreError> {
        let (sql, args) = Query::select(&["url"])
            .from("subscriptions")
            .order_by("url")
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(StoreError::query("list subscriptions"))?;
            let rows = stmt
                .query_map(params_from_iter(args), |row| row.get::<_, String>(0))
                .map_err(StoreError::query("list subscriptions"))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::query("list subscriptions"))
        })
    }

    pub fn remove_subscription(&self, url: &str) -> Result<bool, StoreError> {
        let (sql, args) = Query::delete_from("subscriptions")
            .filter("url = ?", [Value::from(url.to_string())])
            .build();
        self.with_conn(|conn| {
            let changed = conn
                .execute(&sql, params_from_iter(args))
                .map_err(StoreError::query("remove subscription"))?;
            Ok(changed > 0)
        })
    }

    pub fn clear_subscriptions(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM subscriptions", [])
                .map_err(StoreError::query("clear subscriptions"))
        })
    }
}
