//! Profile repository.

use crate::query::Query;
use crate::rows::{ProfileRow, ProfileType};
use crate::{Store, StoreError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use tracing::debug;

const PROFILE_COLUMNS: &str = "id, name, source, type, config_count, alive_count, \
     last_synced_at, created_at, updated_at";

impl Store {
    pub fn create_profile(
        &self,
        name: &str,
        source: &str,
        profile_type: ProfileType,
    ) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (name, source, type, last_synced_at) \
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)",
                params![name, source, profile_type.as_str()],
            )
            .map_err(StoreError::query("create profile"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Find by source (sources are unique), else create.
    pub fn get_or_create_profile(
        &self,
        name: &str,
        source: &str,
        profile_type: ProfileType,
    ) -> Result<i64, StoreError> {
        if let Some(existing) = self.find_profile_by_source(source)? {
            return Ok(existing);
        }
        let id = self.create_profile(name, source, profile_type)?;
        debug!(id, name, source, "profile created");
        Ok(id)
    }

    pub fn find_profile_by_source(&self, source: &str) -> Result<Option<i64>, StoreError> {
        let (sql, args) = Query::select(&["id"])
            .from("profiles")
            .filter("source = ?", [Value::from(source.to_string())])
            .limit(1)
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(StoreError::query("find profile"))?;
            let mut rows = stmt
                .query_map(params_from_iter(args), |row| row.get::<_, i64>(0))
                .map_err(StoreError::query("find profile"))?;
            rows.next()
                .transpose()
                .map_err(StoreError::query("find profile"))
        })
    }

    pub fn get_profile(&self, id: i64) -> Result<Option<ProfileRow>, StoreError> {
        let (sql, args) = Query::select(&[PROFILE_COLUMNS])
            .from("profiles")
            .filter("id = ?", [Value::from(id)])
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(StoreError::query("get profile"))?;
            let mut rows = stmt
                .query_map(params_from_iter(args), |row| ProfileRow::from_row(row))
                .map_err(StoreError::query("get profile"))?;
            rows.next()
                .transpose()
                .map_err(StoreError::query("get profile"))
        })
    }

    pub fn list_profiles(&self) -> Result<Vec<ProfileRow>, StoreError> {
        let (sql, args) = Query::select(&[PROFILE_COLUMNS])
            .from("profiles")
            .order_by("id")
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(StoreError::query("list profiles"))?;
            let rows = stmt
                .query_map(params_from_iter(args), |row| ProfileRow::from_row(row))
                .map_err(StoreError::query("list profiles"))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::query("list profiles"))
        })
    }

    pub fn touch_profile_sync(&self, id: i64) -> Result<(), StoreError> {
        let (sql, args) = Query::update("profiles")
            .set_expr("last_synced_at", "CURRENT_TIMESTAMP")
            .set_expr("updated_at", "CURRENT_TIMESTAMP")
            .filter("id = ?", [Value::from(id)])
            .build();
        self.with_conn(|conn| {
            conn.execute(&sql, params_from_iter(args))
                .map_err(StoreError::query("touch profile"))?;
            Ok(())
        })
    }

    /// Delete a profile; the foreign key cascades to its configs.
    pub fn delete_profile(&self, id: i64) -> Result<bool, StoreError> {
        let (sql, args) = Query::delete_from("profiles")
            .filter("id = ?", [Value::from(id)])
            .build();
        self.with_conn(|conn| {
            let changed = conn
                .execute(&sql, params_from_iter(args))
                .map_err(StoreError::query("delete profile"))?;
            Ok(changed > 0)
        })
    }

    /// Wipe everything: profiles cascade into configs.
    pub fn delete_all_profiles(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM profiles", [])
                .map_err(StoreError::query("delete all profiles"))
        })
    }
}
