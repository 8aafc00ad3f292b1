//! Config repository.

use crate::query::Query;
use crate::rows::ConfigRow;
use crate::{Store, StoreError};
use pdx_types::{Config, PingResult, Protocol};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use tracing::debug;

pub(crate) const CONFIG_COLUMNS: &str = "id, profile_id, name, protocol, server, port, uuid, \
     password, method, transport, security, extra, source, last_ping, is_alive, \
     created_at, updated_at";

const INSERT_SQL: &str = "INSERT OR IGNORE INTO configs \
     (profile_id, name, protocol, server, port, uuid, password, method, transport, security, extra, source) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

impl Store {
    /// Insert a batch under one transaction with `INSERT OR IGNORE`.
    /// Returns how many rows were actually new; the difference to the input
    /// length is the number of dedup hits.
    pub fn insert_configs_batch(
        &self,
        configs: &[Config],
        profile_id: i64,
    ) -> Result<usize, StoreError> {
        let inserted = self.with_tx(|tx| {
            let mut stmt = tx
                .prepare(INSERT_SQL)
                .map_err(StoreError::query("prepare insert"))?;

            let mut inserted = 0usize;
            for cfg in configs {
                let extra = serde_json::to_string(&cfg.extra)?;
                let source = if cfg.source.is_empty() {
                    "manual"
                } else {
                    cfg.source.as_str()
                };
                let changed = stmt
                    .execute(params![
                        profile_id,
                        cfg.name,
                        cfg.protocol.as_str(),
                        cfg.server,
                        i64::from(cfg.port),
                        cfg.uuid.as_deref().unwrap_or(""),
                        cfg.password.as_deref().unwrap_or(""),
                        cfg.method.as_deref().unwrap_or(""),
                        cfg.transport.as_str(),
                        cfg.security.as_str(),
                        extra,
                        source,
                    ])
                    .map_err(StoreError::query("insert config"))?;
                inserted += changed;
            }
            Ok(inserted)
        })?;

        debug!(inserted, total = configs.len(), profile_id, "config batch stored");
        Ok(inserted)
    }

    /// Persist probe outcomes atomically: one prepared update per result,
    /// all in one transaction. The built SQL is identical for every row, so
    /// the statement cache compiles it once.
    pub fn update_ping_batch(&self, results: &[(i64, PingResult)]) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            for (id, result) in results {
                let (sql, args) = Query::update("configs")
                    .set("last_ping", result.avg_ms)
                    .set("is_alive", i64::from(result.reachable))
                    .set_expr("updated_at", "CURRENT_TIMESTAMP")
                    .filter("id = ?", [Value::from(*id)])
                    .build();
                let mut stmt = tx
                    .prepare_cached(&sql)
                    .map_err(StoreError::query("prepare ping update"))?;
                stmt.execute(params_from_iter(args))
                    .map_err(StoreError::query("update ping"))?;
            }
            Ok(())
        })
    }

    pub fn update_ping(&self, id: i64, result: &PingResult) -> Result<(), StoreError> {
        self.update_ping_batch(&[(id, result.clone())])
    }

    pub fn get_config(&self, id: i64) -> Result<Option<ConfigRow>, StoreError> {
        let (sql, args) = Query::select(&[CONFIG_COLUMNS])
            .from("configs")
            .filter("id = ?", [Value::from(id)])
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(StoreError::query("get config"))?;
            let mut rows = stmt
                .query_map(params_from_iter(args), |row| ConfigRow::from_row(row))
                .map_err(StoreError::query("get config"))?;
            rows.next()
                .transpose()
                .map_err(StoreError::query("get config"))
        })
    }

    /// All configs, optionally filtered by protocol, in stored order.
    pub fn list_configs(&self, protocol: Option<Protocol>) -> Result<Vec<ConfigRow>, StoreError> {
        let mut query = Query::select(&[CONFIG_COLUMNS]).from("configs");
        if let Some(protocol) = protocol {
            query = query.filter("protocol = ?", [Value::from(protocol.as_str().to_string())]);
        }
        let (sql, args) = query.order_by("profile_id, id").build();
        self.query_rows(&sql, args, "list configs")
    }

    /// Configs in one profile: alive first, then fastest first.
    pub fn list_configs_by_profile(&self, profile_id: i64) -> Result<Vec<ConfigRow>, StoreError> {
        let (sql, args) = Query::select(&[CONFIG_COLUMNS])
            .from("configs")
            .filter("profile_id = ?", [Value::from(profile_id)])
            .order_by("is_alive DESC, last_ping ASC")
            .build();
        self.query_rows(&sql, args, "list configs by profile")
    }

    pub fn list_alive(&self) -> Result<Vec<ConfigRow>, StoreError> {
        let (sql, args) = Query::select(&[CONFIG_COLUMNS])
            .from("configs")
            .filter("is_alive = ?", [Value::from(1i64)])
            .order_by("last_ping ASC")
            .build();
        self.query_rows(&sql, args, "list alive")
    }

    pub fn count_configs(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM configs", [], |row| row.get(0))
                .map_err(StoreError::query("count configs"))
        })
    }

    pub fn delete_config(&self, id: i64) -> Result<bool, StoreError> {
        let (sql, args) = Query::delete_from("configs")
            .filter("id = ?", [Value::from(id)])
            .build();
        self.with_conn(|conn| {
            let changed = conn
                .execute(&sql, params_from_iter(args))
                .map_err(StoreError::query("delete config"))?;
            Ok(changed > 0)
        })
    }

    /// Dedup-index lookup for an already-stored twin of `cfg`.
    pub fn find_duplicate_id(&self, cfg: &Config) -> Result<Option<i64>, StoreError> {
        let (sql, args) = Query::select(&["id"])
            .from("configs")
            .filter(
                "protocol = ? AND server = ? AND port = ? AND uuid = ? AND password = ?",
                [
                    Value::from(cfg.protocol.as_str().to_string()),
                    Value::from(cfg.server.clone()),
                    Value::from(i64::from(cfg.port)),
                    Value::from(cfg.uuid.clone().unwrap_or_default()),
                    Value::from(cfg.password.clone().unwrap_or_default()),
                ],
            )
            .limit(1)
            .build();
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(StoreError::query("find duplicate"))?;
            let mut rows = stmt
                .query_map(params_from_iter(args), |row| row.get::<_, i64>(0))
                .map_err(StoreError::query("find duplicate"))?;
            rows.next()
                .transpose()
                .map_err(StoreError::query("find duplicate"))
        })
    }

    fn query_rows(
        &self,
        sql: &str,
        args: Vec<Value>,
        context: &'static str,
    ) -> Result<Vec<ConfigRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql).map_err(StoreError::query(context))?;
            let rows = stmt
                .query_map(params_from_iter(args), |row| ConfigRow::from_row(row))
                .map_err(StoreError::query(context))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::query(context))
        })
    }
}
