//! Row shapes loaded from the database.

use pdx_types::{Config, Protocol, Security, Transport};
use rusqlite::types::Type;
use rusqlite::Row;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Origin class of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Subscription,
    Manual,
    Mixed,
}

impl ProfileType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Manual => "manual",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscription" => Ok(Self::Subscription),
            "manual" => Ok(Self::Manual),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("unknown profile type: {other}")),
        }
    }
}

/// A stored config, as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRow {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
    pub protocol: Protocol,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    pub password: String,
    pub method: String,
    pub transport: Transport,
    pub security: Security,
    pub extra: BTreeMap<String, String>,
    pub source: String,
    /// Milliseconds; -1 when never tested.
    pub last_ping: i64,
    pub is_alive: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ConfigRow {
    /// Shape expected by the prober and the exporters.
    pub fn to_config(&self) -> Config {
        Config {
            name: self.name.clone(),
            protocol: self.protocol,
            server: self.server.clone(),
            port: self.port,
            uuid: non_empty(&self.uuid),
            password: non_empty(&self.password),
            method: non_empty(&self.method),
            transport: self.transport,
            security: self.security,
            extra: self.extra.clone(),
            source: self.source.clone(),
        }
    }

    /// Column order must match [`crate::configs::CONFIG_COLUMNS`].
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let protocol: String = row.get(3)?;
        let port: i64 = row.get(5)?;
        let transport: String = row.get(9)?;
        let security: String = row.get(10)?;
        let extra: String = row.get(11)?;

        Ok(Self {
            id: row.get(0)?,
            profile_id: row.get(1)?,
            name: row.get(2)?,
            protocol: parse_column(3, &protocol)?,
            server: row.get(4)?,
            port: u16::try_from(port)
                .map_err(|e| conversion_error(5, format!("port out of range: {e}")))?,
            uuid: row.get(6)?,
            password: row.get(7)?,
            method: row.get(8)?,
            transport: parse_column(9, &transport)?,
            security: parse_column(10, &security)?,
            extra: serde_json::from_str(&extra)
                .map_err(|e| conversion_error(11, format!("extra column: {e}")))?,
            source: row.get(12)?,
            last_ping: row.get(13)?,
            is_alive: row.get::<_, i64>(14)? != 0,
            created_at: row.get(15)?,
            updated_at: row.get(16)?,
        })
    }
}

/// A profile row with its trigger-maintained aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub id: i64,
    pub name: String,
    pub source: String,
    pub profile_type: ProfileType,
    pub config_count: i64,
    pub alive_count: i64,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let profile_type: String = row.get(3)?;
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            source: row.get(2)?,
            profile_type: parse_column(3, &profile_type)?,
            config_count: row.get(4)?,
            alive_count: row.get(5)?,
            last_synced_at: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

fn parse_column<T: FromStr<Err = String>>(index: usize, value: &str) -> rusqlite::Result<T> {
    value.parse().map_err(|e: String| conversion_error(index, e))
}

fn conversion_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
