//! Common types and utilities shared across Folio crates.
//!
//! This crate holds the pieces every other crate in the workspace leans on:
//! logging initialisation and the health report the `folio` binary prints. It stays dependency-light so the widget crates can
//! pull it in without dragging the HTTP stack along.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`HealthReport`]: Liveness payload (`{"status":"ok","timestamp":...}`)
//!
//! # Examples
//!
//! ```rust
//! use folio_common::HealthReport;
//!
//! let report = HealthReport::ok();
//! assert_eq!(report.status, "ok");
//! ```
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub mod observability;

/// Liveness payload for the site.
///
/// Serialises to `{"status":"ok","timestamp":"2025-01-01T00:00:00.000Z"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// A healthy report stamped with the current time.
    pub fn ok() -> Self {
        Self::ok_at(Utc::now())
    }

    /// A healthy report stamped with `timestamp`.
    pub fn ok_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp,
        }
    }
}

mod rfc3339_millis {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
