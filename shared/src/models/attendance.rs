//! Attendance Models
//!
//! Per-service, per-member check-ins. At most one record exists per
//! `(member_id, service_id)` pair; a repeat mark returns the existing row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::member::Member;

/// How the check-in was captured. "qr_code" is a client-side simulation;
/// the server just records the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AttendanceMethod {
    Manual,
    QrCode,
}

impl AttendanceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceMethod::Manual => "manual",
            AttendanceMethod::QrCode => "qr_code",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct AttendanceRecord {
    pub id: i64,
    pub member_id: i64,
    pub service_id: i64,
    pub check_in_time: i64,
    pub method: AttendanceMethod,
    pub location: Option<String>,
}

/// Mark payload. `check_in_time` is server-assigned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub member_id: i64,
    pub service_id: i64,
    pub method: AttendanceMethod,
    pub location: Option<String>,
}

/// Record joined with its member, for service listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithMember {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub member: Member,
}

/// Per-service aggregates. Map keys are strings for JSON; `byCell` uses
/// "0" for members with no cell assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub service_id: i64,
    pub service_name: String,
    pub total_present: i64,
    pub by_method: BTreeMap<String, i64>,
    pub by_cell: BTreeMap<String, i64>,
}
