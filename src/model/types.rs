//! Typed records and the collection name space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve cached collections, in load order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Vehicles,
    Drivers,
    Operators,
    Routes,
    Badges,
    Dispatches,
    Schedules,
    Services,
    Shifts,
    Invoices,
    Violations,
    ServiceCharges,
}

impl Collection {
    pub const ALL: [Collection; 12] = [
        Collection::Vehicles,
        Collection::Drivers,
        Collection::Operators,
        Collection::Routes,
        Collection::Badges,
        Collection::Dispatches,
        Collection::Schedules,
        Collection::Services,
        Collection::Shifts,
        Collection::Invoices,
        Collection::Violations,
        Collection::ServiceCharges,
    ];

    /// Stable snapshot name, also the fetch key against the source of truth.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Vehicles => "vehicles",
            Collection::Drivers => "drivers",
            Collection::Operators => "operators",
            Collection::Routes => "routes",
            Collection::Badges => "badges",
            Collection::Dispatches => "dispatches",
            Collection::Schedules => "schedules",
            Collection::Services => "services",
            Collection::Shifts => "shifts",
            Collection::Invoices => "invoices",
            Collection::Violations => "violations",
            Collection::ServiceCharges => "service_charges",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    pub operator: Option<String>,
    pub seats: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub license: Option<String>,
    pub operator: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub code: String,
    /// Departure station display name.
    pub origin: Option<String>,
    /// Arrival station display name.
    pub destination: Option<String>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub number: String,
    pub plate: Option<String>,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
}

/// One gate movement: a vehicle entering the station and/or departing on a
/// dispatched trip. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: String,
    pub plate: Option<String>,
    pub route_code: Option<String>,
    pub entered_at: Option<i64>,
    pub departed_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub route_code: Option<String>,
    pub plate: Option<String>,
    /// Planned departure slot as the source formats it (e.g. "06:30").
    pub departs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub staff: Option<String>,
    pub role: Option<String>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub customer: Option<String>,
    pub amount: Option<f64>,
    pub issued_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub id: String,
    pub plate: Option<String>,
    pub detail: Option<String>,
    pub occurred_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCharge {
    pub id: String,
    pub service: Option<String>,
    pub plate: Option<String>,
    pub amount: Option<f64>,
    pub charged_at: Option<i64>,
}
