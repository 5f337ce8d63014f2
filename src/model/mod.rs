//! Canonical record shapes for the twelve cached collections.
//!
//! Raw snapshots arrive as loosely-shaped JSON rows whose keys mix canonical
//! English names with legacy Vietnamese names. [`ingest`] applies one
//! field-mapping pass per collection and produces the typed records in
//! [`types`]; nothing downstream ever looks at a raw key again.

pub mod ingest;
pub mod types;

pub use types::{
    Badge, Collection, Dispatch, Driver, Invoice, Operator, Route, Schedule, Service,
    ServiceCharge, Shift, Vehicle, Violation,
};
