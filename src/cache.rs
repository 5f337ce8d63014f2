//! In-memory operational cache: snapshot slots, concurrent warm-up, and the
//! readiness gate.
//!
//! Each collection lives in its own slot holding an `Arc<Snapshot>` behind a
//! short-critical-section `RwLock`. A warm builds the replacement snapshot
//! (items + indexes) entirely off-lock, then publishes it with one pointer
//! swap, so a reader sees the previous snapshot or the new one but never a
//! half-built index. Collections are fetched concurrently and published
//! independently as each fetch resolves; one failing collection is logged
//! and left empty without disturbing the other eleven.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use smallvec::smallvec;

use crate::index::{FieldIndex, FieldValues};
use crate::model::ingest;
use crate::model::{
    Badge, Collection, Dispatch, Driver, Invoice, Operator, Route, Schedule, Service,
    ServiceCharge, Shift, Vehicle, Violation,
};
use crate::normalize::Mode;
use crate::source::CollectionSource;

/// Field slot of a collection's primary searchable value.
pub(crate) const PRIMARY_FIELD: usize = 0;
/// Routes only: field slot of the departure/arrival station names.
pub(crate) const ROUTE_STATION_FIELD: usize = 1;

/// One immutable collection snapshot plus its derived indexes. Replaced
/// wholesale on every load, never mutated in place.
pub(crate) struct Snapshot<T> {
    pub(crate) items: Vec<T>,
    indexes: Vec<FieldIndex>,
}

impl<T> Snapshot<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub(crate) fn index(&self, field: usize) -> Option<&FieldIndex> {
        self.indexes.get(field)
    }
}

pub(crate) struct Slot<T> {
    current: RwLock<Arc<Snapshot<T>>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    pub(crate) fn load(&self) -> Arc<Snapshot<T>> {
        Arc::clone(&self.current.read())
    }

    fn publish(&self, snapshot: Snapshot<T>) {
        *self.current.write() = Arc::new(snapshot);
    }
}

/// Lifecycle of the cache as a whole. A refresh cycles `Ready -> Loading ->
/// Ready`; the cache never returns to `Uninitialized` once warmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
}

/// Per-collection counts for the assistant's status surface.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub ready: bool,
    pub state: LoadState,
    pub counts: BTreeMap<&'static str, usize>,
    /// Epoch millis of the last completed warm, if any.
    pub last_refresh: Option<i64>,
}

/// Operational knowledge cache over the twelve station collections.
///
/// Explicitly constructed and injectable: every instance owns its source and
/// its snapshots, so tests can run isolated caches side by side. All read
/// operations are synchronous, pure in-memory lookups and are safe to call
/// before the first [`OpsCache::pre_warm`]; they simply see empty
/// collections.
pub struct OpsCache<S> {
    source: S,
    state: Mutex<LoadState>,
    warmed: AtomicBool,
    last_refresh: AtomicI64,

    pub(crate) vehicles: Slot<Vehicle>,
    pub(crate) drivers: Slot<Driver>,
    pub(crate) operators: Slot<Operator>,
    pub(crate) routes: Slot<Route>,
    pub(crate) badges: Slot<Badge>,
    pub(crate) dispatches: Slot<Dispatch>,
    pub(crate) schedules: Slot<Schedule>,
    pub(crate) services: Slot<Service>,
    pub(crate) shifts: Slot<Shift>,
    pub(crate) invoices: Slot<Invoice>,
    pub(crate) violations: Slot<Violation>,
    pub(crate) service_charges: Slot<ServiceCharge>,
}

impl<S> OpsCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Uninitialized),
            warmed: AtomicBool::new(false),
            last_refresh: AtomicI64::new(0),
            vehicles: Slot::new(),
            drivers: Slot::new(),
            operators: Slot::new(),
            routes: Slot::new(),
            badges: Slot::new(),
            dispatches: Slot::new(),
            schedules: Slot::new(),
            services: Slot::new(),
            shifts: Slot::new(),
            invoices: Slot::new(),
            violations: Slot::new(),
            service_charges: Slot::new(),
        }
    }

    /// True once the first warm has completed, regardless of how many
    /// individual collection fetches succeeded.
    pub fn is_ready(&self) -> bool {
        self.warmed.load(Ordering::Acquire)
    }

    pub fn state(&self) -> LoadState {
        *self.state.lock()
    }

    pub fn last_refresh(&self) -> Option<i64> {
        match self.last_refresh.load(Ordering::Relaxed) {
            0 => None,
            ts => Some(ts),
        }
    }

    pub fn system_stats(&self) -> SystemStats {
        let mut counts = BTreeMap::new();
        counts.insert(Collection::Vehicles.name(), self.vehicles.load().items.len());
        counts.insert(Collection::Drivers.name(), self.drivers.load().items.len());
        counts.insert(Collection::Operators.name(), self.operators.load().items.len());
        counts.insert(Collection::Routes.name(), self.routes.load().items.len());
        counts.insert(Collection::Badges.name(), self.badges.load().items.len());
        counts.insert(Collection::Dispatches.name(), self.dispatches.load().items.len());
        counts.insert(Collection::Schedules.name(), self.schedules.load().items.len());
        counts.insert(Collection::Services.name(), self.services.load().items.len());
        counts.insert(Collection::Shifts.name(), self.shifts.load().items.len());
        counts.insert(Collection::Invoices.name(), self.invoices.load().items.len());
        counts.insert(Collection::Violations.name(), self.violations.load().items.len());
        counts.insert(
            Collection::ServiceCharges.name(),
            self.service_charges.load().items.len(),
        );
        SystemStats {
            ready: self.is_ready(),
            state: self.state(),
            counts,
            last_refresh: self.last_refresh(),
        }
    }
}

impl<S: CollectionSource> OpsCache<S> {
    /// Fetch all twelve collections concurrently and replace their snapshots.
    ///
    /// Infallible by design: a collection whose fetch fails is logged and
    /// published empty. Safe to call repeatedly; every call is a full
    /// replace, never an incremental patch.
    pub async fn pre_warm(&self) {
        *self.state.lock() = LoadState::Loading;
        let started = std::time::Instant::now();

        tokio::join!(
            self.load_into(Collection::Vehicles, &self.vehicles, ingest::vehicle_from_raw, |items| {
                vec![FieldIndex::build(items, Mode::Code, vehicle_fields)]
            }),
            self.load_into(Collection::Drivers, &self.drivers, ingest::driver_from_raw, |items| {
                vec![FieldIndex::build(items, Mode::Text, driver_fields)]
            }),
            self.load_into(
                Collection::Operators,
                &self.operators,
                ingest::operator_from_raw,
                |items| vec![FieldIndex::build(items, Mode::Text, operator_fields)],
            ),
            self.load_into(Collection::Routes, &self.routes, ingest::route_from_raw, |items| {
                vec![
                    FieldIndex::build(items, Mode::Code, route_code_fields),
                    FieldIndex::build(items, Mode::Text, route_station_fields),
                ]
            }),
            self.load_into(Collection::Badges, &self.badges, ingest::badge_from_raw, |items| {
                vec![FieldIndex::build(items, Mode::Code, badge_fields)]
            }),
            self.load_into(
                Collection::Dispatches,
                &self.dispatches,
                ingest::dispatch_from_raw,
                |_| Vec::new(),
            ),
            self.load_into(
                Collection::Schedules,
                &self.schedules,
                ingest::schedule_from_raw,
                |_| Vec::new(),
            ),
            self.load_into(Collection::Services, &self.services, ingest::service_from_raw, |_| {
                Vec::new()
            }),
            self.load_into(Collection::Shifts, &self.shifts, ingest::shift_from_raw, |_| {
                Vec::new()
            }),
            self.load_into(Collection::Invoices, &self.invoices, ingest::invoice_from_raw, |_| {
                Vec::new()
            }),
            self.load_into(
                Collection::Violations,
                &self.violations,
                ingest::violation_from_raw,
                |_| Vec::new(),
            ),
            self.load_into(
                Collection::ServiceCharges,
                &self.service_charges,
                ingest::service_charge_from_raw,
                |_| Vec::new(),
            ),
        );

        self.last_refresh
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
        self.warmed.store(true, Ordering::Release);
        *self.state.lock() = LoadState::Ready;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cache_warm_complete"
        );
    }

    async fn load_into<T>(
        &self,
        collection: Collection,
        slot: &Slot<T>,
        ingest_row: impl Fn(&Value, usize) -> T,
        build_indexes: impl Fn(&[T]) -> Vec<FieldIndex>,
    ) {
        let rows = self.fetch_rows(collection).await;
        let items: Vec<T> = rows
            .iter()
            .enumerate()
            .map(|(ordinal, raw)| ingest_row(raw, ordinal))
            .collect();
        let indexes = build_indexes(&items);
        let count = items.len();
        slot.publish(Snapshot { items, indexes });
        tracing::debug!(collection = %collection, count, "collection_loaded");
    }

    async fn fetch_rows(&self, collection: Collection) -> Vec<Value> {
        match self.source.fetch(collection).await {
            Ok(Some(rows)) => rows,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(collection = %collection, error = %err, "collection_fetch_failed");
                Vec::new()
            }
        }
    }
}

fn vehicle_fields(v: &Vehicle) -> FieldValues {
    smallvec![v.plate.clone()]
}

fn driver_fields(d: &Driver) -> FieldValues {
    smallvec![d.name.clone()]
}

fn operator_fields(o: &Operator) -> FieldValues {
    smallvec![o.name.clone()]
}

fn route_code_fields(r: &Route) -> FieldValues {
    smallvec![r.code.clone()]
}

fn route_station_fields(r: &Route) -> FieldValues {
    let mut values = FieldValues::new();
    if let Some(origin) = &r.origin {
        values.push(origin.clone());
    }
    if let Some(destination) = &r.destination {
        values.push(destination.clone());
    }
    values
}

fn badge_fields(b: &Badge) -> FieldValues {
    smallvec![b.number.clone()]
}
