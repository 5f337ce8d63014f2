//! Search layer: per-entity lookups and the cross-collection fuzzy router.
//!
//! - [`query`]: query-shape classification (plate-like vs free text).
//! - [`fuzzy`]: fan-out across collections, tagged merge, bounded results.
//!
//! Per-entity searches share one contract: normalize the query in the
//! field's mode, take exact token hits first, fall back to a substring scan
//! only when the exact lookup comes up empty, and return deduplicated
//! entities in original collection order. Empty or unmatched queries return
//! an empty vector, never an error.

pub mod fuzzy;
pub mod query;

use serde::Serialize;

use crate::cache::{OpsCache, PRIMARY_FIELD, ROUTE_STATION_FIELD, Snapshot};
use crate::model::{Badge, Collection, Driver, Operator, Route, Vehicle};
use crate::normalize::{Mode, normalize};

pub use fuzzy::FUZZY_RESULT_CAP;
pub use query::{QueryShape, classify, extract_plate_cluster};

/// One fuzzy-search hit, tagged with its source collection.
#[derive(Debug, Clone, Serialize)]
pub struct TaggedHit {
    pub collection: Collection,
    pub entity: SearchEntity,
}

impl TaggedHit {
    pub fn id(&self) -> &str {
        self.entity.id()
    }
}

/// The searchable entity families the fuzzy router can return.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchEntity {
    Vehicle(Vehicle),
    Driver(Driver),
    Operator(Operator),
    Route(Route),
    Badge(Badge),
}

impl SearchEntity {
    pub fn id(&self) -> &str {
        match self {
            SearchEntity::Vehicle(v) => &v.id,
            SearchEntity::Driver(d) => &d.id,
            SearchEntity::Operator(o) => &o.id,
            SearchEntity::Route(r) => &r.id,
            SearchEntity::Badge(b) => &b.id,
        }
    }
}

/// Matches split by rank, each half in original collection order.
pub(crate) struct Ranked<T> {
    pub(crate) exact: Vec<T>,
    pub(crate) partial: Vec<T>,
}

impl<T> Ranked<T> {
    fn empty() -> Self {
        Self {
            exact: Vec::new(),
            partial: Vec::new(),
        }
    }

    fn flatten(mut self) -> Vec<T> {
        self.exact.append(&mut self.partial);
        self.exact
    }
}

fn materialize<T: Clone>(snapshot: &Snapshot<T>, ordinals: &[u32]) -> Vec<T> {
    ordinals
        .iter()
        .filter_map(|&ordinal| snapshot.items.get(ordinal as usize).cloned())
        .collect()
}

/// Exact-then-scan lookup against one indexed field of a snapshot.
fn single_field_ranked<T: Clone>(snapshot: &Snapshot<T>, field: usize, token: &str) -> Ranked<T> {
    let Some(index) = snapshot.index(field) else {
        return Ranked::empty();
    };
    let exact = index.exact_matches(token).to_vec();
    let partial = if exact.is_empty() {
        index.scan_matches(token)
    } else {
        Vec::new()
    };
    Ranked {
        exact: materialize(snapshot, &exact),
        partial: materialize(snapshot, &partial),
    }
}

impl<S> OpsCache<S> {
    pub(crate) fn vehicle_matches(&self, query: &str) -> Ranked<Vehicle> {
        let token = normalize(query, Mode::Code);
        if token.is_empty() {
            return Ranked::empty();
        }
        single_field_ranked(&self.vehicles.load(), PRIMARY_FIELD, &token)
    }

    pub(crate) fn driver_matches(&self, query: &str) -> Ranked<Driver> {
        let token = normalize(query, Mode::Text);
        if token.is_empty() {
            return Ranked::empty();
        }
        single_field_ranked(&self.drivers.load(), PRIMARY_FIELD, &token)
    }

    pub(crate) fn operator_matches(&self, query: &str) -> Ranked<Operator> {
        let token = normalize(query, Mode::Text);
        if token.is_empty() {
            return Ranked::empty();
        }
        single_field_ranked(&self.operators.load(), PRIMARY_FIELD, &token)
    }

    pub(crate) fn badge_matches(&self, query: &str) -> Ranked<Badge> {
        let token = normalize(query, Mode::Code);
        if token.is_empty() {
            return Ranked::empty();
        }
        single_field_ranked(&self.badges.load(), PRIMARY_FIELD, &token)
    }

    /// Routes match on the route code and on departure/arrival station text.
    /// Code hits order before station hits within each rank.
    pub(crate) fn route_matches(&self, query: &str) -> Ranked<Route> {
        let code_token = normalize(query, Mode::Code);
        let text_token = normalize(query, Mode::Text);
        if code_token.is_empty() && text_token.is_empty() {
            return Ranked::empty();
        }
        let snapshot = self.routes.load();

        let mut exact: Vec<u32> = Vec::new();
        if !code_token.is_empty()
            && let Some(index) = snapshot.index(PRIMARY_FIELD)
        {
            exact.extend_from_slice(index.exact_matches(&code_token));
        }
        if !text_token.is_empty()
            && let Some(index) = snapshot.index(ROUTE_STATION_FIELD)
        {
            for &ordinal in index.exact_matches(&text_token) {
                if !exact.contains(&ordinal) {
                    exact.push(ordinal);
                }
            }
        }

        let mut partial: Vec<u32> = Vec::new();
        if exact.is_empty() {
            if !code_token.is_empty()
                && let Some(index) = snapshot.index(PRIMARY_FIELD)
            {
                partial = index.scan_matches(&code_token);
            }
            if !text_token.is_empty()
                && let Some(index) = snapshot.index(ROUTE_STATION_FIELD)
            {
                for ordinal in index.scan_matches(&text_token) {
                    if !partial.contains(&ordinal) {
                        partial.push(ordinal);
                    }
                }
            }
        }

        Ranked {
            exact: materialize(&snapshot, &exact),
            partial: materialize(&snapshot, &partial),
        }
    }

    pub fn search_vehicle_by_plate(&self, query: &str) -> Vec<Vehicle> {
        self.vehicle_matches(query).flatten()
    }

    pub fn search_driver_by_name(&self, query: &str) -> Vec<Driver> {
        self.driver_matches(query).flatten()
    }

    pub fn search_operator_by_name(&self, query: &str) -> Vec<Operator> {
        self.operator_matches(query).flatten()
    }

    pub fn search_route_by_code(&self, query: &str) -> Vec<Route> {
        self.route_matches(query).flatten()
    }

    pub fn search_badge_by_number(&self, query: &str) -> Vec<Badge> {
        self.badge_matches(query).flatten()
    }
}
