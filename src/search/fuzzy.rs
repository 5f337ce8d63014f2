//! Cross-collection fuzzy search: classify the query, fan out to the
//! per-entity searches, merge tagged results, cap the answer.
//!
//! Merge order is a deterministic total order: exact matches by collection
//! priority, then partial matches by collection priority, then original load
//! order within a collection. Duplicates collapse on (collection, id).

use itertools::Itertools;

use crate::cache::OpsCache;
use crate::model::Collection;
use crate::normalize::{Mode, normalize};
use crate::search::query::{QueryShape, classify, extract_plate_cluster};
use crate::search::{Ranked, SearchEntity, TaggedHit};

/// Upper bound on fuzzy results for any input.
pub const FUZZY_RESULT_CAP: usize = 10;

struct TaggedGroup {
    exact: Vec<TaggedHit>,
    partial: Vec<TaggedHit>,
}

fn tag<T>(
    collection: Collection,
    ranked: Ranked<T>,
    wrap: impl Fn(T) -> SearchEntity,
) -> TaggedGroup {
    let to_hits = |entities: Vec<T>| {
        entities
            .into_iter()
            .map(|entity| TaggedHit {
                collection,
                entity: wrap(entity),
            })
            .collect()
    };
    TaggedGroup {
        exact: to_hits(ranked.exact),
        partial: to_hits(ranked.partial),
    }
}

fn merge(groups: Vec<TaggedGroup>) -> Vec<TaggedHit> {
    let mut ordered: Vec<TaggedHit> = Vec::new();
    let mut partials: Vec<TaggedHit> = Vec::new();
    for group in groups {
        ordered.extend(group.exact);
        partials.extend(group.partial);
    }
    ordered.extend(partials);
    ordered
        .into_iter()
        .unique_by(|hit| (hit.collection, hit.id().to_string()))
        .take(FUZZY_RESULT_CAP)
        .collect()
}

impl<S> OpsCache<S> {
    /// Free-text search across vehicles, badges, operators, drivers and
    /// routes. Never fails; any input yields at most
    /// [`FUZZY_RESULT_CAP`] tagged hits.
    pub fn fuzzy_search(&self, query: &str) -> Vec<TaggedHit> {
        let groups = match classify(query) {
            QueryShape::Empty => return Vec::new(),
            QueryShape::PlateLike => {
                // Query the plate-bearing collections with the extracted
                // cluster so surrounding words don't dilute the lookup.
                let cluster = extract_plate_cluster(query)
                    .unwrap_or_else(|| normalize(query, Mode::Code));
                vec![
                    tag(
                        Collection::Vehicles,
                        self.vehicle_matches(&cluster),
                        SearchEntity::Vehicle,
                    ),
                    tag(
                        Collection::Badges,
                        self.badge_matches(&cluster),
                        SearchEntity::Badge,
                    ),
                    tag(
                        Collection::Routes,
                        self.route_matches(query),
                        SearchEntity::Route,
                    ),
                    tag(
                        Collection::Drivers,
                        self.driver_matches(query),
                        SearchEntity::Driver,
                    ),
                    tag(
                        Collection::Operators,
                        self.operator_matches(query),
                        SearchEntity::Operator,
                    ),
                ]
            }
            QueryShape::FreeText => vec![
                tag(
                    Collection::Operators,
                    self.operator_matches(query),
                    SearchEntity::Operator,
                ),
                tag(
                    Collection::Drivers,
                    self.driver_matches(query),
                    SearchEntity::Driver,
                ),
                tag(
                    Collection::Routes,
                    self.route_matches(query),
                    SearchEntity::Route,
                ),
                tag(
                    Collection::Vehicles,
                    self.vehicle_matches(query),
                    SearchEntity::Vehicle,
                ),
                tag(
                    Collection::Badges,
                    self.badge_matches(query),
                    SearchEntity::Badge,
                ),
            ],
        };
        merge(groups)
    }
}
