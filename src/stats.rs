//! Date-scoped statistics and filtered listings over the cached snapshots.
//!
//! Every operation here is a synchronous scan of one collection snapshot.
//! Date parameters are `YYYY-MM-DD` strings; an omitted or unparsable date
//! means "today" in local time. A day with no matching records yields zeros
//! or an empty list, never an error.

use chrono::{Days, Local, NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;

use crate::cache::OpsCache;
use crate::model::{Invoice, ServiceCharge, Shift, Violation};
use crate::normalize::{Mode, normalize};

/// Gate-movement counts for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Dispatch records whose station entry fell on the day.
    pub entered: usize,
    /// Dispatch records whose departure fell on the day.
    pub departed: usize,
    /// Records touching the day by either timestamp.
    pub total: usize,
}

/// Local-time `[midnight, next midnight)` of the requested day, in epoch
/// millis.
fn day_bounds(date: Option<&str>) -> (i64, i64) {
    let day = date
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive());
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    (local_midnight_millis(day), local_midnight_millis(next))
}

fn local_midnight_millis(day: NaiveDate) -> i64 {
    let naive = day.and_time(NaiveTime::MIN);
    // A DST gap can make local midnight ambiguous or nonexistent; fall back
    // to the UTC reading rather than failing the read path.
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => naive.and_utc().timestamp_millis(),
    }
}

fn on_day(ts: Option<i64>, bounds: (i64, i64)) -> bool {
    ts.is_some_and(|t| t >= bounds.0 && t < bounds.1)
}

impl<S> OpsCache<S> {
    pub fn dispatch_stats(&self, date: Option<&str>) -> DispatchStats {
        let bounds = day_bounds(date);
        let snapshot = self.dispatches.load();
        let mut stats = DispatchStats::default();
        for dispatch in &snapshot.items {
            let entered = on_day(dispatch.entered_at, bounds);
            let departed = on_day(dispatch.departed_at, bounds);
            if entered {
                stats.entered += 1;
            }
            if departed {
                stats.departed += 1;
            }
            if entered || departed {
                stats.total += 1;
            }
        }
        stats
    }

    /// Shifts starting on the given day.
    pub fn shift_info(&self, date: Option<&str>) -> Vec<Shift> {
        let bounds = day_bounds(date);
        let snapshot = self.shifts.load();
        snapshot
            .items
            .iter()
            .filter(|shift| on_day(shift.starts_at, bounds))
            .cloned()
            .collect()
    }

    /// Invoices issued on the given day; `limit` truncates the tail.
    pub fn invoices(&self, date: Option<&str>, limit: Option<usize>) -> Vec<Invoice> {
        let bounds = day_bounds(date);
        let snapshot = self.invoices.load();
        let mut out: Vec<Invoice> = snapshot
            .items
            .iter()
            .filter(|invoice| on_day(invoice.issued_at, bounds))
            .cloned()
            .collect();
        if let Some(limit) = limit {
            out.truncate(limit);
        }
        out
    }

    /// All cached violations, or those whose plate contains `plate` after
    /// code normalization.
    pub fn violations(&self, plate: Option<&str>) -> Vec<Violation> {
        let snapshot = self.violations.load();
        let needle = plate
            .map(|p| normalize(p, Mode::Code))
            .filter(|p| !p.is_empty());
        snapshot
            .items
            .iter()
            .filter(|violation| match &needle {
                None => true,
                Some(needle) => violation
                    .plate
                    .as_deref()
                    .is_some_and(|p| normalize(p, Mode::Code).contains(needle.as_str())),
            })
            .cloned()
            .collect()
    }

    /// All cached service charges, or those whose service name contains
    /// `service_name` after text normalization.
    pub fn service_charges(&self, service_name: Option<&str>) -> Vec<ServiceCharge> {
        let snapshot = self.service_charges.load();
        let needle = service_name
            .map(|s| normalize(s, Mode::Text))
            .filter(|s| !s.is_empty());
        snapshot
            .items
            .iter()
            .filter(|charge| match &needle {
                None => true,
                Some(needle) => charge
                    .service
                    .as_deref()
                    .is_some_and(|s| normalize(s, Mode::Text).contains(needle.as_str())),
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Collection;
    use crate::source::{CollectionSource, SourceError};
    use serde_json::{Value, json};

    fn millis(y: i32, mo: u32, d: u32, h: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, 0, 0)
            .single()
            .expect("fixed local time")
            .timestamp_millis()
    }

    struct DaySource;

    impl CollectionSource for DaySource {
        async fn fetch(
            &self,
            collection: Collection,
        ) -> Result<Option<Vec<Value>>, SourceError> {
            let rows = match collection {
                Collection::Dispatches => vec![
                    json!({"id": "d1", "gioVao": millis(2024, 3, 5, 6), "gioXuatBen": millis(2024, 3, 5, 7)}),
                    json!({"id": "d2", "gioVao": millis(2024, 3, 5, 9)}),
                    json!({"id": "d3", "gioVao": millis(2024, 3, 4, 23), "gioXuatBen": millis(2024, 3, 5, 1)}),
                    json!({"id": "d4", "gioVao": millis(2024, 2, 1, 8)}),
                ],
                Collection::Invoices => vec![
                    json!({"id": "i1", "ngayLap": millis(2024, 3, 5, 8), "thanhTien": 100}),
                    json!({"id": "i2", "ngayLap": millis(2024, 3, 5, 9), "thanhTien": 200}),
                    json!({"id": "i3", "ngayLap": millis(2024, 3, 6, 9), "thanhTien": 300}),
                ],
                Collection::Shifts => vec![
                    json!({"id": "s1", "nhanVien": "Lê Văn Cường", "batDau": millis(2024, 3, 5, 6)}),
                    json!({"id": "s2", "nhanVien": "Phạm Thị Dung", "batDau": millis(2024, 3, 6, 6)}),
                ],
                Collection::Violations => vec![
                    json!({"id": "p1", "bienSo": "98H-07480", "noiDung": "đón khách sai quy định"}),
                    json!({"id": "p2", "bienSo": "29B 12345", "noiDung": "quá giờ lưu bến"}),
                ],
                Collection::ServiceCharges => vec![
                    json!({"id": "c1", "tenDichVu": "Vệ sinh xe", "soTien": 50000}),
                    json!({"id": "c2", "tenDichVu": "Bến bãi qua đêm", "soTien": 120000}),
                ],
                _ => Vec::new(),
            };
            Ok(Some(rows))
        }
    }

    async fn warmed() -> OpsCache<DaySource> {
        let cache = OpsCache::new(DaySource);
        cache.pre_warm().await;
        cache
    }

    #[tokio::test]
    async fn dispatch_stats_partition_by_calendar_day() {
        let cache = warmed().await;
        let stats = cache.dispatch_stats(Some("2024-03-05"));
        assert_eq!(
            stats,
            DispatchStats {
                entered: 2,
                departed: 2,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn empty_day_yields_zeros() {
        let cache = warmed().await;
        assert_eq!(cache.dispatch_stats(Some("2020-01-01")), DispatchStats::default());
        assert!(cache.shift_info(Some("2020-01-01")).is_empty());
        assert!(cache.invoices(Some("2020-01-01"), None).is_empty());
    }

    #[tokio::test]
    async fn unparsable_date_falls_back_to_today() {
        let cache = warmed().await;
        // Fixture days are in the past, so "today" has no records either way.
        assert_eq!(
            cache.dispatch_stats(Some("not-a-date")),
            cache.dispatch_stats(None)
        );
    }

    #[tokio::test]
    async fn invoice_limit_truncates_without_erroring() {
        let cache = warmed().await;
        assert_eq!(cache.invoices(Some("2024-03-05"), Some(1)).len(), 1);
        assert_eq!(cache.invoices(Some("2024-03-05"), Some(99)).len(), 2);
        assert_eq!(cache.invoices(Some("2024-03-05"), None).len(), 2);
    }

    #[tokio::test]
    async fn shift_info_selects_the_day() {
        let cache = warmed().await;
        let shifts = cache.shift_info(Some("2024-03-05"));
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].staff.as_deref(), Some("Lê Văn Cường"));
    }

    #[tokio::test]
    async fn violations_filter_is_plate_format_insensitive() {
        let cache = warmed().await;
        assert_eq!(cache.violations(None).len(), 2);
        let filtered = cache.violations(Some("98h 07480"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "p1");
        // Partial plate narrows too.
        assert_eq!(cache.violations(Some("07480")).len(), 1);
        assert!(cache.violations(Some("51F")).is_empty());
    }

    #[tokio::test]
    async fn service_charge_filter_is_diacritic_insensitive() {
        let cache = warmed().await;
        assert_eq!(cache.service_charges(None).len(), 2);
        let filtered = cache.service_charges(Some("ve sinh"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "c1");
        // Blank filter behaves like no filter.
        assert_eq!(cache.service_charges(Some("  ")).len(), 2);
    }
}
