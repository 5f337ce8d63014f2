//! Raw-row ingestion: legacy/canonical key mapping into typed records.
//!
//! The hosted database grew under two generations of schema, so a plate can
//! arrive as `plate`, `bienSo` or `bien_so`, and timestamps as epoch seconds,
//! epoch milliseconds or ISO-8601 strings. Each collection has one mapping
//! table below; a row missing a field keeps the record alive with the field
//! empty, it never fails ingestion.

use serde_json::Value;

use crate::model::types::{
    Badge, Collection, Dispatch, Driver, Invoice, Operator, Route, Schedule, Service,
    ServiceCharge, Shift, Vehicle, Violation,
};

const ID_KEYS: &[&str] = &["id", "_id", "ma", "maSo", "ma_so"];

const PLATE_KEYS: &[&str] = &["plate", "licensePlate", "bienSo", "bien_so", "bienKiemSoat"];
const SEAT_KEYS: &[&str] = &["seats", "seatCount", "soGhe", "so_ghe"];
const STATUS_KEYS: &[&str] = &["status", "trangThai", "trang_thai"];

const PERSON_NAME_KEYS: &[&str] = &["name", "fullName", "hoTen", "ho_ten", "tenLaiXe"];
const LICENSE_KEYS: &[&str] = &["license", "licenseNo", "soGiayPhep", "hangBang"];
const PHONE_KEYS: &[&str] = &["phone", "soDienThoai", "so_dien_thoai", "sdt"];

const OPERATOR_NAME_KEYS: &[&str] = &["name", "operatorName", "tenDonVi", "ten_don_vi", "donVi"];
const OPERATOR_CODE_KEYS: &[&str] = &["code", "maDonVi", "ma_don_vi"];
const ADDRESS_KEYS: &[&str] = &["address", "diaChi", "dia_chi"];
const OPERATOR_REF_KEYS: &[&str] = &["operator", "operatorName", "tenDonVi", "donVi"];

const ROUTE_CODE_KEYS: &[&str] = &["code", "routeCode", "maTuyen", "ma_tuyen"];
const ORIGIN_KEYS: &[&str] = &["origin", "departureStation", "benDi", "ben_di"];
const DESTINATION_KEYS: &[&str] = &["destination", "arrivalStation", "benDen", "ben_den"];
const DISTANCE_KEYS: &[&str] = &["distanceKm", "cuLyKm", "cuLy", "cu_ly"];

const BADGE_NUMBER_KEYS: &[&str] = &["number", "badgeNo", "soPhuHieu", "so_phu_hieu"];
const ISSUED_KEYS: &[&str] = &["issuedAt", "ngayCap", "ngay_cap"];
const EXPIRES_KEYS: &[&str] = &["expiresAt", "ngayHetHan", "ngay_het_han"];

const ENTERED_KEYS: &[&str] = &["enteredAt", "gioVao", "gio_vao", "thoiGianVao"];
const DEPARTED_KEYS: &[&str] = &["departedAt", "gioXuatBen", "gio_xuat_ben", "thoiGianXuatBen"];

const DEPARTS_KEYS: &[&str] = &["departs", "departureTime", "gioKhoiHanh", "gioXuatBen"];

const SERVICE_NAME_KEYS: &[&str] = &["name", "serviceName", "tenDichVu", "ten_dich_vu"];
const AMOUNT_KEYS: &[&str] = &["amount", "price", "soTien", "thanhTien", "gia"];

const STAFF_KEYS: &[&str] = &["staff", "staffName", "nhanVien", "tenNhanVien"];
const ROLE_KEYS: &[&str] = &["role", "chucVu", "chuc_vu"];
const SHIFT_START_KEYS: &[&str] = &["startsAt", "batDau", "thoiGianBatDau", "ngayTruc"];
const SHIFT_END_KEYS: &[&str] = &["endsAt", "ketThuc", "thoiGianKetThuc"];

const INVOICE_NUMBER_KEYS: &[&str] = &["number", "invoiceNo", "soHoaDon", "so_hoa_don"];
const CUSTOMER_KEYS: &[&str] = &["customer", "khachHang", "tenKhachHang"];
const INVOICE_ISSUED_KEYS: &[&str] = &["issuedAt", "ngayLap", "ngay_lap"];

const VIOLATION_DETAIL_KEYS: &[&str] = &["detail", "description", "noiDung", "noi_dung", "loi"];
const OCCURRED_KEYS: &[&str] = &["occurredAt", "thoiGian", "thoi_gian", "ngayViPham"];

const CHARGE_SERVICE_KEYS: &[&str] = &["service", "serviceName", "tenDichVu", "ten_dich_vu"];
const CHARGED_KEYS: &[&str] = &["chargedAt", "ngayThu", "ngay_thu", "thoiGian"];

/// First non-empty string under any of `keys`. Bare numbers are accepted and
/// stringified since legacy rows store codes both ways.
fn str_at(raw: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match raw.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn f64_at(raw: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        match raw.get(key) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

fn u32_at(raw: &Value, keys: &[&str]) -> Option<u32> {
    f64_at(raw, keys).and_then(|v| {
        if v.is_finite() && v >= 0.0 {
            Some(v as u32)
        } else {
            None
        }
    })
}

fn ts_at(raw: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| raw.get(key))
        .find_map(parse_timestamp)
}

/// Parse a timestamp from i64 epoch values, numeric strings, or ISO-8601
/// strings, into epoch milliseconds.
///
/// Values below `100_000_000_000` are taken as seconds (that bound is year
/// 5138 in seconds but only 1973 in millis), everything else as millis.
pub fn parse_timestamp(val: &Value) -> Option<i64> {
    const MILLIS_CUTOVER: i64 = 100_000_000_000;

    let scale = |ts: i64| {
        if (0..MILLIS_CUTOVER).contains(&ts) {
            ts.saturating_mul(1000)
        } else {
            ts
        }
    };

    if let Some(ts) = val.as_i64() {
        return Some(scale(ts));
    }
    if let Some(s) = val.as_str() {
        let s = s.trim();
        if let Ok(num) = s.parse::<i64>() {
            return Some(scale(num));
        }
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
            return Some(dt.timestamp_millis());
        }
        // Legacy backend format without zone, taken as UTC.
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(dt.and_utc().timestamp_millis());
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Stable id for a row; falls back to `<collection>-<ordinal>` when the row
/// carries none, so dedup and hit mapping stay total.
fn id_at(raw: &Value, collection: Collection, ordinal: usize) -> String {
    str_at(raw, ID_KEYS).unwrap_or_else(|| format!("{}-{ordinal}", collection.name()))
}

pub fn vehicle_from_raw(raw: &Value, ordinal: usize) -> Vehicle {
    Vehicle {
        id: id_at(raw, Collection::Vehicles, ordinal),
        plate: str_at(raw, PLATE_KEYS).unwrap_or_default(),
        operator: str_at(raw, OPERATOR_REF_KEYS),
        seats: u32_at(raw, SEAT_KEYS),
        status: str_at(raw, STATUS_KEYS),
    }
}

pub fn driver_from_raw(raw: &Value, ordinal: usize) -> Driver {
    Driver {
        id: id_at(raw, Collection::Drivers, ordinal),
        name: str_at(raw, PERSON_NAME_KEYS).unwrap_or_default(),
        license: str_at(raw, LICENSE_KEYS),
        operator: str_at(raw, OPERATOR_REF_KEYS),
        phone: str_at(raw, PHONE_KEYS),
    }
}

pub fn operator_from_raw(raw: &Value, ordinal: usize) -> Operator {
    Operator {
        id: id_at(raw, Collection::Operators, ordinal),
        name: str_at(raw, OPERATOR_NAME_KEYS).unwrap_or_default(),
        code: str_at(raw, OPERATOR_CODE_KEYS),
        phone: str_at(raw, PHONE_KEYS),
        address: str_at(raw, ADDRESS_KEYS),
    }
}

pub fn route_from_raw(raw: &Value, ordinal: usize) -> Route {
    Route {
        id: id_at(raw, Collection::Routes, ordinal),
        code: str_at(raw, ROUTE_CODE_KEYS).unwrap_or_default(),
        origin: str_at(raw, ORIGIN_KEYS),
        destination: str_at(raw, DESTINATION_KEYS),
        distance_km: f64_at(raw, DISTANCE_KEYS),
    }
}

pub fn badge_from_raw(raw: &Value, ordinal: usize) -> Badge {
    Badge {
        id: id_at(raw, Collection::Badges, ordinal),
        number: str_at(raw, BADGE_NUMBER_KEYS).unwrap_or_default(),
        plate: str_at(raw, PLATE_KEYS),
        issued_at: ts_at(raw, ISSUED_KEYS),
        expires_at: ts_at(raw, EXPIRES_KEYS),
    }
}

pub fn dispatch_from_raw(raw: &Value, ordinal: usize) -> Dispatch {
    Dispatch {
        id: id_at(raw, Collection::Dispatches, ordinal),
        plate: str_at(raw, PLATE_KEYS),
        route_code: str_at(raw, ROUTE_CODE_KEYS),
        entered_at: ts_at(raw, ENTERED_KEYS),
        departed_at: ts_at(raw, DEPARTED_KEYS),
    }
}

pub fn schedule_from_raw(raw: &Value, ordinal: usize) -> Schedule {
    Schedule {
        id: id_at(raw, Collection::Schedules, ordinal),
        route_code: str_at(raw, ROUTE_CODE_KEYS),
        plate: str_at(raw, PLATE_KEYS),
        departs: str_at(raw, DEPARTS_KEYS),
    }
}

pub fn service_from_raw(raw: &Value, ordinal: usize) -> Service {
    Service {
        id: id_at(raw, Collection::Services, ordinal),
        name: str_at(raw, SERVICE_NAME_KEYS).unwrap_or_default(),
        price: f64_at(raw, AMOUNT_KEYS),
    }
}

pub fn shift_from_raw(raw: &Value, ordinal: usize) -> Shift {
    Shift {
        id: id_at(raw, Collection::Shifts, ordinal),
        staff: str_at(raw, STAFF_KEYS),
        role: str_at(raw, ROLE_KEYS),
        starts_at: ts_at(raw, SHIFT_START_KEYS),
        ends_at: ts_at(raw, SHIFT_END_KEYS),
    }
}

pub fn invoice_from_raw(raw: &Value, ordinal: usize) -> Invoice {
    Invoice {
        id: id_at(raw, Collection::Invoices, ordinal),
        number: str_at(raw, INVOICE_NUMBER_KEYS),
        customer: str_at(raw, CUSTOMER_KEYS),
        amount: f64_at(raw, AMOUNT_KEYS),
        issued_at: ts_at(raw, INVOICE_ISSUED_KEYS),
    }
}

pub fn violation_from_raw(raw: &Value, ordinal: usize) -> Violation {
    Violation {
        id: id_at(raw, Collection::Violations, ordinal),
        plate: str_at(raw, PLATE_KEYS),
        detail: str_at(raw, VIOLATION_DETAIL_KEYS),
        occurred_at: ts_at(raw, OCCURRED_KEYS),
    }
}

pub fn service_charge_from_raw(raw: &Value, ordinal: usize) -> ServiceCharge {
    ServiceCharge {
        id: id_at(raw, Collection::ServiceCharges, ordinal),
        service: str_at(raw, CHARGE_SERVICE_KEYS),
        plate: str_at(raw, PLATE_KEYS),
        amount: f64_at(raw, AMOUNT_KEYS),
        charged_at: ts_at(raw, CHARGED_KEYS),
    }
}
