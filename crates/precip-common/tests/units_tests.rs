//! Unit conversion properties exercised through the public API.

use precip_common::{MissingUnitPolicy, PrecipUnit, RateUnit};
use test_utils::assert_approx_eq;

#[test]
fn test_mm_per_day_to_mm_per_hour_divides_by_24_exactly() {
    let unit = PrecipUnit::from_attribute(Some("mm/day"), MissingUnitPolicy::Reject).unwrap();
    for v in [0.0f32, 1.0, 2.4, 24.0, 123.456, 1.0e-6] {
        assert_eq!(RateUnit::MmPerHour.convert(unit, v), v / 24.0);
    }
}

#[test]
fn test_kg_flux_converts_to_3600_mm_per_hour() {
    let unit = PrecipUnit::from_attribute(Some("kg m-2 s-1"), MissingUnitPolicy::Reject).unwrap();
    assert_eq!(RateUnit::MmPerHour.convert(unit, 1.0), 3600.0);
    assert_eq!(RateUnit::MmPerDay.convert(unit, 1.0), 86400.0);
}

#[test]
fn test_hourly_daily_round_trip() {
    for v in [0.1f32, 0.75, 3.3, 17.0] {
        let daily = RateUnit::MmPerDay.convert(PrecipUnit::MmPerHour, v);
        let hourly = RateUnit::MmPerHour.convert(PrecipUnit::MmPerDay, daily);
        assert_approx_eq!(hourly, v, 1e-6);
    }
}

#[test]
fn test_imerg_spelling_is_recognized() {
    assert_eq!(PrecipUnit::parse("mm/hr"), Some(PrecipUnit::MmPerHour));
    assert_eq!(
        PrecipUnit::parse("kg m^-2 s^-1"),
        Some(PrecipUnit::KgPerM2PerS)
    );
}
