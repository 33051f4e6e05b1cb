//! Write-then-read checks against real files in a temp directory.

use chrono::{TimeZone, Utc};
use netcdf_io::{Dataset, FieldWriter};
use precip_common::{Field, GridCoords, PrecipError, TimeAxis, VariableRole};
use test_utils::{assert_approx_eq, index_grid, linspace_axis};

#[test]
fn test_field_coords_and_time_survive_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remap.nc");

    let coords = GridCoords::rectilinear(linspace_axis(-5.0, 1.0, 3), linspace_axis(300.0, 0.5, 4))
        .unwrap();
    let axis = TimeAxis::new(vec![
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
    ]);
    let mut data = index_grid(3, 4);
    data.extend(index_grid(3, 4));
    data[5] = f32::NAN;
    let field = Field::new("precipitation_rate", data.clone(), vec![2, 3, 4])
        .unwrap()
        .with_units("mm/h")
        .with_long_name("remapped rate");

    let mut writer = FieldWriter::create(&path).unwrap();
    writer.write_coords(&coords).unwrap();
    writer.write_time(&axis).unwrap();
    writer
        .write_field(&field, &[("regridding", "bilinear")])
        .unwrap();
    writer.finish().unwrap();

    let ds = Dataset::open(&path).unwrap();
    let back = ds.read_field(VariableRole::RemappedPrecipitation).unwrap();
    assert_eq!(back.dims(), &[2, 3, 4]);
    assert_eq!(back.units.as_deref(), Some("mm/h"));
    assert_eq!(back.long_name.as_deref(), Some("remapped rate"));
    assert!(back.data[5].is_nan());
    assert_eq!(back.data[6], data[6]);

    assert_eq!(ds.read_coords().unwrap(), coords);
    let back_axis = ds.read_time_axis().unwrap();
    assert_eq!(back_axis, axis);
    assert_approx_eq!(back_axis.interval_hours()[0], 3.0, 1e-9);
}

#[test]
fn test_imerg_lon_lat_layout_is_transposed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("imerg.nc4");

    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("time", 1).unwrap();
        file.add_dimension("lon", 3).unwrap();
        file.add_dimension("lat", 2).unwrap();
        let mut var = file
            .add_variable::<f32>("precipitation", &["time", "lon", "lat"])
            .unwrap();
        var.put_attribute("units", "mm/hr").unwrap();
        var.put_attribute("_FillValue", -9999.9f32).unwrap();
        // lon-major: value = lon * 10 + lat
        let values = [0.0f32, 1.0, 10.0, -9999.9, 20.0, 21.0];
        var.put_values(&values, ..).unwrap();
    }

    let ds = Dataset::open(&path).unwrap();
    let field = ds.read_field(VariableRole::Precipitation).unwrap();
    assert_eq!(field.dims(), &[1, 2, 3]);
    assert_eq!(field.units.as_deref(), Some("mm/hr"));
    // row = lat, col = lon
    assert_eq!(field.data[0], 0.0);
    assert_eq!(field.data[1], 10.0);
    assert_eq!(field.data[2], 20.0);
    assert_eq!(field.data[3], 1.0);
    assert!(field.data[4].is_nan());
    assert_eq!(field.data[5], 21.0);
}

#[test]
fn test_missing_role_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.nc");
    let field = Field::new_2d("something_else", vec![1.0; 4], 2, 2).unwrap();
    let mut writer = FieldWriter::create(&path).unwrap();
    writer.write_field(&field, &[]).unwrap();
    writer.finish().unwrap();

    let ds = Dataset::open(&path).unwrap();
    let err = ds.read_field(VariableRole::ConvectiveAccumulation).unwrap_err();
    assert!(matches!(err, PrecipError::MissingVariable(_)));
    assert!(ds.read_time_axis().is_err());
}

#[test]
fn test_open_nonexistent_file_fails() {
    let err = Dataset::open("/nonexistent/path/file.nc").err().unwrap();
    assert_eq!(err.error_code(), "NetCdfError");
}

fn write_time_only(path: &std::path::Path, values: &[f64]) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("time", values.len()).unwrap();
    let mut var = file.add_variable::<f64>("time", &["time"]).unwrap();
    var.put_attribute("units", "hours since 2024-01-01 00:00:00")
        .unwrap();
    var.put_attribute("_FillValue", 9.96921e36f64).unwrap();
    var.put_values(values, ..).unwrap();
}

#[test]
fn test_time_fill_value_is_invalid_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filled_time.nc");
    write_time_only(&path, &[0.0, 3.0, 9.96921e36]);

    let err = Dataset::open(&path).unwrap().read_time_axis().unwrap_err();
    assert!(matches!(err, PrecipError::InvalidTime(_)), "{:?}", err);
    assert_eq!(err.error_code(), "InvalidTimeError");
}

#[test]
fn test_time_offset_overflow_is_invalid_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge_time.nc");
    write_time_only(&path, &[0.0, 1.0e15]);

    let err = Dataset::open(&path).unwrap().read_time_axis().unwrap_err();
    assert!(matches!(err, PrecipError::InvalidTime(_)), "{:?}", err);
}
