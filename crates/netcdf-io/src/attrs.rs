//! HDF5 diagnostics control and attribute helpers.

use std::sync::Once;

/// Fill value written for missing samples (CF default for `f32`).
pub const FILL_VALUE_F32: f32 = 9.96921e36;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints a diagnostic stack every time an optional
/// attribute lookup misses, even though the Rust side handles the error.
/// Call this once before any NetCDF operation; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

pub(crate) fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

/// String attribute, trimmed. Empty strings count as absent.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

/// Sentinel values that mark missing samples (`_FillValue`, `missing_value`).
pub(crate) fn missing_sentinels(var: &netcdf::Variable) -> Vec<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| get_f64_attr(var, name))
        .collect()
}
