//! Edge trimming ahead of spectral analysis.

use precip_common::{Field, PrecipError, PrecipResult};

/// Remove `n` cells from every edge of each 2D slice.
///
/// `n == 0` returns an equal copy. Fails with `InvalidTrim` when `2n` reaches
/// either spatial dimension.
pub fn trim_edges(field: &Field, n: usize) -> PrecipResult<Field> {
    let (rows, cols) = field.spatial_dims()?;
    if !(2..=3).contains(&field.rank()) {
        return Err(PrecipError::dimension(format!(
            "trim expects a 2D or 3D field, got shape {:?}",
            field.dims()
        )));
    }
    if n == 0 {
        return Ok(field.clone());
    }
    if 2 * n >= rows || 2 * n >= cols {
        return Err(PrecipError::InvalidTrim {
            width: n,
            rows,
            cols,
        });
    }

    let out_rows = rows - 2 * n;
    let out_cols = cols - 2 * n;
    let mut data = Vec::with_capacity(field.len() / (rows * cols) * out_rows * out_cols);
    for slice in field.slices()? {
        for row in n..rows - n {
            let start = row * cols + n;
            data.extend_from_slice(&slice[start..start + out_cols]);
        }
    }

    let mut dims = field.dims().to_vec();
    let rank = dims.len();
    dims[rank - 2] = out_rows;
    dims[rank - 1] = out_cols;
    Ok(field.derive(data, dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::index_grid;

    #[test]
    fn test_trim_zero_is_identity() {
        let field = Field::new_2d("p", index_grid(4, 5), 4, 5).unwrap();
        assert_eq!(trim_edges(&field, 0).unwrap(), field);
    }

    #[test]
    fn test_trim_shape_and_content() {
        let field = Field::new_2d("p", index_grid(6, 7), 6, 7).unwrap();
        let trimmed = trim_edges(&field, 2).unwrap();
        assert_eq!(trimmed.dims(), &[2, 3]);
        assert_eq!(trimmed.data, vec![2002.0, 2003.0, 2004.0, 3002.0, 3003.0, 3004.0]);
    }

    #[test]
    fn test_trim_3d_per_slice() {
        let mut data = index_grid(4, 4);
        data.extend(index_grid(4, 4).iter().map(|v| v + 0.5));
        let field = Field::new("p", data, vec![2, 4, 4]).unwrap();
        let trimmed = trim_edges(&field, 1).unwrap();
        assert_eq!(trimmed.dims(), &[2, 2, 2]);
        assert_eq!(trimmed.data[0], 1001.0);
        assert_eq!(trimmed.data[4], 1001.5);
    }

    #[test]
    fn test_trim_too_wide_fails() {
        let field = Field::new_2d("p", vec![0.0; 8 * 10], 8, 10).unwrap();
        let err = trim_edges(&field, 4).unwrap_err();
        assert!(matches!(
            err,
            PrecipError::InvalidTrim {
                width: 4,
                rows: 8,
                cols: 10
            }
        ));
        assert!(trim_edges(&field, 3).is_ok());
    }
}
