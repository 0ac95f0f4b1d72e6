use super::basic;
use crate::core::model::{ReadTable, TableError};

// None for an empty or constant column: nothing is an outlier
pub fn outlier_cutoff(values: &[f64]) -> Option<f64> {
    let median = basic::median(values)?;
    let sd = basic::std_dev(values)?;
    if sd == 0.0 {
        return None;
    }
    Some(median + 3.0 * sd)
}

pub fn is_outlier(value: f64, cutoff: Option<f64>) -> bool {
    match cutoff {
        Some(limit) => value >= limit || value.is_nan(),
        None => false,
    }
}

// one-sided: unusually small values are kept
pub fn remove_outliers(table: &ReadTable, column: &str) -> Result<ReadTable, TableError> {
    let values = table.numeric_column(column)?;
    let cutoff = outlier_cutoff(&values);
    Ok(table.filter_rows(|i| !is_outlier(values[i], cutoff)))
}
