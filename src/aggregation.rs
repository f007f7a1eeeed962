//! Reduces decoded series to one summary point per entity.

use crate::cloudera::SeriesSamples;

/// Mean value of one series, attributed to its host and cluster
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub value: f64,
    pub hostname: String,
    pub cluster_name: String,
}

/// Unweighted arithmetic mean; `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// One point per non-empty series, in input order.
///
/// Empty series are dropped rather than zero-filled. NaN and infinite samples
/// are not filtered and propagate into the mean.
pub fn aggregate(series: &[SeriesSamples]) -> Vec<Point> {
    series
        .iter()
        .filter_map(|s| {
            mean(&s.values).map(|value| Point {
                value,
                hostname: s.metadata.attributes.hostname.clone(),
                cluster_name: s.metadata.attributes.cluster_name.clone(),
            })
        })
        .collect()
}
