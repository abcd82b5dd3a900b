use optics_core::{DataSource, DataSourceError, Metric};

/// Dense rows compared with a configurable metric.
#[derive(Clone, Debug)]
pub struct Points {
    rows: Vec<Vec<f64>>,
    metric: Metric,
}

impl Points {
    #[must_use]
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self {
            rows,
            metric: Metric::Euclidean,
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

impl DataSource for Points {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn name(&self) -> &str {
        "points"
    }

    fn distance(&self, left: usize, right: usize) -> Result<f64, DataSourceError> {
        let a = self
            .rows
            .get(left)
            .ok_or(DataSourceError::OutOfBounds { index: left })?;
        let b = self
            .rows
            .get(right)
            .ok_or(DataSourceError::OutOfBounds { index: right })?;
        self.metric
            .distance(a, b)
            .map_err(|source| DataSourceError::Metric {
                left,
                right,
                source,
            })
    }
}
