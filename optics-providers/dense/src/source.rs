//! In-memory dense data source built from owned rows.
use optics_core::{DataSource, DataSourceError, Metric};

/// In-memory dense vector data source.
#[derive(Clone, Debug)]
pub struct DenseSource {
    data: Vec<Vec<f64>>,
    name: String,
    metric: Metric,
}

impl DenseSource {
    #[cfg(test)]
    pub(crate) fn from_parts(name: impl Into<String>, data: Vec<Vec<f64>>) -> Self {
        Self {
            data,
            name: name.into(),
            metric: Metric::default(),
        }
    }

    /// Creates a dense source after validating uniform dimensions.
    ///
    /// # Errors
    /// Returns `DataSourceError::EmptyData` if `data` is empty,
    /// `DataSourceError::ZeroDimension` if rows are empty, and
    /// `DataSourceError::DimensionMismatch` if row lengths differ.
    ///
    /// # Examples
    /// ```
    /// use optics_core::{DataSource, DataSourceError};
    /// use optics_providers_dense::DenseSource;
    ///
    /// let ds = DenseSource::try_new("demo", vec![vec![0.0, 0.0], vec![3.0, 4.0]])?;
    /// assert_eq!(ds.len(), 2);
    /// assert_eq!(ds.distance(0, 1)?, 5.0);
    ///
    /// let err = DenseSource::try_new("demo", vec![vec![0.0], vec![1.0, 2.0]]);
    /// assert!(matches!(err, Err(DataSourceError::DimensionMismatch { .. })));
    /// # Ok::<(), DataSourceError>(())
    /// ```
    pub fn try_new(name: impl Into<String>, data: Vec<Vec<f64>>) -> Result<Self, DataSourceError> {
        let Some((first, rest)) = data.split_first() else {
            return Err(DataSourceError::EmptyData);
        };
        let dim = first.len();
        if dim == 0 {
            return Err(DataSourceError::ZeroDimension);
        }
        if let Some(row) = rest.iter().find(|row| row.len() != dim) {
            return Err(DataSourceError::DimensionMismatch {
                left: dim,
                right: row.len(),
            });
        }
        Ok(Self {
            data,
            name: name.into(),
            metric: Metric::default(),
        })
    }

    /// Replaces the metric used to compare rows.
    #[must_use]
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Returns the stored rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.data
    }
}

impl DataSource for DenseSource {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f64, DataSourceError> {
        let a = self
            .data
            .get(i)
            .ok_or(DataSourceError::OutOfBounds { index: i })?;
        let b = self
            .data
            .get(j)
            .ok_or(DataSourceError::OutOfBounds { index: j })?;
        if a.len() != b.len() {
            return Err(DataSourceError::DimensionMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        self.metric
            .distance(a, b)
            .map_err(|source| DataSourceError::Metric {
                left: i,
                right: j,
                source,
            })
    }
}
