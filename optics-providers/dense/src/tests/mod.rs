pub(crate) use super::{DenseMatrixProvider, DenseMatrixProviderError, DenseSource};

mod support;
