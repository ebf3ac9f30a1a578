use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GranuliteError {
    #[error("NaN encountered: {0}")]
    NanValue(#[from] ordered_float::FloatIsNan),

    #[error("Invalid range bounds: [{0}, {1}]")]
    InvalidRangeBounds(f64, f64),

    #[error("Invalid matching threshold (degrees): {0}")]
    InvalidThreshold(f64),

    #[error("Empty entity name")]
    EmptyEntityName,
}
