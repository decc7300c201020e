pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("segment {segment_id} has invalid proportion {proportion}; expected a value in [0, 1]")]
    InvalidSegment { segment_id: String, proportion: f64 },

    #[error("segment proportions at level {level} sum to {total}, which exceeds the bar")]
    ProportionOverflow { level: usize, total: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
