#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BimapError {
    #[error("bimap has no such element")]
    KeyNotFound,
    #[error("left value is already present in the bimap")]
    DuplicateLeft,
    #[error("right value is already present in the bimap")]
    DuplicateRight,
    #[error("{side} tree is corrupted: {reason}")]
    Corrupted { side: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, BimapError>;
