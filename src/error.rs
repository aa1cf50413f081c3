use thiserror::Error;

/// Top-level error type for the promesh compression kernel.
#[derive(Debug, Error)]
pub enum PromeshError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Conquest(#[from] ConquestError),
}

/// Errors related to mesh connectivity queries and mutations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("vertex not found in the active topology")]
    VertexNotFound,

    #[error("vertex star does not close into a simple fan")]
    OpenStar,
}

/// Errors related to the conquest traversal.
#[derive(Debug, Error)]
pub enum ConquestError {
    #[error("no seed gate found in the mesh")]
    NoSeedGate,

    #[error("gate edge vertices carry no retriangulation tags")]
    UntaggedGate,

    #[error("patch valence {0} is outside the retriangulation table range [3, 6]")]
    ValenceOutOfRange(u8),
}

/// Convenience type alias for results using [`PromeshError`].
pub type Result<T> = std::result::Result<T, PromeshError>;
