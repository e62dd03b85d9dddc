//! Error types for TUIO core

use thiserror::Error;

/// Result type alias for TUIO core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which structural invariant a topology-carrying message enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Out-star around a single center node
    Star,
    /// Single simple directed chain
    Chain,
    /// Origin leaf, trunk path, then an out-tree
    TrunkTree,
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topology::Star => f.write_str("star"),
            Topology::Chain => f.write_str("chain"),
            Topology::TrunkTree => f.write_str("trunk tree"),
        }
    }
}

/// TUIO core error types
#[derive(Error, Debug)]
pub enum Error {
    /// Graph assigned to an association or skeleton failed its invariant
    #[error("topology error: graph is not a valid {0}")]
    Topology(Topology),

    /// Bundle stack index past the end
    #[error("index {index} out of range for stack of {len} bundles")]
    OutOfRange { index: usize, len: usize },

    /// Raw wire data could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Wire encoding failed
    #[error("encode error: {0}")]
    Encode(String),

    /// Polygon rejected by a geometric test
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Bundle framing violated (frame first, alive last)
    #[error("malformed bundle: {0}")]
    Malformed(String),
}

impl From<rosc::OscError> for Error {
    fn from(e: rosc::OscError) -> Self {
        Error::Encode(format!("{:?}", e))
    }
}

impl Error {
    /// True for the distinct topology error kind
    pub fn is_topology(&self) -> bool {
        matches!(self, Error::Topology(_))
    }
}
