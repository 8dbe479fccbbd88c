use cfsim_protocol::UnknownOperation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse, serializable classification of a [`CfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Error)]
pub enum CfError {
    #[error("Line {line}: {message} ('{text}')")]
    Parse {
        line: usize,
        text: String,
        message: String,
    },
    #[error("'{name}' is not a nucleotide sequence: invalid letter '{letter}' at position {position}")]
    UnrecognizedSequence {
        name: String,
        letter: char,
        position: usize,
    },
    #[error("Step '{step}' references '{name}', which is neither an earlier product nor a declared sequence")]
    UnresolvedReference { step: String, name: String },
    #[error("'{name}': {message}")]
    InvalidInput { name: String, message: String },
    #[error("The 3' end of {direction} oligo '{oligo}' does not anneal to template '{template}'")]
    AnnealMismatch {
        direction: String,
        oligo: String,
        template: String,
    },
    #[error("Unknown restriction enzyme '{name}'")]
    UnknownEnzyme { name: String },
    #[error("{enzyme} sites in '{fragment}': {message}")]
    EnzymeSite {
        fragment: String,
        enzyme: String,
        message: String,
    },
    #[error("Sticky end {sticky_end} of '{fragment}': {message}")]
    StickyEnd {
        fragment: String,
        sticky_end: String,
        message: String,
    },
    #[error("Sticky end {sticky_end} fits more than one junction (fragments {})", .fragments.join(", "))]
    AmbiguousAssembly {
        sticky_end: String,
        fragments: Vec<String>,
    },
    #[error("'{left}' ends in {left_end} but '{right}' starts with {right_end}")]
    StickyEndMismatch {
        left: String,
        right: String,
        left_end: String,
        right_end: String,
    },
    #[error("Homology assembly did not converge in round {round}: {candidates} merge candidates from {} fragment(s) ({})", .fragments.len(), .fragments.join(", "))]
    NonConvergence {
        round: usize,
        candidates: usize,
        fragments: Vec<String>,
    },
    #[error("Assembly product '{product}' is linear but a circular product is required")]
    Circularity { product: String },
    #[error("Digest of '{dna}' produced {count} fragment(s); fragment index {index} is out of range")]
    FragmentIndex {
        dna: String,
        index: usize,
        count: usize,
    },
    #[error("Unsupported operation '{operation}'")]
    UnsupportedOperation { operation: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl CfError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. }
            | Self::UnrecognizedSequence { .. }
            | Self::InvalidInput { .. }
            | Self::AnnealMismatch { .. }
            | Self::EnzymeSite { .. }
            | Self::StickyEnd { .. }
            | Self::AmbiguousAssembly { .. }
            | Self::StickyEndMismatch { .. }
            | Self::NonConvergence { .. }
            | Self::Circularity { .. }
            | Self::FragmentIndex { .. }
            | Self::Json(_)
            | Self::Csv(_) => ErrorCode::InvalidInput,
            Self::UnresolvedReference { .. } | Self::UnknownEnzyme { .. } => ErrorCode::NotFound,
            Self::UnsupportedOperation { .. } => ErrorCode::Unsupported,
            Self::Io(_) => ErrorCode::Io,
        }
    }
}

impl From<UnknownOperation> for CfError {
    fn from(err: UnknownOperation) -> Self {
        CfError::UnsupportedOperation { operation: err.0 }
    }
}
