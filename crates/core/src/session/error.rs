#![forbid(unsafe_code)]

use crate::apply::MutationFailure;
use crate::path::LabelPathError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditError {
    InvalidPath(LabelPathError),
    ApplyInProgress,
    NotApplying,
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(err) => write!(f, "invalid label path: {err}"),
            Self::ApplyInProgress => write!(f, "labels are being applied"),
            Self::NotApplying => write!(f, "no apply in progress"),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LabelPathError> for EditError {
    fn from(value: LabelPathError) -> Self {
        Self::InvalidPath(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateLabelError {
    InvalidPath(LabelPathError),
    ApplyInProgress,
    Mutation(MutationFailure),
}

impl std::fmt::Display for CreateLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(err) => write!(f, "invalid label path: {err}"),
            Self::ApplyInProgress => write!(f, "labels are being applied"),
            Self::Mutation(failure) => write!(f, "{failure}"),
        }
    }
}

impl std::error::Error for CreateLabelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            Self::Mutation(failure) => Some(failure),
            Self::ApplyInProgress => None,
        }
    }
}

impl From<LabelPathError> for CreateLabelError {
    fn from(value: LabelPathError) -> Self {
        Self::InvalidPath(value)
    }
}
