#![forbid(unsafe_code)]

use lt_core::{GroupId, LabelPathError, ResourceId};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    InvalidLabel(LabelPathError),
    UnknownResource(ResourceId),
    UnknownLabel(String),
    LabelAlreadyExists(String),
    NotGroupMember { group: GroupId, actor: String },
}

impl StoreError {
    /// Stable machine-readable code, used in tool error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "STORE_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidLabel(_) => "INVALID_LABEL_PATH",
            Self::UnknownResource(_) => "UNKNOWN_RESOURCE",
            Self::UnknownLabel(_) => "UNKNOWN_LABEL",
            Self::LabelAlreadyExists(_) => "LABEL_EXISTS",
            Self::NotGroupMember { .. } => "NOT_GROUP_MEMBER",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidLabel(err) => write!(f, "invalid label path: {err}"),
            Self::UnknownResource(id) => write!(f, "unknown resource: {id}"),
            Self::UnknownLabel(label) => write!(f, "unknown label: {label}"),
            Self::LabelAlreadyExists(label) => write!(f, "label already exists: {label}"),
            Self::NotGroupMember { group, actor } => {
                write!(f, "{actor} is not a member of group {group}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<LabelPathError> for StoreError {
    fn from(value: LabelPathError) -> Self {
        Self::InvalidLabel(value)
    }
}
