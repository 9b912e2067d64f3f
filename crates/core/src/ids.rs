#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ResourceIdError> {
        let value = value.into();
        validate_resource_id(&value)?;
        Ok(Self(value))
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl ResourceIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "resource id must not be empty",
            Self::TooLong => "resource id is too long",
            Self::ContainsControl => "resource id contains control characters",
        }
    }
}

impl std::fmt::Display for ResourceIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ResourceIdError {}

fn validate_resource_id(value: &str) -> Result<(), ResourceIdError> {
    if value.trim().is_empty() {
        return Err(ResourceIdError::Empty);
    }
    if value.len() > 256 {
        return Err(ResourceIdError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(ResourceIdError::ContainsControl);
    }
    Ok(())
}

/// Identifier of a group namespace. Any printable text is allowed; the path codec escapes it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, GroupIdError> {
        let value = value.into();
        validate_group_id(&value)?;
        Ok(Self(value))
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupIdError {
    Empty,
    TooLong,
    ContainsControl,
}

impl GroupIdError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "group id must not be empty",
            Self::TooLong => "group id is too long",
            Self::ContainsControl => "group id contains control characters",
        }
    }
}

impl std::fmt::Display for GroupIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for GroupIdError {}

fn validate_group_id(value: &str) -> Result<(), GroupIdError> {
    if value.is_empty() {
        return Err(GroupIdError::Empty);
    }
    if value.len() > 128 {
        return Err(GroupIdError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(GroupIdError::ContainsControl);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_id_validation() {
        assert_eq!(ResourceId::try_new("").unwrap_err(), ResourceIdError::Empty);
        assert_eq!(
            ResourceId::try_new("  ").unwrap_err(),
            ResourceIdError::Empty
        );
        assert_eq!(
            ResourceId::try_new("vm\u{0007}1").unwrap_err(),
            ResourceIdError::ContainsControl
        );
        assert_eq!(ResourceId::from(42).as_str(), "42");
        assert!(ResourceId::try_new("vm-17").is_ok());
    }

    #[test]
    fn group_id_validation() {
        assert_eq!(GroupId::try_new("").unwrap_err(), GroupIdError::Empty);
        assert_eq!(
            GroupId::try_new("x".repeat(129)).unwrap_err(),
            GroupIdError::TooLong
        );
        assert!(GroupId::try_new("ops.team").is_ok());
    }
}
