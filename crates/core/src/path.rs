#![forbid(unsafe_code)]

//! Label strings <-> namespaced segment paths.
//!
//! A user label is `seg(.seg)*`; a group label is `$group.seg(.seg)*`. Inside a segment (and the
//! group id) `\.` is a literal delimiter and `\\` a literal escape. A user label whose first
//! segment starts with a literal `$` writes it as `\$`. Every other escape is rejected, so the
//! accepted spelling of a path is unique and `encode(decode(x)) == x`.

use crate::ids::{GroupId, GroupIdError};

pub const DELIMITER: char = '.';
pub const ESCAPE: char = '\\';
pub const GROUP_MARKER: char = '$';

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    User,
    Group(GroupId),
}

impl Namespace {
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            Self::User => None,
            Self::Group(group) => Some(group),
        }
    }

    /// Encoded form of the namespace root: empty for user labels, `$group` for group labels.
    pub fn root_label(&self) -> String {
        match self {
            Self::User => String::new(),
            Self::Group(group) => {
                let mut out = String::new();
                out.push(GROUP_MARKER);
                push_escaped(&mut out, group.as_str());
                out
            }
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Group(group) => write!(f, "group:{group}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelPathError {
    Empty,
    ContainsControl,
    EmptySegment { position: usize },
    EmptyGroup,
    MissingSegments,
    DanglingEscape,
    InvalidEscape { ch: char, offset: usize },
    InvalidGroup(GroupIdError),
}

impl LabelPathError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "label must not be empty",
            Self::ContainsControl => "label contains control characters",
            Self::EmptySegment { .. } => "label contains an empty segment",
            Self::EmptyGroup => "group label must name a group",
            Self::MissingSegments => "label must have at least one segment",
            Self::DanglingEscape => "label ends with a dangling escape",
            Self::InvalidEscape { .. } => "label contains an invalid escape",
            Self::InvalidGroup(_) => "group id is invalid",
        }
    }
}

impl std::fmt::Display for LabelPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySegment { position } => {
                write!(f, "{} (segment {position})", self.message())
            }
            Self::InvalidEscape { ch, offset } => {
                write!(f, "{} ('\\{ch}' at byte {offset})", self.message())
            }
            Self::InvalidGroup(err) => write!(f, "{}: {err}", self.message()),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for LabelPathError {}

/// A decoded label: its namespace plus the ordered segments below the namespace root.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelPath {
    namespace: Namespace,
    segments: Vec<String>,
}

impl LabelPath {
    pub fn new(namespace: Namespace, segments: Vec<String>) -> Result<Self, LabelPathError> {
        if segments.is_empty() {
            return Err(LabelPathError::MissingSegments);
        }
        for (position, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(LabelPathError::EmptySegment { position });
            }
            if segment.chars().any(|c| c.is_control()) {
                return Err(LabelPathError::ContainsControl);
            }
        }
        Ok(Self {
            namespace,
            segments,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn to_label(&self) -> String {
        write_label(&self.namespace, &self.segments)
    }
}

impl std::fmt::Display for LabelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_label())
    }
}

pub fn decode(label: &str) -> Result<LabelPath, LabelPathError> {
    if label.is_empty() {
        return Err(LabelPathError::Empty);
    }
    if label.chars().any(|c| c.is_control()) {
        return Err(LabelPathError::ContainsControl);
    }

    let (is_group, body, base) = match label.strip_prefix(GROUP_MARKER) {
        Some(rest) => (true, rest, GROUP_MARKER.len_utf8()),
        None => (false, label, 0),
    };
    let empty_segment = |position: usize| {
        if is_group && position == 0 {
            LabelPathError::EmptyGroup
        } else {
            LabelPathError::EmptySegment { position }
        }
    };

    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut chars = body.char_indices();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some((_, DELIMITER)) => current.push(DELIMITER),
                Some((_, ESCAPE)) => current.push(ESCAPE),
                Some((_, GROUP_MARKER)) if !is_group && offset == 0 => current.push(GROUP_MARKER),
                Some((_, other)) => {
                    return Err(LabelPathError::InvalidEscape {
                        ch: other,
                        offset: base + offset,
                    });
                }
                None => return Err(LabelPathError::DanglingEscape),
            },
            DELIMITER => {
                if current.is_empty() {
                    return Err(empty_segment(parts.len()));
                }
                parts.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    if current.is_empty() {
        return Err(empty_segment(parts.len()));
    }
    parts.push(current);

    if !is_group {
        return Ok(LabelPath {
            namespace: Namespace::User,
            segments: parts,
        });
    }

    let mut parts = parts.into_iter();
    let group = parts.next().ok_or(LabelPathError::EmptyGroup)?;
    let group = GroupId::try_new(group).map_err(LabelPathError::InvalidGroup)?;
    let segments = parts.collect::<Vec<_>>();
    if segments.is_empty() {
        return Err(LabelPathError::MissingSegments);
    }
    Ok(LabelPath {
        namespace: Namespace::Group(group),
        segments,
    })
}

pub fn encode<S: AsRef<str>>(
    namespace: &Namespace,
    segments: &[S],
) -> Result<String, LabelPathError> {
    let segments = segments
        .iter()
        .map(|segment| segment.as_ref().to_string())
        .collect::<Vec<_>>();
    LabelPath::new(namespace.clone(), segments).map(|path| path.to_label())
}

/// Canonical spelling of `segments` under `namespace`. `segments` must not be empty.
pub(crate) fn write_label<S: AsRef<str>>(namespace: &Namespace, segments: &[S]) -> String {
    let mut out = namespace.root_label();
    match namespace {
        Namespace::User => {
            if segments
                .first()
                .is_some_and(|first| first.as_ref().starts_with(GROUP_MARKER))
            {
                out.push(ESCAPE);
            }
        }
        Namespace::Group(_) => out.push(DELIMITER),
    }
    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            out.push(DELIMITER);
        }
        push_escaped(&mut out, segment.as_ref());
    }
    out
}

fn push_escaped(out: &mut String, segment: &str) {
    for ch in segment.chars() {
        if matches!(ch, DELIMITER | ESCAPE) {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
}
