#![forbid(unsafe_code)]

/// Assignment of one label (or a whole folder) across the working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriState {
    None,
    Partial,
    All,
}

impl TriState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Partial => "partial",
            Self::All => "all",
        }
    }

    /// Target state of a toggle. A partial selection always resolves to `All`, never to `None`,
    /// so labels already carried by some rows are not dropped by a single click.
    pub fn toggled(self) -> Self {
        match self {
            Self::All => Self::None,
            Self::None | Self::Partial => Self::All,
        }
    }

    /// State of a label carried by `members` out of `total` rows. An empty working set is `None`.
    pub fn of_membership(members: usize, total: usize) -> Self {
        if total == 0 || members == 0 {
            Self::None
        } else if members >= total {
            Self::All
        } else {
            Self::Partial
        }
    }

    /// `All` iff every part is `All`, `None` iff every part is `None` (or there are no parts).
    pub fn aggregate(states: impl IntoIterator<Item = TriState>) -> Self {
        let mut saw_all = false;
        let mut saw_none = false;
        for state in states {
            match state {
                Self::Partial => return Self::Partial,
                Self::All => saw_all = true,
                Self::None => saw_none = true,
            }
            if saw_all && saw_none {
                return Self::Partial;
            }
        }
        if saw_all { Self::All } else { Self::None }
    }
}

impl std::fmt::Display for TriState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
