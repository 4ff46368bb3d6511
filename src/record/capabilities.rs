use std::fmt;

use super::Record;

/// Which optional behaviours a record supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub serializable: bool,
    pub identity_assignable: bool,
    pub timestamp_tracked: bool,
}

impl Capabilities {
    /// Read which capability accessors a record overrides.
    ///
    /// Takes `&mut` because identity assignment is only reachable through a
    /// mutable accessor; nothing is modified.
    pub fn of<R: Record + ?Sized>(record: &mut R) -> Self {
        Capabilities {
            serializable: record.as_serializable().is_some(),
            identity_assignable: record.as_identity_assignable().is_some(),
            timestamp_tracked: record.as_timestamped().is_some(),
        }
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.serializable {
            names.push("serializable");
        }
        if self.identity_assignable {
            names.push("identity-assignable");
        }
        if self.timestamp_tracked {
            names.push("timestamp-tracked");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}
