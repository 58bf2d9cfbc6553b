//! Reading status lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a book sits in the reading cycle
///
/// The statuses form a single forward cycle:
/// want-to-read → reading → read → re-reading → abandoned → want-to-read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    #[default]
    WantToRead,
    Reading,
    Read,
    ReReading,
    Abandoned,
}

impl ReadingStatus {
    /// Every status, in cycle order
    pub const ALL: [ReadingStatus; 5] = [
        ReadingStatus::WantToRead,
        ReadingStatus::Reading,
        ReadingStatus::Read,
        ReadingStatus::ReReading,
        ReadingStatus::Abandoned,
    ];

    /// The successor in the reading cycle
    pub fn next(self) -> Self {
        match self {
            ReadingStatus::WantToRead => ReadingStatus::Reading,
            ReadingStatus::Reading => ReadingStatus::Read,
            ReadingStatus::Read => ReadingStatus::ReReading,
            ReadingStatus::ReReading => ReadingStatus::Abandoned,
            ReadingStatus::Abandoned => ReadingStatus::WantToRead,
        }
    }

    /// Wire name, as stored in snapshots and exports
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want-to-read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
            ReadingStatus::ReReading => "re-reading",
            ReadingStatus::Abandoned => "abandoned",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "Want to read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Read => "Read",
            ReadingStatus::ReReading => "Re-reading",
            ReadingStatus::Abandoned => "Abandoned",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown reading status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ReadingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_closes_after_five_steps() {
        for start in ReadingStatus::ALL {
            let mut status = start;
            for _ in 0..5 {
                status = status.next();
            }
            assert_eq!(status, start);
        }
    }

    #[test]
    fn test_each_status_has_distinct_successor() {
        let successors: std::collections::HashSet<_> =
            ReadingStatus::ALL.iter().map(|s| s.next()).collect();
        assert_eq!(successors.len(), ReadingStatus::ALL.len());
    }

    #[test]
    fn test_parse_accepts_wire_and_loose_spellings() {
        assert_eq!("re-reading".parse(), Ok(ReadingStatus::ReReading));
        assert_eq!("Want_To_Read".parse(), Ok(ReadingStatus::WantToRead));
        assert_eq!(" read ".parse(), Ok(ReadingStatus::Read));
        assert!("finished".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ReadingStatus::ReReading).unwrap();
        assert_eq!(json, "\"re-reading\"");
        let status: ReadingStatus = serde_json::from_str("\"want-to-read\"").unwrap();
        assert_eq!(status, ReadingStatus::WantToRead);
    }
}
