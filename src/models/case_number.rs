use serde::{Serialize, Serializer};
use std::fmt;

/// One normalized case identifier, e.g. `CAS 2020 A 123`.
///
/// Field order drives `Ord`, so sets of case numbers sort by prefix, year,
/// series and then numerically by number (`A 9` before `A 10`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseNumber {
    pub prefix: String,
    pub year: Option<u16>,
    pub series: Option<String>,
    pub number: u64,
}

impl CaseNumber {
    /// Fully qualified identifier (`PREFIX YEAR SERIES NUMBER`).
    pub fn qualified(prefix: &str, year: u16, series: &str, number: u64) -> Self {
        Self {
            prefix: prefix.to_uppercase(),
            year: Some(year),
            series: Some(series.to_uppercase()),
            number,
        }
    }

    /// Bare identifier (`PREFIX NUMBER`) for grammars without year/series.
    pub fn bare(prefix: &str, number: u64) -> Self {
        Self {
            prefix: prefix.to_uppercase(),
            year: None,
            series: None,
            number,
        }
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)?;
        if let Some(year) = self.year {
            write!(f, " {}", year)?;
        }
        if let Some(series) = &self.series {
            write!(f, " {}", series)?;
        }
        write!(f, " {}", self.number)
    }
}

impl Serialize for CaseNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
