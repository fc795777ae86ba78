//! Closed-ring labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RingError;

/// Human label attached to a scan.
///
/// Written to tables as `1`, `0` and `idk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    NotClosedRing,
    ClosedRing,
    Unknown,
}

impl Label {
    /// Class index used by the models: 0 for not-closed, 1 for closed.
    ///
    /// Unknown labels have no class.
    pub fn class_index(&self) -> Option<i64> {
        match self {
            Label::NotClosedRing => Some(0),
            Label::ClosedRing => Some(1),
            Label::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Label::Unknown)
    }
}

impl FromStr for Label {
    type Err = RingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("idk") {
            return Ok(Label::Unknown);
        }
        // Labels exported through float columns come back as "1.0".
        match trimmed.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(Label::NotClosedRing),
            Ok(v) if v == 1.0 => Ok(Label::ClosedRing),
            _ => Err(RingError::InvalidLabel(s.to_string())),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::NotClosedRing => write!(f, "0"),
            Label::ClosedRing => write!(f, "1"),
            Label::Unknown => write!(f, "idk"),
        }
    }
}
