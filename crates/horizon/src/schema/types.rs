//! Core type definitions for the canonical schema.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal classification target shared by every mission vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TargetClass {
    /// Not a planet (false positive, refuted, false alarm).
    FalsePositive,
    /// Planet candidate.
    Candidate,
    /// Confirmed or known planet.
    Confirmed,
}

impl TargetClass {
    /// All classes in ordinal order.
    pub const ALL: [TargetClass; 3] = [
        TargetClass::FalsePositive,
        TargetClass::Candidate,
        TargetClass::Confirmed,
    ];

    /// Ordinal encoding: 0 = not-a-planet, 1 = candidate, 2 = confirmed.
    pub fn ordinal(self) -> u8 {
        match self {
            TargetClass::FalsePositive => 0,
            TargetClass::Candidate => 1,
            TargetClass::Confirmed => 2,
        }
    }

    /// Decode an ordinal.
    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(TargetClass::FalsePositive),
            1 => Some(TargetClass::Candidate),
            2 => Some(TargetClass::Confirmed),
            _ => None,
        }
    }

    /// Human-readable label used in prediction downloads.
    ///
    /// Each string maps back to this class through the label alias table.
    pub fn label(self) -> &'static str {
        match self {
            TargetClass::FalsePositive => "FALSE POSITIVE",
            TargetClass::Candidate => "CANDIDATE",
            TargetClass::Confirmed => "CONFIRMED",
        }
    }
}

impl From<TargetClass> for u8 {
    fn from(class: TargetClass) -> Self {
        class.ordinal()
    }
}

impl TryFrom<u8> for TargetClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TargetClass::from_ordinal(value).ok_or_else(|| format!("invalid target ordinal {}", value))
    }
}

impl fmt::Display for TargetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

/// Role of a column in a harmonized table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Model input.
    Feature,
    /// Encoded classification target.
    Target,
    /// Row identifier carried through unchanged.
    Identifier,
}
