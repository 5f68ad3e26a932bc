//! Funnel stages and furthest-stage normalization

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::FunnelError;

/// Offer decision value that overrides the recorded furthest stage
pub const OFFER_ACCEPTED_DECISION: &str = "Offer Accepted";

/// The five recruiting stages, in funnel order.
///
/// The derived `Ord` is the funnel order: every aggregation and sort in the
/// crate relies on it instead of comparing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    NewApplication = 1,
    PhoneScreen = 2,
    InHouseInterview = 3,
    OfferSent = 4,
    OfferAccepted = 5,
}

impl Stage {
    /// All stages in funnel order
    pub const ALL: [Stage; 5] = [
        Stage::NewApplication,
        Stage::PhoneScreen,
        Stage::InHouseInterview,
        Stage::OfferSent,
        Stage::OfferAccepted,
    ];

    /// 1-based position in the funnel
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Zero-based position, usable as an index into per-stage arrays
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Canonical display label
    pub fn label(self) -> &'static str {
        match self {
            Stage::NewApplication => "New Application",
            Stage::PhoneScreen => "Phone Screen",
            Stage::InHouseInterview => "In-House Interview",
            Stage::OfferSent => "Offer Sent",
            Stage::OfferAccepted => "Offer Accepted",
        }
    }

    /// Match a label against the canonical spellings, ignoring case,
    /// hyphens, underscores and repeated whitespace.
    pub fn from_label(label: &str) -> Result<Stage, FunnelError> {
        let key = spelling_key(label);
        Stage::ALL
            .into_iter()
            .find(|stage| spelling_key(stage.label()) == key)
            .ok_or_else(|| FunnelError::InvalidStage(label.to_string()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_label(s)
    }
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Resolve a candidate's furthest stage.
///
/// An accepted offer always wins over the recorded stage. Otherwise the
/// recorded label is unified to its canonical spelling; a missing or
/// unrecognised label is an error.
pub fn normalize_stage(
    recorded_stage: Option<&str>,
    offer_decision: Option<&str>,
) -> Result<Stage, FunnelError> {
    if offer_decision.map(str::trim) == Some(OFFER_ACCEPTED_DECISION) {
        return Ok(Stage::OfferAccepted);
    }

    match recorded_stage {
        Some(label) => Stage::from_label(label),
        None => Err(FunnelError::InvalidStage("<missing>".to_string())),
    }
}

fn spelling_key(label: &str) -> String {
    label
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
