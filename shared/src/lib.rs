use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Course codes the predictor understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum CanonicalCourse {
    #[strum(serialize = "CSE")]
    Cse,
    #[strum(serialize = "IT")]
    It,
    #[strum(serialize = "ECE")]
    Ece,
    #[strum(serialize = "EEE")]
    Eee,
    #[strum(serialize = "MECH")]
    Mech,
    #[strum(serialize = "CIVIL")]
    Civil,
}

impl Default for CanonicalCourse {
    fn default() -> Self {
        CanonicalCourse::Cse
    }
}

/// Reservation / quota classes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(ascii_case_insensitive)]
pub enum CanonicalCategory {
    #[strum(serialize = "OC")]
    Oc,
    #[strum(serialize = "BC")]
    Bc,
    #[strum(serialize = "MBC")]
    Mbc,
    #[strum(serialize = "SC")]
    Sc,
    #[strum(serialize = "ST")]
    St,
}

impl Default for CanonicalCategory {
    fn default() -> Self {
        CanonicalCategory::Oc
    }
}

/// Coarse admission-likelihood label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Tier {
    Safe,
    Target,
    Dream,
}

impl Tier {
    pub const SAFE_THRESHOLD: f64 = 0.7;
    pub const TARGET_THRESHOLD: f64 = 0.5;

    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::SAFE_THRESHOLD {
            Tier::Safe
        } else if probability >= Self::TARGET_THRESHOLD {
            Tier::Target
        } else {
            Tier::Dream
        }
    }

    /// Sort priority, lower comes first.
    pub fn priority(self) -> u8 {
        match self {
            Tier::Safe => 0,
            Tier::Target => 1,
            Tier::Dream => 2,
        }
    }
}

// The form posts the rank as a string, API clients send a number.
fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse::<f64>().map_err(|_| {
            serde::de::Error::custom(format!("Invalid numeric value: {}", s))
        }),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionRequest {
    #[serde(rename = "cutoff", deserialize_with = "deserialize_number_or_string")]
    pub rank: f64,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl PredictionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !self.rank.is_finite() || self.rank <= 0.0 {
            return Err(format!("Cutoff must be a positive number, got {}", self.rank));
        }
        Ok(())
    }

    /// Location filter with blank input treated as absent.
    pub fn location_filter(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub college: String,
    pub course: String,
    pub location: String,
    pub probability: f64,
    pub cutoff_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Tier>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstitutionRecord {
    pub id: u32,
    pub name: String,
    pub course: String,
    pub location: String,
    pub category: String,
    pub cutoff: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
