//! Evaluation records: one full tasting of one coffee

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cupping::{CupEvaluation, NewCupEvaluation};

/// Roast level of the evaluated coffee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RoastLevel {
    Light,
    Medium,
    MediumDark,
    Dark,
}

impl RoastLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Medium => "medium",
            RoastLevel::MediumDark => "medium-dark",
            RoastLevel::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(RoastLevel::Light),
            "medium" => Some(RoastLevel::Medium),
            "medium-dark" => Some(RoastLevel::MediumDark),
            "dark" => Some(RoastLevel::Dark),
            _ => None,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            RoastLevel::Light => "roast.light",
            RoastLevel::Medium => "roast.medium",
            RoastLevel::MediumDark => "roast.medium_dark",
            RoastLevel::Dark => "roast.dark",
        }
    }
}

/// A full tasting record as submitted by the evaluation form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvaluation {
    pub coffee_name: String,
    pub roast_level: RoastLevel,
    #[serde(default)]
    pub water_temperature: String,
    pub cups: Vec<NewCupEvaluation>,
    #[serde(default)]
    pub notes: String,
}

/// A stored tasting record. Scores are fixed at creation; only the
/// favorite flag changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub coffee_name: String,
    pub roast_level: RoastLevel,
    pub water_temperature: String,
    pub cups: Vec<CupEvaluation>,
    /// Mean of the cup totals
    pub overall_score: Decimal,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Condensed row for history lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub id: Uuid,
    pub coffee_name: String,
    pub roast_level: RoastLevel,
    pub overall_score: Decimal,
    pub cup_count: usize,
    pub created_at: DateTime<Utc>,
    pub is_favorite: bool,
}

impl From<&Evaluation> for EvaluationSummary {
    fn from(e: &Evaluation) -> Self {
        Self {
            id: e.id,
            coffee_name: e.coffee_name.clone(),
            roast_level: e.roast_level,
            overall_score: e.overall_score,
            cup_count: e.cups.len(),
            created_at: e.created_at,
            is_favorite: e.is_favorite,
        }
    }
}
