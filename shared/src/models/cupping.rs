//! Cup evaluation models (SCA protocol)

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of reference cups behind each consistency check
pub const CUPS_PER_CHECK: usize = 5;

/// Descriptive intensity, carried for the narrative only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

/// Serving temperature at which a cup is re-evaluated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Hot,
    Warm,
    Cold,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Hot, Phase::Warm, Phase::Cold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Hot => "hot",
            Phase::Warm => "warm",
            Phase::Cold => "cold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hot" => Some(Phase::Hot),
            "warm" => Some(Phase::Warm),
            "cold" => Some(Phase::Cold),
            _ => None,
        }
    }

    /// Localization key of the phase label
    pub fn label_key(&self) -> &'static str {
        match self {
            Phase::Hot => "phase.hot",
            Phase::Warm => "phase.warm",
            Phase::Cold => "phase.cold",
        }
    }
}

/// Every named score that contributes to a cup total
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Aroma,
    Flavor,
    Aftertaste,
    Acidity,
    Body,
    Balance,
    Uniformity,
    CleanCup,
    Sweetness,
    Defects,
}

impl Attribute {
    /// Attributes scored 2 points per matching cup
    pub const CONSISTENCY: [Attribute; 3] = [
        Attribute::Uniformity,
        Attribute::CleanCup,
        Attribute::Sweetness,
    ];

    pub const ALL: [Attribute; 10] = [
        Attribute::Aroma,
        Attribute::Flavor,
        Attribute::Aftertaste,
        Attribute::Acidity,
        Attribute::Body,
        Attribute::Balance,
        Attribute::Uniformity,
        Attribute::CleanCup,
        Attribute::Sweetness,
        Attribute::Defects,
    ];

    /// Stable key, used as the field name in errors and as the localization key
    pub fn key(&self) -> &'static str {
        match self {
            Attribute::Aroma => "aroma",
            Attribute::Flavor => "flavor",
            Attribute::Aftertaste => "aftertaste",
            Attribute::Acidity => "acidity",
            Attribute::Body => "body",
            Attribute::Balance => "balance",
            Attribute::Uniformity => "uniformity",
            Attribute::CleanCup => "clean_cup",
            Attribute::Sweetness => "sweetness",
            Attribute::Defects => "defects",
        }
    }

    /// Localization key of the attribute label
    pub fn label_key(&self) -> &'static str {
        match self {
            Attribute::Aroma => "attribute.aroma",
            Attribute::Flavor => "attribute.flavor",
            Attribute::Aftertaste => "attribute.aftertaste",
            Attribute::Acidity => "attribute.acidity",
            Attribute::Body => "attribute.body",
            Attribute::Balance => "attribute.balance",
            Attribute::Uniformity => "attribute.uniformity",
            Attribute::CleanCup => "attribute.clean_cup",
            Attribute::Sweetness => "attribute.sweetness",
            Attribute::Defects => "attribute.defects",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The five core attributes scored during one temperature phase
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreSet {
    pub flavor: Decimal,
    pub aftertaste: Decimal,
    pub acidity: Decimal,
    pub body: Decimal,
    pub balance: Decimal,
    #[serde(default)]
    pub acidity_intensity: Intensity,
    #[serde(default)]
    pub body_intensity: Intensity,
}

impl ScoreSet {
    /// The five phased slider scores, flavor first
    pub fn entries(&self) -> [(Attribute, Decimal); 5] {
        [
            (Attribute::Flavor, self.flavor),
            (Attribute::Aftertaste, self.aftertaste),
            (Attribute::Acidity, self.acidity),
            (Attribute::Body, self.body),
            (Attribute::Balance, self.balance),
        ]
    }
}

/// Uniformity, clean cup and sweetness, one entry per reference cup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsistencyChecks {
    pub uniformity: Vec<bool>,
    pub clean_cup: Vec<bool>,
    pub sweetness: Vec<bool>,
}

impl ConsistencyChecks {
    /// All reference cups matched on every check
    pub fn all_passed() -> Self {
        Self {
            uniformity: vec![true; CUPS_PER_CHECK],
            clean_cup: vec![true; CUPS_PER_CHECK],
            sweetness: vec![true; CUPS_PER_CHECK],
        }
    }

    /// The three checks, in `Attribute::CONSISTENCY` order
    pub fn entries(&self) -> [(Attribute, &[bool]); 3] {
        [
            (Attribute::Uniformity, self.uniformity.as_slice()),
            (Attribute::CleanCup, self.clean_cup.as_slice()),
            (Attribute::Sweetness, self.sweetness.as_slice()),
        ]
    }
}

/// Defect inputs: how many cups were affected and at which intensity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DefectRecord {
    /// 0-5 cups
    pub cups_affected: u8,
    /// 0, 2 (taint) or 4 (fault)
    pub intensity: u8,
}

impl DefectRecord {
    pub const TAINT: u8 = 2;
    pub const FAULT: u8 = 4;

    pub fn taint(cups_affected: u8) -> Self {
        Self {
            cups_affected,
            intensity: Self::TAINT,
        }
    }

    pub fn fault(cups_affected: u8) -> Self {
        Self {
            cups_affected,
            intensity: Self::FAULT,
        }
    }
}

/// One scored cup as submitted by the form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCupEvaluation {
    #[serde(default)]
    pub aroma_category: Option<String>,
    #[serde(default)]
    pub dry_fragrance: Intensity,
    #[serde(default)]
    pub wet_aroma: Intensity,
    pub aroma: Decimal,
    pub scores: BTreeMap<Phase, ScoreSet>,
    /// Required: an unticked cup must be sent as `false`
    pub checks: ConsistencyChecks,
    #[serde(default)]
    pub defects: DefectRecord,
}

/// One scored cup within a stored evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CupEvaluation {
    pub id: Uuid,
    pub aroma_category: Option<String>,
    pub dry_fragrance: Intensity,
    pub wet_aroma: Intensity,
    pub aroma: Decimal,
    pub scores: BTreeMap<Phase, ScoreSet>,
    pub checks: ConsistencyChecks,
    pub defects: DefectRecord,
    /// Aroma plus the phase-averaged sensory attributes
    pub cupper_score: Decimal,
    pub total_score: Decimal,
}

/// Coffee classification based on cupping score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoffeeClassification {
    /// 90+ points
    Outstanding,
    /// 85-89.99 points
    Excellent,
    /// 80-84.99 points
    VeryGood,
    /// Below 80 points
    BelowSpecialty,
}

impl CoffeeClassification {
    pub fn label_key(&self) -> &'static str {
        match self {
            CoffeeClassification::Outstanding => "classification.outstanding",
            CoffeeClassification::Excellent => "classification.excellent",
            CoffeeClassification::VeryGood => "classification.very_good",
            CoffeeClassification::BelowSpecialty => "classification.below_specialty",
        }
    }
}

impl std::fmt::Display for CoffeeClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoffeeClassification::Outstanding => write!(f, "Outstanding"),
            CoffeeClassification::Excellent => write!(f, "Excellent"),
            CoffeeClassification::VeryGood => write!(f, "Very Good"),
            CoffeeClassification::BelowSpecialty => write!(f, "Below Specialty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_hot_warm_cold() {
        let mut phases = vec![Phase::Cold, Phase::Hot, Phase::Warm];
        phases.sort();
        assert_eq!(phases, Phase::ALL.to_vec());
    }

    #[test]
    fn test_scores_map_uses_phase_names() {
        let json = r#"{
            "aroma": 8.5,
            "scores": {
                "warm": { "flavor": 8, "aftertaste": 8, "acidity": 8, "body": 8, "balance": 8 }
            },
            "checks": {
                "uniformity": [true, true, true, true, true],
                "clean_cup": [true, true, true, true, false],
                "sweetness": [true, true, true, true, true]
            }
        }"#;
        let cup: NewCupEvaluation = serde_json::from_str(json).unwrap();
        assert!(cup.scores.contains_key(&Phase::Warm));
        assert!(!cup.checks.clean_cup[4]);
        assert_eq!(cup.defects, DefectRecord::default());
        assert_eq!(cup.scores[&Phase::Warm].acidity_intensity, Intensity::Medium);
    }

    #[test]
    fn test_missing_checks_are_rejected() {
        let json = r#"{
            "aroma": 6,
            "scores": {
                "hot": { "flavor": 6, "aftertaste": 6, "acidity": 6, "body": 6, "balance": 6 }
            }
        }"#;
        let err = serde_json::from_str::<NewCupEvaluation>(json).unwrap_err();
        assert!(err.to_string().contains("checks"));
    }

    #[test]
    fn test_attribute_keys_are_unique() {
        let mut keys: Vec<&str> = Attribute::ALL.iter().map(|a| a.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Attribute::ALL.len());
    }
}
