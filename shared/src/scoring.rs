//! SCA score aggregation
//!
//! Scores always live on cups. A cup total is the sum of its six slider
//! scores and three consistency checks minus its defect points. The five
//! phased attributes are the mean over every temperature phase the cup was
//! scored at. An evaluation's overall score is the mean of its cup totals.
//! Derived scores are rounded to two decimals, half away from zero, and are
//! never clamped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScoringError, ScoringResult};
use crate::models::{
    Attribute, CoffeeClassification, ConsistencyChecks, CupEvaluation, DefectRecord, Evaluation,
    NewCupEvaluation, NewEvaluation, Phase, ScoreSet, CUPS_PER_CHECK,
};
use crate::validation::{clamp_slider_score, ensure_unique_coffee_name, validate_coffee_name};

/// Points awarded per passing reference cup
pub const POINTS_PER_CUP: u8 = 2;
/// Most cups a defect can be recorded against
pub const MAX_DEFECTIVE_CUPS: u8 = 5;

/// Round a derived score to two decimals
pub fn round_score(score: Decimal) -> Decimal {
    score.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ============================================================================
// Score Primitives
// ============================================================================

/// Points for one consistency check: 2 per `true`, over exactly five cups
pub fn consistency_points(field: &str, checks: &[bool]) -> ScoringResult<Decimal> {
    if checks.len() != CUPS_PER_CHECK {
        return Err(ScoringError::validation(
            field,
            format!(
                "{} must record exactly {} cups, got {}",
                field,
                CUPS_PER_CHECK,
                checks.len()
            ),
        ));
    }
    let passed = checks.iter().filter(|c| **c).count() as u8;
    Ok(Decimal::from(passed * POINTS_PER_CUP))
}

/// Defect deduction: affected cups times intensity (2 taint, 4 fault)
pub fn defect_points(cups_affected: u8, intensity: u8) -> ScoringResult<Decimal> {
    if cups_affected > MAX_DEFECTIVE_CUPS {
        return Err(ScoringError::validation(
            "defects.cups_affected",
            format!(
                "cups affected must be between 0 and {}, got {}",
                MAX_DEFECTIVE_CUPS, cups_affected
            ),
        ));
    }
    if !matches!(intensity, 0 | DefectRecord::TAINT | DefectRecord::FAULT) {
        return Err(ScoringError::validation(
            "defects.intensity",
            format!("intensity must be 0, 2 or 4, got {}", intensity),
        ));
    }
    Ok(Decimal::from(u32::from(cups_affected) * u32::from(intensity)))
}

// ============================================================================
// Per-Cup Aggregation
// ============================================================================

/// Raw inputs of a scored cup, shared by submitted and stored cups
pub trait CupInputs {
    fn aroma(&self) -> Decimal;
    fn phase_scores(&self) -> &BTreeMap<Phase, ScoreSet>;
    fn checks(&self) -> &ConsistencyChecks;
    fn defects(&self) -> DefectRecord;
}

impl CupInputs for NewCupEvaluation {
    fn aroma(&self) -> Decimal {
        self.aroma
    }

    fn phase_scores(&self) -> &BTreeMap<Phase, ScoreSet> {
        &self.scores
    }

    fn checks(&self) -> &ConsistencyChecks {
        &self.checks
    }

    fn defects(&self) -> DefectRecord {
        self.defects
    }
}

impl CupInputs for CupEvaluation {
    fn aroma(&self) -> Decimal {
        self.aroma
    }

    fn phase_scores(&self) -> &BTreeMap<Phase, ScoreSet> {
        &self.scores
    }

    fn checks(&self) -> &ConsistencyChecks {
        &self.checks
    }

    fn defects(&self) -> DefectRecord {
        self.defects
    }
}

/// The six slider attributes of one cup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensoryScores {
    pub aroma: Decimal,
    pub flavor: Decimal,
    pub aftertaste: Decimal,
    pub acidity: Decimal,
    pub body: Decimal,
    pub balance: Decimal,
}

impl SensoryScores {
    pub fn sum(&self) -> Decimal {
        self.aroma + self.flavor + self.aftertaste + self.acidity + self.body + self.balance
    }
}

/// Validated slider scores of a cup.
///
/// With `phase` set, the phased attributes come from that phase alone and
/// a missing phase is rejected. Without it they are averaged over every
/// recorded phase, and every recorded phase is validated.
pub fn sensory_scores<C>(cup: &C, phase: Option<Phase>) -> ScoringResult<SensoryScores>
where
    C: CupInputs + ?Sized,
{
    let aroma = clamp_slider_score(Attribute::Aroma.key(), cup.aroma())?;

    let recorded = cup.phase_scores();
    let selected: Vec<(Phase, &ScoreSet)> = match phase {
        Some(p) => {
            let set = recorded.get(&p).ok_or_else(|| {
                ScoringError::validation(
                    "phase",
                    format!("no scores recorded for the {} phase", p.as_str()),
                )
            })?;
            vec![(p, set)]
        }
        None => recorded.iter().map(|(p, set)| (*p, set)).collect(),
    };

    if selected.is_empty() {
        return Err(ScoringError::validation(
            "scores",
            "at least one temperature phase must be scored",
        ));
    }

    let mut sums = [Decimal::ZERO; 5];
    for (p, set) in &selected {
        for (slot, (attribute, value)) in sums.iter_mut().zip(set.entries()) {
            let field = format!("scores.{}.{}", p.as_str(), attribute.key());
            *slot += clamp_slider_score(&field, value)?;
        }
    }

    let count = Decimal::from(selected.len());
    let [flavor, aftertaste, acidity, body, balance] = sums.map(|sum| sum / count);

    Ok(SensoryScores {
        aroma,
        flavor,
        aftertaste,
        acidity,
        body,
        balance,
    })
}

/// Named contributions to a cup total. Defects hold the deducted points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub aroma: Decimal,
    pub flavor: Decimal,
    pub aftertaste: Decimal,
    pub acidity: Decimal,
    pub body: Decimal,
    pub balance: Decimal,
    pub uniformity: Decimal,
    pub clean_cup: Decimal,
    pub sweetness: Decimal,
    pub defects: Decimal,
}

impl ScoreBreakdown {
    pub fn get(&self, attribute: Attribute) -> Decimal {
        match attribute {
            Attribute::Aroma => self.aroma,
            Attribute::Flavor => self.flavor,
            Attribute::Aftertaste => self.aftertaste,
            Attribute::Acidity => self.acidity,
            Attribute::Body => self.body,
            Attribute::Balance => self.balance,
            Attribute::Uniformity => self.uniformity,
            Attribute::CleanCup => self.clean_cup,
            Attribute::Sweetness => self.sweetness,
            Attribute::Defects => self.defects,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut Decimal {
        match attribute {
            Attribute::Aroma => &mut self.aroma,
            Attribute::Flavor => &mut self.flavor,
            Attribute::Aftertaste => &mut self.aftertaste,
            Attribute::Acidity => &mut self.acidity,
            Attribute::Body => &mut self.body,
            Attribute::Balance => &mut self.balance,
            Attribute::Uniformity => &mut self.uniformity,
            Attribute::CleanCup => &mut self.clean_cup,
            Attribute::Sweetness => &mut self.sweetness,
            Attribute::Defects => &mut self.defects,
        }
    }

    /// Every attribute with its value, in `Attribute::ALL` order
    pub fn entries(&self) -> [(Attribute, Decimal); 10] {
        Attribute::ALL.map(|attribute| (attribute, self.get(attribute)))
    }

    /// Sum of the positive contributions, before defects
    pub fn raw_total(&self) -> Decimal {
        self.entries()
            .iter()
            .filter(|(attribute, _)| *attribute != Attribute::Defects)
            .map(|(_, value)| *value)
            .sum()
    }

    fn zero() -> Self {
        Self {
            aroma: Decimal::ZERO,
            flavor: Decimal::ZERO,
            aftertaste: Decimal::ZERO,
            acidity: Decimal::ZERO,
            body: Decimal::ZERO,
            balance: Decimal::ZERO,
            uniformity: Decimal::ZERO,
            clean_cup: Decimal::ZERO,
            sweetness: Decimal::ZERO,
            defects: Decimal::ZERO,
        }
    }
}

/// Derived scores of one cup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CupScore {
    /// Aroma plus the five phase-averaged attributes
    pub cupper_score: Decimal,
    pub total_score: Decimal,
    pub breakdown: ScoreBreakdown,
}

/// Subtract the defect deduction, refusing to produce a negative score
fn signed_total(raw: Decimal, deduction: Decimal) -> ScoringResult<Decimal> {
    let total = round_score(raw - deduction);
    if total < Decimal::ZERO {
        return Err(ScoringError::computation(
            "total_score",
            format!(
                "defect deduction {} exceeds the raw score {}",
                deduction, raw
            ),
        ));
    }
    Ok(total)
}

/// Aggregate one cup into its total and per-attribute breakdown
pub fn aggregate_cup<C>(cup: &C) -> ScoringResult<CupScore>
where
    C: CupInputs + ?Sized,
{
    let sensory = sensory_scores(cup, None)?;

    let checks = cup.checks();
    let mut consistency = [Decimal::ZERO; 3];
    for (slot, (attribute, values)) in consistency.iter_mut().zip(checks.entries()) {
        let field = format!("checks.{}", attribute.key());
        *slot = consistency_points(&field, values)?;
    }
    let [uniformity, clean_cup, sweetness] = consistency;

    let defects = cup.defects();
    let deduction = defect_points(defects.cups_affected, defects.intensity)?;

    let breakdown = ScoreBreakdown {
        aroma: sensory.aroma,
        flavor: sensory.flavor,
        aftertaste: sensory.aftertaste,
        acidity: sensory.acidity,
        body: sensory.body,
        balance: sensory.balance,
        uniformity,
        clean_cup,
        sweetness,
        defects: deduction,
    };

    Ok(CupScore {
        cupper_score: round_score(sensory.sum()),
        total_score: signed_total(breakdown.raw_total(), deduction)?,
        breakdown,
    })
}

// ============================================================================
// Evaluation Aggregation
// ============================================================================

/// Derived scores of a whole evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationScore {
    /// Mean of the cup totals
    pub overall_score: Decimal,
    pub cups: Vec<CupScore>,
}

impl EvaluationScore {
    /// Mean of each attribute across cups
    pub fn attribute_averages(&self) -> ScoreBreakdown {
        let mut averages = ScoreBreakdown::zero();
        if self.cups.is_empty() {
            return averages;
        }
        let count = Decimal::from(self.cups.len());
        for attribute in Attribute::ALL {
            let sum: Decimal = self.cups.iter().map(|c| c.breakdown.get(attribute)).sum();
            *averages.get_mut(attribute) = sum / count;
        }
        averages
    }

    pub fn classification(&self) -> CoffeeClassification {
        classify_by_score(self.overall_score)
    }
}

fn aggregate_cups<'a, C, I>(
    coffee_name: &str,
    cups: &[C],
    other_names: I,
) -> ScoringResult<EvaluationScore>
where
    C: CupInputs,
    I: IntoIterator<Item = &'a str>,
{
    validate_coffee_name(coffee_name)?;
    ensure_unique_coffee_name(coffee_name, other_names)?;

    if cups.is_empty() {
        return Err(ScoringError::validation(
            "cups",
            "an evaluation must contain at least one cup",
        ));
    }

    let scores = cups
        .iter()
        .enumerate()
        .map(|(i, cup)| aggregate_cup(cup).map_err(|e| e.prefixed(&format!("cups[{}]", i))))
        .collect::<ScoringResult<Vec<_>>>()?;

    let sum: Decimal = scores.iter().map(|s| s.total_score).sum();
    let overall_score = round_score(sum / Decimal::from(scores.len()));

    Ok(EvaluationScore {
        overall_score,
        cups: scores,
    })
}

/// Aggregate an evaluation.
///
/// `other_names` are the coffee names of the owner's other records; a
/// case-insensitive match is rejected before anything is scored.
pub fn aggregate_evaluation<'a, I>(
    evaluation: &Evaluation,
    other_names: I,
) -> ScoringResult<EvaluationScore>
where
    I: IntoIterator<Item = &'a str>,
{
    aggregate_cups(
        &evaluation.coffee_name,
        evaluation.cups.as_slice(),
        other_names,
    )
}

/// Validate and score a submitted form into an immutable record
pub fn score_new_evaluation<'a, I>(
    input: NewEvaluation,
    owner_id: Uuid,
    existing_names: I,
    now: DateTime<Utc>,
) -> ScoringResult<Evaluation>
where
    I: IntoIterator<Item = &'a str>,
{
    let score = aggregate_cups(&input.coffee_name, input.cups.as_slice(), existing_names)?;

    let cups = input
        .cups
        .into_iter()
        .zip(&score.cups)
        .map(|(cup, derived)| CupEvaluation {
            id: Uuid::new_v4(),
            aroma_category: cup.aroma_category,
            dry_fragrance: cup.dry_fragrance,
            wet_aroma: cup.wet_aroma,
            aroma: cup.aroma,
            scores: cup.scores,
            checks: cup.checks,
            defects: cup.defects,
            cupper_score: derived.cupper_score,
            total_score: derived.total_score,
        })
        .collect();

    Ok(Evaluation {
        id: Uuid::new_v4(),
        owner_id,
        coffee_name: input.coffee_name.trim().to_string(),
        roast_level: input.roast_level,
        water_temperature: input.water_temperature,
        cups,
        overall_score: score.overall_score,
        notes: input.notes,
        created_at: now,
        is_favorite: false,
    })
}

/// Classify coffee based on its overall score
pub fn classify_by_score(score: Decimal) -> CoffeeClassification {
    if score >= Decimal::from(90) {
        CoffeeClassification::Outstanding
    } else if score >= Decimal::from(85) {
        CoffeeClassification::Excellent
    } else if score >= Decimal::from(80) {
        CoffeeClassification::VeryGood
    } else {
        CoffeeClassification::BelowSpecialty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intensity, RoastLevel};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn score_set(flavor: &str, aftertaste: &str, acidity: &str, body: &str, balance: &str) -> ScoreSet {
        ScoreSet {
            flavor: dec(flavor),
            aftertaste: dec(aftertaste),
            acidity: dec(acidity),
            body: dec(body),
            balance: dec(balance),
            acidity_intensity: Intensity::High,
            body_intensity: Intensity::Medium,
        }
    }

    fn reference_cup(defects: DefectRecord) -> NewCupEvaluation {
        NewCupEvaluation {
            aroma_category: Some("floral".to_string()),
            dry_fragrance: Intensity::High,
            wet_aroma: Intensity::Medium,
            aroma: dec("8.5"),
            scores: BTreeMap::from([(
                Phase::Hot,
                score_set("8.25", "8.0", "8.5", "8.0", "8.25"),
            )]),
            checks: ConsistencyChecks::all_passed(),
            defects,
        }
    }

    fn new_evaluation(name: &str, cups: Vec<NewCupEvaluation>) -> NewEvaluation {
        NewEvaluation {
            coffee_name: name.to_string(),
            roast_level: RoastLevel::Light,
            water_temperature: "93C".to_string(),
            cups,
            notes: String::new(),
        }
    }

    #[test]
    fn test_consistency_points() {
        assert_eq!(
            consistency_points("uniformity", &[true, true, true, false, false]).unwrap(),
            dec("6")
        );
        assert_eq!(consistency_points("uniformity", &[false; 5]).unwrap(), dec("0"));
        assert_eq!(consistency_points("uniformity", &[true; 5]).unwrap(), dec("10"));
    }

    #[test]
    fn test_consistency_points_wrong_length() {
        let err = consistency_points("checks.sweetness", &[true; 4]).unwrap_err();
        assert_eq!(err.field(), Some("checks.sweetness"));
        assert!(consistency_points("checks.sweetness", &[true; 6]).is_err());
    }

    #[test]
    fn test_defect_points_table() {
        assert_eq!(defect_points(3, 2).unwrap(), dec("6"));
        assert_eq!(defect_points(0, 4).unwrap(), dec("0"));
        assert_eq!(defect_points(5, 4).unwrap(), dec("20"));
    }

    #[test]
    fn test_defect_points_rejects_out_of_range() {
        let err = defect_points(6, 2).unwrap_err();
        assert_eq!(err.field(), Some("defects.cups_affected"));
        let err = defect_points(1, 3).unwrap_err();
        assert_eq!(err.field(), Some("defects.intensity"));
    }

    #[test]
    fn test_aggregate_cup_reference() {
        let score = aggregate_cup(&reference_cup(DefectRecord::default())).unwrap();
        // 8.5 + 8.25 + 8.0 + 8.5 + 8.0 + 8.25 + 10 + 10 + 10 - 0
        assert_eq!(score.total_score, dec("79.5"));
        assert_eq!(score.cupper_score, dec("49.5"));
        assert_eq!(score.breakdown.uniformity, dec("10"));
        assert_eq!(score.breakdown.defects, dec("0"));
    }

    #[test]
    fn test_aggregate_cup_with_taint() {
        let score = aggregate_cup(&reference_cup(DefectRecord::taint(1))).unwrap();
        assert_eq!(score.total_score, dec("77.5"));
        assert_eq!(score.breakdown.defects, dec("2"));
    }

    #[test]
    fn test_aggregate_cup_averages_recorded_phases() {
        let mut cup = reference_cup(DefectRecord::default());
        cup.scores
            .insert(Phase::Warm, score_set("8.75", "8.0", "8.5", "8.0", "8.25"));
        cup.scores
            .insert(Phase::Cold, score_set("8.75", "8.0", "8.5", "8.0", "8.25"));

        let score = aggregate_cup(&cup).unwrap();
        // flavor: (8.25 + 8.75 + 8.75) / 3 = 8.5833...
        assert_eq!(round_score(score.breakdown.flavor), dec("8.58"));
        assert_eq!(score.total_score, dec("79.83"));
    }

    #[test]
    fn test_aggregate_cup_requires_a_phase() {
        let mut cup = reference_cup(DefectRecord::default());
        cup.scores.clear();
        let err = aggregate_cup(&cup).unwrap_err();
        assert_eq!(err.field(), Some("scores"));
    }

    #[test]
    fn test_aggregate_cup_names_offending_slider() {
        let mut cup = reference_cup(DefectRecord::default());
        cup.scores
            .insert(Phase::Cold, score_set("8", "8", "5.5", "8", "8"));
        let err = aggregate_cup(&cup).unwrap_err();
        assert_eq!(err.field(), Some("scores.cold.acidity"));
    }

    #[test]
    fn test_signed_total_rejects_negative() {
        let err = signed_total(dec("10"), dec("12")).unwrap_err();
        assert!(matches!(err, ScoringError::Computation { .. }));
        assert_eq!(signed_total(dec("12"), dec("12")).unwrap(), dec("0"));
    }

    #[test]
    fn test_overall_score_is_mean_of_cups() {
        let input = new_evaluation(
            "Ethiopia Guji",
            vec![
                reference_cup(DefectRecord::default()),
                reference_cup(DefectRecord::taint(1)),
            ],
        );
        let evaluation =
            score_new_evaluation(input, Uuid::new_v4(), std::iter::empty(), Utc::now()).unwrap();
        assert_eq!(evaluation.overall_score, dec("78.5"));
        assert_eq!(evaluation.cups[0].total_score, dec("79.5"));
        assert_eq!(evaluation.cups[1].total_score, dec("77.5"));
        assert!(!evaluation.is_favorite);

        let again = aggregate_evaluation(&evaluation, std::iter::empty()).unwrap();
        assert_eq!(again.overall_score, evaluation.overall_score);
    }

    #[test]
    fn test_single_cup_overall_equals_cup_total() {
        let input = new_evaluation("Kenya AA", vec![reference_cup(DefectRecord::default())]);
        let evaluation =
            score_new_evaluation(input, Uuid::new_v4(), std::iter::empty(), Utc::now()).unwrap();
        assert_eq!(evaluation.overall_score, evaluation.cups[0].total_score);
    }

    #[test]
    fn test_empty_cups_rejected() {
        let input = new_evaluation("Kenya AA", vec![]);
        let err = score_new_evaluation(input, Uuid::new_v4(), std::iter::empty(), Utc::now())
            .unwrap_err();
        assert_eq!(err.field(), Some("cups"));
    }

    #[test]
    fn test_duplicate_rejected_before_scoring() {
        // The cup is invalid too; the name check must win.
        let mut cup = reference_cup(DefectRecord::default());
        cup.aroma = dec("3");
        let input = new_evaluation("kenya aa", vec![cup]);
        let err = score_new_evaluation(input, Uuid::new_v4(), ["Kenya AA"], Utc::now())
            .unwrap_err();
        assert!(matches!(err, ScoringError::DuplicateName(_)));
    }

    #[test]
    fn test_cup_errors_carry_cup_index() {
        let mut bad = reference_cup(DefectRecord::default());
        bad.checks.clean_cup.pop();
        let input = new_evaluation(
            "Kenya AA",
            vec![reference_cup(DefectRecord::default()), bad],
        );
        let err = score_new_evaluation(input, Uuid::new_v4(), std::iter::empty(), Utc::now())
            .unwrap_err();
        assert_eq!(err.field(), Some("cups[1].checks.clean_cup"));
    }

    #[test]
    fn test_attribute_averages() {
        let input = new_evaluation(
            "Kenya AA",
            vec![
                reference_cup(DefectRecord::default()),
                reference_cup(DefectRecord::fault(1)),
            ],
        );
        let evaluation =
            score_new_evaluation(input, Uuid::new_v4(), std::iter::empty(), Utc::now()).unwrap();
        let score = aggregate_evaluation(&evaluation, std::iter::empty()).unwrap();
        let averages = score.attribute_averages();
        assert_eq!(averages.aroma, dec("8.5"));
        assert_eq!(averages.defects, dec("2"));
        assert_eq!(averages.sweetness, dec("10"));
        assert_eq!(score.overall_score, dec("77.5"));
        assert_eq!(score.classification(), CoffeeClassification::BelowSpecialty);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify_by_score(dec("90.0")), CoffeeClassification::Outstanding);
        assert_eq!(classify_by_score(dec("89.99")), CoffeeClassification::Excellent);
        assert_eq!(classify_by_score(dec("85.0")), CoffeeClassification::Excellent);
        assert_eq!(classify_by_score(dec("84.99")), CoffeeClassification::VeryGood);
        assert_eq!(classify_by_score(dec("80.0")), CoffeeClassification::VeryGood);
        assert_eq!(classify_by_score(dec("79.99")), CoffeeClassification::BelowSpecialty);
    }
}
