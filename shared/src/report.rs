//! Report projections: radar series, report documents, PDF line items and
//! the narrative payload
//!
//! Everything here is a pure mapping from a stored evaluation. Scores are
//! recomputed through the aggregators so a report always agrees with
//! `aggregate_evaluation`. Labels are resolved through an injected
//! [`Translate`] implementation, except for PDF line items which carry
//! untranslated keys.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ScoringError, ScoringResult};
use crate::models::{
    Attribute, CoffeeClassification, CupEvaluation, Evaluation, Intensity, NewCupEvaluation,
    Phase, RoastLevel, ScoreSet,
};
use crate::scoring::{
    aggregate_evaluation, consistency_points, round_score, sensory_scores, CupInputs,
    ScoreBreakdown,
};

/// Localization lookup: label key to display string
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

// ============================================================================
// Radar Series
// ============================================================================

/// The seven points plotted on the score radar chart
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RadarSeries {
    pub aroma: Decimal,
    pub flavor: Decimal,
    pub aftertaste: Decimal,
    pub acidity: Decimal,
    pub body: Decimal,
    pub balance: Decimal,
    /// Sweetness points, 10 when every reference cup was sweet
    pub sweetness: Decimal,
}

/// One labelled point of a radar series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RadarPoint {
    pub attribute: Attribute,
    pub value: Decimal,
}

impl RadarSeries {
    /// Points in chart order
    pub fn points(&self) -> Vec<RadarPoint> {
        [
            (Attribute::Aroma, self.aroma),
            (Attribute::Flavor, self.flavor),
            (Attribute::Aftertaste, self.aftertaste),
            (Attribute::Acidity, self.acidity),
            (Attribute::Body, self.body),
            (Attribute::Balance, self.balance),
            (Attribute::Sweetness, self.sweetness),
        ]
        .into_iter()
        .map(|(attribute, value)| RadarPoint { attribute, value })
        .collect()
    }

    fn rounded(self) -> Self {
        Self {
            aroma: round_score(self.aroma),
            flavor: round_score(self.flavor),
            aftertaste: round_score(self.aftertaste),
            acidity: round_score(self.acidity),
            body: round_score(self.body),
            balance: round_score(self.balance),
            sweetness: round_score(self.sweetness),
        }
    }
}

/// Anything that can be plotted as a radar series: a cup or a whole evaluation
pub trait RadarSource {
    fn radar_series(&self, phase: Option<Phase>) -> ScoringResult<RadarSeries>;
}

fn cup_radar<C>(cup: &C, phase: Option<Phase>) -> ScoringResult<RadarSeries>
where
    C: CupInputs + ?Sized,
{
    let sensory = sensory_scores(cup, phase)?;
    let sweetness = consistency_points("checks.sweetness", &cup.checks().sweetness)?;
    Ok(RadarSeries {
        aroma: sensory.aroma,
        flavor: sensory.flavor,
        aftertaste: sensory.aftertaste,
        acidity: sensory.acidity,
        body: sensory.body,
        balance: sensory.balance,
        sweetness,
    })
}

impl RadarSource for CupEvaluation {
    fn radar_series(&self, phase: Option<Phase>) -> ScoringResult<RadarSeries> {
        cup_radar(self, phase).map(RadarSeries::rounded)
    }
}

impl RadarSource for NewCupEvaluation {
    fn radar_series(&self, phase: Option<Phase>) -> ScoringResult<RadarSeries> {
        cup_radar(self, phase).map(RadarSeries::rounded)
    }
}

impl RadarSource for Evaluation {
    /// Mean of the cup series
    fn radar_series(&self, phase: Option<Phase>) -> ScoringResult<RadarSeries> {
        if self.cups.is_empty() {
            return Err(ScoringError::validation(
                "cups",
                "an evaluation must contain at least one cup",
            ));
        }

        let series = self
            .cups
            .iter()
            .enumerate()
            .map(|(i, cup)| cup_radar(cup, phase).map_err(|e| e.prefixed(&format!("cups[{}]", i))))
            .collect::<ScoringResult<Vec<_>>>()?;

        let count = Decimal::from(series.len());
        let mean = |pick: fn(&RadarSeries) -> Decimal| -> Decimal {
            series.iter().map(pick).sum::<Decimal>() / count
        };

        Ok(RadarSeries {
            aroma: mean(|s| s.aroma),
            flavor: mean(|s| s.flavor),
            aftertaste: mean(|s| s.aftertaste),
            acidity: mean(|s| s.acidity),
            body: mean(|s| s.body),
            balance: mean(|s| s.balance),
            sweetness: mean(|s| s.sweetness),
        }
        .rounded())
    }
}

/// Radar series of a cup or an evaluation, for one phase or averaged over all
pub fn to_radar_series<S>(source: &S, phase: Option<Phase>) -> ScoringResult<RadarSeries>
where
    S: RadarSource + ?Sized,
{
    source.radar_series(phase)
}

// ============================================================================
// Report Document
// ============================================================================

/// A score with its translated label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledScore {
    pub attribute: Attribute,
    pub label: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportHeader {
    pub title: String,
    pub coffee_name: String,
    pub roast_level: RoastLevel,
    pub roast_level_label: String,
    /// ISO 8601 date of the tasting
    pub date: String,
    pub water_temperature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub overall_score: Decimal,
    pub classification: CoffeeClassification,
    pub classification_label: String,
    pub cup_count: usize,
    /// Mean of each attribute across cups
    pub attribute_averages: Vec<LabeledScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub label: String,
    pub scores: Vec<LabeledScore>,
    pub acidity_intensity: Intensity,
    pub body_intensity: Intensity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CupReport {
    /// 1-based position of the cup in the evaluation
    pub number: usize,
    pub label: String,
    pub total_score: Decimal,
    pub cupper_score: Decimal,
    pub aroma_category: Option<String>,
    pub dry_fragrance: Intensity,
    pub wet_aroma: Intensity,
    pub breakdown: Vec<LabeledScore>,
    pub phases: Vec<PhaseReport>,
    pub radar: RadarSeries,
}

/// Serializable report of one evaluation, used for the JSON export and by
/// the PDF renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub summary: ReportSummary,
    pub cups: Vec<CupReport>,
    pub notes: String,
}

impl ReportDocument {
    pub fn to_json(&self) -> ScoringResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn labeled_breakdown<T>(breakdown: &ScoreBreakdown, translator: &T) -> Vec<LabeledScore>
where
    T: Translate + ?Sized,
{
    breakdown
        .entries()
        .into_iter()
        .map(|(attribute, value)| LabeledScore {
            attribute,
            label: translator.translate(attribute.label_key()),
            value: round_score(value),
        })
        .collect()
}

fn phase_report<T>(phase: Phase, set: &ScoreSet, translator: &T) -> PhaseReport
where
    T: Translate + ?Sized,
{
    PhaseReport {
        phase,
        label: translator.translate(phase.label_key()),
        scores: set
            .entries()
            .into_iter()
            .map(|(attribute, value)| LabeledScore {
                attribute,
                label: translator.translate(attribute.label_key()),
                value,
            })
            .collect(),
        acidity_intensity: set.acidity_intensity,
        body_intensity: set.body_intensity,
    }
}

/// Build the report document of an evaluation
pub fn to_report_document<T>(evaluation: &Evaluation, translator: &T) -> ScoringResult<ReportDocument>
where
    T: Translate + ?Sized,
{
    let score = aggregate_evaluation(evaluation, std::iter::empty())?;
    let classification = score.classification();

    let cups = evaluation
        .cups
        .iter()
        .zip(&score.cups)
        .enumerate()
        .map(|(i, (cup, derived))| -> ScoringResult<CupReport> {
            Ok(CupReport {
                number: i + 1,
                label: format!("{} {}", translator.translate("report.cup"), i + 1),
                total_score: derived.total_score,
                cupper_score: derived.cupper_score,
                aroma_category: cup.aroma_category.clone(),
                dry_fragrance: cup.dry_fragrance,
                wet_aroma: cup.wet_aroma,
                breakdown: labeled_breakdown(&derived.breakdown, translator),
                phases: cup
                    .scores
                    .iter()
                    .map(|(phase, set)| phase_report(*phase, set, translator))
                    .collect(),
                radar: cup.radar_series(None)?,
            })
        })
        .collect::<ScoringResult<Vec<_>>>()?;

    Ok(ReportDocument {
        header: ReportHeader {
            title: translator.translate("report.title"),
            coffee_name: evaluation.coffee_name.clone(),
            roast_level: evaluation.roast_level,
            roast_level_label: translator.translate(evaluation.roast_level.label_key()),
            date: evaluation.created_at.date_naive().to_string(),
            water_temperature: evaluation.water_temperature.clone(),
        },
        summary: ReportSummary {
            overall_score: score.overall_score,
            classification,
            classification_label: translator.translate(classification.label_key()),
            cup_count: score.cups.len(),
            attribute_averages: labeled_breakdown(&score.attribute_averages(), translator),
        },
        cups,
        notes: evaluation.notes.clone(),
    })
}

// ============================================================================
// PDF Line Items
// ============================================================================

/// Block of the page a line belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "cup", rename_all = "snake_case")]
pub enum ReportSection {
    Header,
    Summary,
    /// 1-based cup number
    Cup(usize),
    Notes,
}

/// Where the renderer should place a line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionHint {
    pub section: ReportSection,
    /// Row within the section, from 0
    pub row: u32,
    /// Nesting depth: 0 for section rows, 1 for phase headings, 2 below them
    pub indent: u8,
}

/// Value column of a PDF line, tagged so a renderer knows what to do with it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LineValue {
    Score(Decimal),
    /// Literal text, printed as is
    Text(String),
    /// Label key the renderer translates
    LabelKey(String),
    Empty,
}

/// One draw instruction for the PDF renderer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Untranslated label key
    pub label_key: String,
    pub value: LineValue,
    pub position: PositionHint,
}

struct LineWriter {
    items: Vec<LineItem>,
    section: ReportSection,
    row: u32,
}

impl LineWriter {
    fn section(&mut self, section: ReportSection) {
        self.section = section;
        self.row = 0;
    }

    fn push(&mut self, label_key: impl Into<String>, value: LineValue, indent: u8) {
        self.items.push(LineItem {
            label_key: label_key.into(),
            value,
            position: PositionHint {
                section: self.section,
                row: self.row,
                indent,
            },
        });
        self.row += 1;
    }
}

/// Flatten an evaluation into ordered, language-agnostic draw instructions
pub fn to_pdf_line_items(evaluation: &Evaluation) -> ScoringResult<Vec<LineItem>> {
    let score = aggregate_evaluation(evaluation, std::iter::empty())?;

    let mut out = LineWriter {
        items: Vec::new(),
        section: ReportSection::Header,
        row: 0,
    };

    out.push(
        "report.coffee_name",
        LineValue::Text(evaluation.coffee_name.clone()),
        0,
    );
    out.push(
        "report.roast_level",
        LineValue::LabelKey(evaluation.roast_level.label_key().to_string()),
        0,
    );
    out.push(
        "report.date",
        LineValue::Text(evaluation.created_at.date_naive().to_string()),
        0,
    );
    out.push(
        "report.water_temperature",
        LineValue::Text(evaluation.water_temperature.clone()),
        0,
    );

    out.section(ReportSection::Summary);
    out.push("report.overall_score", LineValue::Score(score.overall_score), 0);
    out.push(
        "report.classification",
        LineValue::LabelKey(score.classification().label_key().to_string()),
        0,
    );
    for (attribute, value) in score.attribute_averages().entries() {
        out.push(attribute.label_key(), LineValue::Score(round_score(value)), 1);
    }

    for (i, (cup, derived)) in evaluation.cups.iter().zip(&score.cups).enumerate() {
        out.section(ReportSection::Cup(i + 1));
        out.push("report.cup_total", LineValue::Score(derived.total_score), 0);
        out.push("report.cupper_score", LineValue::Score(derived.cupper_score), 0);
        out.push(
            Attribute::Aroma.label_key(),
            LineValue::Score(cup.aroma),
            0,
        );
        for (phase, set) in &cup.scores {
            out.push(phase.label_key(), LineValue::Empty, 1);
            for (attribute, value) in set.entries() {
                out.push(attribute.label_key(), LineValue::Score(value), 2);
            }
        }
        for attribute in Attribute::CONSISTENCY {
            out.push(
                attribute.label_key(),
                LineValue::Score(derived.breakdown.get(attribute)),
                0,
            );
        }
        out.push(
            Attribute::Defects.label_key(),
            LineValue::Score(derived.breakdown.defects),
            0,
        );
    }

    if !evaluation.notes.trim().is_empty() {
        out.section(ReportSection::Notes);
        out.push("report.notes", LineValue::Text(evaluation.notes.clone()), 0);
    }

    Ok(out.items)
}

// ============================================================================
// Narrative Payload
// ============================================================================

#[derive(Serialize)]
struct NarrativeCup<'a> {
    number: usize,
    aroma_category: Option<&'a str>,
    dry_fragrance: Intensity,
    wet_aroma: Intensity,
    aroma: Decimal,
    scores: &'a std::collections::BTreeMap<Phase, ScoreSet>,
    total_score: Decimal,
}

#[derive(Serialize)]
struct NarrativePayload<'a> {
    coffee_name: &'a str,
    roast_level: RoastLevel,
    water_temperature: &'a str,
    overall_score: Decimal,
    classification: CoffeeClassification,
    notes: &'a str,
    cups: Vec<NarrativeCup<'a>>,
}

/// Serialize an evaluation for the AI narrative service. Owner and record
/// identity are left out; intensity descriptors are kept.
pub fn narrative_payload(evaluation: &Evaluation) -> ScoringResult<String> {
    let score = aggregate_evaluation(evaluation, std::iter::empty())?;

    let payload = NarrativePayload {
        coffee_name: &evaluation.coffee_name,
        roast_level: evaluation.roast_level,
        water_temperature: &evaluation.water_temperature,
        overall_score: score.overall_score,
        classification: score.classification(),
        notes: &evaluation.notes,
        cups: evaluation
            .cups
            .iter()
            .zip(&score.cups)
            .enumerate()
            .map(|(i, (cup, derived))| NarrativeCup {
                number: i + 1,
                aroma_category: cup.aroma_category.as_deref(),
                dry_fragrance: cup.dry_fragrance,
                wet_aroma: cup.wet_aroma,
                aroma: cup.aroma,
                scores: &cup.scores,
                total_score: derived.total_score,
            })
            .collect(),
    };

    Ok(serde_json::to_string(&payload)?)
}
