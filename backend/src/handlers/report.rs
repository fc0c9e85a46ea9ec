//! HTTP handlers for report projections and AI narratives
//!
//! All projections read a stored evaluation and re-derive scores through the
//! shared aggregators. Display settings come from configuration and may be
//! overridden per request.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    narrative_payload, to_pdf_line_items, to_radar_series, to_report_document, DisplaySettings,
    Language, LineItem, Phase, RadarPoint, RadarSeries, ReportDocument, Theme,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::CurrentUser,
    services::{EvaluationService, LabelTable},
    AppState,
};

/// Per-request display overrides
#[derive(Debug, Default, Deserialize)]
pub struct DisplayQuery {
    pub language: Option<Language>,
    pub theme: Option<Theme>,
}

impl DisplayQuery {
    fn apply(&self, defaults: DisplaySettings) -> DisplaySettings {
        DisplaySettings {
            language: self.language.unwrap_or(defaults.language),
            theme: self.theme.unwrap_or(defaults.theme),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RadarQuery {
    /// Restrict the series to one tasting phase
    pub phase: Option<String>,
    /// One-based cup number; the evaluation mean when absent
    pub cup: Option<usize>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Serialize)]
pub struct RadarResponse {
    pub theme: Theme,
    pub series: RadarSeries,
    pub points: Vec<RadarPoint>,
}

#[derive(Debug, Serialize)]
pub struct PdfExport {
    pub settings: DisplaySettings,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Serialize)]
pub struct NarrativeResponse {
    pub evaluation_id: Uuid,
    pub language: Language,
    pub text: String,
}

fn parse_phase(phase: Option<&str>) -> AppResult<Option<Phase>> {
    match phase.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(value) => Phase::from_str(value).map(Some).ok_or_else(|| AppError::Validation {
            field: "phase".to_string(),
            message: format!("Unknown phase '{}', expected hot, warm or cold", value),
        }),
    }
}

/// Translated report document
pub async fn get_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
    Query(display): Query<DisplayQuery>,
) -> AppResult<Json<ReportDocument>> {
    let settings = display.apply(state.config.display);
    let service = EvaluationService::new(state.db);
    let evaluation = service.get(current_user.0.user_id, evaluation_id).await?;

    let labels = LabelTable::for_language(settings.language);
    let document = to_report_document(&evaluation, &|key: &str| labels.label(key))?;
    Ok(Json(document))
}

/// Language-agnostic PDF draw instructions
pub async fn get_pdf_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
    Query(display): Query<DisplayQuery>,
) -> AppResult<Json<PdfExport>> {
    let settings = display.apply(state.config.display);
    let service = EvaluationService::new(state.db);
    let evaluation = service.get(current_user.0.user_id, evaluation_id).await?;

    let items = to_pdf_line_items(&evaluation)?;
    Ok(Json(PdfExport { settings, items }))
}

/// Radar chart series for the whole evaluation or a single cup
pub async fn get_radar(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
    Query(query): Query<RadarQuery>,
) -> AppResult<Json<RadarResponse>> {
    let phase = parse_phase(query.phase.as_deref())?;
    let theme = query.theme.unwrap_or(state.config.display.theme);
    let service = EvaluationService::new(state.db);
    let evaluation = service.get(current_user.0.user_id, evaluation_id).await?;

    let series = match query.cup {
        None => to_radar_series(&evaluation, phase)?,
        Some(number) => {
            let cup = number
                .checked_sub(1)
                .and_then(|i| evaluation.cups.get(i))
                .ok_or_else(|| AppError::NotFound(format!("Cup {}", number)))?;
            to_radar_series(cup, phase)?
        }
    };

    Ok(Json(RadarResponse {
        theme,
        points: series.points(),
        series,
    }))
}

/// Ask the narrative service to describe an evaluation
pub async fn generate_narrative(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(evaluation_id): Path<Uuid>,
    Query(display): Query<DisplayQuery>,
) -> AppResult<Json<NarrativeResponse>> {
    let client = state
        .narrative
        .clone()
        .ok_or_else(|| AppError::Configuration("Narrative service is not configured".into()))?;
    let settings = display.apply(state.config.display);

    let service = EvaluationService::new(state.db);
    let evaluation = service.get(current_user.0.user_id, evaluation_id).await?;

    let payload = narrative_payload(&evaluation)?;
    let text = client.generate(&payload, settings.language).await?;

    tracing::info!(%evaluation_id, chars = text.len(), "Narrative generated");

    Ok(Json(NarrativeResponse {
        evaluation_id,
        language: settings.language,
        text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phase() {
        assert_eq!(parse_phase(None).unwrap(), None);
        assert_eq!(parse_phase(Some("")).unwrap(), None);
        assert_eq!(parse_phase(Some("warm")).unwrap(), Some(Phase::Warm));
        assert!(matches!(
            parse_phase(Some("tepid")),
            Err(AppError::Validation { field, .. }) if field == "phase"
        ));
    }

    #[test]
    fn test_display_query_overrides_defaults() {
        let defaults = DisplaySettings {
            language: Language::English,
            theme: Theme::Dark,
        };
        let query = DisplayQuery {
            language: Some(Language::Spanish),
            theme: None,
        };
        let settings = query.apply(defaults);
        assert_eq!(settings.language, Language::Spanish);
        assert_eq!(settings.theme, Theme::Dark);
    }
}
