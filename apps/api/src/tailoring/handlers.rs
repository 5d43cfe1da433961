//! Axum route handlers for the Tailoring API.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bundle::{OutputBundle, COVER_LETTER_FILENAME, CV_FILENAME, ZIP_FILENAME};
use crate::errors::AppError;
use crate::state::AppState;
use crate::tailoring::pipeline::{tailor_documents, TailorInput};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TailorRequest {
    pub job_ad: Option<String>,
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorResponse {
    pub cv_pdf: String,
    pub cover_letter_pdf: String,
    pub zip_file: String,
    pub cv_filename: String,
    pub cover_letter_filename: String,
    pub zip_filename: String,
}

impl From<OutputBundle> for TailorResponse {
    fn from(bundle: OutputBundle) -> Self {
        Self {
            cv_pdf: STANDARD.encode(&bundle.cv_pdf),
            cover_letter_pdf: STANDARD.encode(&bundle.cover_letter_pdf),
            zip_file: STANDARD.encode(&bundle.zip),
            cv_filename: CV_FILENAME.to_string(),
            cover_letter_filename: COVER_LETTER_FILENAME.to_string(),
            zip_filename: ZIP_FILENAME.to_string(),
        }
    }
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidInput(format!("date must be YYYY-MM-DD, got '{s}'"))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/tailor
///
/// Tailors the résumé and cover letter to a job ad and returns both PDFs and
/// a zip of them, base64-encoded.
pub async fn handle_tailor(
    State(state): State<AppState>,
    payload: Result<Json<TailorRequest>, JsonRejection>,
) -> Result<Json<TailorResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let job_ad = request
        .job_ad
        .filter(|ad| !ad.trim().is_empty())
        .ok_or_else(|| AppError::MissingInput("Job ad is required".to_string()))?;
    let date = parse_date(request.date.as_deref())?;

    let generator = state
        .generator
        .as_deref()
        .ok_or(AppError::MissingCredential)?;

    info!("Tailoring documents for a {}-character job ad", job_ad.len());
    let bundle = tailor_documents(
        generator,
        state.renderer.as_ref(),
        &state.settings,
        TailorInput { job_ad, date },
    )
    .await?;

    Ok(Json(bundle.into()))
}
