//! Tailoring pipeline: turns a job ad into a tailored résumé, cover letter
//! and zip.
//!
//! Flow: load templates → generate CV → generate cover letter (with the
//! tailored CV as context) → extract YAML → patch dates → validate → write to
//! a scratch directory → render both → discover PDFs → archive.
//!
//! Any failing step aborts the request. Nothing is persisted between requests.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::bundle::OutputBundle;
use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::prompts::{STYLE_POLICY, YAML_ONLY_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::render::discovery::{
    discover, pin_pdf_path, DiscoveryError, COVER_LETTER_PDF_PATH, CV_PDF_PATH,
};
use crate::render::{DocumentRenderer, RenderError, RenderReport};
use crate::tailoring::dates::{patch_cover_letter_date, patch_cv_date};
use crate::tailoring::extract::extract_yaml;
use crate::tailoring::prompts::{fill_prompt, COVER_LETTER_PROMPT_TEMPLATE, CV_PROMPT_TEMPLATE};
use crate::tailoring::scratch;
use crate::tailoring::templates::{self, Template};
use crate::tailoring::validate::validate_yaml;

const CV_DOCUMENT: &str = "CV";
const COVER_LETTER_DOCUMENT: &str = "cover letter";
const CV_YAML_FILE: &str = "tailored_cv.yaml";
const COVER_LETTER_YAML_FILE: &str = "tailored_cover_letter.yaml";

/// Where templates come from and where scratch work happens.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub template_dirs: Vec<PathBuf>,
    pub cv_template: String,
    pub cover_letter_template: String,
    pub scratch_root: PathBuf,
    pub keep_scratch: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            template_dirs: templates::candidate_dirs(&config.templates),
            cv_template: config.templates.cv_file.clone(),
            cover_letter_template: config.templates.cover_letter_file.clone(),
            scratch_root: config.scratch_root.clone(),
            keep_scratch: config.keep_scratch,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TailorInput {
    pub job_ad: String,
    pub date: NaiveDate,
}

pub fn build_cv_prompt(job_ad: &str, template: &Template) -> String {
    fill_prompt(
        CV_PROMPT_TEMPLATE,
        &[
            ("job_ad", job_ad),
            ("template_yaml", &template.to_yaml()),
            ("style_policy", STYLE_POLICY),
        ],
    )
}

pub fn build_cover_letter_prompt(job_ad: &str, template: &Template, tailored_cv: &str) -> String {
    fill_prompt(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("job_ad", job_ad),
            ("template_yaml", &template.to_yaml()),
            ("tailored_cv_yaml", tailored_cv),
            ("style_policy", STYLE_POLICY),
        ],
    )
}

/// Pins the document's output path and serializes it for the renderer.
fn prepare_for_render(
    document: &mut serde_yaml::Value,
    pdf_path: &str,
    label: &str,
) -> Result<String, AppError> {
    pin_pdf_path(document, pdf_path);
    let yaml = serde_yaml::to_string(document)
        .with_context(|| format!("Failed to serialize tailored {label}"))?;
    Ok(yaml)
}

/// Runs the full pipeline for one request.
pub async fn tailor_documents(
    generator: &dyn TextGenerator,
    renderer: &dyn DocumentRenderer,
    settings: &PipelineSettings,
    input: TailorInput,
) -> Result<OutputBundle, AppError> {
    // Step 1: Templates
    let (dirs, cv_file, letter_file) = (
        settings.template_dirs.clone(),
        settings.cv_template.clone(),
        settings.cover_letter_template.clone(),
    );
    let templates = tokio::task::spawn_blocking(move || {
        templates::load_from_dirs(&dirs, &cv_file, &letter_file)
    })
    .await
    .context("Template loading task failed")??;
    info!("Loaded templates from {}", templates.cv.path.display());

    // Step 2: CV generation, then the cover letter which sees the tailored CV
    let cv_raw = generator
        .generate(&build_cv_prompt(&input.job_ad, &templates.cv), YAML_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Generation(format!("CV generation failed: {e}")))?;
    let cv_yaml = patch_cv_date(extract_yaml(&cv_raw), input.date);
    info!("CV tailored ({} bytes)", cv_yaml.len());

    let letter_prompt =
        build_cover_letter_prompt(&input.job_ad, &templates.cover_letter, &cv_yaml);
    let letter_raw = generator
        .generate(&letter_prompt, YAML_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Generation(format!("Cover letter generation failed: {e}")))?;
    let letter_yaml = patch_cover_letter_date(extract_yaml(&letter_raw), input.date);
    info!("Cover letter tailored ({} bytes)", letter_yaml.len());

    // Step 3: Validation, then each document gets its own output file
    let mut cv_doc = validate_yaml(CV_DOCUMENT, &cv_yaml)?;
    let mut letter_doc = validate_yaml(COVER_LETTER_DOCUMENT, &letter_yaml)?;
    let cv_yaml = prepare_for_render(&mut cv_doc, CV_PDF_PATH, CV_DOCUMENT)?;
    let letter_yaml =
        prepare_for_render(&mut letter_doc, COVER_LETTER_PDF_PATH, COVER_LETTER_DOCUMENT)?;

    // Step 4: Scratch files
    let scratch = scratch::create(&settings.scratch_root, settings.keep_scratch)
        .context("Failed to create scratch directory")?;
    let cv_path = scratch.path().join(CV_YAML_FILE);
    let letter_path = scratch.path().join(COVER_LETTER_YAML_FILE);
    tokio::fs::write(&cv_path, &cv_yaml)
        .await
        .context("Failed to write tailored CV")?;
    tokio::fs::write(&letter_path, &letter_yaml)
        .await
        .context("Failed to write tailored cover letter")?;

    // Step 5: Rendering, sequentially
    let cv_report = renderer
        .render(&cv_path, scratch.path())
        .await
        .map_err(|e| render_failure(CV_DOCUMENT, e))?;
    let letter_report = renderer
        .render(&letter_path, scratch.path())
        .await
        .map_err(|e| render_failure(COVER_LETTER_DOCUMENT, e))?;
    info!(
        "Rendered CV via {} and cover letter via {}",
        cv_report.strategy, letter_report.strategy
    );

    // Step 6: Discovery
    let workdir = scratch.path().to_path_buf();
    let name_hint = cv_doc["cv"]["name"].as_str().map(str::to_string);
    let artifacts = tokio::task::spawn_blocking(move || discover(&workdir, name_hint.as_deref()))
        .await
        .context("Artifact discovery task failed")?
        .map_err(|e| artifact_failure(e, &cv_report, &letter_report))?;
    info!(
        "Found PDFs: {} and {}",
        artifacts.cv.display(),
        artifacts.cover_letter.display()
    );

    let cv_pdf = tokio::fs::read(&artifacts.cv)
        .await
        .context("Failed to read rendered CV")?;
    let cover_letter_pdf = tokio::fs::read(&artifacts.cover_letter)
        .await
        .context("Failed to read rendered cover letter")?;

    // Step 7: Archive
    OutputBundle::new(cv_pdf, cover_letter_pdf).map_err(|e| AppError::Archive(e.to_string()))
}

fn render_failure(document: &'static str, e: RenderError) -> AppError {
    AppError::Render {
        document,
        details: json!({ "document": document, "attempts": e.attempts }),
    }
}

fn artifact_failure(e: DiscoveryError, cv: &RenderReport, letter: &RenderReport) -> AppError {
    let mut details = e.details();
    details["renderLog"] = json!({ "cv": cv, "coverLetter": letter });
    AppError::ArtifactNotFound {
        message: e.message(),
        details,
    }
}
