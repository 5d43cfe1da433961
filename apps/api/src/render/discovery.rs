//! Artifact discovery: finds the résumé and cover-letter PDFs the renderer
//! produced.
//!
//! HEURISTIC: the renderer does not report which files it wrote, so roles are
//! assigned from file names alone. A file containing a `cover` or `letter`
//! token is a cover letter; anything else is a résumé candidate, preferring
//! one that carries the candidate's name. When one role is still empty and a
//! single PDF is left over, that PDF takes the role by elimination.
//!
//! Both documents render into the same directory and RenderCV names its
//! output after `cv.name`, so each document's PDF path is pinned in its
//! settings before rendering (`pin_pdf_path`). The letter's file then always
//! carries the cover token.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use serde_yaml::Value as YamlValue;

/// Directory the renderer writes into, relative to its working directory.
pub const OUTPUT_DIR: &str = "rendercv_output";

/// Output paths handed to RenderCV. It expands `NAME_IN_SNAKE_CASE` from
/// `cv.name` itself.
pub const CV_PDF_PATH: &str = "rendercv_output/NAME_IN_SNAKE_CASE_CV.pdf";
pub const COVER_LETTER_PDF_PATH: &str = "rendercv_output/NAME_IN_SNAKE_CASE_Cover_Letter.pdf";

const COVER_TOKENS: [&str; 2] = ["cover", "letter"];

/// Sets `settings.render_command.pdf_path`, creating the mappings on the way.
/// Non-mapping values in the way are replaced.
pub fn pin_pdf_path(document: &mut YamlValue, pdf_path: &str) {
    let mut node = document;
    for key in ["settings", "render_command", "pdf_path"] {
        if !node.is_mapping() {
            *node = YamlValue::Mapping(Default::default());
        }
        node = match node {
            YamlValue::Mapping(map) => map
                .entry(YamlValue::from(key))
                .or_insert_with(|| YamlValue::Mapping(Default::default())),
            _ => return,
        };
    }
    *node = YamlValue::from(pdf_path);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub cv: PathBuf,
    pub cover_letter: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    MissingOutputDir {
        output_dir: PathBuf,
        listing: Vec<String>,
    },
    Unmatched {
        output_dir: PathBuf,
        pdfs: Vec<String>,
        cv: Option<String>,
        cover_letter: Option<String>,
    },
}

impl DiscoveryError {
    pub fn message(&self) -> String {
        match self {
            DiscoveryError::MissingOutputDir { listing, .. } => format!(
                "RenderCV output directory not found. Files in scratch directory: {listing:?}"
            ),
            DiscoveryError::Unmatched { pdfs, .. } => {
                format!("Failed to find generated PDFs. Found PDFs: {pdfs:?}")
            }
        }
    }

    pub fn details(&self) -> Value {
        match self {
            DiscoveryError::MissingOutputDir {
                output_dir,
                listing,
            } => json!({
                "outputDir": output_dir.display().to_string(),
                "allFiles": listing,
            }),
            DiscoveryError::Unmatched {
                output_dir,
                pdfs,
                cv,
                cover_letter,
            } => json!({
                "outputDir": output_dir.display().to_string(),
                "pdfFiles": pdfs,
                "cvPdf": cv,
                "coverLetterPdf": cover_letter,
            }),
        }
    }
}

/// Role assignment over bare file names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMatch<'a> {
    pub cv: Option<&'a str>,
    pub cover_letter: Option<&'a str>,
}

fn is_cover(name: &str) -> bool {
    let lower = name.to_lowercase();
    COVER_TOKENS.iter().any(|token| lower.contains(token))
}

/// `Jane Doe` → `jane_doe`, matching how the renderer names its files.
fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

pub fn match_roles<'a>(pdfs: &'a [String], name_hint: Option<&str>) -> RoleMatch<'a> {
    let hint = name_hint.map(normalize_name).filter(|h| !h.is_empty());

    let mut cv = hint
        .as_deref()
        .and_then(|hint| {
            pdfs.iter()
                .position(|p| !is_cover(p) && p.to_lowercase().contains(hint))
        })
        .or_else(|| pdfs.iter().position(|p| !is_cover(p)));

    let mut cover_letter = (0..pdfs.len()).find(|&i| Some(i) != cv && is_cover(&pdfs[i]));

    let leftover: Vec<usize> = (0..pdfs.len())
        .filter(|i| Some(*i) != cv && Some(*i) != cover_letter)
        .collect();
    if let [only] = leftover[..] {
        match (cv, cover_letter) {
            (Some(_), None) => cover_letter = Some(only),
            (None, Some(_)) => cv = Some(only),
            _ => {}
        }
    }

    RoleMatch {
        cv: cv.map(|i| pdfs[i].as_str()),
        cover_letter: cover_letter.map(|i| pdfs[i].as_str()),
    }
}

/// Lists PDFs in the renderer's output directory, sorted by name.
fn list_pdfs(output_dir: &Path) -> Vec<String> {
    let mut pdfs: Vec<String> = std::fs::read_dir(output_dir)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .collect();
    pdfs.sort();
    pdfs
}

/// Recursive listing relative to `root`, for diagnostics.
pub fn list_tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(&path);
            out.push(relative.display().to_string());
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

pub fn discover(workdir: &Path, name_hint: Option<&str>) -> Result<Artifacts, DiscoveryError> {
    let output_dir = workdir.join(OUTPUT_DIR);
    if !output_dir.is_dir() {
        return Err(DiscoveryError::MissingOutputDir {
            output_dir,
            listing: list_tree(workdir),
        });
    }

    let pdfs = list_pdfs(&output_dir);
    let roles = match_roles(&pdfs, name_hint);

    match (roles.cv, roles.cover_letter) {
        (Some(cv), Some(cover_letter)) => Ok(Artifacts {
            cv: output_dir.join(cv),
            cover_letter: output_dir.join(cover_letter),
        }),
        (cv, cover_letter) => Err(DiscoveryError::Unmatched {
            pdfs: pdfs.clone(),
            cv: cv.map(str::to_string),
            cover_letter: cover_letter.map(str::to_string),
            output_dir,
        }),
    }
}
