//! Template acquisition: finds and loads the base résumé and cover-letter YAML.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::TemplateConfig;
use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("CV template file not found. Please ensure {file} is in one of: {searched}")]
    CvNotFound { file: String, searched: String },

    #[error("Cover letter template {file} not found next to the CV template in {dir}")]
    CoverLetterNotFound { file: String, dir: String },

    #[error("Failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template {path} is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::CvNotFound { .. } | TemplateError::CoverLetterNotFound { .. } => {
                AppError::TemplateNotFound(e.to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

/// A loaded base template: the parsed document plus where it came from.
#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub document: Value,
}

impl Template {
    /// Canonical YAML form embedded into prompts.
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(&self.document).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub cv: Template,
    pub cover_letter: Template,
}

/// Directories searched for templates, in priority order.
///
/// An explicit `TEMPLATE_DIR` wins outright; otherwise the working directory
/// is tried first and then its parent.
pub fn candidate_dirs(config: &TemplateConfig) -> Vec<PathBuf> {
    if let Some(dir) = &config.dir {
        return vec![dir.clone()];
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    vec![cwd.clone(), cwd.join("..")]
}

/// Locates both templates. The first directory holding the CV template is
/// used for both files.
pub fn locate(
    dirs: &[PathBuf],
    cv_file: &str,
    cover_letter_file: &str,
) -> Result<(PathBuf, PathBuf), TemplateError> {
    let dir = dirs
        .iter()
        .find(|dir| dir.join(cv_file).is_file())
        .ok_or_else(|| TemplateError::CvNotFound {
            file: cv_file.to_string(),
            searched: dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

    let cover_letter = dir.join(cover_letter_file);
    if !cover_letter.is_file() {
        return Err(TemplateError::CoverLetterNotFound {
            file: cover_letter_file.to_string(),
            dir: dir.display().to_string(),
        });
    }

    Ok((dir.join(cv_file), cover_letter))
}

fn load_one(path: &Path) -> Result<Template, TemplateError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let document = serde_yaml::from_str(&raw).map_err(|source| TemplateError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Template {
        path: path.to_path_buf(),
        document,
    })
}

pub fn load_from_dirs(
    dirs: &[PathBuf],
    cv_file: &str,
    cover_letter_file: &str,
) -> Result<TemplateSet, TemplateError> {
    let (cv_path, cover_letter_path) = locate(dirs, cv_file, cover_letter_file)?;
    debug!("Loading templates from {}", cv_path.display());
    Ok(TemplateSet {
        cv: load_one(&cv_path)?,
        cover_letter: load_one(&cover_letter_path)?,
    })
}
