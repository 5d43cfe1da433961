//! Test doubles for the generation service and the renderer.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm_client::{LlmError, TextGenerator};
use crate::render::{AttemptLog, DocumentRenderer, RenderError, RenderReport};
use crate::tailoring::pipeline::PipelineSettings;

pub const JOB_AD: &str = "Senior Backend Engineer, Acme Corp, Go/Kubernetes experience required";

pub const CV_TEMPLATE: &str = r#"cv:
  name: Jane Doe
  sections:
    summary:
      - Backend engineer with eight years of experience
    experience:
      - company: Initech
        position: Software Engineer
settings:
  current_date: "2024-01-01"
"#;

pub const COVER_LETTER_TEMPLATE: &str = r#"cv:
  name: Jane Doe
  sections:
    "":
      - "[Date]"
      - Dear [Recipient Name],
      - I am applying for the [Position Title] role at [Company Name].
settings:
  current_date: "2024-01-01"
"#;

pub const CV_RESPONSE: &str = "```yaml\ncv:\n  name: Jane Doe\n  sections:\n    summary:\n      - Backend engineer running Go services on Kubernetes\n    experience:\n      - company: Initech\n        position: Software Engineer\nsettings:\n  current_date: \"2024-01-01\"\n```";

pub const COVER_LETTER_RESPONSE: &str = "Here is the tailored letter:\n```yaml\ncv:\n  name: Jane Doe\n  sections:\n    \"\":\n      - \"[Date]\"\n      - Dear Hiring Manager,\n      - I am applying for the Senior Backend Engineer role at Acme Corp.\nsettings:\n  current_date: \"2024-01-01\"\n```\nGood luck!";

/// Replays queued responses and records every prompt it receives.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockGenerator {
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(str::to_string).collect(),
            )),
            ..Self::default()
        }
    }

    pub fn tailoring() -> Self {
        Self::with_responses(vec![CV_RESPONSE, COVER_LETTER_RESPONSE])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            });
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::EmptyContent)
        } else {
            Ok(responses.remove(0))
        }
    }
}

/// Writes a small PDF-like file where RenderCV would: at
/// `settings.render_command.pdf_path` (default `<NAME>_CV.pdf`) with
/// `NAME_IN_SNAKE_CASE` expanded from `cv.name`.
#[derive(Debug, Clone, Default)]
pub struct FakeRenderer {
    pub fail: bool,
    pub skip_output: bool,
}

impl FakeRenderer {
    fn output_path(yaml_path: &Path, workdir: &Path) -> PathBuf {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(&std::fs::read_to_string(yaml_path).unwrap()).unwrap();
        let name = doc["cv"]["name"].as_str().unwrap_or("").replace(' ', "_");
        let pdf_path = doc["settings"]["render_command"]["pdf_path"]
            .as_str()
            .unwrap_or(DEFAULT_PDF_PATH);
        workdir.join(pdf_path.replace("NAME_IN_SNAKE_CASE", &name))
    }
}

const DEFAULT_PDF_PATH: &str = "rendercv_output/NAME_IN_SNAKE_CASE_CV.pdf";

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, yaml_path: &Path, workdir: &Path) -> Result<RenderReport, RenderError> {
        if self.fail {
            return Err(RenderError {
                attempts: vec![AttemptLog {
                    strategy: "fake".to_string(),
                    stderr: "renderer exploded".to_string(),
                    error: Some("exited with 1".to_string()),
                    exit_code: Some(1),
                    ..AttemptLog::default()
                }],
            });
        }

        if !self.skip_output {
            let out = Self::output_path(yaml_path, workdir);
            std::fs::create_dir_all(out.parent().unwrap()).unwrap();
            let stem = yaml_path.file_stem().unwrap().to_string_lossy();
            let body: &[u8] = if stem.contains("cover") {
                b"%PDF-letter"
            } else {
                b"%PDF-cv"
            };
            std::fs::write(out, body).unwrap();
        }

        Ok(RenderReport {
            strategy: "fake".to_string(),
            attempts: Vec::new(),
        })
    }
}

/// Template directory plus scratch root, both cleaned up on drop.
pub struct Fixture {
    pub templates: tempfile::TempDir,
    pub scratch: tempfile::TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_templates(CV_TEMPLATE, COVER_LETTER_TEMPLATE)
    }

    pub fn with_templates(cv: &str, cover_letter: &str) -> Self {
        let templates = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("CV.yaml"), cv).unwrap();
        std::fs::write(templates.path().join("Cover_Letter.yaml"), cover_letter).unwrap();
        Self {
            templates,
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            template_dirs: vec![self.templates.path().to_path_buf()],
            cv_template: "CV.yaml".to_string(),
            cover_letter_template: "Cover_Letter.yaml".to_string(),
            scratch_root: self.scratch.path().to_path_buf(),
            keep_scratch: false,
        }
    }

    /// Scratch directories still present under the scratch root.
    pub fn leftover_scratch(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}
