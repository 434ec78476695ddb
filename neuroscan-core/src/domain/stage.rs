//! Stage domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::run::StageResults;

/// Results key reserved for the treatment lookup side channel
pub const TREATMENTS_KEY: &str = "treatments";

/// Identifier of one of the fixed pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Classification,
    ClinicalAnalysis,
    Recommendations,
    Report,
}

impl StageId {
    /// Every stage in execution order
    pub const ALL: [StageId; 4] = [
        StageId::Classification,
        StageId::ClinicalAnalysis,
        StageId::Recommendations,
        StageId::Report,
    ];

    /// Stable string key used in run results
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Classification => "classification",
            StageId::ClinicalAnalysis => "clinical_analysis",
            StageId::Recommendations => "recommendations",
            StageId::Report => "report",
        }
    }

    /// Parses a results key back into a stage id
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == key)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view handed to input builders
///
/// Only exposes what a stage is allowed to depend on: the image being analysed
/// and the results accumulated by lower ordinals.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub image_reference: Option<&'a Path>,
    pub results: &'a StageResults,
}

/// A titled block of context passed to an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSection {
    pub title: String,
    pub body: String,
}

/// Structured input for one stage's agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInput {
    /// What the agent is asked to do
    pub description: String,
    /// Shape of the answer the agent should produce
    pub expected_output: String,
    /// Image to analyse, only set for stages that look at the scan
    pub image_path: Option<PathBuf>,
    /// Prior results and reference material, in presentation order
    pub sections: Vec<ContextSection>,
}

impl StageInput {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            image_path: None,
            sections: Vec::new(),
        }
    }

    pub fn with_image(mut self, image_path: Option<&Path>) -> Self {
        self.image_path = image_path.map(Path::to_path_buf);
        self
    }

    pub fn with_section(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(ContextSection {
            title: title.into(),
            body: body.into(),
        });
        self
    }

    /// Looks up a context section by title
    pub fn section(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.body.as_str())
    }

    /// Renders the input as a plain-text task for a language model
    pub fn render(&self) -> String {
        let mut out = self.description.trim().to_string();

        if let Some(path) = &self.image_path {
            out.push_str(&format!("\n\nImage: {}", path.display()));
        }

        for section in &self.sections {
            out.push_str(&format!("\n\n## {}\n{}", section.title, section.body.trim()));
        }

        out.push_str(&format!(
            "\n\n## Expected output\n{}",
            self.expected_output.trim()
        ));
        out
    }
}

/// Builds a stage's input from what lower ordinals produced
///
/// Builders must be total: a missing result is read as empty text.
pub type InputBuilder = fn(&StageContext<'_>) -> StageInput;

/// One step in the fixed stage sequence
#[derive(Clone)]
pub struct PipelineStage {
    pub stage_id: StageId,
    pub display_name: &'static str,
    /// Short task line shown next to the stage in progress displays
    pub summary: &'static str,
    /// 0-based execution position
    pub ordinal: usize,
    pub input_builder: InputBuilder,
    /// Vocabulary used to filter raw agent output; empty keeps the raw text
    pub result_keywords: &'static [&'static str],
}

impl PipelineStage {
    pub fn build_input(&self, context: &StageContext<'_>) -> StageInput {
        (self.input_builder)(context)
    }
}

impl fmt::Debug for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineStage")
            .field("stage_id", &self.stage_id)
            .field("display_name", &self.display_name)
            .field("ordinal", &self.ordinal)
            .field("result_keywords", &self.result_keywords)
            .finish_non_exhaustive()
    }
}
