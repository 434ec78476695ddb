//! Classifier output domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassifierError;

/// Model outputs above this probability are read as "tumor present"
pub const TUMOR_THRESHOLD: f32 = 0.5;

pub const TUMOR_DETECTED: &str = "Tumor detected";
pub const NO_TUMOR_DETECTED: &str = "No tumor detected";

/// Diagnosis produced by the image classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Confidence in `label`, in [0, 100]
    pub confidence_percent: f32,
    /// Raw tumor probability, in [0, 100]
    pub tumor_probability_percent: f32,
}

impl Classification {
    /// Builds a classification from the model's sigmoid output
    pub fn from_probability(probability: f32) -> Result<Self, ClassifierError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::PredictionError(format!(
                "model returned probability {} outside [0, 1]",
                probability
            )));
        }

        let has_tumor = probability > TUMOR_THRESHOLD;
        let (label, confidence) = if has_tumor {
            (TUMOR_DETECTED, probability)
        } else {
            (NO_TUMOR_DETECTED, 1.0 - probability)
        };

        Ok(Self {
            label: label.to_string(),
            confidence_percent: confidence * 100.0,
            tumor_probability_percent: probability * 100.0,
        })
    }

    pub fn has_tumor(&self) -> bool {
        self.label == TUMOR_DETECTED
    }

    /// Line-oriented report, the format the classification stage filters on
    pub fn report(&self) -> String {
        format!(
            "Diagnosis: {}\nConfidence: {:.1}%\nTumor probability: {:.1}%",
            self.label, self.confidence_percent, self.tumor_probability_percent
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.confidence_percent)
    }
}
