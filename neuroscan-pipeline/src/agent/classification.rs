use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use neuroscan_core::domain::stage::StageInput;

use super::{AgentPersona, LanguageModel, ReasoningAgent};
use crate::classifier::Classifier;

/// Section title under which the classifier report is shown to the model
pub const CLASSIFIER_OUTPUT: &str = "Classifier output";

/// Radiology agent: runs the classifier, then has the model interpret it
///
/// The answer starts with the classifier report verbatim so the
/// `Diagnosis`/`Confidence` lines survive extraction whatever the model says.
pub struct ClassificationAgent {
    persona: AgentPersona,
    classifier: Arc<dyn Classifier>,
    model: Arc<dyn LanguageModel>,
}

impl ClassificationAgent {
    pub fn new(classifier: Arc<dyn Classifier>, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            persona: AgentPersona::RADIOLOGIST,
            classifier,
            model,
        }
    }
}

#[async_trait]
impl ReasoningAgent for ClassificationAgent {
    fn persona(&self) -> &AgentPersona {
        &self.persona
    }

    async fn invoke(&self, input: &StageInput) -> anyhow::Result<String> {
        let image = input
            .image_path
            .as_deref()
            .context("classification input has no image")?;

        let classification = self
            .classifier
            .classify(image)
            .await
            .with_context(|| format!("Failed to classify {}", image.display()))?;
        info!("Classifier result for {}: {}", image.display(), classification);

        let report = classification.report();
        let task = input.clone().with_section(CLASSIFIER_OUTPUT, report.as_str());
        let interpretation = self
            .model
            .complete(&self.persona.system_prompt(), &task.render())
            .await
            .context("Radiology interpretation failed")?;

        Ok(format!("{}\n\n{}", report, interpretation.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroscan_core::ClassifierError;
    use neuroscan_core::domain::classification::Classification;
    use std::path::Path;

    struct FixedClassifier(Result<f32, ClassifierError>);

    #[async_trait]
    impl Classifier for FixedClassifier {
        fn is_available(&self) -> bool {
            true
        }

        async fn classify(&self, _image_path: &Path) -> Result<Classification, ClassifierError> {
            self.0.clone().and_then(Classification::from_probability)
        }
    }

    struct Echo;

    #[async_trait]
    impl LanguageModel for Echo {
        async fn complete(&self, _system: &str, prompt: &str) -> anyhow::Result<String> {
            Ok(format!("Type: seen {} chars", prompt.len()))
        }
    }

    fn input() -> StageInput {
        StageInput::new("Classify", "Diagnosis").with_image(Some(Path::new("scan.png")))
    }

    #[tokio::test]
    async fn test_output_leads_with_classifier_report() {
        let agent = ClassificationAgent::new(Arc::new(FixedClassifier(Ok(0.92))), Arc::new(Echo));

        let output = agent.invoke(&input()).await.unwrap();
        assert!(output.starts_with("Diagnosis: Tumor detected\nConfidence: 92.0%"));
        assert!(output.contains("\n\nType: seen"));
    }

    #[tokio::test]
    async fn test_classifier_error_fails_the_agent() {
        let agent = ClassificationAgent::new(
            Arc::new(FixedClassifier(Err(ClassifierError::PredictionError("nan".into())))),
            Arc::new(Echo),
        );

        let err = agent.invoke(&input()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Prediction error: nan"));
    }

    #[tokio::test]
    async fn test_missing_image_fails_the_agent() {
        let agent = ClassificationAgent::new(Arc::new(FixedClassifier(Ok(0.1))), Arc::new(Echo));

        assert!(agent.invoke(&StageInput::new("Classify", "Diagnosis")).await.is_err());
    }
}
