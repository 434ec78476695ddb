//! The fixed stage catalogue
//!
//! Four stages in execution order. Each input builder reads only results of
//! lower ordinals and treats a missing result as empty text.

use neuroscan_core::domain::stage::{PipelineStage, StageContext, StageId, StageInput, TREATMENTS_KEY};

use crate::knowledge::MedicalKnowledgeBase;

pub const CLASSIFICATION_SECTION: &str = "Classification result";
pub const CLINICAL_SECTION: &str = "Clinical analysis";
pub const RECOMMENDATIONS_SECTION: &str = "Recommendations";
pub const TREATMENTS_SECTION: &str = "Known treatments";

/// The four pipeline stages, ordinals 0..4
pub fn standard_stages() -> Vec<PipelineStage> {
    vec![
        PipelineStage {
            stage_id: StageId::Classification,
            display_name: "Image Classification Agent",
            summary: "Tumor detection via VGG19",
            ordinal: 0,
            input_builder: classification_input,
            result_keywords: &["Diagnosis", "Confidence", "Type"],
        },
        PipelineStage {
            stage_id: StageId::ClinicalAnalysis,
            display_name: "Clinical Knowledge Agent",
            summary: "Medical data synthesis",
            ordinal: 1,
            input_builder: clinical_input,
            result_keywords: &["Type", "Grade", "Prognosis", "Characteristics"],
        },
        PipelineStage {
            stage_id: StageId::Recommendations,
            display_name: "Recommendations Agent",
            summary: "Therapeutic proposal and follow-up",
            ordinal: 2,
            input_builder: recommendations_input,
            result_keywords: &["Urgency", "Treatment", "Follow-up", "Next"],
        },
        PipelineStage {
            stage_id: StageId::Report,
            display_name: "Report Writing Agent",
            summary: "Generation of complete medical report",
            ordinal: 3,
            input_builder: report_input,
            result_keywords: &[],
        },
    ]
}

fn classification_input(ctx: &StageContext<'_>) -> StageInput {
    StageInput::new(
        "Analyze the brain MRI image with the tumor classifier and interpret its output. \
         State whether a tumor is present, how confident the model is, and, if a tumor \
         is present, which type it most likely is.",
        "Diagnosis: <tumor detected or not>\n\
         Confidence: <percentage>\n\
         Type: <suspected tumor type, or none>",
    )
    .with_image(ctx.image_reference)
}

fn clinical_input(ctx: &StageContext<'_>) -> StageInput {
    let kb = MedicalKnowledgeBase::new();
    StageInput::new(
        "Using the classification result and the reference material, analyze the case \
         clinically: the probable tumor type, its grade, its characteristics and the \
         prognosis.",
        "Type: <tumor type>\n\
         Grade: <WHO grade>\n\
         Characteristics: <key characteristics>\n\
         Prognosis: <expected prognosis>",
    )
    .with_section(
        CLASSIFICATION_SECTION,
        ctx.results.stage_or_empty(StageId::Classification),
    )
    .with_section("Reference: tumor types", kb.search("tumor type"))
    .with_section("Reference: prognosis", kb.search("prognosis"))
}

fn recommendations_input(ctx: &StageContext<'_>) -> StageInput {
    let kb = MedicalKnowledgeBase::new();
    let mut input = StageInput::new(
        "Based on the clinical analysis, recommend the next steps of care: how urgent the \
         case is, which treatments to consider, the follow-up plan and the next \
         examinations.",
        "Urgency: <level>\n\
         Treatment: <recommended treatments>\n\
         Follow-up: <follow-up schedule>\n\
         Next steps: <additional examinations>",
    )
    .with_section(
        CLINICAL_SECTION,
        ctx.results.stage_or_empty(StageId::ClinicalAnalysis),
    );

    if let Some(treatments) = ctx.results.get(TREATMENTS_KEY).filter(|t| !t.is_empty()) {
        input = input.with_section(TREATMENTS_SECTION, treatments);
    }

    input
        .with_section("Reference: treatment protocols", kb.search("treatment"))
        .with_section("Reference: diagnostic procedures", kb.search("diagnostic"))
}

fn report_input(ctx: &StageContext<'_>) -> StageInput {
    StageInput::new(
        "Write a complete, structured medical report for this brain MRI examination from \
         the results below. Do not invent findings that are not in them.",
        "A report with the sections: Patient examination, Findings, Clinical analysis, \
         Recommendations, Conclusion.",
    )
    .with_section(
        CLASSIFICATION_SECTION,
        ctx.results.stage_or_empty(StageId::Classification),
    )
    .with_section(
        CLINICAL_SECTION,
        ctx.results.stage_or_empty(StageId::ClinicalAnalysis),
    )
    .with_section(
        RECOMMENDATIONS_SECTION,
        ctx.results.stage_or_empty(StageId::Recommendations),
    )
}
