//! Report export

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

use neuroscan_core::PipelineError;
use neuroscan_core::domain::run::PipelineRun;

/// File name of a report exported at `at`
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("brain_tumor_report_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the final report of a completed run into `dir`
///
/// # Returns
/// Path of the written file
pub fn export_report(
    run: &PipelineRun,
    dir: &Path,
    at: DateTime<Local>,
) -> Result<PathBuf, PipelineError> {
    let report = run.final_report().ok_or_else(|| {
        PipelineError::InvalidStateTransition(format!(
            "cannot export the report of a run that is {}",
            run.status()
        ))
    })?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(at));
    std::fs::write(&path, report)?;

    info!("Report written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use neuroscan_core::domain::stage::{PipelineStage, StageContext, StageId, StageInput};

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
    }

    fn noop_input(_: &StageContext<'_>) -> StageInput {
        StageInput::new("", "")
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(report_file_name(at()), "brain_tumor_report_20260304_050607.txt");
    }

    #[test]
    fn test_export_requires_completed_run() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_report(&PipelineRun::new("scan.png"), dir.path(), at()).unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn test_export_writes_final_report() {
        let stage = PipelineStage {
            stage_id: StageId::Report,
            display_name: "Report",
            summary: "report",
            ordinal: 0,
            input_builder: noop_input,
            result_keywords: &[],
        };
        let mut run = PipelineRun::new("scan.png");
        run.begin(chrono::Utc::now()).unwrap();
        run.record_success(&stage, "Final report".into(), 1, chrono::Utc::now())
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let path = export_report(&run, &out, at()).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "Final report");
    }
}
