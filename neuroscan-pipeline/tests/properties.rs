//! Run invariants under arbitrary success/failure scripts and resets

mod common;

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use common::{Agents, FakeClassifier, FakeLookup, ScriptedAgent, image};
use neuroscan_core::domain::run::{PipelineRun, RunStatus};
use neuroscan_pipeline::stages::standard_stages;
use neuroscan_pipeline::{NullLogBuffer, PipelineController};

#[derive(Debug, Clone)]
enum Op {
    Start,
    Advance,
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        4 => Just(Op::Advance),
        1 => Just(Op::Reset),
    ]
}

fn controller_with_failures(failing: [bool; 4], lookup_fails: bool) -> PipelineController {
    let agent = |fail: bool, text: &str| {
        if fail {
            ScriptedAgent::failing("scripted failure")
        } else {
            ScriptedAgent::ok(text)
        }
    };
    let agents = Agents {
        classification: agent(failing[0], "Diagnosis: Tumor detected\nType: Glioblastoma"),
        clinical: agent(failing[1], "Grade: IV"),
        recommendations: agent(failing[2], "Urgency: high"),
        report: agent(failing[3], "Report"),
    };
    let lookup = if lookup_fails {
        FakeLookup::failing("offline")
    } else {
        FakeLookup::returning(&["Surgery"])
    };

    PipelineController::new(
        standard_stages(),
        agents.set(),
        Arc::new(FakeClassifier { available: true }),
        lookup,
    )
    .unwrap()
}

fn check_invariants(run: &PipelineRun, stage_count: usize) -> Result<(), TestCaseError> {
    let stages = standard_stages();

    prop_assert!(run.current_ordinal() <= stage_count);

    let expected: HashSet<&str> = stages
        .iter()
        .filter(|s| s.ordinal < run.current_ordinal())
        .map(|s| s.stage_id.as_str())
        .collect();
    let actual: HashSet<&str> = run.results().stage_keys().collect();
    prop_assert_eq!(actual, expected);

    match run.status() {
        RunStatus::Completed => {
            prop_assert_eq!(run.current_ordinal(), stage_count);
            prop_assert_eq!(run.final_report(), run.results().stage(stages[stage_count - 1].stage_id));
        }
        RunStatus::Failed => {
            let failed = &stages[run.current_ordinal()];
            prop_assert!(!run.results().contains_key(failed.stage_id.as_str()));
            prop_assert!(run.final_report().is_none());
        }
        RunStatus::NotStarted => {
            prop_assert_eq!(run.current_ordinal(), 0);
            prop_assert!(run.results().is_empty());
        }
        RunStatus::Running => prop_assert!(run.final_report().is_none()),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_for_any_operation_sequence(
        failing in prop::array::uniform4(prop::bool::weighted(0.2)),
        lookup_fails in any::<bool>(),
        ops in prop::collection::vec(op(), 0..24),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let controller = controller_with_failures(failing, lookup_fails);
        let (_dir, path) = image();
        let mut run = PipelineRun::new(&path);
        let mut successes_since_start = 0;

        for op in ops {
            let before = run.clone();
            match op {
                Op::Start => {
                    if controller.start(&mut run, &NullLogBuffer).is_ok() {
                        successes_since_start = 0;
                    } else {
                        prop_assert_eq!(&run, &before);
                    }
                }
                Op::Advance => match rt.block_on(controller.advance(&mut run, &NullLogBuffer)) {
                    Ok(_) => {
                        successes_since_start += 1;
                        prop_assert_eq!(run.current_ordinal(), successes_since_start);
                    }
                    Err(e) if e.stage_id().is_some() => {
                        prop_assert_eq!(run.status(), RunStatus::Failed);
                        prop_assert_eq!(run.current_ordinal(), before.current_ordinal());
                        prop_assert_eq!(run.results(), before.results());
                    }
                    Err(_) => prop_assert_eq!(&run, &before),
                },
                Op::Reset => {
                    controller.reset(&mut run, &NullLogBuffer);
                    prop_assert_eq!(&run, &PipelineRun::new(&path));
                    successes_since_start = 0;
                }
            }
            check_invariants(&run, controller.stage_count())?;
        }
    }
}
