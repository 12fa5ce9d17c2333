//! Tests for change resolution.

#[cfg(test)]
mod tests {
    use crate::changes::{
        ChangeType, ExecutionStateChanges, FileChange, InputFileChanges, MockChangeDetector,
        PropertyKind, ResolvedChanges,
    };
    use crate::context::{IncrementalContext, WorkContext};
    use crate::errors::{ChangeDetectionError, ExecutionError};
    use crate::history::FileType;
    use crate::steps::{ResolveChangesStep, Step, NO_HISTORY};
    use crate::work::UnitOfWork;
    use crate::testing::{
        assert_incremental, assert_rebuild, assert_untracked, files, overlapping_work, test_work,
        FailingStep, RecordingChangeDetector, RecordingStep, SnapshotFixture,
    };
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn fixture() -> SnapshotFixture {
        SnapshotFixture::new()
            .input("src", files(&[("/src/fileA", "hash1")]))
            .output("out", files(&[("/out/fileA.o", "object")]))
    }

    fn no_changes() -> ExecutionStateChanges {
        ExecutionStateChanges::incremental(InputFileChanges::empty(), Vec::new())
    }

    fn resolve(
        detector: Arc<RecordingChangeDetector>,
        context: IncrementalContext,
    ) -> ResolvedChanges {
        let delegate = RecordingStep::new("execute", ());
        let step = ResolveChangesStep::new(detector, delegate);
        step.execute(context).unwrap();
        step.delegate().last_changes().unwrap()
    }

    #[test]
    fn test_no_snapshots_is_untracked() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();

        let changes = resolve(detector.clone(), IncrementalContext::new(test_work(":w")));

        assert_untracked(&changes);
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_history_without_snapshot_is_still_untracked() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let context = IncrementalContext::new(test_work(":w"))
            .with_after_previous_execution_state(fixture().after_previous());

        let changes = resolve(detector.clone(), context);

        assert_untracked(&changes);
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_no_history_rebuilds_with_current_inputs() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let before = fixture().before();
        let context = IncrementalContext::new(test_work(":w")).with_before_execution_state(before.clone());

        let changes = resolve(detector.clone(), context);

        let rebuild = assert_rebuild(&changes, NO_HISTORY);
        assert_eq!(rebuild.reason, "No history is available.");
        assert_eq!(rebuild.input_file_properties.as_ref(), Some(&before.input_file_properties));
        assert_eq!(
            rebuild.input_file_properties.as_ref().map(|p| p.contains_key("src")),
            Some(true)
        );
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_identical_snapshots_yield_detector_result() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();

        let changes = resolve(detector.clone(), fixture().context(test_work(":w")));

        assert!(assert_incremental(&changes).is_empty());
        assert_eq!(detector.call_count(), 1);
    }

    #[test]
    fn test_overlapping_outputs_disable_output_checks() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();

        resolve(detector.clone(), fixture().context(overlapping_work(":w")));

        let calls = detector.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].check_outputs);
    }

    #[test]
    fn test_exclusive_outputs_enable_output_checks() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();

        resolve(detector.clone(), fixture().context(test_work(":w")));

        assert!(detector.calls()[0].check_outputs);
    }

    #[test]
    fn test_forced_reason_overrides_available_history() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let before = fixture().before();
        let context = fixture()
            .context(test_work(":w"))
            .with_rebuild_reason("manual rerun");

        let changes = resolve(detector.clone(), context);

        let rebuild = assert_rebuild(&changes, "manual rerun");
        assert_eq!(rebuild.input_file_properties, Some(before.input_file_properties));
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_forced_reason_without_any_snapshot() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let context = IncrementalContext::new(test_work(":w")).with_rebuild_reason("--rerun-tasks");

        let changes = resolve(detector, context);

        let rebuild = assert_rebuild(&changes, "--rerun-tasks");
        assert!(rebuild.input_file_properties.is_none());
    }

    #[test]
    fn test_forced_reason_wins_without_history() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let before = fixture().before();
        let context = IncrementalContext::new(test_work(":w"))
            .with_before_execution_state(before.clone())
            .with_rebuild_reason("manual rerun");

        let changes = resolve(detector.clone(), context);

        let rebuild = assert_rebuild(&changes, "manual rerun");
        assert_eq!(rebuild.input_file_properties, Some(before.input_file_properties));
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_check_outputs_attribute_only_when_detector_runs() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector, RecordingStep::new("execute", ()));
        let before = fixture().before();
        let skipped = [
            IncrementalContext::new(test_work(":w")),
            IncrementalContext::new(test_work(":w")).with_before_execution_state(before.clone()),
            fixture().context(test_work(":w")).with_rebuild_reason("manual rerun"),
        ];

        for context in skipped {
            let (_, attributes) = step.resolve_with_attributes(&context).unwrap();
            assert_eq!(attributes.check_outputs, None, "{context:?}");
            assert!(!attributes.to_otel_attributes().contains_key("changes.check_outputs"));
        }

        let (_, exclusive) = step
            .resolve_with_attributes(&fixture().context(test_work(":w")))
            .unwrap();
        let (_, overlapping) = step
            .resolve_with_attributes(&fixture().context(overlapping_work(":w")))
            .unwrap();
        assert_eq!(exclusive.check_outputs, Some(true));
        assert_eq!(overlapping.check_outputs, Some(false));
        assert_eq!(exclusive.outcome.as_deref(), Some("incremental"));
    }

    #[test]
    fn test_recording_step_keeps_every_context_until_reset() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector, RecordingStep::new("execute", ()));

        step.execute(IncrementalContext::new(test_work(":a"))).unwrap();
        step.execute(fixture().context(test_work(":b"))).unwrap();

        let seen: Vec<String> = step
            .delegate()
            .recorded_contexts()
            .iter()
            .map(|ctx| ctx.work().identity().to_string())
            .collect();
        assert_eq!(seen, vec![":a".to_string(), ":b".to_string()]);

        step.delegate().reset();
        assert_eq!(step.delegate().call_count(), 0);
        assert!(step.delegate().last_context().is_none());
    }

    #[test]
    fn test_detector_receives_both_snapshots_and_work() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let context = fixture().context(test_work(":app:compile"));
        let previous = context.after_previous_execution_state().cloned();
        let current = context.before_execution_state().cloned();

        resolve(detector.clone(), context);

        let call = &detector.calls()[0];
        assert_eq!(Some(&call.previous), previous.as_ref());
        assert_eq!(Some(&call.current), current.as_ref());
        assert_eq!(call.work.as_str(), ":app:compile");
    }

    #[test]
    fn test_detector_rebuild_is_passed_through() {
        let reported = ExecutionStateChanges::rebuild(
            "Input property 'src' file set has been added",
            Some(fixture().before().input_file_properties),
        );
        let detector = RecordingChangeDetector::returning(reported.clone()).shared();

        let changes = resolve(detector, fixture().context(test_work(":w")));

        assert_eq!(changes, ResolvedChanges::from(reported));
    }

    #[test]
    fn test_detector_changes_are_passed_through() {
        let file_changes: InputFileChanges = std::iter::once(FileChange::new(
            PropertyKind::Input,
            "src",
            "/src/fileA",
            ChangeType::Modified,
            FileType::RegularFile,
        ))
        .collect();
        let reported = ExecutionStateChanges::incremental(file_changes, vec!["changed".to_string()]);
        let detector = RecordingChangeDetector::returning(reported.clone()).shared();

        let changes = resolve(detector, fixture().context(test_work(":w")));

        assert_eq!(changes.execution_state_changes(), Some(reported));
    }

    #[test]
    fn test_check_outputs_flag_with_mock_detector() {
        for allows_overlap in [false, true] {
            let mut detector = MockChangeDetector::new();
            detector
                .expect_detect_changes()
                .withf(move |_, _, work, check_outputs| {
                    *check_outputs == !allows_overlap
                        && work.allows_overlapping_outputs() == allows_overlap
                })
                .times(1)
                .returning(|_, _, _, _| Ok(no_changes()));

            let work = if allows_overlap {
                overlapping_work(":w")
            } else {
                test_work(":w")
            };
            let step = ResolveChangesStep::new(Arc::new(detector), RecordingStep::new("next", ()));

            step.execute(fixture().context(work)).unwrap();
        }
    }

    #[test]
    fn test_mock_detector_not_called_without_history() {
        let mut detector = MockChangeDetector::new();
        detector.expect_detect_changes().times(0);

        let step = ResolveChangesStep::new(Arc::new(detector), RecordingStep::new("next", ()));
        let context = IncrementalContext::new(test_work(":w")).with_before_execution_state(fixture().before());

        step.execute(context).unwrap();
    }

    #[test]
    fn test_detector_failure_carries_work_identity() {
        let error = ChangeDetectionError::Unsupported("history written by an older version".to_string());
        let detector = RecordingChangeDetector::failing(error.clone()).shared();
        let delegate = RecordingStep::new("execute", ());
        let step = ResolveChangesStep::new(detector, delegate);

        let err = step.execute(fixture().context(test_work(":lib:jar"))).unwrap_err();

        match err {
            ExecutionError::ChangeDetection { work, source } => {
                assert_eq!(work.as_str(), ":lib:jar");
                assert_eq!(source, error);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(step.delegate().call_count(), 0);
    }

    #[test]
    fn test_delegate_failure_propagates_unchanged() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector, FailingStep::new("execute", "compiler crashed"));

        let err = step.execute(fixture().context(test_work(":w"))).unwrap_err();

        assert_eq!(err.to_string(), "Step 'execute' failed: compiler crashed");
    }

    #[test]
    fn test_delegate_result_is_returned_unmodified() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector, RecordingStep::new("execute", "UP-TO-DATE".to_string()));

        let result = step.execute(fixture().context(test_work(":w"))).unwrap();

        assert_eq!(result, "UP-TO-DATE");
    }

    #[test]
    fn test_augmented_context_preserves_inputs() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector, RecordingStep::new("execute", ()));
        let work = test_work(":w");
        let context = fixture().context(work.clone()).with_rebuild_reason("manual rerun");

        step.execute(context.clone()).unwrap();

        let seen = step.delegate().last_context().unwrap();
        assert!(Arc::ptr_eq(seen.work(), &work));
        assert_eq!(seen.before_execution_state(), context.before_execution_state());
        assert_eq!(
            seen.after_previous_execution_state(),
            context.after_previous_execution_state()
        );
        assert_eq!(seen.rebuild_reason(), Some("manual rerun"));
    }

    #[test]
    fn test_resolution_runs_once_per_execution() {
        let detector = RecordingChangeDetector::returning(no_changes()).shared();
        let step = ResolveChangesStep::new(detector.clone(), RecordingStep::new("execute", ()));

        step.execute(fixture().context(test_work(":a"))).unwrap();
        step.execute(fixture().context(test_work(":b"))).unwrap();

        assert_eq!(detector.call_count(), 2);
        assert_eq!(step.delegate().call_count(), 2);
        let works: Vec<String> = detector.calls().into_iter().map(|c| c.work.to_string()).collect();
        assert_eq!(works, vec![":a".to_string(), ":b".to_string()]);
    }
}
