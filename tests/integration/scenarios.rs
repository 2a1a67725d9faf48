//! Whole-run scenarios.
//!
//! Each test drives `run::run` with a scripted executor and checks the
//! resulting summary, the staged directories and the log.

use smrt_stress::context::StagingPolicy;
use smrt_stress::run::run;
use smrt_stress::Error;

use crate::fixtures::{RunHarness, ScriptedExecutor};

/// Test: Single iteration, everything succeeds
/// Given iterations=1 and all commands exit 0
/// When the run completes
/// Then the summary has 4 tasks and no failures
#[tokio::test]
async fn test_single_iteration_all_succeed() {
    let harness = RunHarness::new(1, 10);
    let exec = ScriptedExecutor::succeeding();

    let summary = run(&harness.opts, exec.clone(), &harness.logger).await.unwrap();

    assert_eq!(summary.total, 4);
    assert!(summary.failures.is_empty());
    // 2 staging calls + 4 tasks
    assert_eq!(exec.call_count(), 6);
    assert_eq!(harness.staged_dirs().len(), 1);
    assert!(harness.logged("Failed Results 0 of 4"));
}

/// Test: Second analysis run fails
/// Given iterations=2 and the second run-analysis exits 1
/// When the run completes
/// Then exactly that result is reported as failed
#[tokio::test]
async fn test_second_analysis_failure_is_reported() {
    // A single worker keeps call order equal to submission order, so the
    // second run-analysis call is the second RunAnalysis task.
    let harness = RunHarness::new(2, 1);
    let exec = ScriptedExecutor::failing_nth("run-analysis", 2, 1);

    let summary = run(&harness.opts, exec.clone(), &harness.logger).await.unwrap();

    assert_eq!(summary.total, 8);
    assert_eq!(summary.failures.len(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.exit_code, 1);
    assert_eq!(
        failure.command,
        "pbservice run-analysis --host=localhost --port=8070 --block /specs/analysis-dev-diagnostic-01.json"
    );
    assert!(harness.logged("Failed Results 1 of 8"));
}

/// Test: Zero iterations
/// Given iterations=0
/// When the run completes
/// Then nothing is staged, nothing is executed, and the summary is empty
#[tokio::test]
async fn test_zero_iterations() {
    let harness = RunHarness::new(0, 4);
    let exec = ScriptedExecutor::succeeding();

    let summary = run(&harness.opts, exec.clone(), &harness.logger).await.unwrap();

    assert_eq!(summary.total, 0);
    assert!(summary.failures.is_empty());
    assert_eq!(exec.call_count(), 0);
    assert!(harness.staged_dirs().is_empty());
}

/// Test: Failures never stop the run
/// Given every status check fails
/// When the run completes
/// Then all tasks still ran and every status check is counted
#[tokio::test]
async fn test_all_status_checks_fail() {
    let harness = RunHarness::new(3, 4);
    let exec = ScriptedExecutor::with_rule(|cmd, _| {
        if cmd.args().first().map(String::as_str) == Some("status") {
            2
        } else {
            0
        }
    });

    let summary = run(&harness.opts, exec.clone(), &harness.logger).await.unwrap();

    assert_eq!(summary.total, 12);
    assert_eq!(summary.failed(), 6);
    assert!(summary.failures.iter().all(|r| r.command.contains(" status ")));
    assert_eq!(exec.calls_of("run-analysis").len(), 3);
    assert_eq!(exec.calls_of("import-dataset").len(), 3);
}

/// Test: Failed dataset copy is tolerated by default
/// Given copyto fails for the first iteration
/// When staging policy is log-and-continue
/// Then the import still runs against the staged path
#[tokio::test]
async fn test_failed_copy_tolerated_by_default() {
    let harness = RunHarness::new(2, 2);
    let exec = ScriptedExecutor::failing_nth("copyto", 1, 1);

    let summary = run(&harness.opts, exec.clone(), &harness.logger).await.unwrap();

    assert_eq!(summary.total, 8);
    // Staging failures are not task results.
    assert!(summary.failures.is_empty());
    assert_eq!(exec.calls_of("import-dataset").len(), 2);
    assert!(harness.logged("Staging step 'copyto' failed, continuing"));
}

/// Test: Failed dataset copy aborts under fail-fast
/// Given copyto fails for the second iteration
/// When staging policy is fail-fast
/// Then the run aborts after the first iteration's tasks complete
#[tokio::test]
async fn test_failed_copy_aborts_under_fail_fast() {
    let mut harness = RunHarness::new(3, 2);
    harness.opts.staging_policy = StagingPolicy::FailFast;
    let exec = ScriptedExecutor::failing_nth("copyto", 2, 1);

    let err = run(&harness.opts, exec.clone(), &harness.logger)
        .await
        .unwrap_err();

    match err {
        Error::GenerationAborted { source, completed } => {
            assert!(matches!(*source, Error::StagingStep { .. }));
            assert_eq!(completed.len(), 4);
            assert!(completed.iter().all(|r| r.is_success()));
        }
        other => panic!("Expected GenerationAborted, got {:?}", other),
    }
    assert_eq!(exec.calls_of("newuuid").len(), 1);
    assert_eq!(exec.calls_of("run-analysis").len(), 1);
    // Completed work is still summarized before the error surfaces.
    assert!(harness.logged("Failed Results 0 of 4"));
}

/// Test: Unwritable output root aborts the run
/// Given the output root is a regular file
/// When the run starts
/// Then it fails without executing anything
#[tokio::test]
async fn test_output_root_is_a_file() {
    let mut harness = RunHarness::new(1, 2);
    let file = harness.temp_dir.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();
    harness.opts.output_root = file;
    let exec = ScriptedExecutor::succeeding();

    let err = run(&harness.opts, exec.clone(), &harness.logger)
        .await
        .unwrap_err();

    match err {
        Error::GenerationAborted { source, completed } => {
            assert!(matches!(*source, Error::Staging { .. }));
            assert!(completed.is_empty());
        }
        other => panic!("Expected GenerationAborted, got {:?}", other),
    }
    assert_eq!(exec.call_count(), 0);
}
