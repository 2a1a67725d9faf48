//! Generator feeding the worker pool directly.

use uuid::Uuid;

use smrt_stress::context::RunContext;
use smrt_stress::core::{ServiceTarget, ToolPaths};
use smrt_stress::log::Logger;
use smrt_stress::orchestration::{summarize, TaskGenerator, WorkerPool};
use smrt_stress::Error;

use crate::fixtures::{staged_dirs, ScriptedExecutor};

fn context(root: &std::path::Path) -> RunContext {
    RunContext::new(Logger::silent(), ServiceTarget::new("localhost", 8070), root)
}

/// Test: Results line up with the generated tasks
/// Given generated tasks for several iterations
/// When the pool runs them with various worker counts and batch sizes
/// Then result[i] is the command of task i
#[tokio::test]
async fn test_results_follow_generation_order() {
    for (workers, batch_size) in [(1, 1), (3, 2), (10, 6), (4, 100)] {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = context(dir.path());
        let exec = ScriptedExecutor::succeeding();
        let pool = WorkerPool::new(&ctx, exec.clone(), workers, batch_size).unwrap();
        let mut gen = TaskGenerator::new(&ctx, exec.clone(), "/d/ref.xml", "/a.json", 5);

        let results = pool.run(&mut gen).await.unwrap();
        assert_eq!(results.len(), 20);

        for (i, result) in results.iter().enumerate() {
            let sub = result.command.split(' ').nth(1).unwrap();
            let expected = match i % 4 {
                0 | 2 => "status",
                1 => "import-dataset",
                _ => "run-analysis",
            };
            assert_eq!(sub, expected, "workers={} batch={} i={}", workers, batch_size, i);
        }

        // Each import points at a different staged directory, in staging order.
        let imports: Vec<&str> = results
            .iter()
            .filter(|r| r.command.contains("import-dataset"))
            .map(|r| r.command.as_str())
            .collect();
        let copies = exec.calls_of("copyto");
        assert_eq!(imports.len(), copies.len());
        for (import, copy) in imports.iter().zip(copies.iter()) {
            let staged_dir = copy.rsplit(' ').next().unwrap();
            assert!(
                import.contains(staged_dir),
                "import {} does not use {}",
                import,
                staged_dir
            );
        }
    }
}

/// Test: Identifier collision aborts generation
/// Given an identifier source that always returns the same UUID
/// When the second iteration is staged
/// Then the first iteration's tasks still complete and the error carries them
#[tokio::test]
async fn test_identifier_collision_aborts_after_first_iteration() {
    let dir = tempfile::TempDir::new().unwrap();
    let ctx = context(dir.path());
    let exec = ScriptedExecutor::succeeding();
    let pool = WorkerPool::new(&ctx, exec.clone(), 3, 6).unwrap();
    let fixed = Uuid::new_v4();
    let mut gen =
        TaskGenerator::new(&ctx, exec.clone(), "/d/ref.xml", "/a.json", 4).with_id_source(move || fixed);

    let err = pool.run(&mut gen).await.unwrap_err();

    match err {
        Error::GenerationAborted { source, completed } => {
            assert!(matches!(*source, Error::Staging { .. }));
            assert_eq!(completed.len(), 4);
            let summary = summarize(&completed, &Logger::silent());
            assert_eq!(summary.total, 4);
            assert!(summary.all_succeeded());
        }
        other => panic!("Expected GenerationAborted, got {:?}", other),
    }

    assert_eq!(staged_dirs(dir.path()), vec![format!("dataset-{}", fixed)]);
    // 2 staging calls, then 4 task executions; nothing from iteration two.
    assert_eq!(exec.call_count(), 6);
    assert_eq!(exec.calls_of("status").len(), 2);
}

/// Test: Custom tool binaries
/// Given non-default client and dataset tool names
/// When a run is dispatched
/// Then every command uses them
#[tokio::test]
async fn test_custom_tools_are_used() {
    let dir = tempfile::TempDir::new().unwrap();
    let ctx = context(dir.path()).with_tools(ToolPaths {
        client: "/opt/smrtlink/pbservice".to_string(),
        dataset_tool: "/opt/smrtlink/dataset".to_string(),
    });
    let exec = ScriptedExecutor::succeeding();
    let pool = WorkerPool::new(&ctx, exec.clone(), 2, 3).unwrap();
    let mut gen = TaskGenerator::new(&ctx, exec.clone(), "/d/ref.xml", "/a.json", 2);

    let results = pool.run(&mut gen).await.unwrap();

    assert!(results
        .iter()
        .all(|r| r.command.starts_with("/opt/smrtlink/pbservice ")));
    assert!(exec
        .calls()
        .iter()
        .filter(|c| !c.starts_with("/opt/smrtlink/pbservice "))
        .all(|c| c.starts_with("/opt/smrtlink/dataset ")));
}
