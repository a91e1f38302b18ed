//! Retention sweep interplay with in-flight runs

mod support;

use codesight::cleanup::{LeaseRegistry, sweep};
use codesight::{AnalysisError, ProjectAnalyzer};
use std::time::Duration;
use support::Workspace;

#[tokio::test]
async fn test_sweep_removes_expired_artifacts_of_finished_runs() {
    let ws = Workspace::new();
    ws.write_project_file("done", "package.json", "{}");
    ws.write_project_file("done", "src/A.jsx", "export const A = () => <a/>;\n");
    ws.upload("done", &[("package.json", "{}")]);

    let leases = LeaseRegistry::new(&ws.settings.projects_dir);
    let analyzer = ProjectAnalyzer::new(ws.settings.clone()).with_leases(leases.clone());
    analyzer.analyze("done", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let projects = sweep(&ws.settings.projects_dir, Duration::ZERO, &leases).unwrap();
    let uploads = sweep(&ws.settings.uploads_dir, Duration::ZERO, &leases).unwrap();

    assert_eq!(projects, vec!["done", "done.lock", "done_analysis.json"]);
    assert_eq!(uploads, vec!["done.zip"]);
    assert!(!ws.project_dir("done").exists());
}

#[tokio::test]
async fn test_leased_project_survives_sweep_and_blocks_second_run() {
    let ws = Workspace::new();
    ws.write_project_file("busy", "index.js", "export default 1;\n");
    ws.upload("busy", &[("index.js", "1")]);

    let analyzer = ProjectAnalyzer::new(ws.settings.clone());
    let lease = analyzer.leases().acquire("busy").unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A sweeper with its own registry, as a separate cleanup process would have
    let sweeper = LeaseRegistry::new(&ws.settings.projects_dir);
    let removed = sweep(&ws.settings.projects_dir, Duration::ZERO, &sweeper).unwrap();
    assert!(removed.is_empty());
    let removed = sweep(&ws.settings.uploads_dir, Duration::ZERO, &sweeper).unwrap();
    assert!(removed.is_empty());
    assert!(ws.project_dir("busy").join("index.js").is_file());

    let err = analyzer.analyze("busy", None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::AlreadyRunning(_)));

    drop(lease);
    analyzer.analyze("busy", None).await.unwrap();
}
