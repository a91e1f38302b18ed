//! Feature context built from a persisted analysis

mod support;

use codesight::ProjectAnalyzer;
use codesight::context::{FeatureContext, read_project_file, render_digest};
use codesight::error::AnalysisError;
use support::{Workspace, react_project};

#[tokio::test]
async fn test_feature_context_from_stored_analysis() {
    let ws = Workspace::new();
    let zip = ws.upload("shop", &react_project());
    let analyzer = ProjectAnalyzer::new(ws.settings.clone());
    analyzer.analyze("shop", Some(&zip)).await.unwrap();

    let analysis = analyzer.store().load("shop").unwrap();
    let root = ws.project_dir("shop");
    let context = FeatureContext::build("Button component", &analysis, &root, 2);

    assert_eq!(context.component_count, 2);
    assert_eq!(context.dependency_file_count, 3);
    let paths: Vec<_> = context.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], "src/components/Button.tsx");
    assert!(context.files[0].content.contains("<button"));

    let json = serde_json::to_value(&context).unwrap();
    assert_eq!(json["componentCount"], 2);
    assert_eq!(json["files"][0]["path"], "src/components/Button.tsx");

    let digest = render_digest(&context, 20);
    assert!(digest.contains("- Total Components: 2"));
    assert!(digest.contains("src/index.tsx -> src/App.tsx"));
}

#[tokio::test]
async fn test_context_files_resolve_under_nested_root() {
    let ws = Workspace::new();
    let zip = ws.upload(
        "nested",
        &[
            ("app/package.json", "{}"),
            (
                "app/src/Profile.jsx",
                "export default function Profile() { return <p/>; }\n",
            ),
        ],
    );
    let analyzer = ProjectAnalyzer::new(ws.settings.clone());
    let analysis = analyzer.analyze("nested", Some(&zip)).await.unwrap();

    let root = ws.project_dir("nested");
    let context = FeatureContext::build("profile page", &analysis, &root, 5);
    assert_eq!(context.files.len(), 1);
    assert_eq!(context.files[0].path, "src/Profile.jsx");

    assert!(matches!(
        read_project_file(&ws.project_dir("nested"), "../../codesight.yaml"),
        Err(AnalysisError::AccessDenied(_))
    ));
}
