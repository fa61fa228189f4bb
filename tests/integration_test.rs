/// Integration tests for the application layer
mod test_utilities;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use test_utilities::fixtures::*;
use test_utilities::mocks::*;
use vuln_impact::impact_analysis::domain::{Direction, EdgeKind, NodeKey};
use vuln_impact::ports::outbound::SilentProgressReporter;
use vuln_impact::prelude::*;

async fn build(store: &Arc<InMemoryGraphStore>, records: &ScanRecords) {
    GraphBuilder::new(store.clone())
        .apply(records)
        .await
        .unwrap();
}

/// core <- lib (DependsOn) <- app (DependsOn) <- module app <- src/deep.js,
/// plus module core <- src/direct.js
fn layered_scan() -> ScanRecords {
    ScanRecords {
        packages: vec![
            package("core", Ecosystem::JavaScript, Some("2.3.1")),
            package("lib", Ecosystem::JavaScript, Some("1.0.0")),
            package("app", Ecosystem::JavaScript, Some("0.1.0")),
        ],
        imports: vec![
            import("src/deep.js", "app"),
            import("src/direct.js", "core/utils"),
        ],
        module_links: vec![
            link("app", "app", Ecosystem::JavaScript),
            link("core", "core", Ecosystem::JavaScript),
        ],
        dependencies: vec![
            depends("lib", "core", Ecosystem::JavaScript),
            depends("app", "lib", Ecosystem::JavaScript),
        ],
        advisories: vec![],
    }
}

#[tokio::test]
async fn test_replaying_records_leaves_graph_unchanged() {
    let store = Arc::new(InMemoryGraphStore::new());
    let mut records = layered_scan();
    records.advisories = vec![advisory(
        "core",
        Ecosystem::JavaScript,
        vec![VulnerabilityRecord::new(
            "CVE-2024-1000",
            Severity::High,
            7.5,
            &[">=2.0.0,<2.3.5"],
        )],
    )];

    let annotator = VulnerabilityAnnotator::new(store.clone(), 4);
    build(&store, &records).await;
    annotator
        .annotate_all(&records.advisories, &SilentProgressReporter)
        .await
        .unwrap();
    let first = store.stats().await.unwrap();

    build(&store, &records).await;
    annotator
        .annotate_all(&records.advisories, &SilentProgressReporter)
        .await
        .unwrap();
    let second = store.stats().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.edges_labeled(EdgeKind::AffectedBy), 1);
}

#[tokio::test]
async fn test_range_match_links_package_to_vulnerability() {
    let store = Arc::new(InMemoryGraphStore::new());
    build(&store, &layered_scan()).await;

    let result = VulnerabilityAnnotator::new(store.clone(), 4)
        .annotate(
            &PackageRef::new("core", Ecosystem::JavaScript),
            &[
                VulnerabilityRecord::new("CVE-2024-1000", Severity::High, 7.5, &[">=2.0.0,<2.3.5"]),
                VulnerabilityRecord::new("CVE-2024-2000", Severity::High, 7.5, &["<2.0.0"]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.vulnerabilities_processed, 2);
    assert_eq!(result.edges_created, 1);
    assert_eq!(result.edges_skipped, 1);

    let core = NodeKey::package(&PackageRef::new("core", Ecosystem::JavaScript));
    let edge = store
        .get_edge(
            &core,
            EdgeKind::AffectedBy,
            &NodeKey::vulnerability("CVE-2024-1000"),
        )
        .await
        .unwrap()
        .expect("matched edge");
    assert_eq!(edge.matched_ranges(), &[">=2.0.0,<2.3.5".to_string()]);
    assert!(!edge.is_unresolved_version());

    let affected = store
        .neighbors(&core, EdgeKind::AffectedBy, Direction::Outgoing)
        .await
        .unwrap();
    assert_eq!(affected, vec![NodeKey::vulnerability("CVE-2024-1000")]);
}

#[tokio::test]
async fn test_traversal_terminates_on_dependency_cycle() {
    let store = Arc::new(InMemoryGraphStore::new());
    let records = ScanRecords {
        packages: vec![
            package("alpha", Ecosystem::Rust, Some("1.0.0")),
            package("beta", Ecosystem::Rust, Some("1.0.0")),
        ],
        imports: vec![import("src/main.rs", "beta")],
        module_links: vec![link("beta", "beta", Ecosystem::Rust)],
        dependencies: vec![
            depends("alpha", "beta", Ecosystem::Rust),
            depends("beta", "alpha", Ecosystem::Rust),
        ],
        advisories: vec![],
    };
    build(&store, &records).await;

    let impact = ImpactTraversalEngine::new(store, 4)
        .traverse(
            &TraversalSeed::package(PackageRef::new("alpha", Ecosystem::Rust)),
            None,
        )
        .await
        .unwrap();

    assert_eq!(impact.packages.len(), 2);
    assert_eq!(
        impact.package_depth(&PackageRef::new("beta", Ecosystem::Rust)),
        Some(1)
    );
    assert_eq!(impact.file_depth("src/main.rs"), Some(3));
    assert!(!impact.truncated);
}

#[tokio::test]
async fn test_file_reported_at_shortest_depth() {
    let store = Arc::new(InMemoryGraphStore::new());
    let mut records = layered_scan();
    // src/deep.js also reaches core directly
    records.imports.push(import("src/deep.js", "core"));
    build(&store, &records).await;

    let impact = ImpactTraversalEngine::new(store, 4)
        .traverse(
            &TraversalSeed::package(PackageRef::new("core", Ecosystem::JavaScript)),
            None,
        )
        .await
        .unwrap();

    assert_eq!(impact.file_depth("src/deep.js"), Some(2));
    assert_eq!(impact.file_depth("src/direct.js"), Some(2));
    assert_eq!(impact.module_depth("app"), Some(3));
    assert_eq!(impact.files.len(), 2);
}

#[tokio::test]
async fn test_depth_limit_marks_truncation() {
    let store = Arc::new(InMemoryGraphStore::new());
    build(&store, &layered_scan()).await;
    let engine = ImpactTraversalEngine::new(store, 4);
    let seed = TraversalSeed::package(PackageRef::new("core", Ecosystem::JavaScript));

    let shallow = engine.traverse(&seed, Some(1)).await.unwrap();
    assert!(shallow.truncated);
    assert!(!shallow.cancelled);
    assert!(shallow.files.is_empty());
    assert_eq!(shallow.module_depth("core"), Some(1));

    let full = engine.traverse(&seed, None).await.unwrap();
    assert!(!full.truncated);
    assert_eq!(full.file_depth("src/deep.js"), Some(4));
}

#[tokio::test]
async fn test_query_port_existence_checks() {
    let store = Arc::new(InMemoryGraphStore::new());
    build(&store, &layered_scan()).await;
    let port: Box<dyn ImpactQueryPort> = Box::new(ImpactTraversalEngine::new(store, 2));

    assert!(port.file_exists("src/deep.js").await.unwrap());
    assert!(!port.file_exists("src/missing.js").await.unwrap());
    assert!(port
        .package_exists(&PackageRef::new("LIB", Ecosystem::JavaScript))
        .await
        .unwrap());
    assert!(!port.vulnerability_exists("CVE-2024-1000").await.unwrap());

    let err = port
        .traverse_impact(&TraversalSeed::vulnerability("CVE-2024-1000"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ImpactError::NotFound { .. }));
}

#[tokio::test]
async fn test_risk_ranking_is_deterministic() {
    let impact = ImpactSet::empty(
        TraversalSeed::package(PackageRef::new("core", Ecosystem::Go)),
        None,
    );
    let package = vuln_impact::impact_analysis::domain::PackageNode {
        package: PackageRef::new("core", Ecosystem::Go),
        version: Some("1.0.0".to_string()),
    };
    let vulns = vec![
        VulnerabilityRecord::new("CVE-2024-0003", Severity::Critical, 9.1, &["<1.1.0"]),
        VulnerabilityRecord::new("CVE-2024-0002", Severity::Critical, 9.5, &["<1.2.0"]),
        VulnerabilityRecord::new("CVE-2024-0001", Severity::Critical, 9.1, &["<1.1.0"]),
        VulnerabilityRecord::new("CVE-2024-0004", Severity::Medium, 5.0, &["<1.0.5"]),
    ];

    let report = RiskAggregator::default().aggregate_risk(&package, &vulns, &impact);
    let order: Vec<&str> = report.ranked.iter().map(|r| r.cve_id.as_str()).collect();

    assert_eq!(
        order,
        vec!["CVE-2024-0002", "CVE-2024-0001", "CVE-2024-0003", "CVE-2024-0004"]
    );
    assert_eq!(report.recommended_version.as_deref(), Some("1.2.0"));
}

#[tokio::test]
async fn test_malformed_record_does_not_fail_batch() {
    let store = Arc::new(InMemoryGraphStore::new());
    build(&store, &layered_scan()).await;

    let mut records: Vec<VulnerabilityRecord> = (1..=5)
        .map(|i| {
            VulnerabilityRecord::new(
                &format!("CVE-2024-000{}", i),
                Severity::Medium,
                5.0,
                &["<3.0.0"],
            )
        })
        .collect();
    records[2].cvss_score = 15.0;

    let result = VulnerabilityAnnotator::new(store.clone(), 4)
        .annotate(&PackageRef::new("core", Ecosystem::JavaScript), &records)
        .await
        .unwrap();

    assert_eq!(result.vulnerabilities_processed, 4);
    assert_eq!(result.rejected_count(), 1);
    assert_eq!(result.edges_created, 4);
}

#[tokio::test]
async fn test_analyze_scan_end_to_end() {
    let progress = MockProgressReporter::new();
    let store = Arc::new(InMemoryGraphStore::new());
    let use_case = AnalyzeScanUseCase::new(
        MockRecordsReader::new(left_pad_scan()),
        progress.clone(),
        store.clone(),
    );

    let report = use_case
        .execute(AnalysisRequest::new(PathBuf::from("scan.json")))
        .await
        .unwrap();

    assert_eq!(report.build.files, 1);
    assert_eq!(report.build.packages, 1);
    assert_eq!(report.annotation.total_edges_created(), 1);

    let impact = &report.impacts[0];
    assert_eq!(impact.file_depth("src/index.js"), Some(2));
    assert_eq!(impact.vulnerabilities, vec!["CVE-2020-0001".to_string()]);

    let risk = &report.risks[0];
    assert_eq!(risk.current_version.as_deref(), Some("1.0.0"));
    assert_eq!(risk.ranked[0].severity, Severity::High);
    assert_eq!(risk.ranked[0].remediation.upgrade_version(), Some("1.0.1"));
    assert_eq!(risk.recommended_version.as_deref(), Some("1.0.1"));
    assert!(report.exceeds_threshold());

    let starts = progress.messages_with_prefix("Start:");
    assert!(starts.iter().any(|m| m.contains("Traversing impact")));

    // The same graph queried from the vulnerability side
    let by_cve = ImpactTraversalEngine::new(store, 4)
        .traverse(&TraversalSeed::vulnerability("CVE-2020-0001"), None)
        .await
        .unwrap();
    assert_eq!(by_cve.vulnerabilities, vec!["CVE-2020-0001".to_string()]);
    assert_eq!(
        by_cve.package_depth(&PackageRef::new("left-pad", Ecosystem::JavaScript)),
        Some(0)
    );
    assert_eq!(by_cve.module_depth("left-pad"), Some(1));
    assert_eq!(by_cve.file_depth("src/index.js"), Some(2));
    assert!(!by_cve.truncated);
}

#[tokio::test]
async fn test_undecodable_advisories_are_rejected_not_fatal() {
    let records: ScanRecords = serde_json::from_str(
        r#"{
          "packages": [{"name": "left-pad", "ecosystem": "npm", "version": "1.0.0"}],
          "imports": [{"filePath": "src/index.js", "moduleName": "left-pad"}],
          "module_links": [{"module": "left-pad", "package": "left-pad", "ecosystem": "npm"}],
          "advisories": [{
            "name": "left-pad",
            "ecosystem": "npm",
            "vulnerabilities": [
              {"cve_id": "CVE-OK", "severity": "HIGH", "cvss_score": 8.5, "affected_ranges": ["<1.0.1"]},
              {"cve_id": "CVE-BAD", "severity": "UNKNOWN", "cvss_score": 5.0, "affected_ranges": ["<1.0.1"]},
              {"cve_id": "CVE-NOSCORE", "severity": "LOW", "affected_ranges": ["<1.0.1"]}
            ]
          }]
        }"#,
    )
    .unwrap();

    let progress = MockProgressReporter::new();
    let use_case = AnalyzeScanUseCase::new(
        MockRecordsReader::new(records),
        progress.clone(),
        Arc::new(InMemoryGraphStore::new()),
    );
    let report = use_case
        .execute(AnalysisRequest::new(PathBuf::from("scan.json")))
        .await
        .unwrap();

    let left_pad = PackageRef::new("left-pad", Ecosystem::JavaScript);
    let result = report.annotation.result_for(&left_pad).unwrap();
    assert_eq!(result.vulnerabilities_processed, 1);
    assert_eq!(result.edges_created, 1);
    let rejected: Vec<&str> = result.rejected.iter().map(|r| r.cve_id.as_str()).collect();
    assert_eq!(rejected, vec!["CVE-BAD", "CVE-NOSCORE"]);
    assert!(result.rejected[0].reason.contains("UNKNOWN"));

    assert_eq!(report.risks[0].ranked.len(), 1);
    assert_eq!(report.risks[0].ranked[0].cve_id, "CVE-OK");
    assert!(progress
        .messages_with_prefix("Warn:")
        .iter()
        .any(|m| m.contains("CVE-NOSCORE")));
}

#[tokio::test]
async fn test_fail_threshold_respects_severity() {
    let use_case = AnalyzeScanUseCase::new(
        MockRecordsReader::new(left_pad_scan()),
        SilentProgressReporter,
        Arc::new(InMemoryGraphStore::new()),
    );

    let report = use_case
        .execute(
            AnalysisRequest::new(PathBuf::from("scan.json"))
                .with_fail_on_severity(Severity::Critical),
        )
        .await
        .unwrap();

    assert_eq!(report.risks.len(), 1);
    assert!(!report.exceeds_threshold());
}

#[tokio::test]
async fn test_store_failure_surfaces_as_retryable_error() {
    let use_case = AnalyzeScanUseCase::new(
        MockRecordsReader::new(left_pad_scan()),
        SilentProgressReporter,
        Arc::new(TimeoutGraphStore::new(
            FailingGraphStore::new(0),
            Duration::from_secs(1),
        )),
    );

    let err = use_case
        .execute(AnalysisRequest::new(PathBuf::from("scan.json")))
        .await
        .unwrap_err();

    let impact_error = err.downcast_ref::<ImpactError>().expect("engine error");
    assert!(impact_error.is_retryable());
    assert!(matches!(
        impact_error,
        ImpactError::StoreUnavailable { operation, .. } if operation == "upsert_node"
    ));
}

#[tokio::test]
async fn test_store_failure_mid_build_aborts() {
    // Enough for the package and file nodes, then the store goes away
    let store = Arc::new(FailingGraphStore::new(2));

    let err = GraphBuilder::new(store)
        .apply(&left_pad_scan())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImpactError::StoreUnavailable { ref operation, .. } if operation == "upsert_node"
    ));
    assert!(err.is_retryable());
}
