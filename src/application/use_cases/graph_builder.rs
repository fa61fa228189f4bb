use crate::application::dto::{BuildSummary, ScanRecords};
use crate::impact_analysis::domain::records::top_level_module;
use crate::impact_analysis::domain::{
    Ecosystem, Edge, Node, NodeKey, PackageNode, PackageRef, UpsertOutcome,
};
use crate::ports::outbound::GraphStore;
use crate::shared::error::{ImpactError, NodeKind};
use crate::shared::EngineResult;
use std::collections::BTreeSet;
use std::sync::Arc;

/// GraphBuilder - structural graph construction from collaborator records.
///
/// Every operation merges on key, so replaying the same records leaves the
/// graph unchanged. No vulnerability logic lives here.
///
/// # Type Parameters
/// * `S` - GraphStore implementation
pub struct GraphBuilder<S: GraphStore> {
    store: Arc<S>,
}

impl<S: GraphStore> GraphBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn upsert_file(&self, path: &str) -> EngineResult<UpsertOutcome> {
        self.store
            .upsert_node(Node::File {
                path: path.trim().to_string(),
            })
            .await
    }

    /// Records that `file_path` imports `module_name`.
    ///
    /// The module name is reduced to its top-level unit first. Relative
    /// imports still record the file but create no module, and return `None`.
    pub async fn upsert_import(
        &self,
        file_path: &str,
        module_name: &str,
    ) -> EngineResult<Option<UpsertOutcome>> {
        self.upsert_file(file_path).await?;

        let Some(module) = top_level_module(module_name) else {
            tracing::debug!(file = file_path, module = module_name, "Skipping relative import");
            return Ok(None);
        };

        self.store
            .upsert_node(Node::Module {
                name: module.clone(),
            })
            .await?;
        let outcome = self
            .store
            .upsert_edge(Edge::imports(file_path.trim(), &module))
            .await?;
        Ok(Some(outcome))
    }

    /// Inserts the package or updates its pinned version in place.
    ///
    /// A blank or absent version never erases a version already known.
    pub async fn upsert_package(
        &self,
        name: &str,
        ecosystem: Ecosystem,
        version: Option<&str>,
    ) -> EngineResult<UpsertOutcome> {
        let version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);

        self.store
            .upsert_node(Node::Package(PackageNode {
                package: PackageRef::new(name, ecosystem),
                version,
            }))
            .await
    }

    /// Resolves an imported module to a declared package.
    ///
    /// # Errors
    /// `NotFound` when the package has not been upserted.
    pub async fn link_module_to_package(
        &self,
        module_name: &str,
        package_name: &str,
        ecosystem: Ecosystem,
    ) -> EngineResult<UpsertOutcome> {
        let module = top_level_module(module_name)
            .ok_or_else(|| ImpactError::not_found(NodeKind::Module, module_name))?;
        let package = PackageRef::new(package_name, ecosystem);
        if !self.store.contains_node(&NodeKey::package(&package)).await? {
            return Err(ImpactError::not_found(NodeKind::Package, &package));
        }

        self.store
            .upsert_node(Node::Module {
                name: module.clone(),
            })
            .await?;
        self.store
            .upsert_edge(Edge::resolves_to(&module, &package))
            .await
    }

    /// Records that `dependent` declares a dependency on `dependency`.
    ///
    /// # Errors
    /// `NotFound` when either package has not been upserted.
    pub async fn upsert_dependency(
        &self,
        dependent: &str,
        dependency: &str,
        ecosystem: Ecosystem,
    ) -> EngineResult<UpsertOutcome> {
        let dependent = PackageRef::new(dependent, ecosystem);
        let dependency = PackageRef::new(dependency, ecosystem);
        self.store
            .upsert_edge(Edge::depends_on(&dependent, &dependency))
            .await
    }

    /// Applies every structural record of a scan.
    ///
    /// Packages go first so that links and dependencies can find them.
    /// References to packages absent from the records are counted and
    /// skipped; store failures abort.
    pub async fn apply(&self, records: &ScanRecords) -> EngineResult<BuildSummary> {
        let mut summary = BuildSummary::default();

        for record in &records.packages {
            self.upsert_package(&record.name, record.ecosystem, record.version.as_deref())
                .await?;
        }
        summary.packages = records
            .packages
            .iter()
            .map(|record| record.package_ref())
            .collect::<BTreeSet<_>>()
            .len();

        let mut files = BTreeSet::new();
        for record in &records.imports {
            if record.file_path.trim().is_empty() {
                summary.skipped_imports += 1;
                continue;
            }
            files.insert(record.file_path.trim().to_string());
            match self.upsert_import(&record.file_path, &record.module_name).await? {
                Some(_) => summary.imports += 1,
                None => summary.skipped_imports += 1,
            }
        }
        summary.files = files.len();

        for link in &records.module_links {
            match self
                .link_module_to_package(&link.module, &link.package, link.ecosystem)
                .await
            {
                Ok(_) => summary.module_links += 1,
                Err(ImpactError::NotFound { kind, key }) => {
                    tracing::warn!(module = %link.module, %kind, %key, "Skipping module link");
                    summary.dangling_references += 1;
                }
                Err(e) => return Err(e),
            }
        }

        for dependency in &records.dependencies {
            match self
                .upsert_dependency(
                    &dependency.dependent,
                    &dependency.dependency,
                    dependency.ecosystem,
                )
                .await
            {
                Ok(_) => summary.dependencies += 1,
                Err(ImpactError::NotFound { kind, key }) => {
                    tracing::warn!(
                        dependent = %dependency.dependent,
                        dependency = %dependency.dependency,
                        %kind,
                        %key,
                        "Skipping dependency"
                    );
                    summary.dangling_references += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            files = summary.files,
            imports = summary.imports,
            packages = summary.packages,
            module_links = summary.module_links,
            dependencies = summary.dependencies,
            "Graph built"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::memory::InMemoryGraphStore;
    use crate::impact_analysis::domain::{
        Direction, EdgeKind, ImportRecord, ModuleLinkRecord, PackageRecord,
    };

    fn builder() -> (Arc<InMemoryGraphStore>, GraphBuilder<InMemoryGraphStore>) {
        let store = Arc::new(InMemoryGraphStore::new());
        (store.clone(), GraphBuilder::new(store))
    }

    #[tokio::test]
    async fn test_upsert_import_normalizes_module() {
        let (store, builder) = builder();
        builder.upsert_import("app/main.py", "os.path").await.unwrap();

        let targets = store
            .neighbors(&NodeKey::file("app/main.py"), EdgeKind::Imports, Direction::Outgoing)
            .await
            .unwrap();
        assert_eq!(targets, vec![NodeKey::module("os")]);
    }

    #[tokio::test]
    async fn test_relative_import_records_file_only() {
        let (store, builder) = builder();
        let outcome = builder.upsert_import("src/index.js", "./util").await.unwrap();

        assert_eq!(outcome, None);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.nodes_labeled(NodeKind::File), 1);
        assert_eq!(stats.nodes_labeled(NodeKind::Module), 0);
    }

    #[tokio::test]
    async fn test_operations_are_idempotent() {
        let (store, builder) = builder();
        for _ in 0..2 {
            builder.upsert_file("a.py").await.unwrap();
            builder.upsert_import("a.py", "requests").await.unwrap();
            builder
                .upsert_package("requests", Ecosystem::Python, Some("2.31.0"))
                .await
                .unwrap();
            builder
                .link_module_to_package("requests", "requests", Ecosystem::Python)
                .await
                .unwrap();
        }

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.node_count(), 3);
        assert_eq!(stats.edge_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_version_keeps_known_version() {
        let (store, builder) = builder();
        builder
            .upsert_package("flask", Ecosystem::Python, Some("2.0.0"))
            .await
            .unwrap();
        let outcome = builder
            .upsert_package("Flask", Ecosystem::Python, Some("  "))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        let node = store
            .get_node(&NodeKey::package(&PackageRef::new("flask", Ecosystem::Python)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(node.as_package().unwrap().version.as_deref(), Some("2.0.0"));
    }

    #[tokio::test]
    async fn test_same_name_in_two_ecosystems_is_two_packages() {
        let (store, builder) = builder();
        builder
            .upsert_package("request", Ecosystem::Python, Some("1.0"))
            .await
            .unwrap();
        builder
            .upsert_package("request", Ecosystem::JavaScript, Some("1.0"))
            .await
            .unwrap();
        assert_eq!(store.stats().await.unwrap().nodes_labeled(NodeKind::Package), 2);
    }

    #[tokio::test]
    async fn test_link_to_unknown_package_is_not_found() {
        let (_, builder) = builder();
        let result = builder
            .link_module_to_package("yaml", "pyyaml", Ecosystem::Python)
            .await;
        assert!(matches!(
            result,
            Err(ImpactError::NotFound {
                kind: NodeKind::Package,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_apply_counts_dangling_references() {
        let (store, builder) = builder();
        let records = ScanRecords {
            packages: vec![PackageRecord::new("lodash", Ecosystem::JavaScript, Some("4.17.20"))],
            imports: vec![
                ImportRecord::new("src/a.js", "lodash/fp"),
                ImportRecord::new("src/a.js", "./local"),
                ImportRecord::new("src/b.js", "lodash"),
            ],
            module_links: vec![
                ModuleLinkRecord {
                    module: "lodash".to_string(),
                    package: "lodash".to_string(),
                    ecosystem: Ecosystem::JavaScript,
                },
                ModuleLinkRecord {
                    module: "express".to_string(),
                    package: "express".to_string(),
                    ecosystem: Ecosystem::JavaScript,
                },
            ],
            ..ScanRecords::default()
        };

        let summary = builder.apply(&records).await.unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.imports, 2);
        assert_eq!(summary.skipped_imports, 1);
        assert_eq!(summary.module_links, 1);
        assert_eq!(summary.dangling_references, 1);

        let again = builder.apply(&records).await.unwrap();
        assert_eq!(again, summary);
        // lodash module, two files, one package
        assert_eq!(store.stats().await.unwrap().node_count(), 4);
    }
}
