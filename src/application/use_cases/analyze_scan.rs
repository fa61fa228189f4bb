use super::graph_builder::GraphBuilder;
use super::impact_traversal::{CancellationSignal, ImpactTraversalEngine};
use super::vulnerability_annotator::VulnerabilityAnnotator;
use crate::application::dto::{AnalysisReport, AnalysisRequest, ScanRecords, UnresolvedSeed};
use crate::impact_analysis::domain::{
    AnnotationBatch, Direction, EdgeKind, ImpactSet, NodeKey, PackageRef, RiskReport,
    TraversalSeed,
};
use crate::impact_analysis::services::RiskAggregator;
use crate::ports::outbound::{GraphStore, ProgressReporter, RecordsReader};
use crate::shared::error::ImpactError;
use crate::shared::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// AnalyzeScanUseCase - end-to-end analysis of one scan.
///
/// Orchestrates the engine components in data-flow order: read the
/// collaborator records, build the structural graph, annotate
/// vulnerabilities, traverse impact per seed and aggregate risk per
/// vulnerable package.
///
/// # Type Parameters
/// * `RR` - RecordsReader implementation
/// * `PR` - ProgressReporter implementation
/// * `S` - GraphStore implementation
pub struct AnalyzeScanUseCase<RR, PR, S: GraphStore> {
    records_reader: RR,
    progress_reporter: PR,
    store: Arc<S>,
    cancellation: CancellationSignal,
}

impl<RR, PR, S> AnalyzeScanUseCase<RR, PR, S>
where
    RR: RecordsReader,
    PR: ProgressReporter,
    S: GraphStore,
{
    pub fn new(records_reader: RR, progress_reporter: PR, store: Arc<S>) -> Self {
        Self {
            records_reader,
            progress_reporter,
            store,
            cancellation: CancellationSignal::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Executes the analysis
    ///
    /// # Errors
    /// Returns an error if the records cannot be read or the graph store
    /// fails. Unknown seeds and malformed vulnerability records are
    /// reported in the result, not as errors.
    pub async fn execute(&self, request: AnalysisRequest) -> Result<AnalysisReport> {
        // Step 1: Read collaborator records
        let records = self.records_reader.read_records(&request.input_path)?;
        tracing::info!(
            packages = records.packages.len(),
            imports = records.imports.len(),
            advisories = records.vulnerability_record_count(),
            "Loaded scan records"
        );

        // Step 2: Build the structural graph
        let build = GraphBuilder::new(self.store.clone()).apply(&records).await?;

        // Step 3: Annotate vulnerabilities
        let annotation = VulnerabilityAnnotator::new(self.store.clone(), request.max_concurrency)
            .annotate_all(&records.advisories, &self.progress_reporter)
            .await?;

        // Step 4: Traverse impact per seed
        let seeds = if request.seeds.is_empty() {
            Self::default_seeds(&annotation)
        } else {
            request.seeds.clone()
        };
        let engine = ImpactTraversalEngine::new(self.store.clone(), request.max_concurrency)
            .with_cancellation(self.cancellation.clone());
        let (impacts, unresolved_seeds) = self.traverse_seeds(&engine, &seeds, &request).await?;

        // Step 5: Aggregate risk per vulnerable package
        let risks = self
            .aggregate_risks(&engine, &records, &impacts, &request)
            .await?;

        // Step 6: Assemble the report
        let graph = self.store.stats().await?;
        let mut report =
            AnalysisReport::new(build, annotation, graph, request.fail_on_severity);
        report.impacts = impacts;
        report.risks = risks;
        report.unresolved_seeds = unresolved_seeds;
        Ok(report)
    }

    /// Every package with at least one confirmed AFFECTED_BY edge
    fn default_seeds(annotation: &AnnotationBatch) -> Vec<TraversalSeed> {
        annotation
            .results
            .iter()
            .filter(|result| result.edges_created > 0)
            .map(|result| TraversalSeed::package(result.package.clone()))
            .collect()
    }

    async fn traverse_seeds(
        &self,
        engine: &ImpactTraversalEngine<S>,
        seeds: &[TraversalSeed],
        request: &AnalysisRequest,
    ) -> Result<(Vec<ImpactSet>, Vec<UnresolvedSeed>)> {
        let mut impacts = Vec::new();
        let mut unresolved = Vec::new();

        self.progress_reporter
            .start(seeds.len(), "Traversing impact");
        for seed in seeds {
            match engine.traverse(seed, request.max_depth).await {
                Ok(impact) => {
                    if impact.truncated {
                        self.progress_reporter.warn(&format!(
                            "Impact of {} is truncated (max depth {:?}, cancelled: {})",
                            seed, request.max_depth, impact.cancelled
                        ));
                    }
                    impacts.push(impact);
                }
                Err(e @ ImpactError::NotFound { .. }) => {
                    self.progress_reporter
                        .warn(&format!("Skipping seed {}: {}", seed, e));
                    unresolved.push(UnresolvedSeed {
                        seed: seed.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    self.progress_reporter.finish("Traversal aborted");
                    return Err(e.into());
                }
            }
            self.progress_reporter.advance(&seed.to_string());
        }
        self.progress_reporter.finish(&format!(
            "Traversed {} seed(s), {} unresolved",
            impacts.len(),
            unresolved.len()
        ));

        Ok((impacts, unresolved))
    }

    /// One risk report per package found vulnerable at depth 0 of any impact
    /// set. The report uses the package's own impact set, traversing it
    /// when no package seed produced one.
    async fn aggregate_risks(
        &self,
        engine: &ImpactTraversalEngine<S>,
        records: &ScanRecords,
        impacts: &[ImpactSet],
        request: &AnalysisRequest,
    ) -> Result<Vec<RiskReport>> {
        let mut package_impacts: BTreeMap<PackageRef, ImpactSet> = BTreeMap::new();
        let mut vulnerable: BTreeSet<PackageRef> = BTreeSet::new();
        for impact in impacts {
            if let TraversalSeed::Package(package) = &impact.seed {
                package_impacts.insert(package.clone(), impact.clone());
            }
            vulnerable.extend(
                impact
                    .packages
                    .iter()
                    .filter(|p| p.depth == 0)
                    .map(|p| p.package.clone()),
            );
        }

        let aggregator = RiskAggregator::new(request.breadth_weight);
        let mut reports = Vec::new();
        for package in vulnerable {
            let key = NodeKey::package(&package);
            let cve_ids: BTreeSet<String> = self
                .store
                .neighbors(&key, EdgeKind::AffectedBy, Direction::Outgoing)
                .await?
                .iter()
                .map(NodeKey::identifier)
                .collect();
            if cve_ids.is_empty() {
                continue;
            }

            let Some(node) = self
                .store
                .get_node(&key)
                .await?
                .and_then(|node| node.as_package().cloned())
            else {
                continue;
            };

            let impact = match package_impacts.remove(&package) {
                Some(impact) => impact,
                None => {
                    engine
                        .traverse(&TraversalSeed::package(package.clone()), request.max_depth)
                        .await?
                }
            };

            let vulns: Vec<_> = records
                .advisories_for(&package)
                .into_iter()
                .filter(|record| cve_ids.contains(record.cve_id.trim()))
                .collect();
            reports.push(aggregator.aggregate_risk(&node, &vulns, &impact));
        }

        reports.sort_by(|a, b| {
            b.highest_severity()
                .cmp(&a.highest_severity())
                .then_with(|| a.package.cmp(&b.package))
        });
        Ok(reports)
    }
}
