use crate::application::dto::PackageAdvisories;
use crate::impact_analysis::domain::{
    AnnotationBatch, AnnotationResult, Edge, EdgeKind, Node, NodeKey, PackageRef,
    VulnerabilityNode, VulnerabilityRecord,
};
use crate::impact_analysis::services::{MatchOutcome, VersionMatcher};
use crate::ports::outbound::{GraphStore, ProgressReporter};
use crate::shared::error::{ImpactError, NodeKind};
use crate::shared::EngineResult;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;

/// VulnerabilityAnnotator - merges fetched vulnerability records onto
/// Package nodes.
///
/// For each valid record it upserts the Vulnerability node, one
/// AffectedVersion node per range, and an AFFECTED_BY edge when the
/// package's resolved version falls inside at least one range. A package
/// without a pinned version is assumed affected and its edge is flagged
/// as unresolved-version.
///
/// # Type Parameters
/// * `S` - GraphStore implementation
pub struct VulnerabilityAnnotator<S: GraphStore> {
    store: Arc<S>,
    max_concurrency: usize,
}

impl<S: GraphStore> VulnerabilityAnnotator<S> {
    pub fn new(store: Arc<S>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Annotates one package with a batch of records.
    ///
    /// Malformed records are rejected and counted; the rest of the batch
    /// still runs.
    ///
    /// # Errors
    /// - `NotFound` when the package is not in the graph
    /// - `StoreUnavailable` when the graph store fails
    pub async fn annotate(
        &self,
        package: &PackageRef,
        vulnerabilities: &[VulnerabilityRecord],
    ) -> EngineResult<AnnotationResult> {
        let package_key = NodeKey::package(package);
        let version = match self.store.get_node(&package_key).await? {
            Some(Node::Package(node)) => node.version,
            _ => return Err(ImpactError::not_found(NodeKind::Package, package)),
        };

        let mut result = AnnotationResult::new(package.clone());
        for record in vulnerabilities {
            if let Err(e) = record.validate() {
                tracing::warn!(package = %package, error = %e, "Rejecting vulnerability record");
                result.rejected.push(e.into());
                continue;
            }
            self.annotate_record(package, version.as_deref(), record, &mut result)
                .await?;
            result.vulnerabilities_processed += 1;
        }

        tracing::debug!(
            package = %package,
            processed = result.vulnerabilities_processed,
            edges_created = result.edges_created,
            edges_skipped = result.edges_skipped,
            unresolved = result.unresolved_version_edges,
            rejected = result.rejected_count(),
            "Annotated package"
        );
        Ok(result)
    }

    async fn annotate_record(
        &self,
        package: &PackageRef,
        version: Option<&str>,
        record: &VulnerabilityRecord,
        result: &mut AnnotationResult,
    ) -> EngineResult<()> {
        let vulnerability = VulnerabilityNode::from(record);
        let cve_id = vulnerability.cve_id.clone();
        self.store
            .upsert_node(Node::Vulnerability(vulnerability))
            .await?;

        let ranges: Vec<&str> = record
            .affected_ranges
            .iter()
            .map(|range| range.trim())
            .filter(|range| !range.is_empty())
            .collect();

        for range in &ranges {
            self.store
                .upsert_node(Node::AffectedVersion {
                    cve_id: cve_id.clone(),
                    range: range.to_string(),
                })
                .await?;
            self.store.upsert_edge(Edge::affects(&cve_id, range)).await?;
        }

        if ranges.is_empty() {
            tracing::debug!(package = %package, cve_id = %cve_id, "Record lists no affected ranges");
            result.edges_skipped += 1;
            return Ok(());
        }

        let Some(version) = version else {
            self.store
                .upsert_edge(Edge::affected_by_unresolved(package, &cve_id))
                .await?;
            result.edges_created += 1;
            result.unresolved_version_edges += 1;
            return Ok(());
        };

        let mut matched = Vec::new();
        for range in &ranges {
            match VersionMatcher::evaluate(version, range) {
                MatchOutcome::Affected => matched.push(range.to_string()),
                MatchOutcome::NotAffected => {}
                MatchOutcome::Unparseable => {
                    tracing::warn!(
                        package = %package,
                        version,
                        range,
                        cve_id = %cve_id,
                        "Unparseable version or range, treating as not affected"
                    );
                    result.unparseable_versions += 1;
                }
            }
        }

        if matched.is_empty() {
            result.edges_skipped += 1;
            let removed = self
                .store
                .remove_edge(
                    &NodeKey::package(package),
                    EdgeKind::AffectedBy,
                    &NodeKey::vulnerability(&cve_id),
                )
                .await?;
            if removed {
                result.edges_removed += 1;
            }
        } else {
            self.store
                .upsert_edge(Edge::affected_by(package, &cve_id, matched))
                .await?;
            result.edges_created += 1;
        }
        Ok(())
    }

    /// Annotates many packages concurrently.
    ///
    /// Records are grouped per package key first, so one package is never
    /// annotated by two tasks at once. Packages missing from the graph are
    /// listed in `missing_packages`; any other failure aborts the batch.
    pub async fn annotate_all(
        &self,
        advisories: &[PackageAdvisories],
        progress: &dyn ProgressReporter,
    ) -> EngineResult<AnnotationBatch> {
        let mut grouped: BTreeMap<PackageRef, Vec<VulnerabilityRecord>> = BTreeMap::new();
        for entry in advisories {
            grouped
                .entry(entry.package_ref())
                .or_default()
                .extend(entry.vulnerabilities.iter().cloned());
        }

        progress.start(grouped.len(), "Annotating packages");
        let outcomes: Vec<(PackageRef, EngineResult<AnnotationResult>)> = stream::iter(grouped)
            .map(|(package, records)| async move {
                let outcome = self.annotate(&package, &records).await;
                progress.advance(&package.to_string());
                (package, outcome)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut batch = AnnotationBatch::default();
        for (package, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    for rejected in &result.rejected {
                        progress.warn(&format!(
                            "Rejected {} for {}: {}",
                            rejected.cve_id, package, rejected.reason
                        ));
                    }
                    batch.results.push(result);
                }
                Err(ImpactError::NotFound { .. }) => {
                    tracing::warn!(package = %package, "Advisories name a package absent from the graph");
                    batch.missing_packages.push(package);
                }
                Err(e) => {
                    progress.finish("Annotation aborted");
                    return Err(e);
                }
            }
        }
        batch.results.sort_by(|a, b| a.package.cmp(&b.package));
        batch.missing_packages.sort();

        progress.finish(&format!(
            "Annotated {} package(s): {} edge(s), {} rejected record(s)",
            batch.results.len(),
            batch.total_edges_created(),
            batch.total_rejected()
        ));
        Ok(batch)
    }
}
