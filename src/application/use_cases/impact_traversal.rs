use crate::impact_analysis::domain::{
    Direction, EdgeKind, ImpactSet, ImpactedFile, ImpactedModule, ImpactedPackage, NodeKey,
    PackageRef, TraversalSeed,
};
use crate::ports::inbound::ImpactQueryPort;
use crate::ports::outbound::GraphStore;
use crate::shared::error::{ImpactError, NodeKind};
use crate::shared::EngineResult;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a caller and running
/// traversals. Traversals check it between BFS levels, never mid-level.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// ImpactTraversalEngine - computes transitive impact by walking
/// structural edges in reverse.
///
/// Impact flows from a vulnerable package outward: to packages that depend
/// on it (DEPENDS_ON), to modules resolving to it (RESOLVES_TO) and from
/// modules to the files importing them (IMPORTS). The walk is a level-by-
/// level BFS; queries within one level are issued concurrently and merged
/// before the next level starts.
///
/// # Type Parameters
/// * `S` - GraphStore implementation
pub struct ImpactTraversalEngine<S: GraphStore> {
    store: Arc<S>,
    max_concurrency: usize,
    cancellation: CancellationSignal,
}

impl<S: GraphStore> ImpactTraversalEngine<S> {
    pub fn new(store: Arc<S>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
            cancellation: CancellationSignal::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Computes the impact set of `seed`.
    ///
    /// `max_depth` bounds reverse hops from the vulnerable package(s), which
    /// sit at depth 0. For a vulnerability seed, reaching those packages via
    /// AFFECTED_BY is not a hop.
    ///
    /// # Errors
    /// - `NotFound` when the seed is not in the graph
    /// - `StoreUnavailable` when the graph store fails
    pub async fn traverse(
        &self,
        seed: &TraversalSeed,
        max_depth: Option<u32>,
    ) -> EngineResult<ImpactSet> {
        let mut impact = ImpactSet::empty(seed.clone(), max_depth);
        let roots = self.resolve_roots(seed, &mut impact).await?;

        let mut visited: HashSet<NodeKey> = HashSet::new();
        let mut frontier: Vec<NodeKey> = Vec::new();
        for root in roots {
            if visited.insert(root.clone()) {
                record(&mut impact, &root, 0);
                frontier.push(root);
            }
        }

        let mut depth = 0;
        while !frontier.is_empty() {
            if self.cancellation.is_cancelled() {
                tracing::info!(seed = %seed, depth, "Traversal cancelled");
                impact.cancelled = true;
                impact.truncated = true;
                break;
            }

            let next = self.expand_level(&frontier).await?;
            if max_depth == Some(depth) {
                if next.iter().any(|key| !visited.contains(key)) {
                    tracing::info!(seed = %seed, depth, "Traversal truncated at max depth");
                    impact.truncated = true;
                }
                break;
            }

            depth += 1;
            frontier = next
                .into_iter()
                .filter(|key| visited.insert(key.clone()))
                .collect();
            for key in &frontier {
                record(&mut impact, key, depth);
            }
        }

        impact.normalize();
        tracing::debug!(
            seed = %seed,
            packages = impact.packages.len(),
            modules = impact.modules.len(),
            files = impact.files.len(),
            truncated = impact.truncated,
            "Traversal complete"
        );
        Ok(impact)
    }

    /// Finds the depth-0 packages of a seed and records the vulnerabilities
    /// the traversal originates from.
    async fn resolve_roots(
        &self,
        seed: &TraversalSeed,
        impact: &mut ImpactSet,
    ) -> EngineResult<Vec<NodeKey>> {
        match seed {
            TraversalSeed::Vulnerability { cve_id } => {
                let cve_id = cve_id.trim();
                let key = NodeKey::vulnerability(cve_id);
                if !self.store.contains_node(&key).await? {
                    return Err(ImpactError::not_found(NodeKind::Vulnerability, cve_id));
                }
                impact.vulnerabilities.push(cve_id.to_string());
                self.store
                    .neighbors(&key, EdgeKind::AffectedBy, Direction::Incoming)
                    .await
            }
            TraversalSeed::Package(package) => {
                let key = NodeKey::package(package);
                if !self.store.contains_node(&key).await? {
                    return Err(ImpactError::not_found(NodeKind::Package, package));
                }
                impact.vulnerabilities = self
                    .store
                    .neighbors(&key, EdgeKind::AffectedBy, Direction::Outgoing)
                    .await?
                    .iter()
                    .map(NodeKey::identifier)
                    .collect();
                Ok(vec![key])
            }
        }
    }

    /// Reverse neighbors of every frontier node, fetched concurrently and
    /// merged into a stable order.
    async fn expand_level(&self, frontier: &[NodeKey]) -> EngineResult<BTreeSet<NodeKey>> {
        let batches: Vec<EngineResult<Vec<NodeKey>>> = stream::iter(frontier.iter().cloned())
            .map(|key| async move { self.reverse_neighbors(&key).await })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut next = BTreeSet::new();
        for batch in batches {
            next.extend(batch?);
        }
        Ok(next)
    }

    async fn reverse_neighbors(&self, key: &NodeKey) -> EngineResult<Vec<NodeKey>> {
        match key {
            NodeKey::Package(_) => {
                let mut keys = self
                    .store
                    .neighbors(key, EdgeKind::DependsOn, Direction::Incoming)
                    .await?;
                keys.extend(
                    self.store
                        .neighbors(key, EdgeKind::ResolvesTo, Direction::Incoming)
                        .await?,
                );
                Ok(keys)
            }
            NodeKey::Module { .. } => {
                self.store
                    .neighbors(key, EdgeKind::Imports, Direction::Incoming)
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn record(impact: &mut ImpactSet, key: &NodeKey, depth: u32) {
    match key {
        NodeKey::Package(package) => impact.packages.push(ImpactedPackage {
            package: package.clone(),
            depth,
        }),
        NodeKey::Module { name } => impact.modules.push(ImpactedModule {
            name: name.clone(),
            depth,
        }),
        NodeKey::File { path } => impact.files.push(ImpactedFile {
            path: path.clone(),
            depth,
        }),
        _ => {}
    }
}

#[async_trait]
impl<S: GraphStore> ImpactQueryPort for ImpactTraversalEngine<S> {
    async fn traverse_impact(
        &self,
        seed: &TraversalSeed,
        max_depth: Option<u32>,
    ) -> EngineResult<ImpactSet> {
        self.traverse(seed, max_depth).await
    }

    async fn file_exists(&self, path: &str) -> EngineResult<bool> {
        self.store.contains_node(&NodeKey::file(path)).await
    }

    async fn package_exists(&self, package: &PackageRef) -> EngineResult<bool> {
        self.store.contains_node(&NodeKey::package(package)).await
    }

    async fn vulnerability_exists(&self, cve_id: &str) -> EngineResult<bool> {
        self.store
            .contains_node(&NodeKey::vulnerability(cve_id.trim()))
            .await
    }
}
