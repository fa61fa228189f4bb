use crate::impact_analysis::domain::{ImpactSet, PackageRef, TraversalSeed};
use crate::shared::EngineResult;
use async_trait::async_trait;

/// ImpactQueryPort - Inbound port for impact queries
///
/// This is the read surface external adapters (CLI, report layer) use:
/// existence checks to validate identifiers, then the impact traversal.
#[async_trait]
pub trait ImpactQueryPort: Send + Sync {
    /// Computes the transitive impact of a vulnerability or package.
    ///
    /// `max_depth` bounds the number of reverse hops from the vulnerable
    /// package(s); `None` means unbounded.
    ///
    /// # Errors
    /// - `NotFound` when the seed does not exist in the graph
    /// - `StoreUnavailable` when the graph store cannot be reached
    async fn traverse_impact(
        &self,
        seed: &TraversalSeed,
        max_depth: Option<u32>,
    ) -> EngineResult<ImpactSet>;

    async fn file_exists(&self, path: &str) -> EngineResult<bool>;

    async fn package_exists(&self, package: &PackageRef) -> EngineResult<bool>;

    async fn vulnerability_exists(&self, cve_id: &str) -> EngineResult<bool>;
}
