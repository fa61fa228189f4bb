use crate::impact_analysis::domain::{
    Direction, Edge, EdgeKind, GraphStats, Node, NodeKey, UpsertOutcome,
};
use crate::shared::EngineResult;
use async_trait::async_trait;

/// GraphStore port over a labeled property graph.
///
/// This is the single source of truth for graph state: the builder,
/// annotator and traversal engine hold no private copies and go through
/// these operations for every read and write.
///
/// # Contract
/// - Upserts merge on key and are idempotent, so a retry after a timeout
///   can never double-apply an effect.
/// - Operations touching the same node key are serialized by the
///   implementation (per-key locking or transactional upsert).
/// - Connectivity or deadline failures surface as `StoreUnavailable`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Inserts the node or merges it into the existing node with the same key
    async fn upsert_node(&self, node: Node) -> EngineResult<UpsertOutcome>;

    /// Inserts the edge or replaces the attributes of the existing
    /// `(from, kind, to)` edge.
    ///
    /// # Errors
    /// `NotFound` when either endpoint does not exist.
    async fn upsert_edge(&self, edge: Edge) -> EngineResult<UpsertOutcome>;

    /// Looks up a node by key
    async fn get_node(&self, key: &NodeKey) -> EngineResult<Option<Node>>;

    /// Looks up the edge identified by `(from, kind, to)`
    async fn get_edge(&self, from: &NodeKey, kind: EdgeKind, to: &NodeKey)
        -> EngineResult<Option<Edge>>;

    /// Deletes the `(from, kind, to)` edge; returns whether it existed.
    /// Nodes are never deleted.
    async fn remove_edge(&self, from: &NodeKey, kind: EdgeKind, to: &NodeKey) -> EngineResult<bool>;

    /// Keys of the nodes one `kind` hop away from `key` in `direction`,
    /// in a stable order
    async fn neighbors(
        &self,
        key: &NodeKey,
        kind: EdgeKind,
        direction: Direction,
    ) -> EngineResult<Vec<NodeKey>>;

    /// Node and edge counts per label
    async fn stats(&self) -> EngineResult<GraphStats>;

    async fn contains_node(&self, key: &NodeKey) -> EngineResult<bool> {
        Ok(self.get_node(key).await?.is_some())
    }
}
