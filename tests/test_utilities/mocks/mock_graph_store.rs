use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use vuln_impact::impact_analysis::domain::{
    Direction, Edge, EdgeKind, GraphStats, Node, NodeKey, UpsertOutcome,
};
use vuln_impact::prelude::*;

/// Graph store that serves `budget` operations from an in-memory store and
/// then fails every call with `StoreUnavailable`
pub struct FailingGraphStore {
    inner: InMemoryGraphStore,
    remaining: AtomicUsize,
}

impl FailingGraphStore {
    pub fn new(budget: usize) -> Self {
        Self {
            inner: InMemoryGraphStore::new(),
            remaining: AtomicUsize::new(budget),
        }
    }

    fn take(&self, operation: &str) -> EngineResult<()> {
        let consumed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match consumed {
            Ok(_) => Ok(()),
            Err(_) => Err(ImpactError::StoreUnavailable {
                operation: operation.to_string(),
                details: "connection refused".to_string(),
            }),
        }
    }
}

#[async_trait]
impl GraphStore for FailingGraphStore {
    async fn upsert_node(&self, node: Node) -> EngineResult<UpsertOutcome> {
        self.take("upsert_node")?;
        self.inner.upsert_node(node).await
    }

    async fn upsert_edge(&self, edge: Edge) -> EngineResult<UpsertOutcome> {
        self.take("upsert_edge")?;
        self.inner.upsert_edge(edge).await
    }

    async fn get_node(&self, key: &NodeKey) -> EngineResult<Option<Node>> {
        self.take("get_node")?;
        self.inner.get_node(key).await
    }

    async fn get_edge(
        &self,
        from: &NodeKey,
        kind: EdgeKind,
        to: &NodeKey,
    ) -> EngineResult<Option<Edge>> {
        self.take("get_edge")?;
        self.inner.get_edge(from, kind, to).await
    }

    async fn remove_edge(&self, from: &NodeKey, kind: EdgeKind, to: &NodeKey) -> EngineResult<bool> {
        self.take("remove_edge")?;
        self.inner.remove_edge(from, kind, to).await
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        kind: EdgeKind,
        direction: Direction,
    ) -> EngineResult<Vec<NodeKey>> {
        self.take("neighbors")?;
        self.inner.neighbors(key, kind, direction).await
    }

    async fn stats(&self) -> EngineResult<GraphStats> {
        self.take("stats")?;
        self.inner.stats().await
    }
}
