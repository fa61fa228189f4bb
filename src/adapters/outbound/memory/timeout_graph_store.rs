use crate::impact_analysis::domain::{
    Direction, Edge, EdgeKind, GraphStats, Node, NodeKey, UpsertOutcome,
};
use crate::ports::outbound::GraphStore;
use crate::shared::error::ImpactError;
use crate::shared::EngineResult;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// TimeoutGraphStore wraps a GraphStore and bounds every operation by a
/// deadline.
///
/// This adapter implements the decorator pattern: an operation that does
/// not complete in time fails with `StoreUnavailable`. Every store mutation
/// is an idempotent upsert, so the caller may retry it safely.
pub struct TimeoutGraphStore<S: GraphStore> {
    inner: S,
    deadline: Duration,
}

impl<S: GraphStore> TimeoutGraphStore<S> {
    pub fn new(inner: S, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        future: impl Future<Output = EngineResult<T>> + Send,
    ) -> EngineResult<T> {
        match tokio::time::timeout(self.deadline, future).await {
            Ok(result) => result,
            Err(_) => {
                let deadline_ms = self.deadline.as_millis();
                tracing::warn!(operation, deadline_ms, "Graph store operation timed out");
                Err(ImpactError::store_unavailable(
                    operation,
                    format!("no response within {} ms", deadline_ms),
                ))
            }
        }
    }
}

#[async_trait]
impl<S: GraphStore> GraphStore for TimeoutGraphStore<S> {
    async fn upsert_node(&self, node: Node) -> EngineResult<UpsertOutcome> {
        self.bounded("upsert_node", self.inner.upsert_node(node)).await
    }

    async fn upsert_edge(&self, edge: Edge) -> EngineResult<UpsertOutcome> {
        self.bounded("upsert_edge", self.inner.upsert_edge(edge)).await
    }

    async fn get_node(&self, key: &NodeKey) -> EngineResult<Option<Node>> {
        self.bounded("get_node", self.inner.get_node(key)).await
    }

    async fn get_edge(
        &self,
        from: &NodeKey,
        kind: EdgeKind,
        to: &NodeKey,
    ) -> EngineResult<Option<Edge>> {
        self.bounded("get_edge", self.inner.get_edge(from, kind, to)).await
    }

    async fn remove_edge(&self, from: &NodeKey, kind: EdgeKind, to: &NodeKey) -> EngineResult<bool> {
        self.bounded("remove_edge", self.inner.remove_edge(from, kind, to))
            .await
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        kind: EdgeKind,
        direction: Direction,
    ) -> EngineResult<Vec<NodeKey>> {
        self.bounded("neighbors", self.inner.neighbors(key, kind, direction))
            .await
    }

    async fn stats(&self) -> EngineResult<GraphStats> {
        self.bounded("stats", self.inner.stats()).await
    }
}
