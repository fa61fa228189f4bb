use crate::impact_analysis::domain::{
    Direction, Edge, EdgeKey, EdgeKind, GraphStats, Node, NodeKey, UpsertOutcome,
};
use crate::ports::outbound::GraphStore;
use crate::shared::error::ImpactError;
use crate::shared::EngineResult;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeSet;

type AdjacencyKey = (NodeKey, EdgeKind);

/// InMemoryGraphStore adapter: an embedded labeled property graph.
///
/// Nodes and edges live in sharded concurrent maps. Upserts go through
/// `DashMap::entry`, which holds the shard lock for the key while merging,
/// so concurrent writers to the same node key are serialized and cannot
/// lose each other's updates.
#[derive(Default)]
pub struct InMemoryGraphStore {
    nodes: DashMap<NodeKey, Node>,
    edges: DashMap<EdgeKey, Edge>,
    outgoing: DashMap<AdjacencyKey, BTreeSet<NodeKey>>,
    incoming: DashMap<AdjacencyKey, BTreeSet<NodeKey>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_exists(&self, key: &NodeKey) -> EngineResult<()> {
        if self.nodes.contains_key(key) {
            Ok(())
        } else {
            Err(ImpactError::not_found(key.kind(), key.identifier()))
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn upsert_node(&self, node: Node) -> EngineResult<UpsertOutcome> {
        match self.nodes.entry(node.key()) {
            Entry::Occupied(mut entry) => Ok(if entry.get_mut().merge(node) {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Unchanged
            }),
            Entry::Vacant(entry) => {
                entry.insert(node);
                Ok(UpsertOutcome::Created)
            }
        }
    }

    async fn upsert_edge(&self, edge: Edge) -> EngineResult<UpsertOutcome> {
        self.ensure_exists(edge.from())?;
        self.ensure_exists(edge.to())?;

        let key = edge.key();
        let outcome = match self.edges.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get() == &edge {
                    UpsertOutcome::Unchanged
                } else {
                    entry.insert(edge);
                    UpsertOutcome::Updated
                }
            }
            Entry::Vacant(entry) => {
                // Adjacency changes happen under the edge's shard lock.
                let _locked = entry.insert(edge);
                self.outgoing
                    .entry((key.from.clone(), key.kind))
                    .or_default()
                    .insert(key.to.clone());
                self.incoming
                    .entry((key.to.clone(), key.kind))
                    .or_default()
                    .insert(key.from.clone());
                UpsertOutcome::Created
            }
        };

        Ok(outcome)
    }

    async fn get_node(&self, key: &NodeKey) -> EngineResult<Option<Node>> {
        Ok(self.nodes.get(key).map(|node| node.value().clone()))
    }

    async fn get_edge(
        &self,
        from: &NodeKey,
        kind: EdgeKind,
        to: &NodeKey,
    ) -> EngineResult<Option<Edge>> {
        let key = EdgeKey {
            from: from.clone(),
            kind,
            to: to.clone(),
        };
        Ok(self.edges.get(&key).map(|edge| edge.value().clone()))
    }

    async fn remove_edge(&self, from: &NodeKey, kind: EdgeKind, to: &NodeKey) -> EngineResult<bool> {
        let key = EdgeKey {
            from: from.clone(),
            kind,
            to: to.clone(),
        };
        let Entry::Occupied(entry) = self.edges.entry(key.clone()) else {
            return Ok(false);
        };

        if let Some(mut targets) = self.outgoing.get_mut(&(key.from.clone(), kind)) {
            targets.remove(&key.to);
        }
        if let Some(mut sources) = self.incoming.get_mut(&(key.to, kind)) {
            sources.remove(&key.from);
        }
        entry.remove();
        Ok(true)
    }

    async fn neighbors(
        &self,
        key: &NodeKey,
        kind: EdgeKind,
        direction: Direction,
    ) -> EngineResult<Vec<NodeKey>> {
        let index = match direction {
            Direction::Outgoing => &self.outgoing,
            Direction::Incoming => &self.incoming,
        };
        Ok(index
            .get(&(key.clone(), kind))
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn stats(&self) -> EngineResult<GraphStats> {
        let mut stats = GraphStats::default();
        for entry in self.nodes.iter() {
            *stats.nodes.entry(entry.key().kind().to_string()).or_insert(0) += 1;
        }
        for entry in self.edges.iter() {
            *stats.edges.entry(entry.key().kind.label().to_string()).or_insert(0) += 1;
        }
        Ok(stats)
    }
}
