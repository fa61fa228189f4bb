mod in_memory_graph_store;
mod timeout_graph_store;

pub use in_memory_graph_store::InMemoryGraphStore;
pub use timeout_graph_store::TimeoutGraphStore;
