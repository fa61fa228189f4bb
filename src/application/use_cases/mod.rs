/// Use cases module containing the engine components and their orchestration
mod analyze_scan;
mod graph_builder;
mod impact_traversal;
mod vulnerability_annotator;

pub use analyze_scan::AnalyzeScanUseCase;
pub use graph_builder::GraphBuilder;
pub use impact_traversal::{CancellationSignal, ImpactTraversalEngine};
pub use vulnerability_annotator::VulnerabilityAnnotator;
