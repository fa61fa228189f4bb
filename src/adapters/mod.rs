/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports:
/// the embedded graph store, filesystem input/output and console progress.
pub mod outbound;
