/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (e.g., CLI)
/// use to interact with the engine.
pub mod impact_query_port;

pub use impact_query_port::ImpactQueryPort;
