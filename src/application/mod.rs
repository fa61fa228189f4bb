/// Application layer - Use cases and DTOs
///
/// This layer orchestrates the domain services and reaches the graph store,
/// collaborator records and console only through ports.
pub mod dto;
pub mod use_cases;
