/// Application layer - The analyzer, its DTOs and adapter factories
///
/// This layer orchestrates domain services and reaches infrastructure only
/// through ports.
pub mod analyzer;
pub mod dto;
pub mod factories;
