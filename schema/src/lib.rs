// Creature Arena Schema - Shared type definitions
// This crate contains the catalog data shapes and static enums that are shared
// between the battle engine and anything that loads or stores catalog data.

// Re-export the main types
pub use pokemon_types::*;
pub use species_data::*;

pub mod pokemon_types;
pub mod species_data;
