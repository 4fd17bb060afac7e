//! Vault Legend - a forest of enemies forged from your notes

pub mod analysis;
pub mod cache;
pub mod combat;
pub mod core;
pub mod forge;
pub mod llm;
pub mod quiz;
pub mod session;
pub mod vault;
