//! Core types, contract storage, and the host object model for tenet.
//!
//! This crate provides the foundational data structures used by the enforcement layer:
//! - [`types`]: Entity and method contract types
//! - [`error`]: The [`ContractError`](error::ContractError) taxonomy
//! - [`store`]: The [`ContractStore`](store::ContractStore) trait
//! - [`sharded`]: `DashMap`-backed implementation of `ContractStore`
//! - [`hierarchy`]: Entities, inclusion/superclass graph, and ancestor linearization
//! - [`signature`]: Parameter shapes and the shape-comparison seam
//! - [`config`]: Configuration loading from `tenet.json`

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod sharded;
pub mod signature;
pub mod store;
pub mod types;
