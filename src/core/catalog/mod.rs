// Catalog of uniques and its display contract.
//
// - bridge.rs: what the catalog needs from a list display
// - model.rs: the two sorted lists kept in sync with the record

pub mod bridge;
pub mod model;
