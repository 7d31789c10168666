// Store Adapters
//
// Concrete implementations of the capabilities in `crate::store`.

pub mod memory;
