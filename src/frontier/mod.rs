//! URL frontier
//!
//! The shared, domain-partitioned queue of URLs waiting to be fetched, plus
//! loading it from a checkpoint or a seed list at startup.

mod bootstrap;
mod queue;

pub use bootstrap::{load_checkpoint, pick_seed, save_checkpoint};
pub use queue::{Frontier, FrontierSnapshot, InFlight};
