//! Reachability, deadlock, and linear-optimization analysis of 1-safe
//! Place/Transition nets.
//!
//! The core is the net model ([`petri_net`]) together with its three
//! analysis engines: explicit BFS reachability, the symbolic (BDD) engine,
//! and the two ILP clients built on top of it. PNML parsing and the CLI
//! driver are ambient infrastructure around that core, not the core
//! itself.

pub mod error;
pub mod petri_net;

pub use error::{AnalysisError, ParseError};
pub use petri_net::{PetriNet, PetriNetBuilder};
