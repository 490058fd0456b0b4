//! Nets, how parts attach to them and the engine that settles and clocks a wired circuit.
#[macro_use]
mod types;
mod circuit;
mod circuit_builder;
mod handles;
mod resolve;
mod topology;
pub use circuit::*;
pub use circuit_builder::*;
pub use handles::*;
pub use resolve::*;
pub use types::*;
