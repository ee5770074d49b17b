pub mod registry;
pub mod subgraph;

pub use registry::*;
pub use subgraph::*;
