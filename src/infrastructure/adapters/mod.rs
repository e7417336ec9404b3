mod edge_inputs;

pub use edge_inputs::{EdgeCallback, bind_edge_inputs};
