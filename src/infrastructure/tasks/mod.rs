mod edge_workers;

pub use edge_workers::run_edge_workers;
