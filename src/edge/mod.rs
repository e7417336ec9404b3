mod debounce;

pub use debounce::{DebounceGate, EdgeGates};
