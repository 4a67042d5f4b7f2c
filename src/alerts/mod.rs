pub mod config;
pub mod debouncer;
pub mod policy;

pub use config::{AlertConfig, AlertSelection};
pub use debouncer::{AlertDebouncer, AlertState};
pub use policy::ProximityPolicy;
