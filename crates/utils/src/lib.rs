pub mod date;
pub mod id;
pub mod latency;
pub mod logging;
