pub mod assets;
pub mod charts;
pub mod data;
pub mod infer;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod session;
