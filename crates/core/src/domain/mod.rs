pub mod analysis;
pub mod backtest;
pub mod report;
pub mod signal;
pub mod subscription;
pub mod wire;
