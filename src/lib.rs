pub mod agent;
pub mod algorithms;
pub mod batch_simulation;
pub mod config;
pub mod environment;
pub mod simulation;
pub mod statistics;
