pub mod policy;
pub mod registry;
pub mod runner;
pub mod task;
