pub mod config;
pub mod dataset;
pub mod demo_table;
pub mod export;
pub mod options;
pub mod state;
pub mod stats;
