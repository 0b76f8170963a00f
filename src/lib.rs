pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fpl_api;
pub mod http;
pub mod prepare;
pub mod records;
pub mod state;
