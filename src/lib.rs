pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod fbref;
pub mod http_client;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod snapshot;
pub mod teams;
pub mod transform;
