pub mod aggregate;
pub mod bonus;
pub mod config;
pub mod dataset;
pub mod eligibility;
pub mod error;
pub mod export;
pub mod http_client;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod scoring;
pub mod sheets;
pub mod telemetry;
