//! Profile integration and the end-to-end pipeline

pub mod integrator;
pub mod pipeline;

pub use integrator::{CommunicationProfile, Modality, ProfileIntegrator, SCHEMA_VERSION};
pub use pipeline::{PerformanceMetrics, Pipeline, PipelineResult};
