//! Cost estimation pipeline
//!
//! Stages run in this order for an allocation request: spreadsheet
//! normalisation, location resolution, questionnaire analysis, consumption
//! modelling, product summary, regional metrics, peer allocation,
//! benchmarking and recommendations. [`pipeline::AllocationPipeline`] wires
//! them together; each stage is also usable on its own.

pub mod allocation;
pub mod benchmark;
pub mod classifier;
pub mod consumption;
pub mod enhanced;
pub mod forecast;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod pricing;
pub mod products;
pub mod recommendations;
pub mod regional;
pub mod session;
pub mod spreadsheet;
pub mod tables;
pub mod trace;

pub use models::{Customer, CustomerType};
pub use pipeline::{AllocationPipeline, AllocationRequest, AllocationResponse, PipelineFailure};
pub use tables::ReferenceTables;
pub use trace::CalculationTrace;
