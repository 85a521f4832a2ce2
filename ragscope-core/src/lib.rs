//! # RAGScope Core
//!
//! Core library for RAGScope, a control panel for inspecting a remote
//! Retrieval-Augmented-Generation pipeline. Provides the parameter store, request
//! builder, pipeline client, session state machine, panel model and configuration.
//! The retrieval, embedding and generation work itself happens in the backend.

pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod render;
pub mod request;
pub mod result;
pub mod session;

// Re-export commonly used types at the crate root.
pub use client::{HttpBackend, MockBackend, PipelineClient, Protocol, RagBackend};
pub use config::{ConfigOverrides, RagscopeConfig, load_config};
pub use error::{RagscopeError, Result};
pub use params::{Param, ParameterStore, Parameters, StepDirection};
pub use render::{Panels, render_panels};
pub use request::{RequestPayload, build_request};
pub use result::{Answer, PipelineResult, ScoredChunk, Submission};
pub use session::{Session, SessionState, Ticket};
