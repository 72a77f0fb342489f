//! Call session orchestration and AI backend routing.
//!
//! This crate turns telephony events into spoken replies:
//!
//! - [`SessionOrchestrator`] - Per-call state machines and histories
//! - [`AiRouter`] - Complexity-aware routing with fallback
//! - [`PatternClassifier`] - Lexical utterance complexity rules
//! - [`StatsRegistry`] - Lock-free per-backend usage counters
//! - [`Crm`] - Customer lookup and post-call note seam
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mock_backend::ScriptedBackend;
//! use orchestrator::{
//!     AiRouter, CallEvent, MockCrm, OrchestratorConfig, SessionOrchestrator,
//! };
//!
//! # async fn run() -> Result<(), orchestrator::OrchestratorError> {
//! let router = AiRouter::new(
//!     Arc::new(ScriptedBackend::new("local", "We're open 9 to 5.")),
//!     Arc::new(ScriptedBackend::new("cloud", "We're open 9 to 5.")),
//! );
//! let orchestrator = SessionOrchestrator::new(
//!     router,
//!     Arc::new(MockCrm::new()),
//!     OrchestratorConfig::default(),
//! );
//!
//! let action = orchestrator
//!     .handle_event(CallEvent::CallStarted {
//!         call_id: "c-1".to_string(),
//!         caller_id: "+15551234567".to_string(),
//!     })
//!     .await?;
//! println!("speak: {}", action.say);
//! # Ok(())
//! # }
//! ```

mod classifier;
mod config;
mod crm;
mod error;
mod events;
mod orchestrator;
mod router;
mod session;
mod stats;

pub use classifier::{Classifier, PatternClassifier, Tier};
pub use config::OrchestratorConfig;
pub use crm::{Crm, CrmError, CrmNote, CustomerProfile, MockCrm};
pub use error::OrchestratorError;
pub use events::{CallEvent, NextStep, SessionAction};
pub use orchestrator::SessionOrchestrator;
pub use router::{
    AiRouter, BackendKind, RouteReason, RoutingDecision, RoutingPolicy, EXHAUSTED_REPLY,
};
pub use session::{CallSession, CallState};
pub use stats::{BackendStats, BackendStatsSnapshot, StatsRegistry};
