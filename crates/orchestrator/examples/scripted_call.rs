//! Drive a scripted call through the orchestrator.
//!
//! Run with: cargo run -p orchestrator --example scripted_call

use std::sync::Arc;

use mock_backend::{FailingBackend, ScriptedBackend};
use orchestrator::{
    AiRouter, CallEvent, CustomerProfile, MockCrm, OrchestratorConfig, SessionOrchestrator,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Local is down; every reply falls back to the cloud backend.
    let local = Arc::new(FailingBackend::unreachable("local"));
    let cloud = Arc::new(ScriptedBackend::new(
        "cloud",
        "Your car is ready for pickup. Goodbye!",
    ));

    let crm = Arc::new(MockCrm::new());
    crm.add_customer(CustomerProfile {
        id: "cust-42".to_string(),
        name: "Dana".to_string(),
        phone: "+15551234567".to_string(),
        email: Some("dana@example.com".to_string()),
    })
    .await;

    let config = OrchestratorConfig::default().with_business_name("Cyber Auto Repair");
    let orchestrator = SessionOrchestrator::new(AiRouter::new(local, cloud), crm.clone(), config);

    let events = [
        CallEvent::CallStarted {
            call_id: "demo-1".to_string(),
            caller_id: "+15551234567".to_string(),
        },
        CallEvent::Utterance {
            call_id: "demo-1".to_string(),
            text: "Is my car ready?".to_string(),
        },
    ];

    for event in events {
        match orchestrator.handle_event(event).await {
            Ok(action) => println!("speak: {:?} then {:?}", action.say, action.next),
            Err(e) => println!("dropped: {}", e),
        }
    }

    for note in crm.notes().await {
        println!("crm note for {}: {}", note.customer_id, note.note);
    }

    for snapshot in orchestrator.stats_snapshot() {
        println!(
            "{}: {} attempted, {} succeeded, {} fallbacks",
            snapshot.backend, snapshot.attempted, snapshot.succeeded, snapshot.fallbacks
        );
    }
}
