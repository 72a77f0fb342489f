//! Call event handling and session lifecycle.
//!
//! One `SessionOrchestrator` serves every concurrent call. Events for
//! the same call are serialized by a per-session mutex; events for
//! different calls proceed in parallel. A per-session `Notify` lets a
//! call-end event cancel an in-flight backend request without waiting
//! for it.
//!
//! Lock order: the session map is never held while a session mutex is
//! taken and vice versa, so handlers either clone the `Arc` out of
//! the map first or drop the session guard before touching the map.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use backend_core::{build_system_prompt, hash_prompt, Turn};
use tokio::sync::{Mutex, Notify, RwLock};
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::crm::Crm;
use crate::error::OrchestratorError;
use crate::events::{CallEvent, SessionAction};
use crate::router::{AiRouter, RoutingPolicy};
use crate::session::{CallSession, CallState};
use crate::stats::BackendStatsSnapshot;

/// Reply fragments that signal the caller is wrapping up. A reply
/// containing one of these ends the call after it is spoken.
const ENDING_PHRASES: &[&str] = &[
    "goodbye",
    "thank you for calling",
    "have a great day",
    "have a nice day",
    "take care",
    "talk to you later",
];

fn is_ending_phrase(reply: &str) -> bool {
    let lower = reply.to_lowercase();
    ENDING_PHRASES.iter().any(|p| lower.contains(p))
}

/// Mask a caller id for logs, keeping only the last four digits.
fn mask_caller_id(caller_id: &str) -> String {
    let digits: Vec<char> = caller_id.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("****{}", tail)
}

struct SessionHandle {
    /// Signaled when the call ends so an in-flight route is abandoned.
    hangup: Notify,
    session: Mutex<CallSession>,
}

/// Orchestrates every active call: state machines, histories, routing
/// and post-call CRM notes.
pub struct SessionOrchestrator {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    router: AiRouter,
    crm: Arc<dyn Crm>,
    config: OrchestratorConfig,
}

impl SessionOrchestrator {
    pub fn new(router: AiRouter, crm: Arc<dyn Crm>, config: OrchestratorConfig) -> Self {
        let router = router
            .with_policy(RoutingPolicy::new(config.prefer_local))
            .with_attempt_timeout(config.backend_timeout)
            .with_max_tokens(config.max_tokens);
        info!(
            prefer_local = config.prefer_local,
            history_cap = config.history_cap,
            prompt_hash = %hash_prompt(&build_system_prompt(
                config.business_name.as_deref(),
                None,
                None,
            )),
            "session orchestrator initialized"
        );
        Self {
            sessions: RwLock::new(HashMap::new()),
            router,
            crm,
            config,
        }
    }

    /// Handle one telephony event, returning the action to execute.
    pub async fn handle_event(&self, event: CallEvent) -> Result<SessionAction, OrchestratorError> {
        match event {
            CallEvent::CallStarted { call_id, caller_id } => {
                self.handle_call_started(call_id, caller_id).await
            }
            CallEvent::Utterance { call_id, text } => self.handle_utterance(call_id, text).await,
            CallEvent::CallEnded { call_id, reason } => {
                self.handle_call_ended(call_id, reason).await
            }
        }
    }

    async fn handle_call_started(
        &self,
        call_id: String,
        caller_id: String,
    ) -> Result<SessionAction, OrchestratorError> {
        if self.sessions.read().await.contains_key(&call_id) {
            warn!(call = %call_id, "duplicate call-started event");
            return Err(OrchestratorError::Skipped(format!(
                "call {} already active",
                call_id
            )));
        }

        // An unreachable CRM degrades to an anonymous call, never a
        // refused one.
        let customer = match self.crm.lookup_customer(&caller_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(call = %call_id, error = %e, "customer lookup failed");
                None
            }
        };

        let mut session =
            CallSession::new(call_id.clone(), caller_id.clone(), self.config.history_cap);
        session.transition(CallState::Greeting)?;

        let greeting = match &customer {
            Some(c) => format!(
                "Hello {}! Thank you for calling. How can I help you today?",
                c.name
            ),
            None => {
                "Hello! Thank you for calling. I'm your AI assistant. How can I help you today?"
                    .to_string()
            }
        };

        let prompt = build_system_prompt(
            self.config.business_name.as_deref(),
            customer.as_ref().map(|c| c.name.as_str()),
            customer.as_ref().and_then(|c| c.email.as_deref()),
        );
        session.set_system_prompt(prompt);

        let caller_label = customer
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| mask_caller_id(&caller_id));
        session.history.pin_system(format!("Call from {}", caller_label));
        session.set_customer(customer);

        session.transition(CallState::Listening)?;

        let known_customer = session.customer().is_some();
        let handle = Arc::new(SessionHandle {
            hangup: Notify::new(),
            session: Mutex::new(session),
        });

        // The early check ran before the CRM lookup awaited; a racing
        // start for the same call may have inserted since then. The
        // first session wins, the loser's is discarded unstarted.
        match self.sessions.write().await.entry(call_id.clone()) {
            Entry::Occupied(_) => {
                warn!(call = %call_id, "duplicate call-started event");
                return Err(OrchestratorError::Skipped(format!(
                    "call {} already active",
                    call_id
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
            }
        }

        info!(
            call = %call_id,
            caller = %mask_caller_id(&caller_id),
            known = known_customer,
            "call started"
        );

        Ok(SessionAction::say_and_listen(greeting))
    }

    async fn handle_utterance(
        &self,
        call_id: String,
        text: String,
    ) -> Result<SessionAction, OrchestratorError> {
        let handle = self.session_handle(&call_id).await?;
        let mut session = handle.session.lock().await;

        session.transition(CallState::Processing)?;
        session.record_interaction();
        session.history.append(Turn::caller(text.clone()));

        let system_prompt = session.system_prompt().to_string();
        let context = session.history.recent(self.config.context_turns).to_vec();

        debug!(call = %call_id, chars = text.len(), "processing utterance");

        // The route future holds no session borrow, so a hangup can
        // win the race and the reply is simply discarded.
        let routed = tokio::select! {
            routed = self.router.route(&text, Some(&system_prompt), &context) => Some(routed),
            _ = handle.hangup.notified() => None,
        };

        let Some((reply, decision)) = routed else {
            info!(call = %call_id, "call ended mid-processing, discarding reply");
            return Err(OrchestratorError::Skipped(format!(
                "call {} ended during processing",
                call_id
            )));
        };

        session.transition(CallState::Responding)?;

        let turn = if decision.is_degraded() {
            // No backend produced this text; leave it unattributed.
            Turn::assistant(reply.clone())
        } else {
            Turn::assistant_via(reply.clone(), decision.backend.clone())
        };
        session.history.append(turn);

        info!(
            call = %call_id,
            backend = %decision.backend,
            tier = ?decision.tier,
            reason = ?decision.reason,
            "utterance answered"
        );

        if is_ending_phrase(&reply) {
            session.transition(CallState::Completed)?;
            self.close_session(&mut session).await;
            drop(session);
            self.sessions.write().await.remove(&call_id);
            info!(call = %call_id, "call completed on farewell");
            return Ok(SessionAction::say_and_hangup(reply));
        }

        session.transition(CallState::Listening)?;
        Ok(SessionAction::say_and_listen(reply))
    }

    async fn handle_call_ended(
        &self,
        call_id: String,
        reason: String,
    ) -> Result<SessionAction, OrchestratorError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(&call_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(call_id.clone()))?;

        // Wake any utterance handler blocked on a backend. The permit
        // is retained if nothing is waiting yet.
        handle.hangup.notify_one();

        let mut session = handle.session.lock().await;
        if !session.state().is_terminal() {
            session.transition(CallState::Completed)?;
            self.close_session(&mut session).await;
        }

        info!(
            call = %call_id,
            reason = %reason,
            duration_secs = session.duration_secs().unwrap_or(0),
            interactions = session.interactions(),
            "call ended"
        );

        Ok(SessionAction::hangup())
    }

    /// Abort a call after an unrecoverable error, recording a failure
    /// note instead of a summary.
    pub async fn fail_session(&self, call_id: &str, reason: &str) -> Result<(), OrchestratorError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(call_id)
            .ok_or_else(|| OrchestratorError::SessionNotFound(call_id.to_string()))?;

        handle.hangup.notify_one();

        let mut session = handle.session.lock().await;
        if !session.state().is_terminal() {
            session.transition(CallState::Failed)?;
            session.finalize();

            let note = format!("Call failed: {}. {}", reason, session.history.summarize());
            self.record_note(&session, &note).await;
        }

        warn!(call = %call_id, reason = %reason, "call failed");
        Ok(())
    }

    /// Finalize a completed session: fix the duration, summarize the
    /// conversation and attach the note to the CRM record.
    async fn close_session(&self, session: &mut CallSession) {
        session.finalize();

        let summary = self.router.summarize(&session.history).await;
        let note = format!(
            "Call summary (duration: {}s, {} interactions): {}",
            session.duration_secs().unwrap_or(0),
            session.interactions(),
            summary
        );
        self.record_note(session, &note).await;
    }

    async fn record_note(&self, session: &CallSession, note: &str) {
        // Notes for unknown callers are keyed by raw caller id so a
        // later CRM import can reconcile them.
        let target = session
            .customer()
            .map(|c| c.id.clone())
            .unwrap_or_else(|| session.caller_id().to_string());

        if let Err(e) = self.crm.record_note(&target, note).await {
            warn!(call = %session.call_id(), error = %e, "failed to record call note");
        }
    }

    async fn session_handle(&self, call_id: &str) -> Result<Arc<SessionHandle>, OrchestratorError> {
        self.sessions
            .read()
            .await
            .get(call_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::SessionNotFound(call_id.to_string()))
    }

    /// Number of currently active calls.
    pub async fn active_call_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Current state of a call, if it is still active.
    pub async fn session_state(&self, call_id: &str) -> Option<CallState> {
        let handle = self.sessions.read().await.get(call_id).cloned()?;
        let session = handle.session.lock().await;
        Some(session.state())
    }

    /// Copy of a call's retained history, if it is still active.
    pub async fn history_snapshot(&self, call_id: &str) -> Option<Vec<Turn>> {
        let handle = self.sessions.read().await.get(call_id).cloned()?;
        let session = handle.session.lock().await;
        Some(session.history.turns().to_vec())
    }

    /// Per-backend usage counters.
    pub fn stats_snapshot(&self) -> Vec<BackendStatsSnapshot> {
        self.router.stats_snapshot()
    }

    /// Zero all usage counters.
    pub fn reset_stats(&self) {
        self.router.reset_stats();
    }
}
