//! Complexity-aware routing across AI backends.
//!
//! The router classifies each utterance, orders the backends by
//! preference for that tier, and walks the list until one produces a
//! usable reply. Every attempt is accounted in [`StatsRegistry`];
//! exhaustion degrades to a fixed caller-safe apology instead of an
//! error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use backend_core::{Backend, ConversationHistory, GenerateRequest, Turn};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, PatternClassifier, Tier};
use crate::stats::{BackendStatsSnapshot, StatsRegistry};

/// Spoken to the caller when every backend has failed.
pub const EXHAUSTED_REPLY: &str =
    "I apologize, but I'm having trouble processing that. Could you please try again?";

/// The two backend roles the router arbitrates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Cheap, on-premises model server.
    Local,
    /// High-capability hosted API.
    Cloud,
}

/// How a reply was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteReason {
    /// First-choice backend answered.
    Preferred,
    /// A later backend answered after earlier ones failed.
    Fallback,
    /// No backend answered; the reply is the canned apology.
    Exhausted,
}

/// Outcome metadata for one routed utterance.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    /// Name of the backend that produced the reply (for Exhausted,
    /// the last one tried).
    pub backend: String,
    /// Classified complexity of the utterance.
    pub tier: Tier,
    /// How the reply was obtained.
    pub reason: RouteReason,
}

impl RoutingDecision {
    /// Whether the reply is the degraded apology rather than a real
    /// backend answer.
    pub fn is_degraded(&self) -> bool {
        self.reason == RouteReason::Exhausted
    }
}

/// Backend preference policy.
#[derive(Debug, Clone, Default)]
pub struct RoutingPolicy {
    /// Try the local backend first for every tier, including Complex.
    pub prefer_local: bool,
}

impl RoutingPolicy {
    pub fn new(prefer_local: bool) -> Self {
        Self { prefer_local }
    }

    /// Backend order for a tier. Simple and moderate utterances go
    /// local-first; complex ones escalate to the cloud unless
    /// `prefer_local` pins everything local-first.
    pub fn preference(&self, tier: Tier) -> [BackendKind; 2] {
        match tier {
            Tier::Complex if !self.prefer_local => [BackendKind::Cloud, BackendKind::Local],
            _ => [BackendKind::Local, BackendKind::Cloud],
        }
    }
}

/// Routes utterances to the best available backend with fallback.
pub struct AiRouter {
    local: Arc<dyn Backend>,
    cloud: Arc<dyn Backend>,
    classifier: Box<dyn Classifier>,
    policy: RoutingPolicy,
    attempt_timeout: Duration,
    max_tokens: u32,
    stats: StatsRegistry,
}

impl AiRouter {
    /// Create a router over a local and a cloud backend with the
    /// default classifier and policy.
    pub fn new(local: Arc<dyn Backend>, cloud: Arc<dyn Backend>) -> Self {
        let mut stats = StatsRegistry::new();
        stats.register(local.name());
        stats.register(cloud.name());

        Self {
            local,
            cloud,
            classifier: Box::new(PatternClassifier::new()),
            policy: RoutingPolicy::default(),
            attempt_timeout: Duration::from_secs(30),
            max_tokens: 512,
            stats,
        }
    }

    pub fn with_policy(mut self, policy: RoutingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn backend(&self, kind: BackendKind) -> &Arc<dyn Backend> {
        match kind {
            BackendKind::Local => &self.local,
            BackendKind::Cloud => &self.cloud,
        }
    }

    /// Route one utterance to a reply.
    ///
    /// Walks the preference order for the classified tier, trying
    /// each backend exactly once under the attempt deadline. Failures
    /// and empty replies fall through to the next backend; exhaustion
    /// returns [`EXHAUSTED_REPLY`] instead of an error so the caller
    /// always hears something.
    pub async fn route(
        &self,
        utterance: &str,
        system_prompt: Option<&str>,
        context: &[Turn],
    ) -> (String, RoutingDecision) {
        let tier = self.classifier.classify(utterance);
        let appointment = self.classifier.is_appointment(utterance);

        // Appointment talk stays on the conversational model even
        // when the tier would pick the small one.
        let hint = if appointment && tier != Tier::Complex {
            "chat"
        } else {
            tier.model_hint()
        };

        let mut request = GenerateRequest::new(utterance)
            .with_context(context.to_vec())
            .with_max_tokens(self.max_tokens)
            .with_model_hint(hint);
        if let Some(prompt) = system_prompt {
            request = request.with_system_prompt(prompt);
        }

        debug!(tier = ?tier, hint = %hint, appointment, "routing utterance");

        let order = self.policy.preference(tier);
        let mut last_tried = String::new();

        for (attempt, kind) in order.iter().enumerate() {
            let backend = self.backend(*kind);
            let name = backend.name().to_string();
            let counters = self.stats.get(&name);

            if let Some(ref counters) = counters {
                counters.record_attempt();
            }

            let started = Instant::now();
            let outcome = timeout(self.attempt_timeout, backend.generate(&request)).await;

            match outcome {
                Ok(Ok(reply)) if !reply.trim().is_empty() => {
                    if let Some(ref counters) = counters {
                        counters.record_success(started.elapsed());
                    }
                    let reason = if attempt == 0 {
                        RouteReason::Preferred
                    } else {
                        RouteReason::Fallback
                    };
                    info!(
                        backend = %name,
                        tier = ?tier,
                        reason = ?reason,
                        latency_ms = started.elapsed().as_millis() as u64,
                        "reply generated"
                    );
                    return (
                        reply.trim().to_string(),
                        RoutingDecision {
                            backend: name,
                            tier,
                            reason,
                        },
                    );
                }
                Ok(Ok(_)) => {
                    warn!(backend = %name, "backend returned an empty reply, falling back");
                }
                Ok(Err(e)) => {
                    warn!(backend = %name, error = %e, "backend failed, falling back");
                }
                Err(_) => {
                    warn!(
                        backend = %name,
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "backend attempt exceeded deadline, falling back"
                    );
                }
            }

            if let Some(ref counters) = counters {
                counters.record_fallback();
            }
            last_tried = name;
        }

        warn!(tier = ?tier, "all backends exhausted, degrading to apology");
        (
            EXHAUSTED_REPLY.to_string(),
            RoutingDecision {
                backend: last_tried,
                tier,
                reason: RouteReason::Exhausted,
            },
        )
    }

    /// Summarize a call's history for the post-call CRM note.
    ///
    /// Tries the cheapest ready backend first, then the cloud,
    /// skipping backends whose health probe reports them down; if
    /// every attempt fails, falls back to the history's rule-based
    /// note. Summary attempts are not counted as routed traffic.
    pub async fn summarize(&self, history: &ConversationHistory) -> String {
        if history.is_empty() {
            return history.summarize();
        }

        let request =
            GenerateRequest::new("Please provide a brief 1-2 sentence summary of this call.")
                .with_context(history.turns().to_vec())
                .with_max_tokens(256)
                .with_model_hint("fast");

        for kind in [BackendKind::Local, BackendKind::Cloud] {
            let backend = self.backend(kind);
            if !backend.is_ready().await {
                debug!(backend = %backend.name(), "skipping unready backend for summary");
                continue;
            }
            match timeout(self.attempt_timeout, backend.generate(&request)).await {
                Ok(Ok(summary)) if !summary.trim().is_empty() => {
                    let mut summary = summary.trim().to_string();
                    if history.was_trimmed() {
                        summary.push_str(" Earlier context was trimmed from this call.");
                    }
                    return summary;
                }
                _ => {
                    debug!(backend = %backend.name(), "summary attempt failed");
                }
            }
        }

        history.summarize()
    }

    /// Point-in-time usage counters per backend.
    pub fn stats_snapshot(&self) -> Vec<BackendStatsSnapshot> {
        self.stats.snapshot()
    }

    /// Zero all usage counters.
    pub fn reset_stats(&self) {
        self.stats.reset_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_core::BackendError;
    use mock_backend::{DelayedBackend, FailingBackend, ScriptedBackend};

    fn scripted(name: &str, reply: &str) -> Arc<ScriptedBackend> {
        Arc::new(ScriptedBackend::new(name, reply))
    }

    #[tokio::test]
    async fn test_simple_goes_local_first() {
        let local = scripted("local", "Hello! How can I help?");
        let cloud = scripted("cloud", "cloud reply");
        let router = AiRouter::new(local.clone(), cloud.clone());

        let (reply, decision) = router.route("Hi", None, &[]).await;

        assert_eq!(reply, "Hello! How can I help?");
        assert_eq!(decision.backend, "local");
        assert_eq!(decision.tier, Tier::Simple);
        assert_eq!(decision.reason, RouteReason::Preferred);
        assert_eq!(cloud.request_count(), 0);

        let stats = router.stats_snapshot();
        let local_stats = stats.iter().find(|s| s.backend == "local").unwrap();
        assert_eq!(local_stats.attempted, 1);
        assert_eq!(local_stats.succeeded, 1);
        assert_eq!(local_stats.fallbacks, 0);
    }

    #[tokio::test]
    async fn test_complex_escalates_to_cloud_by_default() {
        let local = scripted("local", "local reply");
        let cloud = scripted("cloud", "cloud reply");
        let router =
            AiRouter::new(local.clone(), cloud.clone()).with_policy(RoutingPolicy::new(false));

        let (reply, decision) = router
            .route("Why does my engine make that noise", None, &[])
            .await;

        assert_eq!(reply, "cloud reply");
        assert_eq!(decision.backend, "cloud");
        assert_eq!(decision.tier, Tier::Complex);
        assert_eq!(local.request_count(), 0);
    }

    #[tokio::test]
    async fn test_prefer_local_pins_complex_local() {
        let local = scripted("local", "local reply");
        let cloud = scripted("cloud", "cloud reply");
        let router = AiRouter::new(local, cloud.clone()).with_policy(RoutingPolicy::new(true));

        let (reply, decision) = router
            .route("Why does my engine make that noise", None, &[])
            .await;

        assert_eq!(reply, "local reply");
        assert_eq!(decision.tier, Tier::Complex);
        assert_eq!(cloud.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_backend_failure() {
        let local: Arc<dyn Backend> = Arc::new(FailingBackend::unreachable("local"));
        let cloud = scripted("cloud", "cloud reply");
        let router = AiRouter::new(local, cloud.clone());

        let (reply, decision) = router.route("What are your hours", None, &[]).await;

        assert_eq!(reply, "cloud reply");
        assert_eq!(decision.reason, RouteReason::Fallback);

        let stats = router.stats_snapshot();
        let local_stats = stats.iter().find(|s| s.backend == "local").unwrap();
        let cloud_stats = stats.iter().find(|s| s.backend == "cloud").unwrap();
        assert_eq!(local_stats.attempted, 1);
        assert_eq!(local_stats.fallbacks, 1);
        assert_eq!(local_stats.succeeded, 0);
        assert_eq!(cloud_stats.attempted, 1);
        assert_eq!(cloud_stats.succeeded, 1);
    }

    #[tokio::test]
    async fn test_empty_reply_triggers_fallback() {
        let local = scripted("local", "   ");
        let cloud = scripted("cloud", "cloud reply");
        let router = AiRouter::new(local, cloud);

        let (reply, decision) = router.route("What are your hours", None, &[]).await;

        assert_eq!(reply, "cloud reply");
        assert_eq!(decision.reason, RouteReason::Fallback);
    }

    #[tokio::test]
    async fn test_slow_backend_triggers_fallback() {
        let inner = ScriptedBackend::new("local", "too late");
        let local: Arc<dyn Backend> = Arc::new(DelayedBackend::with_millis(inner, 200));
        let cloud = scripted("cloud", "cloud reply");
        let router = AiRouter::new(local, cloud).with_attempt_timeout(Duration::from_millis(20));

        let (reply, decision) = router.route("What are your hours", None, &[]).await;

        assert_eq!(reply, "cloud reply");
        assert_eq!(decision.reason, RouteReason::Fallback);
    }

    #[tokio::test]
    async fn test_exhaustion_degrades_to_apology() {
        let local: Arc<dyn Backend> = Arc::new(FailingBackend::unreachable("local"));
        let cloud: Arc<dyn Backend> =
            Arc::new(FailingBackend::new("cloud", BackendError::RateLimited));
        let router = AiRouter::new(local, cloud);

        let (reply, decision) = router.route("What are your hours", None, &[]).await;

        assert_eq!(reply, EXHAUSTED_REPLY);
        assert_eq!(decision.reason, RouteReason::Exhausted);
        assert!(decision.is_degraded());

        // Each backend was tried exactly once.
        for snapshot in router.stats_snapshot() {
            assert_eq!(snapshot.attempted, 1);
            assert_eq!(snapshot.fallbacks, 1);
            assert_eq!(snapshot.succeeded, 0);
        }
    }

    #[tokio::test]
    async fn test_model_hint_follows_tier() {
        let local = scripted("local", "ok");
        let cloud = scripted("cloud", "ok");
        let router = AiRouter::new(local.clone(), cloud);

        router.route("Hi", None, &[]).await;
        let requests = local.recorded_requests();
        assert_eq!(requests[0].model_hint.as_deref(), Some("fast"));
    }

    #[tokio::test]
    async fn test_appointment_stays_on_chat_model() {
        let local = scripted("local", "ok");
        let cloud = scripted("cloud", "ok");
        let router = AiRouter::new(local.clone(), cloud);

        router
            .route("Can I book an appointment for Tuesday", None, &[])
            .await;
        let requests = local.recorded_requests();
        assert_eq!(requests[0].model_hint.as_deref(), Some("chat"));
    }

    #[tokio::test]
    async fn test_context_and_prompt_forwarded() {
        let local = scripted("local", "ok");
        let cloud = scripted("cloud", "ok");
        let router = AiRouter::new(local.clone(), cloud);

        let context = vec![Turn::caller("earlier question")];
        router.route("Hi", Some("Be brief."), &context).await;

        let requests = local.recorded_requests();
        assert_eq!(requests[0].system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(requests[0].context.len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_uses_backend() {
        let local = scripted("local", "Caller asked about service hours.");
        let cloud = scripted("cloud", "unused");
        let router = AiRouter::new(local, cloud);

        let mut history = ConversationHistory::new(10);
        history.append(Turn::caller("What are your hours"));
        history.append(Turn::assistant_via("We're open 9 to 5.", "local"));

        let summary = router.summarize(&history).await;
        assert_eq!(summary, "Caller asked about service hours.");
    }

    #[tokio::test]
    async fn test_summarize_discloses_trimming() {
        let local = scripted("local", "Long call about repairs.");
        let cloud = scripted("cloud", "unused");
        let router = AiRouter::new(local, cloud);

        let mut history = ConversationHistory::new(2);
        history.append(Turn::caller("one"));
        history.append(Turn::caller("two"));
        history.append(Turn::caller("three"));
        assert!(history.was_trimmed());

        let summary = router.summarize(&history).await;
        assert!(summary.contains("trimmed"));
    }

    /// Replies fine when asked, but reports itself down.
    struct UnreadyBackend(ScriptedBackend);

    #[backend_core::async_trait]
    impl Backend for UnreadyBackend {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
            self.0.generate(request).await
        }

        fn name(&self) -> &str {
            self.0.name()
        }

        async fn is_ready(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_summarize_skips_unready_backend() {
        let local: Arc<dyn Backend> =
            Arc::new(UnreadyBackend(ScriptedBackend::new("local", "never spoken")));
        let cloud = scripted("cloud", "Caller checked on a repair.");
        let router = AiRouter::new(local, cloud.clone());

        let mut history = ConversationHistory::new(10);
        history.append(Turn::caller("Is my car ready?"));

        let summary = router.summarize(&history).await;
        assert_eq!(summary, "Caller checked on a repair.");
        assert_eq!(cloud.request_count(), 1);
    }

    #[tokio::test]
    async fn test_summarize_falls_back_to_rule_based() {
        let local: Arc<dyn Backend> = Arc::new(FailingBackend::unreachable("local"));
        let cloud: Arc<dyn Backend> = Arc::new(FailingBackend::unreachable("cloud"));
        let router = AiRouter::new(local, cloud);

        let mut history = ConversationHistory::new(10);
        history.append(Turn::caller("Is my car ready?"));

        let summary = router.summarize(&history).await;
        assert!(summary.contains("caller"));
        assert!(summary.contains("Is my car ready?"));
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let local = scripted("local", "ok");
        let cloud = scripted("cloud", "ok");
        let router = AiRouter::new(local, cloud);

        router.route("Hi", None, &[]).await;
        router.reset_stats();

        for snapshot in router.stats_snapshot() {
            assert_eq!(snapshot.attempted, 0);
            assert_eq!(snapshot.succeeded, 0);
        }
    }
}
