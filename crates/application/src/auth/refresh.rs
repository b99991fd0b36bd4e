//! Token refresh controller.
//!
//! Decides, for every 401 the backend returns, whether a token refresh may
//! be attempted. Refreshes are rate limited by a cooldown and bounded by an
//! attempt cap; once the cap is reached the controller resets and schedules
//! a forced login instead.
//!
//! All state changes go through [`RefreshState::apply`]. The controller only
//! holds its lock around that call, never across the provider round trip.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use procura_domain::AuthError;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ports::IdentityClient;

/// Limits applied to 401 recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Refresh attempts before giving up and forcing a login.
    pub max_attempts: u32,
    /// Minimum time between two refresh attempts.
    pub cooldown: Duration,
    /// Validity the token must keep for a refresh to be skipped.
    pub min_validity_secs: i64,
    /// Delay before a forced login starts.
    pub login_delay: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown: Duration::from_millis(5000),
            min_validity_secs: 70,
            login_delay: Duration::from_millis(1000),
        }
    }
}

/// Where the controller stands with respect to the next 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// A refresh may be attempted.
    Idle,
    /// The last attempt is too recent.
    CoolingDown,
    /// The attempt cap has been reached.
    Exhausted,
}

/// Inputs to the refresh state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    /// An authenticated request came back 401.
    Unauthorized,
    /// The provider issued a new token.
    Refreshed,
    /// The provider kept the current token.
    Unchanged,
    /// The refresh call failed.
    Failed,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    /// Nothing further.
    None,
    /// Skip recovery; the cooldown has not elapsed.
    Skip,
    /// Call the provider's refresh.
    Refresh,
    /// Schedule a forced login.
    ForceLogin,
}

/// Attempt counter and cooldown clock for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshState {
    attempt_count: u32,
    last_attempt: Option<Instant>,
}

impl RefreshState {
    /// Refresh attempts since the last success or reset.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// When the last attempt started.
    #[must_use]
    pub const fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt
    }

    /// Phase a 401 arriving at `now` would find.
    #[must_use]
    pub fn phase(&self, now: Instant, policy: &RefreshPolicy) -> RefreshPhase {
        let cooling = self
            .last_attempt
            .is_some_and(|last| now.saturating_duration_since(last) < policy.cooldown);
        if cooling {
            RefreshPhase::CoolingDown
        } else if self.attempt_count >= policy.max_attempts {
            RefreshPhase::Exhausted
        } else {
            RefreshPhase::Idle
        }
    }

    /// Applies `event` observed at `now` and returns the follow-up action.
    pub fn apply(&mut self, event: RefreshEvent, now: Instant, policy: &RefreshPolicy) -> RefreshAction {
        match event {
            RefreshEvent::Unauthorized => match self.phase(now, policy) {
                RefreshPhase::CoolingDown => RefreshAction::Skip,
                RefreshPhase::Exhausted => {
                    self.reset();
                    RefreshAction::ForceLogin
                }
                RefreshPhase::Idle => {
                    self.attempt_count += 1;
                    self.last_attempt = Some(now);
                    RefreshAction::Refresh
                }
            },
            RefreshEvent::Refreshed => {
                self.attempt_count = 0;
                RefreshAction::None
            }
            RefreshEvent::Unchanged => RefreshAction::None,
            RefreshEvent::Failed => {
                if self.attempt_count >= policy.max_attempts {
                    self.reset();
                    RefreshAction::ForceLogin
                } else {
                    RefreshAction::None
                }
            }
        }
    }

    const fn reset(&mut self) {
        self.attempt_count = 0;
        self.last_attempt = None;
    }
}

/// How a 401 was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cooldown suppressed the attempt.
    CoolingDown,
    /// A new token was issued.
    Refreshed,
    /// The provider kept the current token.
    Unchanged,
    /// The refresh failed; more attempts remain.
    Failed(AuthError),
    /// Attempts are exhausted and a login was scheduled.
    LoginScheduled,
}

/// Rate-limited, attempt-bounded 401 recovery shared by all requests of a
/// session.
pub struct RefreshController {
    identity: Arc<dyn IdentityClient>,
    policy: RefreshPolicy,
    login_target: String,
    state: Mutex<RefreshState>,
}

impl RefreshController {
    /// Creates a controller that sends forced logins back to `login_target`.
    pub fn new(
        identity: Arc<dyn IdentityClient>,
        policy: RefreshPolicy,
        login_target: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            policy,
            login_target: login_target.into(),
            state: Mutex::new(RefreshState::default()),
        }
    }

    /// The configured limits.
    #[must_use]
    pub const fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> RefreshState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: RefreshEvent) -> (RefreshAction, u32) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let action = state.apply(event, Instant::now(), &self.policy);
        (action, state.attempt_count())
    }

    /// Reacts to a 401 on an authenticated request.
    ///
    /// Waits for the refresh round trip when one is attempted. The caller
    /// still reports the original 401; nothing is replayed.
    pub async fn handle_unauthorized(&self) -> RefreshOutcome {
        let (action, attempt) = self.transition(RefreshEvent::Unauthorized);
        match action {
            RefreshAction::Skip => {
                tracing::warn!("Token refresh in cooldown period, skipping");
                return RefreshOutcome::CoolingDown;
            }
            RefreshAction::ForceLogin => {
                self.force_login();
                return RefreshOutcome::LoginScheduled;
            }
            RefreshAction::None => return RefreshOutcome::Unchanged,
            RefreshAction::Refresh => {}
        }

        tracing::info!(
            attempt,
            max_attempts = self.policy.max_attempts,
            "Attempting token refresh"
        );

        match self.identity.refresh_token(self.policy.min_validity_secs).await {
            Ok(true) => {
                self.transition(RefreshEvent::Refreshed);
                tracing::info!("Token refreshed successfully");
                RefreshOutcome::Refreshed
            }
            Ok(false) => {
                self.transition(RefreshEvent::Unchanged);
                tracing::debug!("Token still valid, refresh skipped by provider");
                RefreshOutcome::Unchanged
            }
            Err(error) => {
                tracing::error!(%error, "Token refresh failed");
                let (action, _) = self.transition(RefreshEvent::Failed);
                if action == RefreshAction::ForceLogin {
                    self.force_login();
                    RefreshOutcome::LoginScheduled
                } else {
                    RefreshOutcome::Failed(error)
                }
            }
        }
    }

    fn force_login(&self) {
        let error = AuthError::RefreshExhausted {
            attempts: self.policy.max_attempts,
        };
        tracing::error!(%error, "Max refresh attempts reached, redirecting to login");
        self.schedule_login();
    }

    /// Starts a login after the configured delay.
    ///
    /// The task is not tracked or cancelled; a second login while one is
    /// pending is harmless.
    pub fn schedule_login(&self) -> JoinHandle<()> {
        let identity = Arc::clone(&self.identity);
        let target = self.login_target.clone();
        let delay = self.policy.login_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = identity.login(&target).await {
                tracing::error!(%error, "Forced login failed to start");
            }
        })
    }
}

impl std::fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("policy", &self.policy)
            .field("login_target", &self.login_target)
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::MockIdentity;
    use pretty_assertions::assert_eq;

    fn rejected() -> AuthError {
        AuthError::RefreshRejected {
            message: "invalid_grant".to_string(),
        }
    }

    fn controller(identity: &Arc<MockIdentity>) -> Arc<RefreshController> {
        Arc::new(RefreshController::new(
            Arc::clone(identity) as Arc<dyn IdentityClient>,
            RefreshPolicy::default(),
            "http://localhost:4200",
        ))
    }

    #[test]
    fn test_transition_idle_increments() {
        let policy = RefreshPolicy::default();
        let now = Instant::now();
        let mut state = RefreshState::default();

        assert_eq!(state.phase(now, &policy), RefreshPhase::Idle);
        assert_eq!(
            state.apply(RefreshEvent::Unauthorized, now, &policy),
            RefreshAction::Refresh
        );
        assert_eq!(state.attempt_count(), 1);
        assert_eq!(state.last_attempt(), Some(now));
    }

    #[test]
    fn test_unauthorized_always_yields_an_action() {
        let policy = RefreshPolicy::default();
        let start = Instant::now();
        let mut state = RefreshState::default();

        for i in 0..8u32 {
            let at = start + policy.cooldown / 2 * i;
            let action = state.apply(RefreshEvent::Unauthorized, at, &policy);
            assert_ne!(action, RefreshAction::None);
        }
    }

    #[test]
    fn test_transition_cooldown_skips() {
        let policy = RefreshPolicy::default();
        let now = Instant::now();
        let mut state = RefreshState::default();
        state.apply(RefreshEvent::Unauthorized, now, &policy);

        let soon = now + Duration::from_millis(4999);
        assert_eq!(state.phase(soon, &policy), RefreshPhase::CoolingDown);
        assert_eq!(
            state.apply(RefreshEvent::Unauthorized, soon, &policy),
            RefreshAction::Skip
        );
        assert_eq!(state.attempt_count(), 1);
        assert_eq!(state.last_attempt(), Some(now));

        let later = now + Duration::from_millis(5000);
        assert_eq!(state.phase(later, &policy), RefreshPhase::Idle);
    }

    #[test]
    fn test_transition_success_resets() {
        let policy = RefreshPolicy::default();
        let now = Instant::now();
        let mut state = RefreshState::default();
        state.apply(RefreshEvent::Unauthorized, now, &policy);
        state.apply(RefreshEvent::Failed, now, &policy);
        state.apply(RefreshEvent::Unauthorized, now + policy.cooldown, &policy);
        assert_eq!(state.attempt_count(), 2);

        assert_eq!(
            state.apply(RefreshEvent::Refreshed, now, &policy),
            RefreshAction::None
        );
        assert_eq!(state.attempt_count(), 0);
    }

    #[test]
    fn test_transition_unchanged_keeps_counters() {
        let policy = RefreshPolicy::default();
        let now = Instant::now();
        let mut state = RefreshState::default();
        state.apply(RefreshEvent::Unauthorized, now, &policy);
        let before = state;
        assert_eq!(
            state.apply(RefreshEvent::Unchanged, now, &policy),
            RefreshAction::None
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_transition_failure_at_cap_forces_login() {
        let policy = RefreshPolicy::default();
        let start = Instant::now();
        let mut state = RefreshState::default();

        for i in 0..3u32 {
            let at = start + policy.cooldown * i;
            assert_eq!(
                state.apply(RefreshEvent::Unauthorized, at, &policy),
                RefreshAction::Refresh
            );
            let expected = if i == 2 {
                RefreshAction::ForceLogin
            } else {
                RefreshAction::None
            };
            assert_eq!(state.apply(RefreshEvent::Failed, at, &policy), expected);
        }
        assert_eq!(state, RefreshState::default());
    }

    #[test]
    fn test_transition_exhausted_without_failure() {
        let policy = RefreshPolicy::default();
        let start = Instant::now();
        let mut state = RefreshState::default();
        for i in 0..3u32 {
            state.apply(RefreshEvent::Unauthorized, start + policy.cooldown * i, &policy);
            state.apply(RefreshEvent::Unchanged, start, &policy);
        }
        assert_eq!(state.attempt_count(), 3);

        let at = start + policy.cooldown * 3;
        assert_eq!(state.phase(at, &policy), RefreshPhase::Exhausted);
        assert_eq!(
            state.apply(RefreshEvent::Unauthorized, at, &policy),
            RefreshAction::ForceLogin
        );
        assert_eq!(state, RefreshState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_unauthorized_single_refresh() {
        let identity = Arc::new(MockIdentity::new());
        identity.set_refresh_delay(Duration::from_millis(50));
        identity.push_refresh(Ok(true));
        let controller = controller(&identity);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let controller = Arc::clone(&controller);
            handles.push(tokio::spawn(async move {
                controller.handle_unauthorized().await
            }));
        }
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(identity.refresh_count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == RefreshOutcome::Refreshed)
                .count(),
            1
        );
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == RefreshOutcome::CoolingDown)
                .count(),
            7
        );
        assert_eq!(controller.snapshot().attempt_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_attempts() {
        let identity = Arc::new(MockIdentity::new());
        identity.push_refresh(Err(rejected()));
        identity.push_refresh(Ok(true));
        let controller = controller(&identity);

        assert_eq!(
            controller.handle_unauthorized().await,
            RefreshOutcome::Failed(rejected())
        );
        assert_eq!(controller.snapshot().attempt_count(), 1);

        tokio::time::advance(Duration::from_millis(5000)).await;
        assert_eq!(
            controller.handle_unauthorized().await,
            RefreshOutcome::Refreshed
        );
        assert_eq!(controller.snapshot().attempt_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_skips_refresh() {
        let identity = Arc::new(MockIdentity::new());
        identity.push_refresh(Err(rejected()));
        let controller = controller(&identity);

        controller.handle_unauthorized().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        assert_eq!(
            controller.handle_unauthorized().await,
            RefreshOutcome::CoolingDown
        );
        assert_eq!(identity.refresh_count(), 1);
        assert_eq!(controller.snapshot().attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_force_one_login() {
        let identity = Arc::new(MockIdentity::new());
        for _ in 0..3 {
            identity.push_refresh(Err(AuthError::ProviderUnreachable {
                message: "connection refused".to_string(),
            }));
        }
        let controller = controller(&identity);

        let mut outcomes = Vec::new();
        for attempt in 0..3 {
            if attempt > 0 {
                tokio::time::advance(Duration::from_millis(5000)).await;
            }
            outcomes.push(controller.handle_unauthorized().await);
        }
        assert_eq!(outcomes[2], RefreshOutcome::LoginScheduled);
        assert_eq!(controller.snapshot(), RefreshState::default());
        assert!(identity.logins().is_empty());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(identity.logins(), vec!["http://localhost:4200".to_string()]);
        assert_eq!(identity.refresh_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_login_waits_for_delay() {
        let identity = Arc::new(MockIdentity::new());
        let controller = controller(&identity);

        let handle = controller.schedule_login();
        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(identity.logins().is_empty());

        handle.await.unwrap();
        assert_eq!(identity.logins().len(), 1);
    }
}
