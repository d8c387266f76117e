//! Shared re-entrancy guards.
//!
//! Each guard holds the token of the operation that raised it. A guard is
//! only lowered by the holder of the live token, so a timer left behind by a
//! superseded operation cannot clear a guard raised by a newer one.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OperationToken(u64);

impl OperationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    RestoringFromHistory,
    NavigatingWithinProfile,
    ProfileRouteInFlight,
}

#[derive(Debug, Default)]
pub struct NavigationContext {
    next_token: u64,
    restoring_from_history: Option<OperationToken>,
    navigating_within_profile: Option<OperationToken>,
    profile_route_in_flight: Option<OperationToken>,
}

impl NavigationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a fresh token without raising any guard.
    pub fn next_token(&mut self) -> OperationToken {
        self.next_token = self.next_token.saturating_add(1);
        OperationToken(self.next_token)
    }

    pub fn begin(&mut self, guard: Guard) -> OperationToken {
        let token = self.next_token();
        *self.slot_mut(guard) = Some(token);
        token
    }

    /// Lowers `guard` if `token` still owns it. Returns whether it did.
    pub fn release(&mut self, guard: Guard, token: OperationToken) -> bool {
        let slot = self.slot_mut(guard);
        if *slot == Some(token) {
            *slot = None;
            true
        } else {
            tracing::debug!(
                ?guard,
                token = token.value(),
                "stale guard release ignored"
            );
            false
        }
    }

    pub fn is_active(&self, guard: Guard) -> bool {
        self.holder(guard).is_some()
    }

    pub fn holder(&self, guard: Guard) -> Option<OperationToken> {
        match guard {
            Guard::RestoringFromHistory => self.restoring_from_history,
            Guard::NavigatingWithinProfile => self.navigating_within_profile,
            Guard::ProfileRouteInFlight => self.profile_route_in_flight,
        }
    }

    pub fn is_restoring_from_history(&self) -> bool {
        self.is_active(Guard::RestoringFromHistory)
    }

    pub fn is_navigating_within_profile(&self) -> bool {
        self.is_active(Guard::NavigatingWithinProfile)
    }

    fn slot_mut(&mut self, guard: Guard) -> &mut Option<OperationToken> {
        match guard {
            Guard::RestoringFromHistory => &mut self.restoring_from_history,
            Guard::NavigatingWithinProfile => &mut self.navigating_within_profile,
            Guard::ProfileRouteInFlight => &mut self.profile_route_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superseded_token_cannot_lower_guard() {
        let mut context = NavigationContext::new();
        let first = context.begin(Guard::RestoringFromHistory);
        let second = context.begin(Guard::RestoringFromHistory);

        assert!(!context.release(Guard::RestoringFromHistory, first));
        assert!(context.is_restoring_from_history());
        assert!(context.release(Guard::RestoringFromHistory, second));
        assert!(!context.is_restoring_from_history());
    }

    #[test]
    fn guards_are_independent() {
        let mut context = NavigationContext::new();
        let within = context.begin(Guard::NavigatingWithinProfile);
        let route = context.begin(Guard::ProfileRouteInFlight);
        assert_ne!(within, route);

        assert!(context.release(Guard::NavigatingWithinProfile, within));
        assert!(!context.is_navigating_within_profile());
        assert!(context.is_active(Guard::ProfileRouteInFlight));
    }
}
