use serde::{Deserialize, Serialize};

use crate::error::NavigationError;
use crate::state::ProfileRoute;

pub const SECTION_TRANSITION_MS: u64 = 350;
pub const HISTORY_PUSH_DELAY_MS: u64 = 50;
pub const FRAME_INTERVAL_MS: u64 = 16;
pub const SUBSECTION_FADE_MS: u64 = 200;
pub const SUBSECTION_STAGGER_MS: u64 = 50;
pub const HOME_CONTENT_FAST_DELAY_MS: u64 = 100;
pub const HOME_CONTENT_SLOW_DELAY_MS: u64 = 400;
pub const PROFILE_MENU_SETTLE_MS: u64 = 300;
pub const PROFILE_ACCOUNT_INFO_SETTLE_MS: u64 = 400;
pub const PROFILE_SETTINGS_SETTLE_MS: u64 = 350;
pub const PROFILE_FAVORITES_SETTLE_MS: u64 = 350;
pub const ACCOUNT_TAB_SETTLE_MS: u64 = 300;
pub const RESTORE_PROFILE_DELAY_MS: u64 = 100;
pub const GUARD_RELEASE_MARGIN_MS: u64 = 100;
/// Upper bound for every configured delay.
pub const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileSettleTimings {
    pub menu_ms: u64,
    pub account_info_ms: u64,
    pub settings_ms: u64,
    pub favorites_ms: u64,
    pub account_tab_ms: u64,
}

impl Default for ProfileSettleTimings {
    fn default() -> Self {
        Self {
            menu_ms: PROFILE_MENU_SETTLE_MS,
            account_info_ms: PROFILE_ACCOUNT_INFO_SETTLE_MS,
            settings_ms: PROFILE_SETTINGS_SETTLE_MS,
            favorites_ms: PROFILE_FAVORITES_SETTLE_MS,
            account_tab_ms: ACCOUNT_TAB_SETTLE_MS,
        }
    }
}

impl ProfileSettleTimings {
    pub fn for_route(&self, route: ProfileRoute) -> u64 {
        match route {
            ProfileRoute::Menu => self.menu_ms,
            ProfileRoute::AccountInfo => self.account_info_ms,
            ProfileRoute::Settings => self.settings_ms,
            ProfileRoute::Favorites => self.favorites_ms,
        }
    }

    pub fn longest(&self) -> u64 {
        ProfileRoute::ALL
            .into_iter()
            .map(|route| self.for_route(route))
            .chain(std::iter::once(self.account_tab_ms))
            .max()
            .unwrap_or(self.account_info_ms)
    }
}

/// Timing knobs for every navigation step. All fields default, so a
/// partial JSON override only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    pub section_transition_ms: u64,
    pub history_push_delay_ms: u64,
    pub frame_interval_ms: u64,
    pub subsection_fade_ms: u64,
    pub subsection_stagger_ms: u64,
    pub home_content_fast_delay_ms: u64,
    pub home_content_slow_delay_ms: u64,
    pub profile_settle: ProfileSettleTimings,
    pub restore_profile_delay_ms: u64,
    pub guard_release_margin_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            section_transition_ms: SECTION_TRANSITION_MS,
            history_push_delay_ms: HISTORY_PUSH_DELAY_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            subsection_fade_ms: SUBSECTION_FADE_MS,
            subsection_stagger_ms: SUBSECTION_STAGGER_MS,
            home_content_fast_delay_ms: HOME_CONTENT_FAST_DELAY_MS,
            home_content_slow_delay_ms: HOME_CONTENT_SLOW_DELAY_MS,
            profile_settle: ProfileSettleTimings::default(),
            restore_profile_delay_ms: RESTORE_PROFILE_DELAY_MS,
            guard_release_margin_ms: GUARD_RELEASE_MARGIN_MS,
        }
    }
}

impl NavigationConfig {
    pub fn from_json(raw: &str) -> Result<Self, NavigationError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| NavigationError::InvalidConfig {
                message: error.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NavigationError> {
        if self.frame_interval_ms == 0 {
            return Err(NavigationError::InvalidConfig {
                message: "frameIntervalMs must be positive".to_string(),
            });
        }
        if let Some((name, _)) = self
            .delays()
            .into_iter()
            .find(|(_, delay)| *delay > MAX_DELAY_MS)
        {
            return Err(NavigationError::InvalidConfig {
                message: format!("{name} must not exceed {MAX_DELAY_MS}ms"),
            });
        }
        if self.subsection_fade_ms >= self.section_push_delay_ms() {
            return Err(NavigationError::InvalidConfig {
                message: "subsectionFadeMs must finish before the history push".to_string(),
            });
        }
        Ok(())
    }

    /// Delay after which a section transition records its history entry.
    pub fn section_push_delay_ms(&self) -> u64 {
        self.section_transition_ms
            .saturating_add(self.history_push_delay_ms)
    }

    fn delays(&self) -> [(&'static str, u64); 14] {
        let settle = &self.profile_settle;
        [
            ("sectionTransitionMs", self.section_transition_ms),
            ("historyPushDelayMs", self.history_push_delay_ms),
            ("frameIntervalMs", self.frame_interval_ms),
            ("subsectionFadeMs", self.subsection_fade_ms),
            ("subsectionStaggerMs", self.subsection_stagger_ms),
            ("homeContentFastDelayMs", self.home_content_fast_delay_ms),
            ("homeContentSlowDelayMs", self.home_content_slow_delay_ms),
            ("profileSettle.menuMs", settle.menu_ms),
            ("profileSettle.accountInfoMs", settle.account_info_ms),
            ("profileSettle.settingsMs", settle.settings_ms),
            ("profileSettle.favoritesMs", settle.favorites_ms),
            ("profileSettle.accountTabMs", settle.account_tab_ms),
            ("restoreProfileDelayMs", self.restore_profile_delay_ms),
            ("guardReleaseMarginMs", self.guard_release_margin_ms),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = NavigationConfig::from_json(
            r#"{"sectionTransitionMs":500,"profileSettle":{"menuMs":250}}"#,
        )
        .expect("partial config parses");

        assert_eq!(config.section_transition_ms, 500);
        assert_eq!(config.profile_settle.menu_ms, 250);
        assert_eq!(
            config.profile_settle.account_info_ms,
            PROFILE_ACCOUNT_INFO_SETTLE_MS
        );
        assert_eq!(config.subsection_stagger_ms, SUBSECTION_STAGGER_MS);
    }

    #[test]
    fn zero_frame_interval_is_rejected() {
        let error = NavigationConfig::from_json(r#"{"frameIntervalMs":0}"#)
            .expect_err("zero frame interval");
        assert!(matches!(error, NavigationError::InvalidConfig { .. }));
    }

    #[test]
    fn oversized_delays_are_rejected_without_overflow() {
        let raw = format!(r#"{{"sectionTransitionMs":{},"historyPushDelayMs":1}}"#, u64::MAX);
        let error = NavigationConfig::from_json(&raw).expect_err("huge transition");
        assert!(error.to_string().contains("sectionTransitionMs"));

        let raw = format!(r#"{{"restoreProfileDelayMs":{}}}"#, u64::MAX);
        let error = NavigationConfig::from_json(&raw).expect_err("huge restore delay");
        assert!(error.to_string().contains("restoreProfileDelayMs"));

        let raw = format!(r#"{{"profileSettle":{{"accountTabMs":{}}}}}"#, MAX_DELAY_MS + 1);
        assert!(NavigationConfig::from_json(&raw).is_err());
    }

    #[test]
    fn push_delay_saturates() {
        let config = NavigationConfig {
            section_transition_ms: u64::MAX,
            history_push_delay_ms: 1,
            ..NavigationConfig::default()
        };
        assert_eq!(config.section_push_delay_ms(), u64::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn longest_profile_settle_covers_every_route() {
        let timings = ProfileSettleTimings {
            account_tab_ms: 900,
            ..ProfileSettleTimings::default()
        };
        assert_eq!(timings.longest(), 900);
        assert_eq!(
            ProfileSettleTimings::default().longest(),
            PROFILE_ACCOUNT_INFO_SETTLE_MS
        );
    }
}
