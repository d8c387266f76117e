use estate_navigation::{AccountTab, ProfileRoute, Section};
use thiserror::Error;

/// One user request, decoded from an exported call or a clicked element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Section(Section),
    ProfileRoute(ProfileRoute),
    AccountTab(AccountTab),
    AccountBack,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown_section:{0}")]
    UnknownSection(String),
    #[error("unknown_profile_route:{0}")]
    UnknownProfileRoute(String),
    #[error("unknown_account_tab:{0}")]
    UnknownAccountTab(String),
}

/// `data-*` attributes read from the nearest navigation element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavAttributes {
    pub section: Option<String>,
    pub profile_route: Option<String>,
    pub account_tab: Option<String>,
    pub back: Option<String>,
}

impl NavAttributes {
    pub fn is_empty(&self) -> bool {
        self.section.is_none()
            && self.profile_route.is_none()
            && self.account_tab.is_none()
            && self.back.is_none()
    }
}

impl NavCommand {
    pub fn section(raw: &str) -> Result<Self, CommandParseError> {
        Section::from_slug(raw)
            .map(Self::Section)
            .ok_or_else(|| CommandParseError::UnknownSection(raw.to_string()))
    }

    pub fn profile_route(raw: &str) -> Result<Self, CommandParseError> {
        ProfileRoute::from_slug(raw)
            .map(Self::ProfileRoute)
            .ok_or_else(|| CommandParseError::UnknownProfileRoute(raw.to_string()))
    }

    pub fn account_tab(raw: &str) -> Result<Self, CommandParseError> {
        AccountTab::from_slug(raw)
            .map(Self::AccountTab)
            .ok_or_else(|| CommandParseError::UnknownAccountTab(raw.to_string()))
    }

    /// The most specific attribute wins: tab, then route, then section.
    /// `data-nav-back="account"` walks up inside the profile, any other
    /// value is the in-app back button.
    pub fn from_attributes(
        attributes: &NavAttributes,
    ) -> Option<Result<Self, CommandParseError>> {
        if let Some(back) = attributes.back.as_deref() {
            let command = if back.trim().eq_ignore_ascii_case("account") {
                Self::AccountBack
            } else {
                Self::Back
            };
            return Some(Ok(command));
        }
        if let Some(tab) = attributes.account_tab.as_deref() {
            return Some(Self::account_tab(tab));
        }
        if let Some(route) = attributes.profile_route.as_deref() {
            return Some(Self::profile_route(route));
        }
        attributes.section.as_deref().map(Self::section)
    }
}
