//! Navigation state model shared by every controller.
//!
//! `Section` covers every id the bottom and top navigation can request.
//! Buy, rent and auction have no element of their own: they are hosted by
//! the home section and expressed as a home `Subsection` once they land in a
//! [`NavigationState`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Home,
    Buy,
    Rent,
    Auction,
    MyActions,
    Profile,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Home,
        Section::Buy,
        Section::Rent,
        Section::Auction,
        Section::MyActions,
        Section::Profile,
    ];

    /// Sections that own a top-level element.
    pub const HOSTS: [Section; 3] = [Section::Home, Section::MyActions, Section::Profile];

    pub fn slug(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Buy => "buy",
            Section::Rent => "rent",
            Section::Auction => "auction",
            Section::MyActions => "my-actions",
            Section::Profile => "profile",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        let normalized = raw.trim().trim_end_matches("-section").to_ascii_lowercase();
        match normalized.as_str() {
            "home" => Some(Section::Home),
            "buy" => Some(Section::Buy),
            "rent" => Some(Section::Rent),
            "auction" | "auctions" => Some(Section::Auction),
            "my-actions" => Some(Section::MyActions),
            "profile" => Some(Section::Profile),
            _ => None,
        }
    }

    /// The section whose element is actually shown for this id.
    pub fn host(self) -> Section {
        match self {
            Section::Buy | Section::Rent | Section::Auction => Section::Home,
            Section::Home | Section::MyActions | Section::Profile => self,
        }
    }

    pub fn as_subsection(self) -> Option<Subsection> {
        match self {
            Section::Buy => Some(Subsection::Buy),
            Section::Rent => Some(Subsection::Rent),
            Section::Auction => Some(Subsection::Auctions),
            Section::Home | Section::MyActions | Section::Profile => None,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Subsection {
    Auctions,
    Buy,
    Rent,
}

impl Subsection {
    pub const ALL: [Subsection; 3] = [Subsection::Auctions, Subsection::Buy, Subsection::Rent];

    pub fn slug(self) -> &'static str {
        match self {
            Subsection::Auctions => "auctions",
            Subsection::Buy => "buy",
            Subsection::Rent => "rent",
        }
    }

    pub fn section(self) -> Section {
        match self {
            Subsection::Auctions => Section::Auction,
            Subsection::Buy => Section::Buy,
            Subsection::Rent => Section::Rent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileRoute {
    Menu,
    AccountInfo,
    Settings,
    Favorites,
}

impl ProfileRoute {
    pub const ALL: [ProfileRoute; 4] = [
        ProfileRoute::Menu,
        ProfileRoute::AccountInfo,
        ProfileRoute::Settings,
        ProfileRoute::Favorites,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ProfileRoute::Menu => "menu",
            ProfileRoute::AccountInfo => "account-info",
            ProfileRoute::Settings => "settings",
            ProfileRoute::Favorites => "favorites",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "menu" => Some(ProfileRoute::Menu),
            "account-info" => Some(ProfileRoute::AccountInfo),
            "settings" => Some(ProfileRoute::Settings),
            "favorites" => Some(ProfileRoute::Favorites),
            _ => None,
        }
    }

    /// Routes that live below the menu and rewrite the URL hash.
    pub fn is_nested(self) -> bool {
        !matches!(self, ProfileRoute::Menu)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountTab {
    BasicData,
    ContactInfo,
    Addresses,
    Documents,
}

impl AccountTab {
    pub const ALL: [AccountTab; 4] = [
        AccountTab::BasicData,
        AccountTab::ContactInfo,
        AccountTab::Addresses,
        AccountTab::Documents,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            AccountTab::BasicData => "basic-data",
            AccountTab::ContactInfo => "contact-info",
            AccountTab::Addresses => "addresses",
            AccountTab::Documents => "documents",
        }
    }

    pub fn from_slug(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        AccountTab::ALL
            .into_iter()
            .find(|tab| tab.slug() == normalized)
    }
}

/// The unit persisted into each browser history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NavigationState {
    pub section: Section,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection: Option<Subsection>,
    #[serde(
        default,
        rename = "profileRoute",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_route: Option<ProfileRoute>,
    #[serde(default, rename = "accountTab", skip_serializing_if = "Option::is_none")]
    pub account_tab: Option<AccountTab>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::home()
    }
}

impl NavigationState {
    pub fn home() -> Self {
        Self {
            section: Section::Home,
            subsection: None,
            profile_route: None,
            account_tab: None,
        }
    }

    pub fn subsection(subsection: Subsection) -> Self {
        Self {
            subsection: Some(subsection),
            ..Self::home()
        }
    }

    pub fn my_actions() -> Self {
        Self {
            section: Section::MyActions,
            ..Self::home()
        }
    }

    pub fn profile(route: ProfileRoute) -> Self {
        Self {
            section: Section::Profile,
            subsection: None,
            profile_route: Some(route),
            account_tab: None,
        }
    }

    pub fn account_tab(tab: AccountTab) -> Self {
        Self {
            account_tab: Some(tab),
            ..Self::profile(ProfileRoute::AccountInfo)
        }
    }

    /// Builds the canonical state for a navigation request on `section`.
    pub fn for_section(section: Section) -> Self {
        match section {
            Section::Home => Self::home(),
            Section::Buy | Section::Rent | Section::Auction => Self {
                subsection: section.as_subsection(),
                ..Self::home()
            },
            Section::MyActions => Self::my_actions(),
            Section::Profile => Self::profile(ProfileRoute::Menu),
        }
    }

    /// Folds subsection aliases into home and drops fields that are not
    /// meaningful under their parent.
    pub fn normalized(self) -> Self {
        let section = self.section.host();
        let subsection = match section {
            Section::Home => self.section.as_subsection().or(self.subsection),
            _ => None,
        };
        let profile_route = match section {
            Section::Profile => Some(self.profile_route.unwrap_or(ProfileRoute::Menu)),
            _ => None,
        };
        let account_tab = match profile_route {
            Some(ProfileRoute::AccountInfo) => self.account_tab,
            _ => None,
        };
        Self {
            section,
            subsection,
            profile_route,
            account_tab,
        }
    }

    /// The id a `switch_to` call needs to reproduce this state's top level.
    pub fn target_section(&self) -> Section {
        match (self.section.host(), self.subsection) {
            (Section::Home, Some(subsection)) => subsection.section(),
            (host, _) => host,
        }
    }
}
