//! The view surface the controllers mutate, and the element ids and class
//! names they agree on with the page markup.

use crate::error::NavigationError;
use crate::state::{AccountTab, ProfileRoute, Section, Subsection};

pub const ACTIVE_CLASS: &str = "active";
pub const VISIBLE_CLASS: &str = "visible";

pub const HOME_SECTION_ID: &str = "home-section";
pub const MY_ACTIONS_SECTION_ID: &str = "my-actions-section";
pub const PROFILE_SECTION_ID: &str = "profile-section";
pub const HOME_CONTENT_ID: &str = "home-section-content";

pub const PROFILE_TITLE_ID: &str = "profile-page-title";
pub const PROFILE_MENU_ID: &str = "profile-menu";
pub const ACCOUNT_INFO_VIEW_ID: &str = "account-info-view";
pub const SETTINGS_VIEW_ID: &str = "settings-view";
pub const FAVORITES_VIEW_ID: &str = "favorites-view";
pub const ACCOUNT_TABS_HEADER_ID: &str = "account-tabs-header";
pub const ACCOUNT_TABS_CONTAINER_ID: &str = "account-tabs-container";
pub const SETTINGS_HEADER_ID: &str = "settings-header";
pub const FAVORITES_HEADER_ID: &str = "favorites-header";

pub fn section_element_id(section: Section) -> &'static str {
    match section.host() {
        Section::MyActions => MY_ACTIONS_SECTION_ID,
        Section::Profile => PROFILE_SECTION_ID,
        Section::Home | Section::Buy | Section::Rent | Section::Auction => HOME_SECTION_ID,
    }
}

pub fn subsection_element_id(subsection: Subsection) -> &'static str {
    match subsection {
        Subsection::Auctions => "auctions-subsection",
        Subsection::Buy => "buy-subsection",
        Subsection::Rent => "rent-subsection",
    }
}

pub fn profile_view_id(route: ProfileRoute) -> &'static str {
    match route {
        ProfileRoute::Menu => PROFILE_MENU_ID,
        ProfileRoute::AccountInfo => ACCOUNT_INFO_VIEW_ID,
        ProfileRoute::Settings => SETTINGS_VIEW_ID,
        ProfileRoute::Favorites => FAVORITES_VIEW_ID,
    }
}

pub fn profile_header_id(route: ProfileRoute) -> Option<&'static str> {
    match route {
        ProfileRoute::Menu => None,
        ProfileRoute::AccountInfo => Some(ACCOUNT_TABS_HEADER_ID),
        ProfileRoute::Settings => Some(SETTINGS_HEADER_ID),
        ProfileRoute::Favorites => Some(FAVORITES_HEADER_ID),
    }
}

pub fn account_tab_button_id(tab: AccountTab) -> String {
    format!("account-tab-{}", tab.slug())
}

pub fn account_tab_view_id(tab: AccountTab) -> String {
    format!("account-tab-view-{}", tab.slug())
}

pub fn account_tab_header_id(tab: AccountTab) -> String {
    format!("account-tab-header-{}", tab.slug())
}

pub fn nav_item_ids(section: Section) -> [String; 2] {
    [
        format!("bottom-nav-{}", section.slug()),
        format!("top-nav-{}", section.slug()),
    ]
}

/// Minimal element API the navigation controllers need from the page.
///
/// Mutations report [`NavigationError::MissingElement`] for unknown ids;
/// queries on unknown ids answer as if the element were absent.
pub trait ViewSurface {
    fn contains(&self, id: &str) -> bool;
    fn has_class(&self, id: &str, class: &str) -> bool;
    fn add_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError>;
    fn remove_class(&mut self, id: &str, class: &str) -> Result<(), NavigationError>;
    fn set_style(&mut self, id: &str, property: &str, value: &str)
    -> Result<(), NavigationError>;
    fn style(&self, id: &str, property: &str) -> Option<String>;
    /// Forces a synchronous style and layout flush on the element.
    fn flush_layout(&mut self, id: &str) -> Result<(), NavigationError>;

    fn show(&mut self, id: &str) -> Result<(), NavigationError> {
        self.set_style(id, "display", "block")
    }

    fn hide(&mut self, id: &str) -> Result<(), NavigationError> {
        self.set_style(id, "display", "none")
    }

    fn is_displayed(&self, id: &str) -> bool {
        self.contains(id) && self.style(id, "display").as_deref() != Some("none")
    }

    fn activate(&mut self, id: &str) -> Result<(), NavigationError> {
        self.show(id)?;
        self.add_class(id, ACTIVE_CLASS)
    }

    fn deactivate(&mut self, id: &str) -> Result<(), NavigationError> {
        self.remove_class(id, ACTIVE_CLASS)?;
        self.hide(id)
    }

    fn is_active(&self, id: &str) -> bool {
        self.has_class(id, ACTIVE_CLASS)
    }

    fn require(&self, id: &str) -> Result<(), NavigationError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(NavigationError::missing(id))
        }
    }
}

/// Every element id the controllers touch, in markup order.
pub fn known_element_ids() -> Vec<String> {
    let mut ids: Vec<String> = [
        HOME_SECTION_ID,
        HOME_CONTENT_ID,
        MY_ACTIONS_SECTION_ID,
        PROFILE_SECTION_ID,
        PROFILE_TITLE_ID,
        PROFILE_MENU_ID,
        ACCOUNT_INFO_VIEW_ID,
        ACCOUNT_TABS_HEADER_ID,
        ACCOUNT_TABS_CONTAINER_ID,
        SETTINGS_VIEW_ID,
        SETTINGS_HEADER_ID,
        FAVORITES_VIEW_ID,
        FAVORITES_HEADER_ID,
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    ids.extend(
        Subsection::ALL
            .into_iter()
            .map(|subsection| subsection_element_id(subsection).to_string()),
    );
    for tab in AccountTab::ALL {
        ids.push(account_tab_button_id(tab));
        ids.push(account_tab_view_id(tab));
        ids.push(account_tab_header_id(tab));
    }
    for section in Section::ALL {
        ids.extend(nav_item_ids(section));
    }
    ids
}
