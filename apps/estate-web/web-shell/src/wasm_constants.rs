pub(crate) const CONFIG_GLOBAL: &str = "__ESTATE_NAV_CONFIG__";
pub(crate) const RELOAD_SECTION_DATA_FN: &str = "reloadSectionData";
pub(crate) const LUCIDE_GLOBAL: &str = "lucide";
pub(crate) const LUCIDE_CREATE_ICONS_FN: &str = "createIcons";
pub(crate) const ACCOUNT_TABS_GLOBAL: &str = "AccountInfoTabs";
pub(crate) const ACCOUNT_TABS_SWITCH_FN: &str = "switchTab";
pub(crate) const ACCOUNT_TABS_GO_BACK_FN: &str = "goBack";
pub(crate) const ACCOUNT_TABS_STICKY_FN: &str = "updateStickyPositions";
pub(crate) const ACCOUNT_TABS_LAYOUT_FN: &str = "updateLayout";
pub(crate) const SETTINGS_PAGE_GLOBAL: &str = "SettingsPage";
pub(crate) const FAVORITES_PAGE_GLOBAL: &str = "FavoritesPage";
pub(crate) const PAGE_INIT_FN: &str = "init";
pub(crate) const VIEW_ACTIVATED_EVENT: &str = "estate:view-activated";
pub(crate) const VIEW_DEACTIVATED_EVENT: &str = "estate:view-deactivated";
pub(crate) const NAV_CLICK_SELECTOR: &str =
    "[data-nav-section],[data-profile-route],[data-account-tab],[data-nav-back]";
pub(crate) const DATA_NAV_SECTION: &str = "data-nav-section";
pub(crate) const DATA_PROFILE_ROUTE: &str = "data-profile-route";
pub(crate) const DATA_ACCOUNT_TAB: &str = "data-account-tab";
pub(crate) const DATA_NAV_BACK: &str = "data-nav-back";
pub(crate) const TIMER_SLACK_MS: u64 = 1;
