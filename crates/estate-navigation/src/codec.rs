//! History payload and URL fragment codec.
//!
//! The fragment mapping is canonical in one direction only: every state has
//! exactly one fragment, while [`decode_fragment`] accepts a looser grammar
//! and is used opportunistically for deep links.

use crate::error::NavigationError;
use crate::state::{AccountTab, NavigationState, ProfileRoute, Section};

pub fn encode_fragment(state: &NavigationState) -> String {
    let state = state.normalized();
    match state.section {
        Section::Home => match state.subsection {
            Some(subsection) => format!("#/{}", subsection.section().slug()),
            None => "#/".to_string(),
        },
        Section::MyActions => "#/my-actions".to_string(),
        Section::Profile => match (state.profile_route, state.account_tab) {
            (Some(ProfileRoute::AccountInfo), Some(tab)) => {
                format!("#/profile/account-info/{}", tab.slug())
            }
            (Some(route), _) if route.is_nested() => format!("#/profile/{}", route.slug()),
            _ => "#/profile".to_string(),
        },
        Section::Buy | Section::Rent | Section::Auction => "#/".to_string(),
    }
}

pub fn decode_fragment(raw: &str) -> Option<NavigationState> {
    let trimmed = raw.trim();
    let path = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [] => Some(NavigationState::home()),
        ["profile"] => Some(NavigationState::profile(ProfileRoute::Menu)),
        ["profile", route] => {
            ProfileRoute::from_slug(route).map(NavigationState::profile)
        }
        ["profile", "account-info", tab] => {
            AccountTab::from_slug(tab).map(NavigationState::account_tab)
        }
        [section] => Section::from_slug(section).map(NavigationState::for_section),
        _ => None,
    }
}

/// Serializes the state into the payload attached to a history entry.
pub fn encode_payload(state: &NavigationState) -> Result<String, NavigationError> {
    serde_json::to_string(&state.normalized()).map_err(|error| NavigationError::Encode {
        message: error.to_string(),
    })
}

pub fn decode_payload(raw: &str) -> Result<NavigationState, NavigationError> {
    serde_json::from_str::<NavigationState>(raw)
        .map(NavigationState::normalized)
        .map_err(|error| NavigationError::Decode {
            message: error.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Subsection;

    #[test]
    fn fragments_follow_canonical_table() {
        let cases = [
            (NavigationState::home(), "#/"),
            (NavigationState::subsection(Subsection::Buy), "#/buy"),
            (NavigationState::subsection(Subsection::Auctions), "#/auction"),
            (NavigationState::my_actions(), "#/my-actions"),
            (NavigationState::profile(ProfileRoute::Menu), "#/profile"),
            (
                NavigationState::profile(ProfileRoute::AccountInfo),
                "#/profile/account-info",
            ),
            (
                NavigationState::account_tab(AccountTab::ContactInfo),
                "#/profile/account-info/contact-info",
            ),
            (
                NavigationState::profile(ProfileRoute::Settings),
                "#/profile/settings",
            ),
            (
                NavigationState::profile(ProfileRoute::Favorites),
                "#/profile/favorites",
            ),
        ];

        for (state, fragment) in cases {
            assert_eq!(encode_fragment(&state), fragment, "state: {state:?}");
        }
    }

    #[test]
    fn decode_tolerates_loose_input_and_rejects_unknown_paths() {
        assert_eq!(decode_fragment(""), Some(NavigationState::home()));
        assert_eq!(decode_fragment("#/home/"), Some(NavigationState::home()));
        assert_eq!(
            decode_fragment("/auctions"),
            Some(NavigationState::subsection(Subsection::Auctions))
        );
        assert_eq!(
            decode_fragment("#/profile/account-info/addresses/"),
            Some(NavigationState::account_tab(AccountTab::Addresses))
        );
        assert_eq!(decode_fragment("#/profile/wallet"), None);
        assert_eq!(decode_fragment("#/listing/42"), None);
        assert_eq!(decode_fragment("#/profile/account-info/passport"), None);
    }

    #[test]
    fn payload_omits_absent_fields_and_uses_wire_names() {
        let payload = encode_payload(&NavigationState::account_tab(AccountTab::BasicData))
            .expect("state serializes");
        assert_eq!(
            payload,
            r#"{"section":"profile","profileRoute":"account-info","accountTab":"basic-data"}"#
        );
        assert_eq!(
            encode_payload(&NavigationState::home()).expect("state serializes"),
            r#"{"section":"home"}"#
        );
    }

    #[test]
    fn payload_with_unknown_section_is_rejected() {
        let error = decode_payload(r#"{"section":"mortgage"}"#).expect_err("unknown section");
        assert!(matches!(error, NavigationError::Decode { .. }));
    }

    #[test]
    fn payload_alias_sections_are_normalized() {
        let state = decode_payload(r#"{"section":"buy"}"#).expect("alias decodes");
        assert_eq!(state, NavigationState::subsection(Subsection::Buy));
    }
}
