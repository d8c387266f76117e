use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("navigation_element_missing:{id}")]
    MissingElement { id: String },
    #[error("navigation_history_unavailable:{message}")]
    HistoryUnavailable { message: String },
    #[error("navigation_state_decode_failed:{message}")]
    Decode { message: String },
    #[error("navigation_state_encode_failed:{message}")]
    Encode { message: String },
    #[error("section_data_load_failed:{section}:{message}")]
    DataLoad { section: String, message: String },
    #[error("navigation_config_invalid:{message}")]
    InvalidConfig { message: String },
}

impl NavigationError {
    pub fn missing(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }

    pub fn history(message: impl Into<String>) -> Self {
        Self::HistoryUnavailable {
            message: message.into(),
        }
    }
}
