// src/api/messages.rs
// Response message codes and their rendered text

use std::fmt;

/// Every outcome a response can report. The key is the stable contract;
/// the rendered text comes from a catalog so hosts can localize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCode {
    Okay,
    InvalidUser,
    NoPermission,
    MustBePosted,
    BadTitle,
    InvalidAction,
    BadRequest,
    InvalidSpriteName,
    InvalidCoordinates,
    InvalidPercentages,
    FatalErrorSaving,
    FatalErrorLoading,
    UnknownError,
}

impl MessageCode {
    #[cfg(test)]
    pub const ALL: [MessageCode; 13] = [
        MessageCode::Okay,
        MessageCode::InvalidUser,
        MessageCode::NoPermission,
        MessageCode::MustBePosted,
        MessageCode::BadTitle,
        MessageCode::InvalidAction,
        MessageCode::BadRequest,
        MessageCode::InvalidSpriteName,
        MessageCode::InvalidCoordinates,
        MessageCode::InvalidPercentages,
        MessageCode::FatalErrorSaving,
        MessageCode::FatalErrorLoading,
        MessageCode::UnknownError,
    ];

    /// Stable key clients match on.
    pub fn key(self) -> &'static str {
        match self {
            MessageCode::Okay => "ss-api-okay",
            MessageCode::InvalidUser => "ss-api-invalid-user",
            MessageCode::NoPermission => "ss-api-no-permission",
            MessageCode::MustBePosted => "ss-api-must-be-posted",
            MessageCode::BadTitle => "ss-api-bad-title",
            MessageCode::InvalidAction => "ss-api-invalid-action",
            MessageCode::BadRequest => "ss-api-bad-request",
            MessageCode::InvalidSpriteName => "ss-api-invalid-sprite-name",
            MessageCode::InvalidCoordinates => "ss-api-invalid-coordinates",
            MessageCode::InvalidPercentages => "ss-api-invalid-percentages",
            MessageCode::FatalErrorSaving => "ss-api-fatal-error-saving",
            MessageCode::FatalErrorLoading => "ss-api-fatal-error-loading",
            MessageCode::UnknownError => "ss-api-unknown-error",
        }
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Renders message codes into human-readable text.
pub trait MessageCatalog {
    fn text(&self, code: MessageCode) -> String;
}

/// Built-in English rendering.
pub struct EnglishCatalog;

impl MessageCatalog for EnglishCatalog {
    fn text(&self, code: MessageCode) -> String {
        let text = match code {
            MessageCode::Okay => "Okay",
            MessageCode::InvalidUser => "A registered user is required to perform this action.",
            MessageCode::NoPermission => "You do not have permission to edit sprite sheets.",
            MessageCode::MustBePosted => "Save actions must be sent as POST requests.",
            MessageCode::BadTitle => "The given page title is not valid.",
            MessageCode::InvalidAction => "The requested action is not recognized.",
            MessageCode::BadRequest => "The request could not be understood.",
            MessageCode::InvalidSpriteName => {
                "The sprite name is empty or contains invalid characters."
            }
            MessageCode::InvalidCoordinates => {
                "The sprite coordinates fall outside the sheet grid."
            }
            MessageCode::InvalidPercentages => {
                "The slice percentages fall outside the image."
            }
            MessageCode::FatalErrorSaving => "There was a fatal error saving to the database.",
            MessageCode::FatalErrorLoading => "There was a fatal error loading from the database.",
            MessageCode::UnknownError => "An unknown error occurred.",
        };
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_prefixed_and_distinct() {
        let mut seen = HashSet::new();
        for code in MessageCode::ALL {
            assert!(code.key().starts_with("ss-api-"), "{}", code.key());
            assert!(seen.insert(code.key()), "duplicate key {}", code.key());
        }
    }

    #[test]
    fn english_catalog_covers_every_code() {
        for code in MessageCode::ALL {
            assert!(!EnglishCatalog.text(code).is_empty());
        }
    }
}
