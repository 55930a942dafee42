// src/api/protocol.rs
//! Wire types for the sprite sheet API
//!
//! Requests and responses travel as single JSON objects over the framed
//! socket connection. All types use serde; unknown JSON fields are
//! ignored so older clients keep working.

use serde::{Deserialize, Serialize};

/// The three editor operations, selected by the request's `do` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    SaveSpriteSheet,
    SaveSpriteName,
    GetAllSpriteNames,
}

impl ApiAction {
    /// Parses the `do` string. Matching is exact; anything else is an
    /// unknown action.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "saveSpriteSheet" => Some(ApiAction::SaveSpriteSheet),
            "saveSpriteName" => Some(ApiAction::SaveSpriteName),
            "getAllSpriteNames" => Some(ApiAction::GetAllSpriteNames),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn as_str(self) -> &'static str {
        match self {
            ApiAction::SaveSpriteSheet => "saveSpriteSheet",
            ApiAction::SaveSpriteName => "saveSpriteName",
            ApiAction::GetAllSpriteNames => "getAllSpriteNames",
        }
    }
}

/// Requests default to GET; mutating actions must declare POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

/// One request as it crosses the wire. Everything but `do` is optional
/// so the handler can answer with a precise error code instead of
/// rejecting the frame wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "do")]
    pub action: String,
    #[serde(default)]
    pub method: RequestMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Editor form blob for the save actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<serde_json::Value>,
    /// Region kind ("sprite" or "slice") for saveSpriteName.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Region geometry payload for saveSpriteName.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<serde_json::Value>,
    /// Sheet selector for getAllSpriteNames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spritesheet_id: Option<i64>,
}

/// The editor form carried by save requests. Fields the editor did not
/// fill in arrive as their zero values and are sanitized downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteSheetForm {
    #[serde(default)]
    pub spritesheet_id: i64,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub sprite_columns: i64,
    #[serde(default)]
    pub sprite_rows: i64,
    #[serde(default)]
    pub sprite_inset: i64,
    #[serde(default)]
    pub sprite_name: String,
}

/// One region in a listing response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteNameRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub values: serde_json::Value,
    pub tag: String,
}

/// Flat response shape shared by every action. Optional fields are
/// omitted from the JSON when they do not apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    /// Stable message key, e.g. "ss-api-okay".
    pub message: String,
    #[serde(rename = "messageText")]
    pub message_text: String,
    #[serde(rename = "spriteSheetId", default, skip_serializing_if = "Option::is_none")]
    pub sprite_sheet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SpriteNameRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_strings_parse_exactly() {
        assert_eq!(ApiAction::parse("saveSpriteSheet"), Some(ApiAction::SaveSpriteSheet));
        assert_eq!(ApiAction::parse("saveSpriteName"), Some(ApiAction::SaveSpriteName));
        assert_eq!(ApiAction::parse("getAllSpriteNames"), Some(ApiAction::GetAllSpriteNames));
        assert_eq!(ApiAction::parse("SaveSpriteSheet"), None);
        assert_eq!(ApiAction::parse("savespritesheet"), None);
        assert_eq!(ApiAction::parse(""), None);
        for action in [
            ApiAction::SaveSpriteSheet,
            ApiAction::SaveSpriteName,
            ApiAction::GetAllSpriteNames,
        ] {
            assert_eq!(ApiAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn envelope_uses_wire_field_names_and_defaults() {
        let envelope: RequestEnvelope = serde_json::from_value(json!({
            "do": "saveSpriteName",
            "method": "POST",
            "user": "alexia",
            "type": "sprite",
            "values": {"xPos": 1, "yPos": 0}
        }))
        .unwrap();
        assert_eq!(envelope.action, "saveSpriteName");
        assert_eq!(envelope.method, RequestMethod::Post);
        assert_eq!(envelope.kind.as_deref(), Some("sprite"));
        assert!(envelope.form.is_none());
        assert!(envelope.spritesheet_id.is_none());

        // Bare minimum: only `do`, method falls back to GET
        let envelope: RequestEnvelope =
            serde_json::from_value(json!({"do": "getAllSpriteNames"})).unwrap();
        assert_eq!(envelope.method, RequestMethod::Get);
        assert!(envelope.user.is_none());
    }

    #[test]
    fn unknown_envelope_fields_are_ignored() {
        let envelope: RequestEnvelope = serde_json::from_value(json!({
            "do": "getAllSpriteNames",
            "spritesheet_id": 4,
            "client_version": "1.2.3"
        }))
        .unwrap();
        assert_eq!(envelope.spritesheet_id, Some(4));
    }

    #[test]
    fn response_omits_inapplicable_fields() {
        let response = ApiResponse {
            success: true,
            message: "ss-api-okay".to_string(),
            message_text: "Okay".to_string(),
            sprite_sheet_id: Some(3),
            tag: None,
            data: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["spriteSheetId"], json!(3));
        assert_eq!(value["messageText"], json!("Okay"));
        assert!(value.get("tag").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn listing_record_round_trips() {
        let record = SpriteNameRecord {
            id: 12,
            name: "coin".to_string(),
            kind: "sprite".to_string(),
            values: json!({"xPos": 1, "yPos": 0}),
            tag: "{{#sprite:Icons.png|coin}}".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("sprite"));
        let back: SpriteNameRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
