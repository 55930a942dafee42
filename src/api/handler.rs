// src/api/handler.rs
// The three editor operations, executed against one open connection

use rusqlite::Connection;
use serde_json::Value;
use tracing::{error, warn};

use super::messages::{MessageCatalog, MessageCode};
use super::protocol::{
    ApiAction, ApiResponse, RequestEnvelope, RequestMethod, SpriteNameRecord, SpriteSheetForm,
};
use crate::host::{
    AuditAction, AuditLog, Caller, IdentityProvider, TitleResolver, EDIT_SPRITES_RIGHT,
};
use crate::sprites::database::{DbReader, DbWriter};
use crate::sprites::definitions::{
    SheetDimensions, SpriteKind, SpriteName, SpriteSheet, SpriteValues,
};
use crate::sprites::validation;

/// Executes API requests with the host collaborators injected. One
/// instance serves one request; construction is just wiring references.
pub struct SpriteSheetApi<'a> {
    conn: &'a Connection,
    identity: &'a dyn IdentityProvider,
    titles: &'a dyn TitleResolver,
    audit: &'a dyn AuditLog,
    catalog: &'a dyn MessageCatalog,
}

impl<'a> SpriteSheetApi<'a> {
    pub fn new(
        conn: &'a Connection,
        identity: &'a dyn IdentityProvider,
        titles: &'a dyn TitleResolver,
        audit: &'a dyn AuditLog,
        catalog: &'a dyn MessageCatalog,
    ) -> Self {
        Self {
            conn,
            identity,
            titles,
            audit,
            catalog,
        }
    }

    /// Handles one envelope. Always produces a response; errors become
    /// failure codes, never panics or dropped requests.
    pub fn execute(&self, request: &RequestEnvelope) -> ApiResponse {
        let caller = self.identity.resolve(request.user.as_deref());
        if !caller.is_registered() {
            return self.failure(MessageCode::InvalidUser);
        }

        match ApiAction::parse(&request.action) {
            Some(ApiAction::SaveSpriteSheet) => self.save_sprite_sheet(&caller, request),
            Some(ApiAction::SaveSpriteName) => self.save_sprite_name(&caller, request),
            Some(ApiAction::GetAllSpriteNames) => self.get_all_sprite_names(request),
            None => self.failure(MessageCode::InvalidAction),
        }
    }

    fn save_sprite_sheet(&self, caller: &Caller, request: &RequestEnvelope) -> ApiResponse {
        if let Some(code) = self.save_gate(caller, request) {
            return self.failure(code);
        }
        let form = match self.parse_form(request) {
            Ok(form) => form,
            Err(code) => return self.failure(code),
        };

        // An unknown title creates a sheet here; this is the only action
        // that does.
        let mut sheet = match self.resolve_sheet(&form, true) {
            Ok(sheet) => sheet,
            Err(code) => return self.failure(code),
        };
        sheet.set_dimensions(SheetDimensions::sanitize(
            form.sprite_columns,
            form.sprite_rows,
            form.sprite_inset,
        ));

        if let Err(e) = DbWriter::save_sheet(self.conn, &mut sheet) {
            error!("Failed to save sprite sheet '{}': {}", sheet.page_title, e);
            return self.failure(MessageCode::FatalErrorSaving);
        }
        self.record_audit(AuditAction::Sheet, &sheet.page_title, None, caller);

        let mut response = self.success();
        response.sprite_sheet_id = Some(sheet.id);
        response
    }

    fn save_sprite_name(&self, caller: &Caller, request: &RequestEnvelope) -> ApiResponse {
        if let Some(code) = self.save_gate(caller, request) {
            return self.failure(code);
        }
        let form = match self.parse_form(request) {
            Ok(form) => form,
            Err(code) => return self.failure(code),
        };

        let sheet = match self.resolve_sheet(&form, false) {
            Ok(sheet) => sheet,
            Err(code) => return self.failure(code),
        };

        let name = validation::normalize_sprite_name(&form.sprite_name);
        if !validation::sprite_name_is_valid(&name) {
            return self.failure(MessageCode::InvalidSpriteName);
        }

        let kind = match request.kind.as_deref().and_then(SpriteKind::parse) {
            Some(kind) => kind,
            None => return self.failure(MessageCode::UnknownError),
        };
        let invalid_geometry = match kind {
            SpriteKind::Sprite => MessageCode::InvalidCoordinates,
            SpriteKind::Slice => MessageCode::InvalidPercentages,
        };

        let values = match request
            .values
            .as_ref()
            .and_then(|raw| SpriteValues::from_wire(kind, raw))
        {
            Some(values) => values,
            None => return self.failure(invalid_geometry),
        };
        if !validation::values_in_bounds(&sheet, &values) {
            return self.failure(invalid_geometry);
        }

        let id = match DbWriter::save_sprite_name(self.conn, sheet.id, &name, &values) {
            Ok(id) => id,
            Err(e) => {
                error!(
                    "Failed to save {} '{}' on '{}': {}",
                    kind, name, sheet.page_title, e
                );
                return self.failure(MessageCode::FatalErrorSaving);
            }
        };
        let region = SpriteName {
            id,
            spritesheet_id: sheet.id,
            name,
            values,
        };

        let action = match kind {
            SpriteKind::Sprite => AuditAction::Sprite,
            SpriteKind::Slice => AuditAction::Slice,
        };
        self.record_audit(action, &sheet.page_title, Some(&region.name), caller);

        let mut response = self.success();
        response.tag = Some(region.parser_tag(&sheet.page_title));
        response
    }

    fn get_all_sprite_names(&self, request: &RequestEnvelope) -> ApiResponse {
        let spritesheet_id = request.spritesheet_id.unwrap_or(0);
        if spritesheet_id <= 0 {
            return self.empty_listing_failure();
        }

        let sheet = match DbReader::load_sheet_by_id(self.conn, spritesheet_id) {
            Ok(Some(sheet)) => sheet,
            Ok(None) => return self.empty_listing_failure(),
            Err(e) => {
                error!("Failed to load sprite sheet {}: {}", spritesheet_id, e);
                return self.empty_listing_failure();
            }
        };
        let names = match DbReader::list_sprite_names(self.conn, sheet.id) {
            Ok(names) => names,
            Err(e) => {
                error!("Failed to list regions of '{}': {}", sheet.page_title, e);
                return self.empty_listing_failure();
            }
        };

        let data = names
            .iter()
            .map(|region| SpriteNameRecord {
                id: region.id,
                name: region.name.clone(),
                kind: region.kind().as_str().to_string(),
                values: region.values.to_wire(),
                tag: region.parser_tag(&sheet.page_title),
            })
            .collect();

        let mut response = self.success();
        response.data = Some(data);
        response
    }

    /// Both save actions require the edit right and a POST request, in
    /// that order.
    fn save_gate(&self, caller: &Caller, request: &RequestEnvelope) -> Option<MessageCode> {
        if !caller.is_allowed(EDIT_SPRITES_RIGHT) {
            return Some(MessageCode::NoPermission);
        }
        if request.method != RequestMethod::Post {
            return Some(MessageCode::MustBePosted);
        }
        None
    }

    /// Accepts the form as a JSON object or as a JSON-encoded string,
    /// which is how browser form serializers deliver it.
    fn parse_form(&self, request: &RequestEnvelope) -> Result<SpriteSheetForm, MessageCode> {
        match &request.form {
            None => Ok(SpriteSheetForm::default()),
            Some(Value::String(encoded)) => {
                serde_json::from_str(encoded).map_err(|_| MessageCode::BadRequest)
            }
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|_| MessageCode::BadRequest),
        }
    }

    /// Finds the sheet the form points at: by id when one is given,
    /// otherwise by normalized title.
    fn resolve_sheet(
        &self,
        form: &SpriteSheetForm,
        create_if_missing: bool,
    ) -> Result<SpriteSheet, MessageCode> {
        if form.spritesheet_id > 0 {
            return match DbReader::load_sheet_by_id(self.conn, form.spritesheet_id) {
                Ok(Some(sheet)) => Ok(sheet),
                Ok(None) => Err(MessageCode::FatalErrorLoading),
                Err(e) => {
                    error!("Failed to load sprite sheet {}: {}", form.spritesheet_id, e);
                    Err(MessageCode::FatalErrorLoading)
                }
            };
        }

        let title = match self.titles.resolve(&form.page_title) {
            Some(title) => title,
            None => return Err(MessageCode::BadTitle),
        };
        match DbReader::load_sheet_by_title(self.conn, title.as_str()) {
            Ok(Some(sheet)) => Ok(sheet),
            Ok(None) if create_if_missing => Ok(SpriteSheet::new(title.into_inner())),
            Ok(None) => Err(MessageCode::FatalErrorLoading),
            Err(e) => {
                error!("Failed to load sprite sheet '{}': {}", title, e);
                Err(MessageCode::FatalErrorLoading)
            }
        }
    }

    // The data write has already committed when the audit append runs,
    // so audit failures degrade to a warning.
    fn record_audit(
        &self,
        action: AuditAction,
        page_title: &str,
        sprite_name: Option<&str>,
        caller: &Caller,
    ) {
        if let Err(e) = self.audit.add_entry(action, page_title, sprite_name, caller) {
            warn!("Failed to record audit entry for '{}': {}", page_title, e);
        }
    }

    fn success(&self) -> ApiResponse {
        self.response(true, MessageCode::Okay)
    }

    fn failure(&self, code: MessageCode) -> ApiResponse {
        self.response(false, code)
    }

    /// Listing failures still carry an empty data array so clients can
    /// always iterate `data` on that action.
    fn empty_listing_failure(&self) -> ApiResponse {
        let mut response = self.failure(MessageCode::FatalErrorLoading);
        response.data = Some(Vec::new());
        response
    }

    fn response(&self, success: bool, code: MessageCode) -> ApiResponse {
        ApiResponse {
            success,
            message: code.key().to_string(),
            message_text: self.catalog.text(code),
            sprite_sheet_id: None,
            tag: None,
            data: None,
        }
    }
}
