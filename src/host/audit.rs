// src/host/audit.rs
// Audit trail for sheet and region edits

use chrono::Utc;
use rusqlite::Connection;

use super::identity::Caller;
use crate::sprites::database::{DbResult, DbWriter};

/// Log action recorded for one audited change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Sheet,
    Sprite,
    Slice,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Sheet => "sheet",
            AuditAction::Sprite => "sprite",
            AuditAction::Slice => "slice",
        }
    }
}

/// Records who changed what. Entries are appended after the change has
/// committed, so implementations must not assume they can veto it.
pub trait AuditLog {
    fn add_entry(
        &self,
        action: AuditAction,
        page_title: &str,
        sprite_name: Option<&str>,
        caller: &Caller,
    ) -> DbResult<()>;
}

/// Appends audit entries to the sprite_log table.
pub struct DbAuditLog<'a> {
    conn: &'a Connection,
}

impl<'a> DbAuditLog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AuditLog for DbAuditLog<'_> {
    fn add_entry(
        &self,
        action: AuditAction,
        page_title: &str,
        sprite_name: Option<&str>,
        caller: &Caller,
    ) -> DbResult<()> {
        DbWriter::append_sprite_log(
            self.conn,
            action.as_str(),
            page_title,
            sprite_name,
            &caller.name,
            &Utc::now().to_rfc3339(),
        )
    }
}

/// Discards audit entries.
#[cfg(test)]
pub struct NullAuditLog;

#[cfg(test)]
impl AuditLog for NullAuditLog {
    fn add_entry(
        &self,
        _action: AuditAction,
        _page_title: &str,
        _sprite_name: Option<&str>,
        _caller: &Caller,
    ) -> DbResult<()> {
        Ok(())
    }
}
