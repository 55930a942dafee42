// src/host/mod.rs
// Injected collaborators the API depends on: who is calling, how page
// titles are canonicalized, and where the audit trail goes.

pub mod audit;
pub mod identity;
pub mod titles;

pub use audit::{AuditAction, AuditLog, DbAuditLog};
#[cfg(test)]
pub use audit::NullAuditLog;
pub use identity::{
    Caller, IdentityProvider, SettingsIdentityProvider, UserEntry, EDIT_SPRITES_RIGHT,
};
pub use titles::{DbKeyTitleResolver, TitleResolver};
