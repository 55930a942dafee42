// src/api/mod.rs

pub mod client;
pub mod handler;
pub mod messages;
pub mod protocol;
pub mod server;

pub use client::ApiClient;
pub use messages::EnglishCatalog;
pub use protocol::{RequestEnvelope, RequestMethod, SpriteSheetForm};
pub use server::{ApiServer, Endpoint};
