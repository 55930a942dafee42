// src/sprites/mod.rs

pub mod database;
pub mod definitions;
pub mod validation;
