// src/sprites/validation.rs
// Name and geometry validation for sheet regions

use unicode_normalization::UnicodeNormalization;

use super::definitions::{SlicePercentages, SpriteCoordinates, SpriteSheet, SpriteValues};

/// Longest accepted sprite name, in bytes of the normalized form.
pub const MAX_SPRITE_NAME_BYTES: usize = 255;

// Characters that would break the embed tag or collide with wikitext.
const RESERVED_NAME_CHARS: &[char] = &['|', '{', '}', '#', '<', '>', '[', ']'];

/// Normalizes a raw sprite name: NFC so visually identical names compare
/// equal, then surrounding whitespace stripped.
pub fn normalize_sprite_name(raw: &str) -> String {
    raw.nfc().collect::<String>().trim().to_string()
}

/// Checks an already normalized name.
pub fn sprite_name_is_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_SPRITE_NAME_BYTES {
        return false;
    }
    !name
        .chars()
        .any(|c| c.is_control() || RESERVED_NAME_CHARS.contains(&c))
}

/// A sprite addresses a grid cell, so both positions must fall inside
/// the sheet's column/row counts.
pub fn coordinates_in_bounds(sheet: &SpriteSheet, coords: &SpriteCoordinates) -> bool {
    (0..i64::from(sheet.columns)).contains(&coords.x_pos)
        && (0..i64::from(sheet.rows)).contains(&coords.y_pos)
}

/// Every slice edge must be a sane percentage and the rectangle must fit
/// inside the image. The range checks also reject NaN.
pub fn percentages_in_bounds(slice: &SlicePercentages) -> bool {
    let percent = 0.0..=100.0;
    percent.contains(&slice.x_percent)
        && percent.contains(&slice.y_percent)
        && percent.contains(&slice.width_percent)
        && percent.contains(&slice.height_percent)
        && slice.x_percent + slice.width_percent <= 100.0
        && slice.y_percent + slice.height_percent <= 100.0
}

pub fn values_in_bounds(sheet: &SpriteSheet, values: &SpriteValues) -> bool {
    match values {
        SpriteValues::Sprite(coords) => coordinates_in_bounds(sheet, coords),
        SpriteValues::Slice(slice) => percentages_in_bounds(slice),
    }
}
