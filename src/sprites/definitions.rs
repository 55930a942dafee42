// src/sprites/definitions.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid defaults for a sheet that has never been saved with explicit
/// dimensions.
pub const DEFAULT_COLUMNS: u32 = 1;
pub const DEFAULT_ROWS: u32 = 1;
pub const DEFAULT_INSET: u32 = 0;

/// Region kind, stored in the `type` column and carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
    Sprite,
    Slice,
}

impl SpriteKind {
    /// Parses the wire/storage string. Anything but the two known kinds
    /// is rejected; new kinds are a schema change, not data.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sprite" => Some(SpriteKind::Sprite),
            "slice" => Some(SpriteKind::Slice),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpriteKind::Sprite => "sprite",
            SpriteKind::Slice => "slice",
        }
    }
}

impl fmt::Display for SpriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid geometry of a sheet: column/row counts plus the pixel inset
/// around each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDimensions {
    pub columns: u32,
    pub rows: u32,
    pub inset: u32,
}

impl SheetDimensions {
    /// Normalizes raw form input into usable geometry: magnitudes only,
    /// and at least one column and row so the grid can hold a sprite.
    pub fn sanitize(columns: i64, rows: i64, inset: i64) -> Self {
        Self {
            columns: clamp_magnitude(columns).max(1),
            rows: clamp_magnitude(rows).max(1),
            inset: clamp_magnitude(inset),
        }
    }
}

impl Default for SheetDimensions {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            inset: DEFAULT_INSET,
        }
    }
}

fn clamp_magnitude(raw: i64) -> u32 {
    raw.unsigned_abs().min(u64::from(u32::MAX)) as u32
}

/// One sprite sheet: a wiki page's image divided into a fixed grid.
/// `id` is 0 until the sheet has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub id: i64,
    pub page_title: String,
    pub columns: u32,
    pub rows: u32,
    pub inset: u32,
}

impl SpriteSheet {
    /// A fresh, unsaved sheet for the given page with default geometry.
    pub fn new(page_title: impl Into<String>) -> Self {
        let dims = SheetDimensions::default();
        Self {
            id: 0,
            page_title: page_title.into(),
            columns: dims.columns,
            rows: dims.rows,
            inset: dims.inset,
        }
    }

    pub fn exists(&self) -> bool {
        self.id > 0
    }

    pub fn set_dimensions(&mut self, dims: SheetDimensions) {
        self.columns = dims.columns;
        self.rows = dims.rows;
        self.inset = dims.inset;
    }
}

/// Grid cell position of a sprite. Cells are addressed from the top-left
/// corner, so valid positions are 0..columns and 0..rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteCoordinates {
    pub x_pos: i64,
    pub y_pos: i64,
}

/// Free rectangle over the source image, each edge expressed as a
/// percentage of the image dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlicePercentages {
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
}

/// Region payload. The kind string selects the variant before the JSON
/// payload is decoded, so a sprite payload can never masquerade as a
/// slice or vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteValues {
    Sprite(SpriteCoordinates),
    Slice(SlicePercentages),
}

impl SpriteValues {
    pub fn kind(&self) -> SpriteKind {
        match self {
            SpriteValues::Sprite(_) => SpriteKind::Sprite,
            SpriteValues::Slice(_) => SpriteKind::Slice,
        }
    }

    /// Decodes a wire payload for the given kind. Missing fields and
    /// mistyped numbers fail the decode rather than defaulting.
    pub fn from_wire(kind: SpriteKind, raw: &serde_json::Value) -> Option<Self> {
        // The derived deserializers also accept positional sequences;
        // payloads must be objects keyed by field name.
        if !raw.is_object() {
            return None;
        }
        match kind {
            SpriteKind::Sprite => serde_json::from_value(raw.clone())
                .ok()
                .map(SpriteValues::Sprite),
            SpriteKind::Slice => serde_json::from_value(raw.clone())
                .ok()
                .map(SpriteValues::Slice),
        }
    }

    /// Decodes the JSON text stored in the `vals` column.
    pub fn from_stored(kind: SpriteKind, raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        Self::from_wire(kind, &value)
    }

    /// Serializes the payload for storage or the wire. Serializing these
    /// plain numeric structs cannot fail.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            SpriteValues::Sprite(c) => serde_json::to_value(c).unwrap_or(serde_json::Value::Null),
            SpriteValues::Slice(p) => serde_json::to_value(p).unwrap_or(serde_json::Value::Null),
        }
    }
}

/// One named region of a sheet. `id` is 0 until persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteName {
    pub id: i64,
    pub spritesheet_id: i64,
    pub name: String,
    pub values: SpriteValues,
}

impl SpriteName {
    pub fn kind(&self) -> SpriteKind {
        self.values.kind()
    }

    /// The wikitext tag that embeds this region on a page.
    pub fn parser_tag(&self, page_title: &str) -> String {
        format!("{{{{#{}:{}|{}}}}}", self.kind(), page_title, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parse_accepts_only_known_strings() {
        assert_eq!(SpriteKind::parse("sprite"), Some(SpriteKind::Sprite));
        assert_eq!(SpriteKind::parse("slice"), Some(SpriteKind::Slice));
        assert_eq!(SpriteKind::parse("Sprite"), None);
        assert_eq!(SpriteKind::parse("polygon"), None);
        assert_eq!(SpriteKind::parse(""), None);
    }

    #[test]
    fn dimensions_sanitize_uses_magnitudes_with_grid_floor() {
        let dims = SheetDimensions::sanitize(-4, 0, -5);
        assert_eq!(dims.columns, 4);
        assert_eq!(dims.rows, 1);
        assert_eq!(dims.inset, 5);

        let dims = SheetDimensions::sanitize(0, 0, 0);
        assert_eq!(dims.columns, 1);
        assert_eq!(dims.rows, 1);
        assert_eq!(dims.inset, 0);

        let dims = SheetDimensions::sanitize(i64::MIN, 7, 2);
        assert_eq!(dims.columns, u32::MAX);
        assert_eq!(dims.rows, 7);
        assert_eq!(dims.inset, 2);
    }

    #[test]
    fn sprite_payload_decodes_strictly() {
        let good = json!({"xPos": 3, "yPos": 0});
        assert_eq!(
            SpriteValues::from_wire(SpriteKind::Sprite, &good),
            Some(SpriteValues::Sprite(SpriteCoordinates { x_pos: 3, y_pos: 0 }))
        );

        // Missing field
        assert_eq!(
            SpriteValues::from_wire(SpriteKind::Sprite, &json!({"xPos": 3})),
            None
        );
        // Wrong field types
        assert_eq!(
            SpriteValues::from_wire(SpriteKind::Sprite, &json!({"xPos": "3", "yPos": 0})),
            None
        );
        assert_eq!(
            SpriteValues::from_wire(SpriteKind::Sprite, &json!({"xPos": 1.5, "yPos": 0})),
            None
        );
        // Not an object at all
        assert_eq!(SpriteValues::from_wire(SpriteKind::Sprite, &json!([1, 2])), None);
    }

    #[test]
    fn slice_payload_accepts_integer_and_float_percentages() {
        let raw = json!({
            "xPercent": 10,
            "yPercent": 12.5,
            "widthPercent": 40,
            "heightPercent": 20
        });
        let values = SpriteValues::from_wire(SpriteKind::Slice, &raw).unwrap();
        match values {
            SpriteValues::Slice(p) => {
                assert_eq!(p.x_percent, 10.0);
                assert_eq!(p.y_percent, 12.5);
            }
            other => panic!("expected slice payload, got {:?}", other),
        }
    }

    #[test]
    fn kind_selects_the_payload_shape() {
        let sprite_shaped = json!({"xPos": 1, "yPos": 1});
        assert_eq!(SpriteValues::from_wire(SpriteKind::Slice, &sprite_shaped), None);
    }

    #[test]
    fn positional_arrays_do_not_decode_as_payloads() {
        // serde would happily fill the structs from these by position
        assert_eq!(
            SpriteValues::from_wire(SpriteKind::Slice, &json!([10.0, 12.5, 40.0, 20.0])),
            None
        );
        assert_eq!(SpriteValues::from_wire(SpriteKind::Sprite, &json!([3, 0])), None);
        assert_eq!(SpriteValues::from_wire(SpriteKind::Sprite, &json!(null)), None);
    }

    #[test]
    fn stored_payload_round_trip() {
        let values = SpriteValues::Slice(SlicePercentages {
            x_percent: 5.0,
            y_percent: 10.0,
            width_percent: 50.0,
            height_percent: 25.0,
        });
        let stored = values.to_wire().to_string();
        assert_eq!(SpriteValues::from_stored(SpriteKind::Slice, &stored), Some(values));
        assert_eq!(SpriteValues::from_stored(SpriteKind::Slice, "not json"), None);
    }

    #[test]
    fn parser_tag_embeds_kind_title_and_name() {
        let name = SpriteName {
            id: 7,
            spritesheet_id: 1,
            name: "coin".to_string(),
            values: SpriteValues::Sprite(SpriteCoordinates { x_pos: 0, y_pos: 0 }),
        };
        assert_eq!(name.parser_tag("Item_icons.png"), "{{#sprite:Item_icons.png|coin}}");

        let slice = SpriteName {
            id: 8,
            spritesheet_id: 1,
            name: "header".to_string(),
            values: SpriteValues::Slice(SlicePercentages {
                x_percent: 0.0,
                y_percent: 0.0,
                width_percent: 100.0,
                height_percent: 10.0,
            }),
        };
        assert_eq!(slice.parser_tag("Banner.png"), "{{#slice:Banner.png|header}}");
    }
}
