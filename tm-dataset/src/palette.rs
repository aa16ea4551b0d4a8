//! The default colours.

use crate::ConfigError;
use tm_geometry::Colour;

/// An 8-bit RGB colour.
pub type RGBArray = [u8; 3];

pub const METALLIC_RED: RGBArray = [0xff, 0x1a, 0x1a];
pub const METALLIC_GREEN: RGBArray = [0x00, 0xc0, 0x40];
pub const METALLIC_GOLD: RGBArray = [0xff, 0xd7, 0x00];

pub const GOLD_HIGH: RGBArray = [0xff, 0xf5, 0xb6];
pub const GOLD_MID: RGBArray = [0xd4, 0xaf, 0x37];
pub const WARM_WHITE: RGBArray = [0xff, 0xfb, 0xea];

/// The deep green at the core of every foliage particle.
pub const FOLIAGE_BASE: RGBArray = [0x1a, 0x5e, 0x3a];

/// The palette shared by gift boxes and baubles.
pub fn metallic() -> Vec<Colour> {
    [METALLIC_RED, METALLIC_GREEN, METALLIC_GOLD]
        .into_iter()
        .map(Colour::from_rgb8)
        .collect()
}

/// The palette of the tiny star lights.
pub fn lights() -> Vec<Colour> {
    [GOLD_HIGH, WARM_WHITE]
        .into_iter()
        .map(Colour::from_rgb8)
        .collect()
}

/// Parse a palette from `#rrggbb` strings, failing on the first malformed entry or on an empty
/// list.
pub fn from_hex<S: AsRef<str>>(hexes: &[S]) -> Result<Vec<Colour>, ConfigError> {
    if hexes.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }

    hexes
        .iter()
        .map(|hex| Colour::from_hex(hex.as_ref()).map_err(ConfigError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_geometry::ParseColourError;

    #[test]
    fn from_hex_test() {
        assert_eq!(
            from_hex(&["#ff1a1a", "#00c040", "#ffd700"]).unwrap(),
            metallic()
        );
        assert_eq!(from_hex::<&str>(&[]), Err(ConfigError::EmptyPalette));
        assert_eq!(
            from_hex(&["#fff5b6", "gold"]),
            Err(ConfigError::MalformedColour(ParseColourError(
                "gold".to_string()
            )))
        );
    }
}
