//! This module provides the [`Colour`] type used for palettes and shader uniforms.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An RGB colour with linear `f32` components.
///
/// Components normally live in `[0, 1]`, but they can be pushed above 1 with
/// [`overdriven`](Colour::overdriven) to make a colour glow under bloom.
///
/// Colours are serialized as `#rrggbb` hex strings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour(Vec3);

/// The error returned when a string isn't a valid `#rrggbb` colour.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("`{0}` is not a colour of the form #rrggbb")]
pub struct ParseColourError(pub String);

impl Colour {
    /// Pure black.
    pub const BLACK: Self = Self(Vec3::ZERO);

    /// Create a colour from its components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    /// Create a colour from 8-bit components.
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255., g as f32 / 255., b as f32 / 255.)
    }

    /// Parse a colour from a `#rrggbb` hex string. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, ParseColourError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let error = || ParseColourError(hex.to_string());

        if digits.len() != 6 || !digits.is_ascii() {
            return Err(error());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| error());
        Ok(Self::from_rgb8([channel(0)?, channel(2)?, channel(4)?]))
    }

    /// Convert this colour to 8-bit components, clamping anything out of range.
    pub fn to_rgb8(self) -> [u8; 3] {
        let [r, g, b] = (self.0.clamp(Vec3::ZERO, Vec3::ONE) * 255.).round().to_array();
        [r as u8, g as u8, b as u8]
    }

    /// This colour multiplied by `intensity`, which may take it out of the `[0, 1]` range.
    pub fn overdriven(self, intensity: f32) -> Self {
        Self(self.0 * intensity)
    }

    /// Linearly interpolate between two colours, like GLSL's `mix()`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self(self.0.lerp(other.0, t))
    }

    /// The components of this colour as a vector.
    pub fn as_vec3(self) -> Vec3 {
        self.0
    }
}

impl From<Vec3> for Colour {
    fn from(v: Vec3) -> Self {
        Self(v)
    }
}

impl FromStr for Colour {
    type Err = ParseColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Colour {
    type Error = ParseColourError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_string()
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}
