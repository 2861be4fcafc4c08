use std::fmt;
use std::str::FromStr;

use crate::components::Color;

/// Scalar that varies linearly with camera distance between two anchors.
///
/// Outside `[near, far]` the value is clamped to the nearest anchor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NearFarScalar {
    pub near: f64,
    pub near_value: f64,
    pub far: f64,
    pub far_value: f64,
}

impl NearFarScalar {
    pub const fn new(near: f64, near_value: f64, far: f64, far_value: f64) -> Self {
        Self {
            near,
            near_value,
            far,
            far_value,
        }
    }

    pub fn evaluate(&self, distance: f64) -> f64 {
        if distance <= self.near {
            return self.near_value;
        }
        if distance >= self.far || self.far <= self.near {
            return self.far_value;
        }
        let t = (distance - self.near) / (self.far - self.near);
        self.near_value + (self.far_value - self.near_value) * t
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleParseError {
    #[error("expected color('<css color>', <alpha>), got {0:?}")]
    Malformed(String),
    #[error("unknown css color {0:?}")]
    UnknownColor(String),
    #[error("alpha must be a number in 0..=1, got {0:?}")]
    InvalidAlpha(String),
}

/// The `color('<css>', <alpha>)` expression of a 3D Tiles style.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorExpression {
    css: String,
    alpha: f32,
    resolved: Color,
}

impl ColorExpression {
    pub fn new(css: &str, alpha: f32) -> Result<Self, StyleParseError> {
        let base = Color::from_css(css).ok_or_else(|| StyleParseError::UnknownColor(css.into()))?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(StyleParseError::InvalidAlpha(alpha.to_string()));
        }
        Ok(Self {
            css: css.to_string(),
            alpha,
            resolved: base.with_alpha(alpha),
        })
    }

    /// `color('white', alpha)`; alpha is clamped to `0..=1`.
    pub fn white(alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            css: "white".to_string(),
            alpha,
            resolved: Color::WHITE.with_alpha(alpha),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn evaluate(&self) -> Color {
        self.resolved
    }
}

impl fmt::Display for ColorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color('{}', {:?})", self.css, self.alpha)
    }
}

impl FromStr for ColorExpression {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || StyleParseError::Malformed(s.to_string());
        let inner = s
            .trim()
            .strip_prefix("color(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let (name, alpha) = match inner.split_once(',') {
            Some((name, alpha)) => (name.trim(), Some(alpha.trim())),
            None => (inner.trim(), None),
        };
        let name = name
            .strip_prefix('\'')
            .and_then(|n| n.strip_suffix('\''))
            .or_else(|| name.strip_prefix('"').and_then(|n| n.strip_suffix('"')))
            .ok_or_else(malformed)?;

        let alpha = match alpha {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| StyleParseError::InvalidAlpha(raw.to_string()))?,
            None => 1.0,
        };
        ColorExpression::new(name, alpha)
    }
}

/// Per-tileset presentation style. Only the color expression is supported.
#[derive(Debug, Clone, PartialEq)]
pub struct TileStyle {
    pub color: ColorExpression,
}

impl TileStyle {
    /// Uniform tint, e.g. `TileStyle::tint("white", 0.1)`.
    pub fn tint(css: &str, alpha: f32) -> Result<Self, StyleParseError> {
        Ok(Self {
            color: ColorExpression::new(css, alpha)?,
        })
    }

    pub fn white_tint(alpha: f32) -> Self {
        Self {
            color: ColorExpression::white(alpha),
        }
    }

    pub fn from_expression(expr: &str) -> Result<Self, StyleParseError> {
        Ok(Self {
            color: expr.parse()?,
        })
    }
}
