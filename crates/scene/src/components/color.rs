/// RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and a handful of CSS names.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return from_hex(hex);
        }
        let named = match value.to_ascii_lowercase().as_str() {
            "white" => Color::WHITE,
            "black" => Color::BLACK,
            "red" => Color::RED,
            "green" => Color::new(0.0, 128.0 / 255.0, 0.0, 1.0),
            "lime" => Color::new(0.0, 1.0, 0.0, 1.0),
            "blue" => Color::new(0.0, 0.0, 1.0, 1.0),
            "yellow" => Color::new(1.0, 1.0, 0.0, 1.0),
            "cyan" | "aqua" => Color::new(0.0, 1.0, 1.0, 1.0),
            "magenta" | "fuchsia" => Color::new(1.0, 0.0, 1.0, 1.0),
            "orange" => Color::new(1.0, 165.0 / 255.0, 0.0, 1.0),
            "gray" | "grey" => Color::new(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0, 1.0),
            _ => return None,
        };
        Some(named)
    }
}

fn from_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let mut out = [0.0f32; 3];
            for (i, c) in hex.chars().enumerate() {
                out[i] = channel(&format!("{c}{c}"))?;
            }
            Some(Color::new(out[0], out[1], out[2], 1.0))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                1.0
            };
            Some(Color::new(r, g, b, a))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_metro_red() {
        assert_eq!(Color::from_css("#FF0000"), Some(Color::RED));
        assert_eq!(Color::from_css("#f00"), Some(Color::RED));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::from_css("White"), Some(Color::WHITE));
        assert_eq!(Color::from_css("not-a-color"), None);
    }

    #[test]
    fn hex_with_alpha() {
        let c = Color::from_css("#ffffff80").expect("color");
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_hex() {
        assert_eq!(Color::from_css("#12"), None);
        assert_eq!(Color::from_css("#gg0000"), None);
    }
}
