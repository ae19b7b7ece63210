//! Curve colors, looked up directly by process ID.

use crate::error::PlotError;
use plotters::style::RGBColor;

/// Tokens used when no palette is given on the command line
pub const DEFAULT_TOKENS: [&str; 16] = [
    "b", "g", "r", "c", "m", "y", "k", "pink", "indigo", "navy", "purple", "silver", "darkgreen",
    "gold", "orange", "gray",
];

/// `DEFAULT_TOKENS` resolved, in the same order
pub const DEFAULT_COLORS: [RGBColor; 16] = [
    RGBColor(0, 0, 255),
    RGBColor(0, 128, 0),
    RGBColor(255, 0, 0),
    RGBColor(0, 191, 191),
    RGBColor(191, 0, 191),
    RGBColor(191, 191, 0),
    RGBColor(0, 0, 0),
    RGBColor(255, 192, 203),
    RGBColor(75, 0, 130),
    RGBColor(0, 0, 128),
    RGBColor(128, 0, 128),
    RGBColor(192, 192, 192),
    RGBColor(0, 100, 0),
    RGBColor(255, 215, 0),
    RGBColor(255, 165, 0),
    RGBColor(128, 128, 128),
];

/// Resolve a color token: a short or named color, or `#rrggbb`
pub fn resolve_token(token: &str) -> Result<RGBColor, PlotError> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| PlotError::UnknownColor(token.to_string()));
    }

    let rgb = match token.to_ascii_lowercase().as_str() {
        "b" | "blue" => (0, 0, 255),
        "g" | "green" => (0, 128, 0),
        "r" | "red" => (255, 0, 0),
        "c" => (0, 191, 191),
        "cyan" => (0, 255, 255),
        "m" => (191, 0, 191),
        "magenta" => (255, 0, 255),
        "y" => (191, 191, 0),
        "yellow" => (255, 255, 0),
        "k" | "black" => (0, 0, 0),
        "w" | "white" => (255, 255, 255),
        "pink" => (255, 192, 203),
        "indigo" => (75, 0, 130),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "silver" => (192, 192, 192),
        "darkgreen" => (0, 100, 0),
        "gold" => (255, 215, 0),
        "orange" => (255, 165, 0),
        "gray" | "grey" => (128, 128, 128),
        "brown" => (165, 42, 42),
        "olive" => (128, 128, 0),
        "teal" => (0, 128, 128),
        "maroon" => (128, 0, 0),
        "lime" => (0, 255, 0),
        _ => return Err(PlotError::UnknownColor(token.to_string())),
    };
    Ok(RGBColor(rgb.0, rgb.1, rgb.2))
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Ordered, non-empty list of curve colors
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<RGBColor>,
}

impl Palette {
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, PlotError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let colors = tokens
            .into_iter()
            .map(|t| resolve_token(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if colors.is_empty() {
            return Err(PlotError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Color for a process, indexed by the PID value itself
    pub fn color_for(&self, pid: u64) -> Result<RGBColor, PlotError> {
        usize::try_from(pid)
            .ok()
            .and_then(|slot| self.colors.get(slot))
            .copied()
            .ok_or(PlotError::PaletteExhausted {
                pid,
                len: self.colors.len(),
            })
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colors_match_default_tokens() {
        let resolved = Palette::from_tokens(DEFAULT_TOKENS).unwrap();
        assert_eq!(resolved, Palette::default());
        assert_eq!(resolved.len(), 16);
    }

    #[test]
    fn test_default_palette_order() {
        let palette = Palette::default();
        assert_eq!(palette.color_for(0).unwrap(), RGBColor(0, 0, 255));
        assert_eq!(palette.color_for(7).unwrap(), RGBColor(255, 192, 203));
        assert_eq!(palette.color_for(15).unwrap(), RGBColor(128, 128, 128));
    }

    #[test]
    fn test_color_indexed_by_pid() {
        let palette = Palette::from_tokens(["red", "#00ff00", " navy "]).unwrap();
        assert_eq!(palette.color_for(1).unwrap(), RGBColor(0, 255, 0));
        assert_eq!(palette.color_for(2).unwrap(), RGBColor(0, 0, 128));
    }

    #[test]
    fn test_pid_past_palette_is_exhausted() {
        let palette = Palette::default();
        assert_eq!(
            palette.color_for(16),
            Err(PlotError::PaletteExhausted { pid: 16, len: 16 })
        );
        assert_eq!(
            palette.color_for(u64::MAX),
            Err(PlotError::PaletteExhausted { pid: u64::MAX, len: 16 })
        );
    }

    #[test]
    fn test_unknown_token_rejected() {
        assert_eq!(
            Palette::from_tokens(["b", "chartreuse-ish"]),
            Err(PlotError::UnknownColor("chartreuse-ish".to_string()))
        );
        assert!(matches!(
            resolve_token("#12345"),
            Err(PlotError::UnknownColor(_))
        ));
        assert!(matches!(
            resolve_token("#gg0000"),
            Err(PlotError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert_eq!(
            Palette::from_tokens(Vec::<String>::new()),
            Err(PlotError::EmptyPalette)
        );
    }
}
