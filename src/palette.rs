//! Ordered label/color palette used to present ranked segments

use crate::error::{Result, SegmentationError};
use std::fmt;
use std::str::FromStr;

/// Named display colors understood by the palette parser
const NAMED_COLORS: &[(&str, (u8, u8, u8))] = &[
    ("orange", (255, 165, 0)),
    ("red", (255, 0, 0)),
    ("purple", (128, 0, 128)),
    ("blue", (0, 0, 255)),
    ("green", (0, 128, 0)),
    ("yellow", (255, 255, 0)),
    ("magenta", (255, 0, 255)),
    ("cyan", (0, 255, 255)),
    ("brown", (165, 42, 42)),
    ("pink", (255, 192, 203)),
    ("gray", (128, 128, 128)),
    ("black", (0, 0, 0)),
];

/// A display color, kept with the name it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentColor {
    pub name: String,
    pub rgb: (u8, u8, u8),
}

impl FromStr for SegmentColor {
    type Err = SegmentationError;

    /// Accepts a color name (`orange`) or a hex triplet (`#ff8800`)
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();

        if let Some(hex) = name.strip_prefix('#') {
            let channel = |range: std::ops::Range<usize>| {
                hex.get(range)
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            };
            // from_str_radix would also take a leading '+'
            let digits_only = hex.bytes().all(|b| b.is_ascii_hexdigit());
            return match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
                (6, Some(r), Some(g), Some(b)) if digits_only => Ok(Self {
                    name,
                    rgb: (r, g, b),
                }),
                _ => Err(SegmentationError::InvalidPalette(format!(
                    "bad hex color '{s}'"
                ))),
            };
        }

        NAMED_COLORS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|&(_, rgb)| Self {
                name: name.clone(),
                rgb,
            })
            .ok_or_else(|| SegmentationError::InvalidPalette(format!("unknown color '{s}'")))
    }
}

impl fmt::Display for SegmentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    pub label: String,
    pub color: SegmentColor,
}

impl PaletteEntry {
    pub fn new(label: impl Into<String>, color: &str) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            color: color.parse()?,
        })
    }
}

/// Positional palette: entry 0 goes to the smallest segment, entry 1 to the
/// next, and so on. Its length caps how many segments can be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(SegmentationError::InvalidPalette(
                "palette needs at least one entry".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn get(&self, rank: usize) -> Option<&PaletteEntry> {
        self.entries.get(rank)
    }
}

impl Default for Palette {
    /// Customer segments by ascending population
    fn default() -> Self {
        let entry = |label: &str, name: &str, rgb| PaletteEntry {
            label: label.to_string(),
            color: SegmentColor {
                name: name.to_string(),
                rgb,
            },
        };
        Self {
            entries: vec![
                entry("Usual", "orange", (255, 165, 0)),
                entry("Ideal", "red", (255, 0, 0)),
                entry("Common - Older", "purple", (128, 0, 128)),
                entry("Common - Young", "blue", (0, 0, 255)),
            ],
        }
    }
}

impl FromStr for Palette {
    type Err = SegmentationError;

    /// Parse `"Label:color,Label:color,..."`
    fn from_str(s: &str) -> Result<Self> {
        let entries = s
            .split(',')
            .map(|item| {
                let (label, color) = item.rsplit_once(':').ok_or_else(|| {
                    SegmentationError::InvalidPalette(format!(
                        "entry '{}' must look like 'Label:color'",
                        item.trim()
                    ))
                })?;
                let label = label.trim();
                if label.is_empty() {
                    return Err(SegmentationError::InvalidPalette(format!(
                        "entry '{}' has an empty label",
                        item.trim()
                    )));
                }
                PaletteEntry::new(label, color)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.get(0).unwrap().label, "Usual");
        assert_eq!(palette.get(3).unwrap().color.name, "blue");
        assert!(palette.get(4).is_none());

        // Default entries agree with the parser
        for entry in palette.entries() {
            let parsed: SegmentColor = entry.color.name.parse().unwrap();
            assert_eq!(parsed, entry.color);
        }
    }

    #[test]
    fn test_parse_palette() {
        let palette: Palette = "Small:green, Big : #0A0b0C".parse().unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get(0).unwrap().label, "Small");
        assert_eq!(palette.get(0).unwrap().color.rgb, (0, 128, 0));
        assert_eq!(palette.get(1).unwrap().label, "Big");
        assert_eq!(palette.get(1).unwrap().color.rgb, (10, 11, 12));
    }

    #[test]
    fn test_parse_palette_errors() {
        assert!(matches!(
            "Small".parse::<Palette>(),
            Err(SegmentationError::InvalidPalette(_))
        ));
        assert!(matches!(
            "Small:chartreuse".parse::<Palette>(),
            Err(SegmentationError::InvalidPalette(_))
        ));
        assert!(matches!(
            ":red".parse::<Palette>(),
            Err(SegmentationError::InvalidPalette(_))
        ));
        assert!("Small:#12345".parse::<Palette>().is_err());
        assert!(Palette::new(Vec::new()).is_err());
    }

    #[test]
    fn test_hex_color_requires_plain_digits() {
        // each pair is a valid from_str_radix input on its own
        assert!(matches!(
            "#+1+2+3".parse::<SegmentColor>(),
            Err(SegmentationError::InvalidPalette(_))
        ));
        assert!("Small:#+1+2+3".parse::<Palette>().is_err());
        assert!("# 1a2b3".parse::<SegmentColor>().is_err());
        assert_eq!("#A1b2C3".parse::<SegmentColor>().unwrap().rgb, (161, 178, 195));
    }
}
