//! Shared types used across the pipeline, config, and CLI.
//!
//! [`ProcessingOptions`] is deserialized from the `[defaults]` section of
//! `config.toml`, overridden by CLI flags, and handed to the pipeline as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Icon colour variant. Each variant has a texture asset of the same name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    Red,
    Gold,
    Blue,
    Green,
    Traveller,
    #[value(name = "travellergood")]
    TravellerGood,
    #[value(name = "travellerevil")]
    TravellerEvil,
}

impl ColorOption {
    pub const ALL: [ColorOption; 7] = [
        ColorOption::Red,
        ColorOption::Gold,
        ColorOption::Blue,
        ColorOption::Green,
        ColorOption::Traveller,
        ColorOption::TravellerGood,
        ColorOption::TravellerEvil,
    ];

    /// Identifier used in texture file names, output names, and config.
    pub fn name(self) -> &'static str {
        match self {
            ColorOption::Red => "red",
            ColorOption::Gold => "gold",
            ColorOption::Blue => "blue",
            ColorOption::Green => "green",
            ColorOption::Traveller => "traveller",
            ColorOption::TravellerGood => "travellergood",
            ColorOption::TravellerEvil => "travellerevil",
        }
    }

    /// Human-readable team label.
    pub fn label(self) -> &'static str {
        match self {
            ColorOption::Red => "Evil",
            ColorOption::Gold => "Fabled",
            ColorOption::Blue => "Good",
            ColorOption::Green => "Loric",
            ColorOption::Traveller => "Traveller",
            ColorOption::TravellerGood => "Traveller (Good)",
            ColorOption::TravellerEvil => "Traveller (Evil)",
        }
    }

    /// Solid swatch colour for display. Split traveller variants have none.
    pub fn swatch_hex(self) -> Option<&'static str> {
        match self {
            ColorOption::Red => Some("#8b1011"),
            ColorOption::Gold => Some("#dba318"),
            ColorOption::Blue => Some("#047ab7"),
            ColorOption::Green => Some("#0f7d3e"),
            ColorOption::Traveller => Some("#9b4f9b"),
            ColorOption::TravellerGood | ColorOption::TravellerEvil => None,
        }
    }

    /// Traveller-family variants honour the horizontal adjustment.
    pub fn is_traveller(self) -> bool {
        matches!(
            self,
            ColorOption::Traveller | ColorOption::TravellerGood | ColorOption::TravellerEvil
        )
    }

    /// Name of the texture asset painted into dark areas.
    pub fn texture_name(self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for ColorOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the contrast stage treats the grayscale input.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContrastMode {
    /// Input is already line art; never enhance.
    BlackWhite,
    /// Input is continuous tone; always enhance.
    Greyscale,
    /// Enhance only when the image is not classified as two-tone.
    #[default]
    Auto,
}

impl fmt::Display for ContrastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContrastMode::BlackWhite => "black-white",
            ContrastMode::Greyscale => "greyscale",
            ContrastMode::Auto => "auto",
        })
    }
}

/// Inclusive range for [`ProcessingOptions::border_size`].
pub const BORDER_SIZE_RANGE: (u32, u32) = (0, 20);
/// Inclusive range for [`ProcessingOptions::output_size`].
pub const OUTPUT_SIZE_RANGE: (u32, u32) = (100, 4000);
/// Inclusive range for [`ProcessingOptions::horizontal_adjustment`].
pub const HORIZONTAL_ADJUSTMENT_RANGE: (i32, i32) = (-160, 160);

/// Everything the pipeline needs to know about one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingOptions {
    pub variant: ColorOption,
    /// Whether the white border is drawn at all.
    pub border: bool,
    /// Border width in pixels, used only when `border` is set.
    pub border_size: u32,
    pub invert: bool,
    pub crop: bool,
    /// Blend textures by intensity instead of thresholding at 128.
    pub smooth_blend: bool,
    pub contrast: ContrastMode,
    pub remove_background: bool,
    /// Aspect-aware transparent margin around the final icon.
    pub padding: bool,
    /// Square working size; the input's larger side when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<u32>,
    pub drop_shadow: bool,
    /// Signed pixels of horizontal padding, traveller variants only.
    pub horizontal_adjustment: i32,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            variant: ColorOption::Red,
            border: false,
            border_size: 2,
            invert: false,
            crop: true,
            smooth_blend: true,
            contrast: ContrastMode::Auto,
            remove_background: false,
            padding: false,
            output_size: None,
            drop_shadow: false,
            horizontal_adjustment: 0,
        }
    }
}

impl ProcessingOptions {
    /// Border width actually drawn: zero unless the border is enabled.
    pub fn effective_border(&self) -> u32 {
        if self.border { self.border_size } else { 0 }
    }

    /// Horizontal padding actually applied: zero for non-traveller variants.
    pub fn effective_horizontal_adjustment(&self) -> i32 {
        if self.variant.is_traveller() {
            self.horizontal_adjustment
        } else {
            0
        }
    }

    /// Check every numeric option against its allowed range.
    pub fn check_ranges(&self) -> Result<(), String> {
        let (lo, hi) = BORDER_SIZE_RANGE;
        if !(lo..=hi).contains(&self.border_size) {
            return Err(format!("border_size must be {lo}-{hi}"));
        }
        if let Some(size) = self.output_size {
            let (lo, hi) = OUTPUT_SIZE_RANGE;
            if !(lo..=hi).contains(&size) {
                return Err(format!("output_size must be {lo}-{hi}"));
            }
        }
        let (lo, hi) = HORIZONTAL_ADJUSTMENT_RANGE;
        if !(lo..=hi).contains(&self.horizontal_adjustment) {
            return Err(format!("horizontal_adjustment must be {lo}-{hi}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_swatches() {
        assert_eq!(ColorOption::Red.label(), "Evil");
        assert_eq!(ColorOption::Blue.label(), "Good");
        assert_eq!(ColorOption::Gold.label(), "Fabled");
        assert_eq!(ColorOption::Green.label(), "Loric");
        assert_eq!(ColorOption::TravellerEvil.label(), "Traveller (Evil)");
        assert_eq!(ColorOption::Red.swatch_hex(), Some("#8b1011"));
        assert_eq!(ColorOption::Traveller.swatch_hex(), Some("#9b4f9b"));
        assert_eq!(ColorOption::TravellerGood.swatch_hex(), None);
    }

    #[test]
    fn traveller_family() {
        let travellers: Vec<_> = ColorOption::ALL
            .into_iter()
            .filter(|c| c.is_traveller())
            .collect();
        assert_eq!(
            travellers,
            vec![
                ColorOption::Traveller,
                ColorOption::TravellerGood,
                ColorOption::TravellerEvil
            ]
        );
    }

    #[test]
    fn serde_names_match_texture_names() {
        for color in ColorOption::ALL {
            let json = serde_json::to_string(&color).unwrap();
            assert_eq!(json, format!("\"{}\"", color.texture_name()));
        }
        let mode: ContrastMode = serde_json::from_str("\"black-white\"").unwrap();
        assert_eq!(mode, ContrastMode::BlackWhite);
    }

    #[test]
    fn clap_names_match_serde_names() {
        use clap::ValueEnum;
        for color in ColorOption::ALL {
            let pv = color.to_possible_value().unwrap();
            assert_eq!(pv.get_name(), color.name());
        }
        assert_eq!(
            ContrastMode::BlackWhite.to_possible_value().unwrap().get_name(),
            "black-white"
        );
    }

    #[test]
    fn default_options() {
        let opts = ProcessingOptions::default();
        assert_eq!(opts.variant, ColorOption::Red);
        assert!(!opts.border);
        assert_eq!(opts.border_size, 2);
        assert!(opts.crop);
        assert!(opts.smooth_blend);
        assert_eq!(opts.contrast, ContrastMode::Auto);
        assert_eq!(opts.output_size, None);
        assert_eq!(opts.effective_border(), 0);
    }

    #[test]
    fn effective_border_requires_enable() {
        let opts = ProcessingOptions {
            border: true,
            border_size: 5,
            ..Default::default()
        };
        assert_eq!(opts.effective_border(), 5);
    }

    #[test]
    fn horizontal_adjustment_ignored_for_non_traveller() {
        let mut opts = ProcessingOptions {
            horizontal_adjustment: -40,
            ..Default::default()
        };
        assert_eq!(opts.effective_horizontal_adjustment(), 0);
        opts.variant = ColorOption::TravellerGood;
        assert_eq!(opts.effective_horizontal_adjustment(), -40);
    }

    #[test]
    fn ranges_checked() {
        assert!(ProcessingOptions::default().check_ranges().is_ok());
        let bad = ProcessingOptions {
            border_size: 21,
            ..Default::default()
        };
        assert!(bad.check_ranges().unwrap_err().contains("border_size"));
        let bad = ProcessingOptions {
            output_size: Some(99),
            ..Default::default()
        };
        assert!(bad.check_ranges().is_err());
        let ok = ProcessingOptions {
            output_size: Some(4000),
            horizontal_adjustment: -160,
            ..Default::default()
        };
        assert!(ok.check_ranges().is_ok());
        let bad = ProcessingOptions {
            horizontal_adjustment: 161,
            ..Default::default()
        };
        assert!(bad.check_ranges().is_err());
    }
}
