//! Named band sizes and sampling densities.

use crate::error::SettingsError;
use std::fmt;
use std::str::FromStr;

/// Wrist size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizePreset {
    ExtraSmall,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl SizePreset {
    pub const ALL: [SizePreset; 5] = [
        Self::ExtraSmall,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::ExtraLarge,
    ];

    /// Inner circumference in mm
    pub fn circumference(self) -> f64 {
        match self {
            Self::ExtraSmall => 140.0,
            Self::Small => 150.0,
            Self::Medium => 160.0,
            Self::Large => 170.0,
            Self::ExtraLarge => 180.0,
        }
    }

    fn code(self) -> &'static str {
        match self {
            Self::ExtraSmall => "XS",
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
        }
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.0}mm)", self.code(), self.circumference())
    }
}

impl FromStr for SizePreset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SettingsError::UnknownPreset {
                kind: "size",
                value: s.to_string(),
            })
    }
}

/// Sampling density preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    Fast,
    #[default]
    Standard,
    High,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 3] = [Self::Fast, Self::Standard, Self::High];

    /// Spiral samples per band
    pub fn num_points(self) -> usize {
        match self {
            Self::Fast => 50_000,
            Self::Standard => 100_000,
            Self::High => 150_000,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Standard => "Standard",
            Self::High => "High",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}k points)", self.name(), self.num_points() / 1000)
    }
}

impl FromStr for QualityPreset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SettingsError::UnknownPreset {
                kind: "quality",
                value: s.to_string(),
            })
    }
}
