//! Blood-pressure category classifier.
//!
//! Thresholds are checked from most to least severe, so whichever of the two
//! values is worse decides the category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Systolic above this is a hypertensive crisis.
pub const CRISIS_SYSTOLIC: u32 = 180;
/// Diastolic above this is a hypertensive crisis.
pub const CRISIS_DIASTOLIC: u32 = 120;
/// Systolic at or above this is stage 2 hypertension.
pub const STAGE2_SYSTOLIC: u32 = 140;
/// Diastolic at or above this is stage 2 hypertension.
pub const STAGE2_DIASTOLIC: u32 = 90;
/// Systolic at or above this is stage 1 hypertension.
pub const STAGE1_SYSTOLIC: u32 = 130;
/// Diastolic at or above this is stage 1 hypertension.
pub const STAGE1_DIASTOLIC: u32 = 80;
/// Systolic at or above this is elevated.
pub const ELEVATED_SYSTOLIC: u32 = 120;

/// Clinical severity of a blood-pressure value, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BpCategory {
    Normal,
    Elevated,
    #[serde(rename = "High BP Stage 1")]
    HighStage1,
    #[serde(rename = "High BP Stage 2")]
    HighStage2,
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
}

impl BpCategory {
    /// All categories, least severe first.
    pub const ALL: [BpCategory; 5] = [
        BpCategory::Normal,
        BpCategory::Elevated,
        BpCategory::HighStage1,
        BpCategory::HighStage2,
        BpCategory::HypertensiveCrisis,
    ];

    /// Display label used by the UI and in exports.
    pub fn label(&self) -> &'static str {
        match self {
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::HighStage1 => "High BP Stage 1",
            BpCategory::HighStage2 => "High BP Stage 2",
            BpCategory::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }

    /// Severity rank, 0 for Normal up to 4 for a crisis.
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    /// Whether this category is in the hypertensive range (stage 2 or worse).
    pub fn is_hypertensive(&self) -> bool {
        *self >= BpCategory::HighStage2
    }

    /// Advice text shown alongside a summary in this category.
    pub fn suggestion(&self) -> &'static str {
        match self {
            BpCategory::Normal => {
                "Excellent! Your blood pressure is in the optimal range. Keep up your healthy \
                 lifestyle with regular exercise and balanced diet."
            }
            BpCategory::Elevated => {
                "Your BP is slightly elevated. Consider reducing sodium intake, staying hydrated, \
                 and monitoring more frequently. Lifestyle changes can help bring it to normal."
            }
            BpCategory::HighStage1 => {
                "Your blood pressure is in Stage 1 Hypertension range. It is recommended to consult \
                 your doctor. Consider the DASH diet, regular aerobic exercise, and stress \
                 reduction techniques."
            }
            BpCategory::HighStage2 => {
                "Your blood pressure is in Stage 2 Hypertension range. Please consult your doctor \
                 promptly. Medication may be required alongside lifestyle modifications."
            }
            BpCategory::HypertensiveCrisis => {
                "URGENT: Your blood pressure readings indicate a hypertensive crisis. Seek \
                 immediate medical attention if you experience symptoms like chest pain, \
                 shortness of breath, or severe headache."
            }
        }
    }
}

impl fmt::Display for BpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BpCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BpCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown blood pressure category: {}", s))
    }
}

/// Classify a single reading.
pub fn classify(systolic: u32, diastolic: u32) -> BpCategory {
    if systolic > CRISIS_SYSTOLIC || diastolic > CRISIS_DIASTOLIC {
        BpCategory::HypertensiveCrisis
    } else if systolic >= STAGE2_SYSTOLIC || diastolic >= STAGE2_DIASTOLIC {
        BpCategory::HighStage2
    } else if systolic >= STAGE1_SYSTOLIC || diastolic >= STAGE1_DIASTOLIC {
        BpCategory::HighStage1
    } else if systolic >= ELEVATED_SYSTOLIC {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    }
}

/// Classify averaged (fractional) values with the same thresholds.
pub fn classify_mean(systolic: f64, diastolic: f64) -> BpCategory {
    if systolic > CRISIS_SYSTOLIC as f64 || diastolic > CRISIS_DIASTOLIC as f64 {
        BpCategory::HypertensiveCrisis
    } else if systolic >= STAGE2_SYSTOLIC as f64 || diastolic >= STAGE2_DIASTOLIC as f64 {
        BpCategory::HighStage2
    } else if systolic >= STAGE1_SYSTOLIC as f64 || diastolic >= STAGE1_DIASTOLIC as f64 {
        BpCategory::HighStage1
    } else if systolic >= ELEVATED_SYSTOLIC as f64 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    }
}
