//! Microphone level classification for live listening feedback.

/// Upper bound (exclusive) of the high-sensitivity bucket's lower edge, in dB.
const HIGH_FLOOR_DB: f64 = -6.0;
/// Lower edge of the medium-sensitivity bucket, in dB.
const MEDIUM_FLOOR_DB: f64 = -15.0;
/// Lower edge of the low-sensitivity bucket. Anything at or below reads as muted.
const LOW_FLOOR_DB: f64 = -349.0;

/// Discrete microphone sensitivity shown while listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeakCategory {
    /// Strong signal, -6 dB < peak <= 0 dB.
    High,
    /// Moderate signal, -15 dB < peak <= -6 dB.
    Medium,
    /// Weak but present signal, -349 dB < peak <= -15 dB.
    Low,
    /// No usable signal, or a reading outside the expected domain.
    Muted,
}

impl PeakCategory {
    /// Symbolic icon name for this category.
    pub fn icon_name(self) -> &'static str {
        match self {
            PeakCategory::High => "microphone-sensitivity-high-symbolic",
            PeakCategory::Medium => "microphone-sensitivity-medium-symbolic",
            PeakCategory::Low => "microphone-sensitivity-low-symbolic",
            PeakCategory::Muted => "microphone-sensitivity-muted-symbolic",
        }
    }
}

/// What the recording surface shows for one peak reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListeningFeedback {
    /// Sensitivity bucket.
    pub category: PeakCategory,
    /// User-facing title.
    pub label: &'static str,
}

/// Map a decibel reading to listening feedback.
///
/// Total over `f64`: values above 0 dB, at or below -349 dB, and NaN all
/// classify as [`PeakCategory::Muted`].
pub fn classify(peak: f64) -> ListeningFeedback {
    let category = if HIGH_FLOOR_DB < peak && peak <= 0.0 {
        PeakCategory::High
    } else if MEDIUM_FLOOR_DB < peak && peak <= HIGH_FLOOR_DB {
        PeakCategory::Medium
    } else if LOW_FLOOR_DB < peak && peak <= MEDIUM_FLOOR_DB {
        PeakCategory::Low
    } else {
        PeakCategory::Muted
    };

    let label = match category {
        PeakCategory::Muted => "Muted",
        _ => "Listening",
    };

    ListeningFeedback { category, label }
}

/// Peak level of a block of samples in dBFS.
///
/// Returns negative infinity for silence or an empty block.
pub fn peak_db(samples: &[f32]) -> f64 {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |acc, s| acc.max(s.abs()));

    if peak == 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * f64::from(peak).log10()
    }
}
