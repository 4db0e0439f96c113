use serde::Serialize;

pub const NO_TEXT_PLACEHOLDER: &str = "No text recognized";
pub const FAILURE_MESSAGE: &str = "Error: Failed to process handwriting";

/// Three-band coloring of the confidence bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceBand {
    Low,    // < 30%
    Medium, // 30% - 69%
    High,   // >= 70%
}

impl ConfidenceBand {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            0..=29 => Self::Low,
            30..=69 => Self::Medium,
            _ => Self::High,
        }
    }

    /// CSS background color for the bar
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#e74c3c",
            Self::Medium => "#f39c12",
            Self::High => "#2ecc71",
        }
    }
}

/// Everything the confidence meter shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceDisplay {
    pub percentage: u8,
    pub band: ConfidenceBand,
}

impl ConfidenceDisplay {
    pub fn from_confidence(confidence: f64) -> Self {
        let percentage = if confidence.is_finite() {
            (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
        } else {
            0
        };
        Self {
            percentage,
            band: ConfidenceBand::from_percentage(percentage),
        }
    }

    /// Bar width, e.g. `"42%"`
    pub fn width(&self) -> String {
        format!("{}%", self.percentage)
    }

    /// Label text, same as the width
    pub fn label(&self) -> String {
        self.width()
    }

    pub fn color(&self) -> &'static str {
        self.band.color()
    }
}

impl Default for ConfidenceDisplay {
    fn default() -> Self {
        Self::from_confidence(0.0)
    }
}

/// View model for the result area under the pad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPanel {
    pub text: String,
    pub confidence: ConfidenceDisplay,
    pub loading: bool,
    pub recognize_enabled: bool,
}

impl Default for ResultPanel {
    fn default() -> Self {
        Self {
            text: String::new(),
            confidence: ConfidenceDisplay::default(),
            loading: false,
            recognize_enabled: true,
        }
    }
}

impl ResultPanel {
    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = ConfidenceDisplay::from_confidence(confidence);
    }

    pub fn begin_request(&mut self) {
        self.loading = true;
        self.recognize_enabled = false;
        self.text.clear();
    }

    pub fn finish_request(&mut self) {
        self.loading = false;
        self.recognize_enabled = true;
    }

    pub fn show_result(&mut self, text: &str, confidence: f64) {
        self.text = if text.is_empty() {
            NO_TEXT_PLACEHOLDER.to_string()
        } else {
            text.to_string()
        };
        self.set_confidence(confidence);
    }

    pub fn show_failure(&mut self) {
        self.text = FAILURE_MESSAGE.to_string();
        self.set_confidence(0.0);
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.set_confidence(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ConfidenceDisplay::from_confidence(0.0).band, ConfidenceBand::Low);
        assert_eq!(ConfidenceDisplay::from_confidence(0.294).band, ConfidenceBand::Low);
        assert_eq!(ConfidenceDisplay::from_confidence(0.3).band, ConfidenceBand::Medium);
        assert_eq!(ConfidenceDisplay::from_confidence(0.69).band, ConfidenceBand::Medium);
        assert_eq!(ConfidenceDisplay::from_confidence(0.7).band, ConfidenceBand::High);
        assert_eq!(ConfidenceDisplay::from_confidence(1.0).band, ConfidenceBand::High);
    }

    #[test]
    fn test_display_strings() {
        let display = ConfidenceDisplay::from_confidence(0.555);
        assert_eq!(display.percentage, 56);
        assert_eq!(display.width(), "56%");
        assert_eq!(display.label(), "56%");
        assert_eq!(display.color(), "#f39c12");

        assert_eq!(ConfidenceDisplay::from_confidence(f64::NAN).percentage, 0);
        assert_eq!(ConfidenceDisplay::from_confidence(3.0).percentage, 100);
    }

    #[test]
    fn test_panel_lifecycle() {
        let mut panel = ResultPanel::default();
        panel.text = "old".to_string();

        panel.begin_request();
        assert!(panel.loading);
        assert!(!panel.recognize_enabled);
        assert!(panel.text.is_empty());

        panel.show_result("", 0.0);
        assert_eq!(panel.text, NO_TEXT_PLACEHOLDER);

        panel.show_result("hello", 0.55);
        assert_eq!(panel.text, "hello");
        assert_eq!(panel.confidence.percentage, 55);

        panel.finish_request();
        assert!(!panel.loading);
        assert!(panel.recognize_enabled);

        panel.show_failure();
        assert_eq!(panel.text, FAILURE_MESSAGE);
        assert_eq!(panel.confidence.percentage, 0);

        panel.reset();
        assert!(panel.text.is_empty());
        assert_eq!(panel.confidence.color(), "#e74c3c");
    }
}
