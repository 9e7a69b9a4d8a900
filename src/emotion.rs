use serde::Deserialize;
use std::cmp::Ordering;

/// One (label, confidence) pair as returned by the detection service.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct EmotionResult {
    pub label: String,
    /// Score in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub percentage: Option<String>,
}

impl EmotionResult {
    #[cfg(test)]
    pub fn new(label: &str, confidence: f64, percentage: &str) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            percentage: Some(percentage.to_string()),
        }
    }

    /// Percentage text as sent by the server, or derived from the confidence.
    pub fn percentage_text(&self) -> String {
        match &self.percentage {
            Some(text) => text.clone(),
            None => format!("{:.2}%", self.confidence * 100.0),
        }
    }

    /// CSS width of the confidence bar, e.g. `"82%"`.
    pub fn fill_width(&self) -> String {
        let pct = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0) * 100.0
        } else {
            0.0
        };
        format!("{}%", round_for_css(pct))
    }

    pub fn display_name(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn icon_class(&self) -> String {
        format!("emotion-icon emotion-{}", self.label)
    }
}

// 0.82 * 100.0 is 82.00000000000001; keep the style attribute readable.
fn round_for_css(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Results sorted by descending confidence. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedEmotions {
    entries: Vec<EmotionResult>,
}

impl RankedEmotions {
    /// Highest-confidence entry.
    pub fn primary(&self) -> &EmotionResult {
        &self.entries[0]
    }

    /// Every entry in display order, the primary included.
    pub fn bars(&self) -> &[EmotionResult] {
        &self.entries
    }
}

/// Ranks a detection result list. Returns `None` when there is nothing to show.
///
/// The sort is stable, so entries with equal confidence keep the order the
/// server sent them in. NaN confidences sink to the bottom.
pub fn rank(results: Option<Vec<EmotionResult>>) -> Option<RankedEmotions> {
    let mut entries = results.filter(|r| !r.is_empty())?;
    entries.sort_by(|a, b| compare_desc(a.confidence, b.confidence));
    Some(RankedEmotions { entries })
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
