//! Category taxonomy: severity and icon lookup
//!
//! Static product configuration for the notification payload, mirroring the
//! side panel's category tables.

use serde::{Deserialize, Serialize};

/// Risk severity attached to a glossary category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Severity for a category; unknown categories default to Low.
pub fn severity_for(category: &str) -> Severity {
    match category {
        "Data & Privacy" => Severity::High,
        "Rights & Obligations" => Severity::High,
        "Payment & Subscription" => Severity::Medium,
        "Legal Risks & Disclaimer" => Severity::Medium,
        "Intellectual Property" => Severity::Medium,
        "User Conduct" => Severity::Low,
        "Miscellaneous" => Severity::Low,
        _ => Severity::Low,
    }
}

/// Icon for a category; unknown categories get the generic clipboard.
pub fn icon_for(category: &str) -> &'static str {
    match category {
        "Data & Privacy" => "\u{1F512}",            // 🔒
        "Rights & Obligations" => "\u{2696}\u{FE0F}", // ⚖️
        "Payment & Subscription" => "\u{1F4B3}",    // 💳
        "Legal Risks & Disclaimer" => "\u{26A0}\u{FE0F}", // ⚠️
        "Intellectual Property" => "\u{1F4DD}",     // 📝
        "User Conduct" => "\u{1F464}",              // 👤
        _ => "\u{1F4CB}",                           // 📋
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert_eq!(severity_for("Data & Privacy"), Severity::High);
        assert_eq!(severity_for("Payment & Subscription"), Severity::Medium);
        assert_eq!(severity_for("User Conduct"), Severity::Low);
        assert_eq!(icon_for("Data & Privacy"), "\u{1F512}");
    }

    #[test]
    fn test_unknown_category_defaults() {
        assert_eq!(severity_for("Made Up"), Severity::Low);
        assert_eq!(icon_for("Made Up"), "\u{1F4CB}");
        assert_eq!(Severity::High.as_str(), "high");
    }
}
