use serde::{Deserialize, Serialize};

/// Coarse risk classification derived from a raw verification score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    HighRisk,
    Warning,
    Normal,
    Trusted,
    LowRisk,
    Unclassified,
}

/// Presentation urgency; the presentation layer picks the actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorClass {
    Danger,
    Caution,
    Neutral,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    ShieldAlert,
    AlertTriangle,
    ThumbsUp,
    BadgeCheck,
}

impl Icon {
    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::ShieldAlert => "⛔",
            Icon::AlertTriangle => "⚠",
            Icon::ThumbsUp => "👍",
            Icon::BadgeCheck => "✓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub color: ColorClass,
    pub verified_percent: u8,
    pub icon: Icon,
}

impl Tier {
    /// Exact match against the known tags; anything else is unclassified.
    pub fn from_score(score: &str) -> Self {
        match score {
            "HIGH_RISK" => Tier::HighRisk,
            "WARNING" => Tier::Warning,
            "NORMAL" => Tier::Normal,
            "TRUSTED" => Tier::Trusted,
            "LOW_RISK" => Tier::LowRisk,
            _ => Tier::Unclassified,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Tier::HighRisk => "HIGH_RISK",
            Tier::Warning => "WARNING",
            Tier::Normal => "NORMAL",
            Tier::Trusted => "TRUSTED",
            Tier::LowRisk => "LOW_RISK",
            Tier::Unclassified => "UNCLASSIFIED",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_tag())
    }

    pub fn verified_percent(&self) -> u8 {
        match self {
            Tier::Trusted | Tier::LowRisk => 100,
            Tier::Normal => 70,
            Tier::HighRisk | Tier::Warning | Tier::Unclassified => 0,
        }
    }

    pub fn color(&self) -> ColorClass {
        match self {
            Tier::HighRisk => ColorClass::Danger,
            Tier::Warning | Tier::Unclassified => ColorClass::Caution,
            Tier::Normal => ColorClass::Neutral,
            Tier::Trusted | Tier::LowRisk => ColorClass::Safe,
        }
    }

    pub fn icon(&self) -> Icon {
        match self {
            Tier::HighRisk => Icon::ShieldAlert,
            Tier::Warning | Tier::Unclassified => Icon::AlertTriangle,
            Tier::Normal => Icon::ThumbsUp,
            Tier::Trusted | Tier::LowRisk => Icon::BadgeCheck,
        }
    }

    /// TRUSTED and LOW_RISK share the trusted bucket in batch statistics.
    pub fn is_trusted(&self) -> bool {
        matches!(self, Tier::Trusted | Tier::LowRisk)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// Map a raw score tag to its tier and display semantics. Never fails.
pub fn classify(score: &str) -> Classification {
    let tier = Tier::from_score(score);
    Classification {
        tier,
        color: tier.color(),
        verified_percent: tier.verified_percent(),
        icon: tier.icon(),
    }
}

impl Classification {
    pub fn label(&self) -> String {
        self.tier.label()
    }
}

/// `HIGH_RISK` -> `High Risk`. Underscores become spaces and every word is
/// capitalized with the rest lower-cased, so applying it twice is a no-op.
/// A word's first letter contributes one upper-case char; the rest of a
/// multi-char expansion (`ß` -> `SS`) is lower-cased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;

    for ch in text.chars() {
        if ch == '_' || ch.is_whitespace() {
            out.push(if ch == '_' { ' ' } else { ch });
            word_start = true;
        } else if word_start {
            let mut upper = ch.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
            word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_scores() {
        assert_eq!(classify("HIGH_RISK").tier, Tier::HighRisk);
        assert_eq!(classify("WARNING").tier, Tier::Warning);
        assert_eq!(classify("NORMAL").tier, Tier::Normal);
        assert_eq!(classify("TRUSTED").tier, Tier::Trusted);
        assert_eq!(classify("LOW_RISK").tier, Tier::LowRisk);
    }

    #[test]
    fn test_unknown_scores_are_unclassified() {
        for score in ["", "HIGH RISK", "high_risk", "SUSPICIOUS", "null", " NORMAL"] {
            let c = classify(score);
            assert_eq!(c.tier, Tier::Unclassified, "score {:?}", score);
            assert_eq!(c.color, ColorClass::Caution);
            assert_eq!(c.verified_percent, 0);
        }
    }

    #[test]
    fn test_verified_percent() {
        assert_eq!(classify("TRUSTED").verified_percent, 100);
        assert_eq!(classify("LOW_RISK").verified_percent, 100);
        assert_eq!(classify("NORMAL").verified_percent, 70);
        assert_eq!(classify("WARNING").verified_percent, 0);
        assert_eq!(classify("HIGH_RISK").verified_percent, 0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("HIGH_RISK"), "High Risk");
        assert_eq!(title_case("document_tampering"), "Document Tampering");
        assert_eq!(title_case("WARNING"), "Warning");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("_"), " ");
    }

    #[test]
    fn test_title_case_idempotent() {
        for s in ["HIGH_RISK", "low_risk", "a__b", "_leading", "trailing_", "x", "already Title"] {
            let once = title_case(s);
            assert_eq!(title_case(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_title_case_multi_char_uppercase() {
        assert_eq!(title_case("ß_x"), "Ss X");
        assert_eq!(title_case("STRASSE_straße"), "Strasse Straße");
        for s in ["ß_x", "ßeta", "ŉ_tag", "ﬁle_check"] {
            let once = title_case(s);
            assert_eq!(title_case(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_tier_label() {
        assert_eq!(Tier::LowRisk.label(), "Low Risk");
        assert_eq!(classify("???").label(), "Unclassified");
    }
}
