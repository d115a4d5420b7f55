use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// Value recorded when no rule could produce a number.
pub const SENTINEL: f64 = -999.0;

const NAME_MARKER: &str = "Device: ";
const VALUE_MARKER: &str = " to ";
const SET_SUFFIX: &str = " Set";

// Stripped from value text in this order.
const VALUE_NOISE: [&str; 6] = ["(F)", "Dim", "%", "(", ")", "Operating State"];

// Newer HS3 releases wrap names and values in font colour tags.
static FONT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\s*font\s*color\s*=\s*["']?#[0-9a-f]{6}["']?\s*>"#).unwrap()
});
static FONT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<\s*/\s*font\s*>").unwrap());

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Contains(&'static str),
    // Substring match after every occurrence of the mask is removed.
    ContainsOutside(&'static str, &'static str),
}

impl Pattern {
    fn matches(self, upper: &str) -> bool {
        match self {
            Pattern::Contains(needle) => upper.contains(needle),
            Pattern::ContainsOutside(needle, mask) => upper.replace(mask, " ").contains(needle),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Pattern::Contains(s) | Pattern::ContainsOutside(s, _) => s,
        }
    }
}

/// Keyword table, first match wins. Order is load-bearing: motion sensors
/// report both "No Motion" and "Motion", locks both "Unlocked" and "Locked".
/// "ON" ignores the letters inside "MOTION" so motion reports reach their rules.
const KEYWORD_RULES: [(Pattern, f64); 7] = [
    (Pattern::Contains("OFF"), 0.0),
    (Pattern::ContainsOutside("ON", "MOTION"), 1.0),
    (Pattern::Contains("NO MOTION"), 0.0),
    (Pattern::Contains("MOTION"), 0.0),
    (Pattern::Contains("UNLOCKED"), 1.0),
    (Pattern::Contains("LOCKED"), 0.0),
    (Pattern::Contains("HEAT"), 1.0),
];

/// Which step of the coercion cascade produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Numeric,
    Keyword(&'static str),
    Token,
    Sentinel,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Numeric => f.write_str("numeric"),
            Rule::Keyword(k) => write!(f, "keyword:{}", k),
            Rule::Token => f.write_str("token"),
            Rule::Sentinel => f.write_str("sentinel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub device: String,
    pub cleaned: String,
    pub value: f64,
    pub rule: Rule,
}

impl Normalized {
    pub fn is_sentinel(&self) -> bool {
        self.rule == Rule::Sentinel
    }
}

pub fn normalize(raw: &str) -> Normalized {
    let device = device_name(raw);
    let cleaned = value_text(raw);
    let (value, rule) = coerce(&cleaned);
    if rule == Rule::Sentinel {
        warn!(
            device = %device,
            raw = %raw,
            cleaned = %cleaned,
            value,
            "could not derive a value"
        );
    }
    Normalized {
        device,
        cleaned,
        value,
        rule,
    }
}

/// `Device: Porch Light Set to On` -> `PorchLight`
pub fn device_name(raw: &str) -> String {
    let mut name = match raw.find(NAME_MARKER) {
        Some(i) => &raw[i + NAME_MARKER.len()..],
        None => raw,
    };
    if let Some(i) = name.find(VALUE_MARKER) {
        name = &name[..i];
    }
    let name = name.strip_suffix(SET_SUFFIX).unwrap_or(name);
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    strip_font_tags(&compact)
}

/// `Device: Thermostat to Heat 72(F)` -> `Heat 72`
pub fn value_text(raw: &str) -> String {
    let text = match raw.find(VALUE_MARKER) {
        Some(i) => &raw[i + VALUE_MARKER.len()..],
        None => raw,
    };
    let mut text = strip_font_tags(text);
    for noise in VALUE_NOISE {
        text = text.replace(noise, "");
    }
    text
}

pub fn coerce(cleaned: &str) -> (f64, Rule) {
    if let Ok(v) = cleaned.trim().parse::<f64>() {
        return (v, Rule::Numeric);
    }

    let upper = cleaned.to_uppercase();
    for (pattern, value) in KEYWORD_RULES {
        if pattern.matches(&upper) {
            return (value, Rule::Keyword(pattern.label()));
        }
    }

    if let Some(v) = cleaned
        .split_whitespace()
        .find_map(|tok| tok.parse::<f64>().ok())
    {
        return (v, Rule::Token);
    }

    (SENTINEL, Rule::Sentinel)
}

fn strip_font_tags(s: &str) -> String {
    let s = FONT_OPEN.replace_all(s, "");
    FONT_CLOSE.replace_all(&s, "").into_owned()
}
