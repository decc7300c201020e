//! Label text formatting strategies.
//!
//! Placement geometry never looks at how label text is produced; callers inject a
//! [`LabelFormatter`] into candidate extraction instead.

use crate::model::BarSegment;
use regex::Regex;
use std::sync::OnceLock;

pub trait LabelFormatter {
    /// Display name for a segment's label.
    fn label_text(&self, segment: &BarSegment) -> String;

    /// Percentage text for a segment occupying `proportion` of the bar.
    fn percent_text(&self, proportion: f64) -> String {
        format_percent(proportion)
    }
}

impl<F> LabelFormatter for F
where
    F: Fn(&BarSegment) -> String,
{
    fn label_text(&self, segment: &BarSegment) -> String {
        self(segment)
    }
}

/// Default formatter for taxon names.
///
/// - strips rank prefixes such as `g__` or `f__`
/// - abbreviates placeholder names (`X_unclassified`, `X_incertae_sedis`, `uncultured_X`)
/// - turns the remaining underscores into spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxonFormatter;

impl LabelFormatter for TaxonFormatter {
    fn label_text(&self, segment: &BarSegment) -> String {
        abbreviate_taxon(&segment.label)
    }
}

fn rank_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[dkpcofgst]__").expect("valid regex"))
}

fn placeholder_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)[_ ](unclassified|unidentified|unknown|incertae[_ ]sedis)$")
            .expect("valid regex")
    })
}

fn uncultured_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^uncultured(?:[_ ](.*))?$").expect("valid regex"))
}

pub fn abbreviate_taxon(name: &str) -> String {
    let name = rank_prefix_re().replace(name.trim(), "");
    let out = if let Some(caps) = placeholder_suffix_re().captures(&name) {
        let suffix = caps[2].to_ascii_lowercase();
        let abbrev = if suffix.starts_with("incertae") {
            "i.s."
        } else {
            "uncl."
        };
        format!("{} {abbrev}", &caps[1])
    } else if let Some(caps) = uncultured_re().captures(&name) {
        match caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            Some(rest) => format!("uncult. {rest}"),
            None => "uncult.".to_string(),
        }
    } else {
        name.into_owned()
    };
    out.replace('_', " ")
}

/// Formats a bar share as a percentage with one decimal.
pub fn format_percent(proportion: f64) -> String {
    let pct = proportion * 100.0;
    if !pct.is_finite() || pct <= 0.0 {
        return "0%".to_string();
    }
    if pct < 0.05 {
        return "<0.1%".to_string();
    }
    format!("{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_prefixes_are_stripped() {
        assert_eq!(abbreviate_taxon("g__Bacteroides"), "Bacteroides");
        assert_eq!(abbreviate_taxon("Prevotella_9"), "Prevotella 9");
    }

    #[test]
    fn placeholders_are_abbreviated() {
        assert_eq!(
            abbreviate_taxon("f__Lachnospiraceae_unclassified"),
            "Lachnospiraceae uncl."
        );
        assert_eq!(
            abbreviate_taxon("Clostridiales_Incertae_Sedis"),
            "Clostridiales i.s."
        );
        assert_eq!(abbreviate_taxon("uncultured_bacterium"), "uncult. bacterium");
        assert_eq!(abbreviate_taxon("uncultured"), "uncult.");
        assert_eq!(abbreviate_taxon("g__Ruminococcaceae_unknown"), "Ruminococcaceae uncl.");
    }

    #[test]
    fn percentages_use_one_decimal() {
        assert_eq!(format_percent(0.125), "12.5%");
        assert_eq!(format_percent(0.0001), "<0.1%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(1.0), "100.0%");
    }

    #[test]
    fn closures_act_as_formatters() {
        let upper = |s: &BarSegment| s.label.to_uppercase();
        let seg = BarSegment::new("s1", "Akkermansia", 0.5);
        assert_eq!(upper.label_text(&seg), "AKKERMANSIA");
        assert_eq!(upper.percent_text(0.5), "50.0%");
    }
}
