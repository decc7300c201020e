use crate::error::{Error, Result};
use crate::format::LabelFormatter;
use crate::model::{BarSegment, LabelCandidate};

/// Slack allowed when a level's proportions are summed.
const PROPORTION_SUM_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Length of the full bar in cm.
    pub bar_length: f64,
    /// Segments with a smaller proportion get no label.
    pub min_proportion: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            bar_length: 13.0,
            min_proportion: 0.0,
        }
    }
}

impl ExtractOptions {
    pub fn from_placement(cfg: &crate::config::PlacementConfig) -> Self {
        Self {
            bar_length: cfg.bar_length,
            min_proportion: cfg.min_proportion,
        }
    }
}

/// Turns one level's ordered segments into ordered label candidates.
///
/// Every segment occupies its share of the bar, but aggregates and segments below
/// `min_proportion` produce no candidate.
pub fn extract_candidates(
    level: usize,
    segments: &[BarSegment],
    options: &ExtractOptions,
    formatter: &dyn LabelFormatter,
) -> Result<Vec<LabelCandidate>> {
    let mut total = 0.0;
    for s in segments {
        if !(s.proportion.is_finite() && (0.0..=1.0).contains(&s.proportion)) {
            return Err(Error::InvalidSegment {
                segment_id: s.id.clone(),
                proportion: s.proportion,
            });
        }
        total += s.proportion;
    }
    if total > 1.0 + PROPORTION_SUM_EPS {
        return Err(Error::ProportionOverflow { level, total });
    }

    let mut out = Vec::new();
    let mut x = 0.0;
    for s in segments {
        let width = s.proportion * options.bar_length;
        let center_x = x + width / 2.0;
        x += width;

        if s.kind.is_aggregate() || s.proportion < options.min_proportion {
            continue;
        }

        out.push(LabelCandidate {
            segment_id: s.id.clone(),
            text: formatter.label_text(s),
            percent_text: formatter.percent_text(s.proportion),
            level,
            sequence: out.len(),
            center_x,
            segment_width: width,
        });
    }

    tracing::debug!(
        level,
        segments = segments.len(),
        candidates = out.len(),
        "extracted label candidates"
    );
    Ok(out)
}
