use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use taxbar_core::{LabelBox, LabelCandidate, LabelVariant};

/// Identifier of the request whose `height_pt` is the global baseline offset.
pub const BASELINE_SENTINEL_ID: &str = "__baseline__";

/// Style class a label variant is typeset with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleClass {
    Full,
    Percent,
    Name,
    /// Reserved for the baseline-offset sentinel.
    Baseline,
}

impl From<LabelVariant> for StyleClass {
    fn from(v: LabelVariant) -> Self {
        match v {
            LabelVariant::Full => StyleClass::Full,
            LabelVariant::Percent => StyleClass::Percent,
            LabelVariant::Name => StyleClass::Name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeasureRequest {
    pub id: String,
    pub style: StyleClass,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureResponse {
    pub id: String,
    pub width_pt: f64,
    pub height_pt: f64,
    pub depth_pt: f64,
}

impl MeasureResponse {
    pub fn label_box(&self) -> LabelBox {
        LabelBox::new(self.width_pt, self.height_pt, self.depth_pt)
    }
}

/// Typesetting backend that reports box metrics for label texts.
///
/// Implementations must answer every request identifier; a missing identifier fails the
/// enclosing diagram.
pub trait LabelMeasurer {
    fn measure(&self, requests: &[MeasureRequest]) -> Result<Vec<MeasureResponse>>;
}

/// Backend-free approximation: every character is `char_width_factor` ems wide.
#[derive(Debug, Clone)]
pub struct DeterministicLabelMeasurer {
    pub font_size_pt: f64,
    pub char_width_factor: f64,
    /// Height above the baseline, in ems.
    pub ascent_factor: f64,
    /// Depth below the baseline, in ems.
    pub descent_factor: f64,
}

impl Default for DeterministicLabelMeasurer {
    fn default() -> Self {
        Self {
            font_size_pt: 8.0,
            char_width_factor: 0.5,
            ascent_factor: 0.7,
            descent_factor: 0.2,
        }
    }
}

impl DeterministicLabelMeasurer {
    pub fn measure_text(&self, text: &str) -> LabelBox {
        if text.is_empty() {
            return LabelBox::EMPTY;
        }
        let font_size = self.font_size_pt.max(1.0);
        let chars = text.chars().count();
        LabelBox::new(
            chars as f64 * font_size * self.char_width_factor,
            font_size * self.ascent_factor,
            font_size * self.descent_factor,
        )
    }
}

impl LabelMeasurer for DeterministicLabelMeasurer {
    fn measure(&self, requests: &[MeasureRequest]) -> Result<Vec<MeasureResponse>> {
        let font_size = self.font_size_pt.max(1.0);
        Ok(requests
            .iter()
            .map(|req| match req.style {
                StyleClass::Baseline => MeasureResponse {
                    id: req.id.clone(),
                    width_pt: 0.0,
                    // Distance from the visual center of a text line down to its baseline.
                    height_pt: font_size * (self.ascent_factor - self.descent_factor) / 2.0,
                    depth_pt: 0.0,
                },
                _ => {
                    let b = self.measure_text(&req.text);
                    MeasureResponse {
                        id: req.id.clone(),
                        width_pt: b.width,
                        height_pt: b.height,
                        depth_pt: b.depth,
                    }
                }
            })
            .collect())
    }
}

/// A candidate with its three label boxes, converted to cm.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredCandidate {
    pub candidate: LabelCandidate,
    pub full: LabelBox,
    pub percent: LabelBox,
    pub name: LabelBox,
    /// The full label is narrower than the segment.
    pub all_fits_in_bar: bool,
    /// The percentage alone is narrower than the segment.
    pub percent_fits_in_bar: bool,
}

impl MeasuredCandidate {
    /// Builds a measured candidate from boxes already in cm.
    pub fn new(
        candidate: LabelCandidate,
        full: LabelBox,
        percent: LabelBox,
        name: LabelBox,
    ) -> Self {
        let all_fits_in_bar = full.width < candidate.segment_width;
        let percent_fits_in_bar = percent.width < candidate.segment_width;
        Self {
            candidate,
            full,
            percent,
            name,
            all_fits_in_bar,
            percent_fits_in_bar,
        }
    }

    pub fn label_box(&self, variant: LabelVariant) -> LabelBox {
        match variant {
            LabelVariant::Full => self.full,
            LabelVariant::Percent => self.percent,
            LabelVariant::Name => self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredLevel {
    pub level: usize,
    pub candidates: Vec<MeasuredCandidate>,
    /// Distance from a text line's visual center down to its baseline, in cm.
    pub baseline_offset: f64,
}

pub fn request_id(candidate: &LabelCandidate, variant: LabelVariant) -> String {
    format!(
        "L{}:{}:{}",
        candidate.level,
        candidate.segment_id,
        variant.as_str()
    )
}

/// Builds the request set for `levels`: three variants per candidate plus the baseline
/// sentinel.
pub fn build_requests(levels: &[(usize, Vec<LabelCandidate>)]) -> Vec<MeasureRequest> {
    let mut out = Vec::new();
    for c in levels.iter().flat_map(|(_, cands)| cands) {
        for variant in LabelVariant::ALL {
            out.push(MeasureRequest {
                id: request_id(c, variant),
                style: variant.into(),
                text: c.variant_text(variant),
            });
        }
    }
    out.push(MeasureRequest {
        id: BASELINE_SENTINEL_ID.to_string(),
        style: StyleClass::Baseline,
        text: String::new(),
    });
    out
}

/// Measures every candidate of every level with a single backend call.
///
/// `levels` pairs each level number with its candidates; a level with no candidates keeps its
/// number.
pub fn measure_levels(
    levels: &[(usize, Vec<LabelCandidate>)],
    measurer: &dyn LabelMeasurer,
) -> Result<Vec<MeasuredLevel>> {
    let requests = build_requests(levels);
    let responses = measurer.measure(&requests)?;

    let mut by_id: FxHashMap<&str, LabelBox> = FxHashMap::default();
    for r in &responses {
        let b = r.label_box();
        if !b.is_valid() {
            return Err(Error::InvalidMetrics {
                id: r.id.clone(),
                width: r.width_pt,
                height: r.height_pt,
                depth: r.depth_pt,
            });
        }
        by_id.insert(r.id.as_str(), b);
    }
    let lookup = |id: &str| -> Result<LabelBox> {
        by_id
            .get(id)
            .map(|b| b.to_cm())
            .ok_or_else(|| Error::MissingMetrics { id: id.to_string() })
    };

    let baseline_offset = lookup(BASELINE_SENTINEL_ID)?.height;

    let mut out = Vec::with_capacity(levels.len());
    for (level, cands) in levels {
        let mut measured = Vec::with_capacity(cands.len());
        for c in cands {
            let full = lookup(&request_id(c, LabelVariant::Full))?;
            let percent = lookup(&request_id(c, LabelVariant::Percent))?;
            let name = lookup(&request_id(c, LabelVariant::Name))?;
            measured.push(MeasuredCandidate::new(c.clone(), full, percent, name));
        }
        out.push(MeasuredLevel {
            level: *level,
            candidates: measured,
            baseline_offset,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, width: f64) -> LabelCandidate {
        LabelCandidate {
            segment_id: id.to_string(),
            text: "Bacteroides".to_string(),
            percent_text: "40.0%".to_string(),
            level: 3,
            sequence: 0,
            center_x: width / 2.0,
            segment_width: width,
        }
    }

    struct DropOne(&'static str);

    impl LabelMeasurer for DropOne {
        fn measure(&self, requests: &[MeasureRequest]) -> Result<Vec<MeasureResponse>> {
            let all = DeterministicLabelMeasurer::default().measure(requests)?;
            Ok(all.into_iter().filter(|r| r.id != self.0).collect())
        }
    }

    #[test]
    fn requests_cover_three_variants_and_sentinel() {
        let reqs = build_requests(&[(3, vec![candidate("a", 1.0), candidate("b", 1.0)])]);
        assert_eq!(reqs.len(), 7);
        assert_eq!(reqs[0].id, "L3:a:full");
        assert_eq!(reqs[0].text, "Bacteroides 40.0%");
        assert_eq!(reqs[1].style, StyleClass::Percent);
        assert_eq!(reqs[6].id, BASELINE_SENTINEL_ID);
    }

    #[test]
    fn fit_flags_compare_against_segment_width() {
        let measurer = DeterministicLabelMeasurer::default();
        let measured = measure_levels(&[(3, vec![candidate("a", 5.0)])], &measurer).unwrap();
        let c = &measured[0].candidates[0];
        // 17 chars * 4pt = 68pt ~ 2.39cm
        assert!(c.all_fits_in_bar);
        assert!(c.percent_fits_in_bar);
        assert!(measured[0].baseline_offset > 0.0);

        let narrow = measure_levels(&[(3, vec![candidate("a", 0.5)])], &measurer).unwrap();
        assert!(!narrow[0].candidates[0].all_fits_in_bar);
        assert!(!narrow[0].candidates[0].percent_fits_in_bar);
    }

    #[test]
    fn missing_identifier_is_fatal() {
        let err =
            measure_levels(&[(3, vec![candidate("a", 1.0)])], &DropOne("L3:a:name")).unwrap_err();
        assert!(matches!(err, Error::MissingMetrics { ref id } if id == "L3:a:name"));

        let err = measure_levels(&[(0, vec![])], &DropOne(BASELINE_SENTINEL_ID)).unwrap_err();
        assert!(matches!(err, Error::MissingMetrics { .. }));
    }

    #[test]
    fn levels_keep_their_numbers_without_candidates() {
        let measurer = DeterministicLabelMeasurer::default();
        let levels = [(2, vec![]), (3, vec![candidate("a", 1.0)]), (9, vec![])];
        let measured = measure_levels(&levels, &measurer).unwrap();
        let numbers = measured.iter().map(|l| l.level).collect::<Vec<_>>();
        assert_eq!(numbers, [2, 3, 9]);
    }

    #[test]
    fn empty_text_measures_as_the_empty_box() {
        let measurer = DeterministicLabelMeasurer::default();
        assert_eq!(measurer.measure_text(""), LabelBox::EMPTY);
        assert!(measurer.measure_text("a").width > 0.0);
    }
}
