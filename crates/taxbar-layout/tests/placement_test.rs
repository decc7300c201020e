use taxbar_core::{LabelBox, LabelCandidate, LabelRow, LabelVariant, PlacementConfig, Side};
use taxbar_layout::metrics::{MeasuredCandidate, MeasuredLevel};
use taxbar_layout::model::LevelLayout;
use taxbar_layout::placement::place_level;
use taxbar_layout::validate::check_level;

fn candidate(id: &str, sequence: usize, center_x: f64, segment_width: f64) -> LabelCandidate {
    LabelCandidate {
        segment_id: id.to_string(),
        text: id.to_string(),
        percent_text: "10.0%".to_string(),
        level: 0,
        sequence,
        center_x,
        segment_width,
    }
}

fn measured(c: LabelCandidate, width: f64) -> MeasuredCandidate {
    let b = LabelBox::new(width, 0.2, 0.05);
    MeasuredCandidate::new(c, b, b, b)
}

fn level(candidates: Vec<MeasuredCandidate>) -> MeasuredLevel {
    MeasuredLevel {
        level: 0,
        candidates,
        baseline_offset: 0.075,
    }
}

fn assert_clean(layout: &LevelLayout, cfg: &PlacementConfig) {
    let violations = check_level(layout, cfg);
    assert!(
        violations.is_empty(),
        "violations: {:?}",
        violations.iter().map(|v| v.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn three_separated_segments_share_the_first_row() {
    // Segments [0,2], [4.5,5.5], [8,10] of a 10 cm bar; the gaps are minor aggregates.
    let cfg = PlacementConfig {
        bar_length: 10.0,
        ..PlacementConfig::default()
    };
    let input = level(vec![
        measured(candidate("a", 0, 1.0, 2.0), 3.0),
        measured(candidate("b", 1, 5.0, 1.0), 3.0),
        measured(candidate("c", 2, 9.0, 2.0), 3.0),
    ]);

    let out = place_level(&input, &cfg);
    assert!(out.unpositioned.is_empty());
    assert_eq!(out.extra_rows, 0);
    assert_eq!(out.labels.len(), 3);
    for l in &out.labels {
        assert_eq!(
            l.row,
            LabelRow::Row {
                side: Side::Above,
                index: 0
            }
        );
        let leader = l.leader.expect("row labels have leaders");
        assert!(leader.horizontal_offset().abs() >= cfg.min_del_x - 1e-9);
        assert!(leader.length() <= cfg.max_leader_length + 1e-9);
        assert!(l.rect.left_x <= l.leader_x && l.leader_x <= l.rect.right_x());
    }
    for pair in out.labels.windows(2) {
        assert!(pair[0].rect.right_x() + cfg.label_min_sep <= pair[1].rect.left_x + 1e-9);
    }
    assert!((out.labels[2].rect.right_x() - 10.5).abs() < 1e-9);
    assert_clean(&out, &cfg);
}

#[test]
fn wide_segment_is_labelled_inline() {
    let cfg = PlacementConfig::default();
    // 90% of a 13 cm bar.
    let input = level(vec![measured(candidate("a", 0, 5.85, 11.7), 2.0)]);

    let out = place_level(&input, &cfg);
    assert_eq!(out.labels.len(), 1);
    let l = &out.labels[0];
    assert_eq!(l.row, LabelRow::Inline);
    assert_eq!(l.variant, LabelVariant::Full);
    assert!(l.leader.is_none());
    assert!((l.rect.left_x - 4.85).abs() < 1e-12);
    assert!((l.rect.baseline_y + 0.075).abs() < 1e-12);
    assert_eq!(out.rows_above + out.rows_below, 0);
    assert_clean(&out, &cfg);
}

#[test]
fn percent_stays_inline_when_only_the_name_needs_a_row() {
    let cfg = PlacementConfig::default();
    let full = LabelBox::new(2.0, 0.2, 0.05);
    let percent = LabelBox::new(0.6, 0.2, 0.05);
    let name = LabelBox::new(1.3, 0.2, 0.05);
    let input = level(vec![MeasuredCandidate::new(
        candidate("a", 0, 3.0, 1.0),
        full,
        percent,
        name,
    )]);

    let out = place_level(&input, &cfg);
    assert_eq!(out.labels.len(), 2);
    assert_eq!(out.labels[0].variant, LabelVariant::Percent);
    assert_eq!(out.labels[0].row, LabelRow::Inline);
    assert_eq!(out.labels[0].text, "10.0%");
    assert_eq!(out.labels[1].variant, LabelVariant::Name);
    assert_eq!(out.labels[1].text, "a");
    assert!(matches!(out.labels[1].row, LabelRow::Row { .. }));
    assert!((out.labels[1].rect.width - 1.3).abs() < 1e-12);
    assert_clean(&out, &cfg);
}

#[test]
fn tall_inline_label_pushes_rows_out_and_deflects_leaders() {
    let cfg = PlacementConfig::default();
    // Top of the inline box sits at 0.525, 0.275 past the bar edge.
    let tall = LabelBox::new(3.0, 0.6, 0.05);
    let neighbours = |with_tall: bool| {
        let mut cands = vec![
            measured(candidate("n1", 0, 3.5, 0.2), 2.0),
            measured(candidate("n3", 1, 4.9, 0.2), 2.0),
        ];
        if with_tall {
            cands.push(MeasuredCandidate::new(
                candidate("wide", 2, 6.5, 5.0),
                tall,
                tall,
                tall,
            ));
        }
        cands.push(measured(candidate("n2", 3, 9.5, 0.2), 2.0));
        level(cands)
    };

    let out = place_level(&neighbours(true), &cfg);
    assert!(out.unpositioned.is_empty());
    assert!(out.first_row_gap > cfg.first_row_gap);
    assert!((out.first_row_gap - 0.4).abs() < 1e-9);

    let find = |id: &str| {
        out.labels
            .iter()
            .find(|l| l.segment_id == id)
            .expect("label placed")
    };
    let wide = find("wide");
    assert_eq!(wide.row, LabelRow::Inline);
    let row_edge = cfg.bar_height / 2.0 + out.first_row_gap;
    assert!(wide.rect.top_y() + cfg.label_min_sep <= row_edge + 1e-9);
    for id in ["n1", "n3", "n2"] {
        assert!(find(id).rect.bottom_y() >= row_edge - 1e-9);
    }
    // The inline box blocks the rightward nudge, so the leader bends left.
    let leader = find("n3").leader.expect("row labels have leaders");
    assert!(leader.corner.x < leader.anchor.x);
    assert_clean(&out, &cfg);

    let open = place_level(&neighbours(false), &cfg);
    assert_eq!(open.first_row_gap, cfg.first_row_gap);
    let n3 = open
        .labels
        .iter()
        .find(|l| l.segment_id == "n3")
        .and_then(|l| l.leader)
        .expect("leader");
    assert!(n3.corner.x > n3.anchor.x);
}

#[test]
fn crowded_level_degrades_to_unpositioned_labels() {
    let cfg = PlacementConfig::default();
    let width = cfg.bar_length / 12.0;
    let candidates = (0..12)
        .map(|i| {
            let c = candidate(&format!("s{i}"), i, width * (i as f64 + 0.5), width);
            measured(c, 8.0)
        })
        .collect();
    let input = level(candidates);

    let out = place_level(&input, &cfg);
    assert!(out.is_partial());
    assert_eq!(out.extra_rows, cfg.max_extra_rows);
    assert_eq!(out.labels.len(), 12);

    let unpositioned = out
        .labels
        .iter()
        .filter(|l| l.row == LabelRow::Unpositioned)
        .collect::<Vec<_>>();
    assert_eq!(unpositioned.len(), out.unpositioned.len());
    for l in unpositioned {
        assert!(l.leader.is_none());
        assert!(l.rect.left_x > cfg.max_x());
        assert!(out.unpositioned.contains(&l.segment_id));
    }
    assert_clean(&out, &cfg);
}

#[test]
fn labels_that_collide_above_move_below() {
    let cfg = PlacementConfig::default();
    // Neighbouring 6 cm labels cannot share a row on one side.
    let input = level(vec![
        measured(candidate("a", 0, 5.0, 0.2), 6.0),
        measured(candidate("b", 1, 5.5, 0.2), 6.0),
    ]);

    let out = place_level(&input, &cfg);
    assert!(out.unpositioned.is_empty());
    assert_eq!(out.labels[0].row.side(), Some(Side::Above));
    assert_eq!(out.labels[1].row.side(), Some(Side::Below));
    assert_eq!((out.rows_above, out.rows_below), (1, 1));
    assert_eq!(out.labels[1].row.row_index(), Some(0));
    let below = out.labels[1].leader.expect("leader");
    assert!(below.corner.y < below.anchor.y);
    assert!(out.labels[1].rect.top_y() <= -cfg.bar_height / 2.0 + 1e-12);
    assert_clean(&out, &cfg);
}

#[test]
fn placement_is_deterministic() {
    let cfg = PlacementConfig::default();
    let width = cfg.bar_length / 7.0;
    let make = || {
        level(
            (0..7)
                .map(|i| {
                    let c = candidate(&format!("s{i}"), i, width * (i as f64 + 0.5), width);
                    measured(c, 2.5 + i as f64 * 0.3)
                })
                .collect(),
        )
    };
    let first = place_level(&make(), &cfg);
    let second = place_level(&make(), &cfg);
    assert_eq!(first, second);
    assert_clean(&first, &cfg);
}
