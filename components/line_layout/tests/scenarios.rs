/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use app_units::Au;
use line_layout::{
    ColumnGrid, InlineBoxTemplate, InlineInsets, InlineItem, InlineSequence,
    InlineSequenceBuilder, LayoutWarning, LeafContent, Line, LineBand, LineBounds,
    LineFragment, LineLayoutError, LineLayoutOptions, LineProcessor, NoPageGrid, PageGrid,
    TextAlign, WhiteSpace, layout_paragraph,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Words of 40 app units separated by spaces of 10.
fn words(count: usize) -> InlineSequence {
    let mut builder = InlineSequenceBuilder::new();
    for index in 0..count {
        if index > 0 {
            builder.space(Au(10));
        }
        builder.text(&format!("w{index}"), Au(40));
    }
    builder.finish().unwrap()
}

fn lay_out(sequence: InlineSequence, options: &LineLayoutOptions, width: Au) -> Vec<Line> {
    layout_paragraph(
        sequence,
        options,
        LineBounds::new(Au(0), width),
        &NoPageGrid,
        Au(20),
    )
    .unwrap()
}

/// The text, position and width of the leaves of a line. Spaces are shown as `" "`.
fn leaves(line: &Line) -> Vec<(String, Au, Au)> {
    line.leaves()
        .into_iter()
        .map(|fragment| {
            let text = match &fragment.leaf.content {
                LeafContent::Text(text) => text.clone(),
                LeafContent::Space => String::from(" "),
                LeafContent::Atomic(_) => String::from("[atomic]"),
                LeafContent::Mark => String::from("[mark]"),
            };
            (text, fragment.position, fragment.width)
        })
        .collect()
}

#[test]
fn test_simple_left_alignment() {
    init_logger();
    let sequence = InlineSequenceBuilder::new()
        .text("Hello", Au(50))
        .text("World", Au(50))
        .finish()
        .unwrap();
    let mut processor = LineProcessor::new(LineLayoutOptions::default());
    processor
        .init(sequence, LineBounds::new(Au(0), Au(200)), &NoPageGrid)
        .unwrap();

    let line = processor.produce_next_line().unwrap().unwrap();
    assert_eq!(
        leaves(&line),
        [
            (String::from("Hello"), Au(0), Au(50)),
            (String::from("World"), Au(50), Au(50)),
        ]
    );
    assert!(line.is_last);
    assert!(!line.overflow);
    assert!(!processor.has_next());
    assert!(processor.produce_next_line().unwrap().is_none());
}

#[test]
fn test_unfittable_content_is_forced() {
    init_logger();
    let sequence = InlineSequenceBuilder::new()
        .text("wide", Au(500))
        .finish()
        .unwrap();
    let mut processor = LineProcessor::new(LineLayoutOptions::default());
    processor
        .init(sequence, LineBounds::new(Au(0), Au(100)), &NoPageGrid)
        .unwrap();

    let line = processor.produce_next_line().unwrap().unwrap();
    assert_eq!(leaves(&line), [(String::from("wide"), Au(0), Au(500))]);
    assert!(line.overflow);
    assert_eq!(
        line.warnings,
        [LayoutWarning::Overflow { excess: Au(400) }]
    );
    assert!(!processor.has_next());
}

#[test]
fn test_forced_placement_stops_at_first_run() {
    init_logger();
    let sequence = InlineSequenceBuilder::new()
        .text("wide", Au(500))
        .space(Au(10))
        .text("narrow", Au(40))
        .finish()
        .unwrap();
    let lines = lay_out(sequence, &LineLayoutOptions::default(), Au(100));
    assert_eq!(lines.len(), 2);
    assert!(lines[0].overflow);
    assert_eq!(lines[0].consumed, 1);
    assert_eq!(leaves(&lines[1]), [(String::from("narrow"), Au(0), Au(40))]);
    assert!(!lines[1].overflow);
}

#[test]
fn test_box_split_across_lines() {
    init_logger();
    let sequence = InlineSequenceBuilder::new()
        .start_box(InlineBoxTemplate::default())
        .text("first", Au(90))
        .text("second", Au(90))
        .end_box()
        .finish()
        .unwrap();
    let mut processor = LineProcessor::new(LineLayoutOptions::default());
    processor
        .init(sequence, LineBounds::new(Au(0), Au(100)), &NoPageGrid)
        .unwrap();

    let line = processor.produce_next_line().unwrap().unwrap();
    let LineFragment::Box(first) = &line.fragments[0] else {
        panic!("expected a box");
    };
    assert_eq!(first.width, Au(90));
    assert_eq!(first.children.len(), 1);
    assert!(!first.is_last_fragment);

    let remaining = processor.remaining().items();
    assert_eq!(remaining.len(), 3);
    match &remaining[0] {
        InlineItem::StartBox(start) => {
            assert_eq!(start.id, first.id);
            assert!(!start.is_first_fragment);
        },
        other => panic!("expected a synthetic start, got {other:?}"),
    }
    assert!(matches!(remaining[2], InlineItem::EndBox(id) if id == first.id));

    let line = processor.produce_next_line().unwrap().unwrap();
    let LineFragment::Box(second) = &line.fragments[0] else {
        panic!("expected a box");
    };
    assert_eq!(second.id, first.id);
    assert_eq!(second.width, Au(90));
    assert!(!second.is_first_fragment);
    assert!(second.is_last_fragment);
    assert!(line.is_last);
}

#[test]
fn test_justified_lines_and_last_line() {
    init_logger();
    let options = LineLayoutOptions {
        text_align: TextAlign::Justify,
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(6), &options, Au(100));
    assert_eq!(lines.len(), 3);

    for line in &lines[..2] {
        let leaves = leaves(line);
        assert_eq!(leaves[1], (String::from(" "), Au(40), Au(20)));
        assert_eq!(leaves[2].1, Au(60));
        assert_eq!(line.content_end(), Au(100));
    }

    let last = leaves(&lines[2]);
    assert_eq!(
        last,
        [
            (String::from("w4"), Au(0), Au(40)),
            (String::from(" "), Au(40), Au(10)),
            (String::from("w5"), Au(50), Au(40)),
        ]
    );
    assert!(lines[2].is_last);
}

#[test]
fn test_justify_last_line_when_requested() {
    let options = LineLayoutOptions {
        text_align: TextAlign::Justify,
        justify_last_line: true,
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(2), &options, Au(100));
    assert_eq!(lines.len(), 1);
    assert_eq!(leaves(&lines[0])[2].1, Au(60));
}

#[test]
fn test_leading_spaces_are_trimmed() {
    init_logger();
    let sequence = InlineSequenceBuilder::new()
        .space(Au(10))
        .text("Hello", Au(50))
        .space(Au(10))
        .text("World", Au(50))
        .finish()
        .unwrap();
    let lines = lay_out(sequence, &LineLayoutOptions::default(), Au(100));
    assert_eq!(lines.len(), 2);
    assert_eq!(leaves(&lines[0]), [(String::from("Hello"), Au(0), Au(50))]);
    assert_eq!(leaves(&lines[1]), [(String::from("World"), Au(0), Au(50))]);
}

#[test]
fn test_right_and_center_alignment() {
    let right = LineLayoutOptions {
        text_align: TextAlign::Right,
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(3), &right, Au(100));
    assert_eq!(lines.len(), 2);
    assert_eq!(leaves(&lines[0])[0].1, Au(10));
    assert_eq!(leaves(&lines[1]), [(String::from("w2"), Au(60), Au(40))]);

    let center = LineLayoutOptions {
        text_align: TextAlign::Center,
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(3), &center, Au(100));
    assert_eq!(leaves(&lines[0])[0].1, Au(5));
    assert_eq!(leaves(&lines[1]), [(String::from("w2"), Au(30), Au(40))]);
}

#[test]
fn test_first_line_indent() {
    let options = LineLayoutOptions {
        text_indent: Au(20),
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(3), &options, Au(100));
    assert_eq!(lines.len(), 2);
    assert_eq!(leaves(&lines[0]), [(String::from("w0"), Au(20), Au(40))]);
    assert_eq!(leaves(&lines[1])[0].1, Au(0));
    assert_eq!(leaves(&lines[1]).len(), 3);
}

#[test]
fn test_runs_do_not_cross_column_breaks() {
    init_logger();
    let grid = ColumnGrid::new(vec![Au(100)]);
    let lines = layout_paragraph(
        words(4),
        &LineLayoutOptions::default(),
        LineBounds::new(Au(0), Au(200)),
        &grid,
        Au(20),
    )
    .unwrap();
    assert_eq!(lines.len(), 1);
    let positions: Vec<Au> = leaves(&lines[0])
        .into_iter()
        .filter(|(text, _, _)| text != " ")
        .map(|(_, position, _)| position)
        .collect();
    assert_eq!(positions, [Au(0), Au(50), Au(110), Au(160)]);

    let overflowing = layout_paragraph(
        words(4),
        &LineLayoutOptions::default(),
        LineBounds::new(Au(0), Au(200)).with_overflow(true),
        &grid,
        Au(20),
    )
    .unwrap();
    assert_eq!(leaves(&overflowing[0])[4].1, Au(100));
}

#[test]
fn test_grid_is_queried_per_band() {
    // A break at 50 only on the first band.
    let grid = |band: &LineBand| {
        if band.block_start == Au(0) {
            vec![Au(50)]
        } else {
            Vec::new()
        }
    };
    assert!(grid.horizontal_breaks(&LineBand::new(Au(20), Au(20))).is_empty());

    let lines = layout_paragraph(
        words(4),
        &LineLayoutOptions::default(),
        LineBounds::new(Au(0), Au(100)).with_band(LineBand::new(Au(0), Au(20))),
        &grid,
        Au(20),
    )
    .unwrap();
    assert_eq!(lines.len(), 2);

    // "w0" and " w1" end up in separate columns of the first band.
    assert_eq!(leaves(&lines[0])[2].1, Au(60));

    // The second band has a single column.
    assert_eq!(lines[1].band.block_start, Au(20));
    assert_eq!(
        leaves(&lines[1]),
        [
            (String::from("w2"), Au(0), Au(40)),
            (String::from(" "), Au(40), Au(10)),
            (String::from("w3"), Au(50), Au(40)),
        ]
    );
}

#[test]
fn test_nowrap_and_pre() {
    let nowrap = LineLayoutOptions {
        white_space: WhiteSpace::NoWrap,
        ..LineLayoutOptions::default()
    };
    let lines = lay_out(words(3), &nowrap, Au(100));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].overflow);
    assert_eq!(lines[0].content_end(), Au(140));

    let sequence = InlineSequenceBuilder::new()
        .start_box(InlineBoxTemplate::new(
            None,
            InlineInsets::zero(),
            WhiteSpace::Pre,
        ))
        .space(Au(10))
        .text("code", Au(40))
        .space(Au(10))
        .end_box()
        .finish()
        .unwrap();
    let lines = lay_out(sequence, &LineLayoutOptions::default(), Au(100));
    assert_eq!(
        leaves(&lines[0]),
        [
            (String::from(" "), Au(0), Au(10)),
            (String::from("code"), Au(10), Au(40)),
            (String::from(" "), Au(50), Au(10)),
        ]
    );
}

#[test]
fn test_degenerate_and_invalid_bounds() {
    let lines = lay_out(words(2), &LineLayoutOptions::default(), Au(0));
    assert!(lines.is_empty());

    let error = layout_paragraph(
        words(2),
        &LineLayoutOptions::default(),
        LineBounds::new(Au(10), Au(0)),
        &NoPageGrid,
        Au(20),
    )
    .unwrap_err();
    assert_eq!(
        error,
        LineLayoutError::InvalidLineBounds {
            start: Au(10),
            end: Au(0),
        }
    );
}

#[test]
fn test_processor_is_reusable() {
    let mut processor = LineProcessor::new(LineLayoutOptions::default());
    for _ in 0..2 {
        processor
            .init(words(3), LineBounds::new(Au(0), Au(100)), &NoPageGrid)
            .unwrap();
        let mut count = 0;
        while processor.has_next() {
            processor.produce_next_line().unwrap().unwrap();
            count += 1;
        }
        assert_eq!(count, 2);
    }
}

#[test]
fn test_reused_processor_queries_the_new_grid() {
    let bounds = LineBounds::new(Au(0), Au(200));
    let mut processor = LineProcessor::new(LineLayoutOptions::default());
    processor
        .init(words(2), bounds, &ColumnGrid::new(vec![Au(60)]))
        .unwrap();
    let line = processor.produce_next_line().unwrap().unwrap();
    let positions: Vec<Au> = leaves(&line).into_iter().map(|(_, position, _)| position).collect();
    assert_eq!(positions, [Au(0), Au(60), Au(70)]);

    processor.init(words(2), bounds, &NoPageGrid).unwrap();
    let line = processor.produce_next_line().unwrap().unwrap();
    let positions: Vec<Au> = leaves(&line).into_iter().map(|(_, position, _)| position).collect();
    assert_eq!(positions, [Au(0), Au(40), Au(50)]);
}

#[test]
fn test_lines_serialize_to_json() {
    let lines = lay_out(words(1), &LineLayoutOptions::default(), Au(100));
    let json = serde_json::to_value(&lines[0]).unwrap();
    assert_eq!(json["fragments"][0]["Leaf"]["leaf"]["content"]["Text"], "w0");
    assert_eq!(json["is_last"], true);
}
