/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Alignment strategies. Every strategy first places runs left to right inside the
//! segments of the line; [`RunPlacer::finish`] then moves or stretches the content of
//! each used segment according to the alignment mode.

use std::ops::Range;

use app_units::Au;
use log::debug;
use smallvec::SmallVec;

use crate::options::{TextAlign, WhiteSpace};
use crate::page_grid::Breakpoints;
use crate::placement::{Placement, PlacementBuffer};
use crate::sequence::{InlineItem, InlineSequence};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlignmentStrategy {
    Left,
    Right,
    Center,
    Justify,
    /// Places content from the line start without looking at the line end or the page
    /// grid. Used to force progress when nothing fits.
    Skip,
}

impl From<TextAlign> for AlignmentStrategy {
    fn from(text_align: TextAlign) -> AlignmentStrategy {
        match text_align {
            TextAlign::Left => AlignmentStrategy::Left,
            TextAlign::Right => AlignmentStrategy::Right,
            TextAlign::Center => AlignmentStrategy::Center,
            TextAlign::Justify => AlignmentStrategy::Justify,
        }
    }
}

/// How the last line of a paragraph is finished.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LastLineAlignment {
    /// Finish the placed content with this strategy.
    Finish(AlignmentStrategy),
    /// Place the open boxes and the line content again with a fresh Left pass.
    LeftSubPass,
}

impl AlignmentStrategy {
    /// How to finish the last line of a paragraph. `fully_fits` is true when the line
    /// holds the whole remainder; otherwise only END markers and ignorable leaves are
    /// left behind it. Justification is dropped unless it is requested for the last
    /// line too.
    pub fn perform_last_line_alignment(
        self,
        justify_last_line: bool,
        fully_fits: bool,
    ) -> LastLineAlignment {
        match self {
            AlignmentStrategy::Justify if !justify_last_line => {
                if fully_fits {
                    LastLineAlignment::Finish(AlignmentStrategy::Left)
                } else {
                    LastLineAlignment::LeftSubPass
                }
            },
            strategy => LastLineAlignment::Finish(strategy),
        }
    }
}

/// Consecutive items placed in the same segment.
#[derive(Clone, Debug, Eq, PartialEq)]
struct SegmentRun {
    segment: usize,
    items: Range<usize>,
}

/// Places the runs of one line attempt.
#[derive(Debug)]
pub(crate) struct RunPlacer {
    strategy: AlignmentStrategy,
    cursor: Au,
    segment: usize,
    runs: SmallVec<[SegmentRun; 4]>,
    trace_fitting: bool,
}

impl RunPlacer {
    pub(crate) fn new(strategy: AlignmentStrategy, line_start: Au, trace_fitting: bool) -> Self {
        RunPlacer {
            strategy,
            cursor: line_start,
            segment: 0,
            runs: SmallVec::new(),
            trace_fitting,
        }
    }

    pub(crate) fn strategy(&self) -> AlignmentStrategy {
        self.strategy
    }

    /// Place the run `[start, start + count)` and return the index up to which it was
    /// placed: either the end of the run, or `start` if no remaining segment can hold it.
    pub(crate) fn handle_element(
        &mut self,
        sequence: &InlineSequence,
        breakpoints: &Breakpoints,
        placements: &mut PlacementBuffer,
        start: usize,
        count: usize,
    ) -> usize {
        let width = (start..start + count)
            .map(|index| sequence.item_inline_size(index))
            .fold(Au(0), |total, size| total + size);

        if self.strategy != AlignmentStrategy::Skip {
            let mut segment = self.segment;
            let mut cursor = self.cursor;
            while segment < breakpoints.segment_count() &&
                cursor + width > breakpoints.segment_end(segment)
            {
                segment += 1;
                if segment < breakpoints.segment_count() {
                    cursor = breakpoints.segment_start(segment);
                }
            }
            if segment >= breakpoints.segment_count() {
                if self.trace_fitting {
                    debug!("Run [{start}, {}) of width {width:?} does not fit", start + count);
                }
                return start;
            }
            self.segment = segment;
            self.cursor = cursor;
        }

        if self.trace_fitting {
            debug!(
                "Placing run [{start}, {}) of width {width:?} at {:?} in segment {}",
                start + count,
                self.cursor,
                self.segment
            );
        }
        for index in start..start + count {
            self.place(sequence, placements, index);
        }
        start + count
    }

    /// Whether the item at `index` still fits in the current segment after the content
    /// placed so far. Forced placement accepts anything.
    pub(crate) fn fits(
        &self,
        sequence: &InlineSequence,
        breakpoints: &Breakpoints,
        index: usize,
    ) -> bool {
        self.strategy == AlignmentStrategy::Skip ||
            self.cursor + sequence.item_inline_size(index) <=
                breakpoints.segment_end(self.segment)
    }

    /// Place a single item right after the previous one, ignoring the line end.
    pub(crate) fn append(
        &mut self,
        sequence: &InlineSequence,
        placements: &mut PlacementBuffer,
        index: usize,
    ) {
        self.place(sequence, placements, index);
    }

    fn place(&mut self, sequence: &InlineSequence, placements: &mut PlacementBuffer, index: usize) {
        let width = sequence.item_inline_size(index);
        placements[index] = Placement {
            position: self.cursor,
            width,
        };
        self.cursor = self.cursor + width;

        match self.runs.last_mut() {
            Some(run) if run.segment == self.segment && run.items.end == index => {
                run.items.end = index + 1
            },
            _ => self.runs.push(SegmentRun {
                segment: self.segment,
                items: index..index + 1,
            }),
        }
    }

    /// Collapse the ignorable leaves at the end of `[0, end)` to zero width, looking
    /// through END markers. Items behind a collapsed leaf move left by its width.
    pub(crate) fn collapse_trailing_ignorables(
        &mut self,
        sequence: &InlineSequence,
        white_space: &[WhiteSpace],
        placements: &mut PlacementBuffer,
        end: usize,
    ) {
        for index in (0..end).rev() {
            match &sequence.items()[index] {
                InlineItem::EndBox(_) => continue,
                InlineItem::Content(leaf)
                    if leaf.is_ignorable() && !white_space[index].preserve_spaces() =>
                {
                    let collapsed = placements[index].width;
                    placements[index].width = Au(0);
                    for following in index + 1..end {
                        placements[following].position = placements[following].position - collapsed;
                    }
                    self.cursor = self.cursor - collapsed;
                },
                _ => break,
            }
        }
    }

    /// The end of the placed content.
    pub(crate) fn content_end(&self, placements: &PlacementBuffer) -> Option<Au> {
        self.runs
            .iter()
            .map(|run| placements[run.items.end - 1].end())
            .max()
    }

    /// Align the content of every used segment.
    pub(crate) fn finish(
        &self,
        strategy: AlignmentStrategy,
        sequence: &InlineSequence,
        breakpoints: &Breakpoints,
        placements: &mut PlacementBuffer,
    ) {
        if matches!(strategy, AlignmentStrategy::Left | AlignmentStrategy::Skip) {
            return;
        }

        let mut segment_runs = self.runs.iter().peekable();
        while let Some(first) = segment_runs.next() {
            // Runs of one segment are adjacent, but a run that jumped ahead may leave
            // several of them for the same segment.
            let mut items = first.items.clone();
            while let Some(next) = segment_runs.next_if(|next| next.segment == first.segment) {
                items.end = next.items.end;
            }

            let segment_end = breakpoints.segment_end(first.segment);
            let slack = segment_end - placements[items.end - 1].end();
            if slack <= Au(0) {
                continue;
            }

            match strategy {
                AlignmentStrategy::Right => shift(placements, items, slack),
                AlignmentStrategy::Center => shift(placements, items, Au(slack.0 / 2)),
                AlignmentStrategy::Justify => justify(sequence, placements, items, slack),
                AlignmentStrategy::Left | AlignmentStrategy::Skip => {},
            }
        }
    }
}

fn shift(placements: &mut PlacementBuffer, items: Range<usize>, offset: Au) {
    for index in items {
        placements[index].position = placements[index].position + offset;
    }
}

/// Distribute `slack` over the stretchable spaces of `items`. Spaces that were
/// collapsed to zero width do not stretch.
fn justify(
    sequence: &InlineSequence,
    placements: &mut PlacementBuffer,
    items: Range<usize>,
    slack: Au,
) {
    let is_stretch_point = |index: usize, placements: &PlacementBuffer| {
        sequence.items()[index]
            .leaf()
            .is_some_and(|leaf| leaf.is_stretchable()) &&
            placements[index].width > Au(0)
    };

    let stretch_points = items
        .clone()
        .filter(|index| is_stretch_point(*index, placements))
        .count() as i32;
    if stretch_points == 0 {
        return;
    }

    let share = slack.0 / stretch_points;
    let mut remainder = slack.0 % stretch_points;
    let mut offset = Au(0);
    for index in items {
        let stretch = is_stretch_point(index, placements);
        placements[index].position = placements[index].position + offset;
        if stretch {
            let mut extra = share;
            if remainder > 0 {
                extra += 1;
                remainder -= 1;
            }
            placements[index].width = placements[index].width + Au(extra);
            offset = offset + Au(extra);
        }
    }
}
