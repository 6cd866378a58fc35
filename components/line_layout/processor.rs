/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The line processor drives line fitting for one paragraph at a time.
//!
//! Each call to [`LineProcessor::produce_next_line`] goes through the same steps:
//!
//! 1. The placement buffer is reset and the fitting pass places as many runs as fit in
//!    the segments of the current line.
//! 2. If nothing fits, the first run (or the whole remainder) is forced onto the line
//!    with [`AlignmentStrategy::Skip`], so every call makes progress.
//! 3. Ignorable items right after the line are dropped, and END markers that then follow
//!    the line directly are pulled onto it.
//! 4. Trailing ignorable items collapse and the line is aligned.
//! 5. The placed prefix is turned into a tree of fragments. Boxes that are still open
//!    at the end of the line are closed there and continue on the next line behind a
//!    synthetic START.

use app_units::Au;
use log::{debug, warn};
use smallvec::SmallVec;

use crate::alignment::{AlignmentStrategy, LastLineAlignment, RunPlacer};
use crate::error::{LayoutWarning, LineLayoutError};
use crate::fitting::{FitResult, fit_runs};
use crate::fragment::{BoxFragment, LeafFragment, Line, LineFragment};
use crate::options::{LineLayoutOptions, WhiteSpace};
use crate::page_grid::{Breakpoints, LineBand, LineBounds, PageGrid};
use crate::placement::{Placement, PlacementBuffer};
use crate::sequence::{BoxId, BoxStart, InlineItem, InlineSequence};

/// Fits the inline sequence of a paragraph into lines. A processor can be reused for
/// any number of paragraphs; its buffers are kept between them.
#[derive(Debug, Default)]
pub struct LineProcessor {
    options: LineLayoutOptions,

    /// The part of the paragraph that has not been placed on a line yet.
    sequence: InlineSequence,
    placements: PlacementBuffer,
    bounds: LineBounds,
    breakpoints: Breakpoints,

    /// Whether the next line is the first line of the paragraph.
    first_line: bool,
}

impl LineProcessor {
    pub fn new(options: LineLayoutOptions) -> LineProcessor {
        LineProcessor {
            options,
            ..LineProcessor::default()
        }
    }

    pub fn options(&self) -> &LineLayoutOptions {
        &self.options
    }

    /// Start laying out a new paragraph. The page grid may differ from the one of the
    /// previous paragraph, so the breakpoints are always recomputed.
    pub fn init(
        &mut self,
        sequence: InlineSequence,
        bounds: LineBounds,
        grid: &dyn PageGrid,
    ) -> Result<(), LineLayoutError> {
        self.breakpoints = Breakpoints::new();
        self.set_line_bounds(bounds, grid)?;
        self.sequence = sequence;
        self.first_line = true;
        self.trim_leading_ignorables();
        Ok(())
    }

    /// Move the processor to the bounds of the next line.
    pub fn set_line_bounds(
        &mut self,
        bounds: LineBounds,
        grid: &dyn PageGrid,
    ) -> Result<(), LineLayoutError> {
        if bounds.inline_end < bounds.inline_start {
            return Err(LineLayoutError::InvalidLineBounds {
                start: bounds.inline_start,
                end: bounds.inline_end,
            });
        }
        self.bounds = bounds;
        self.breakpoints.update(&bounds, grid);
        Ok(())
    }

    pub fn bounds(&self) -> LineBounds {
        self.bounds
    }

    pub fn has_next(&self) -> bool {
        !self.sequence.is_empty()
    }

    /// The items that are still waiting for a line, starting with the synthetic STARTs
    /// of boxes split at the previous line break.
    pub fn remaining(&self) -> &InlineSequence {
        &self.sequence
    }

    /// The placements computed by the last fitting pass.
    pub fn placements(&self) -> &[Placement] {
        self.placements.as_slice()
    }

    /// Run the fitting pass for the current line without producing it.
    pub fn fit_current_line(&mut self) -> FitResult {
        let strategy = AlignmentStrategy::from(self.options.text_align);
        self.run_fitting(strategy).0
    }

    fn line_start(&self) -> Au {
        if self.first_line {
            self.bounds.inline_start + self.options.text_indent
        } else {
            self.bounds.inline_start
        }
    }

    fn run_fitting(&mut self, strategy: AlignmentStrategy) -> (FitResult, RunPlacer) {
        self.placements.reset(self.sequence.len());
        let mut placer = RunPlacer::new(
            strategy,
            self.line_start(),
            self.options.debug.trace_fitting,
        );

        let sequence = &self.sequence;
        let breakpoints = &self.breakpoints;
        let placements = &mut self.placements;
        let result = fit_runs(sequence, self.options.white_space, |start, count| {
            placer.handle_element(sequence, breakpoints, placements, start, count)
        });
        (result, placer)
    }

    /// Produce the next line, or `None` if the line band is empty or nothing visible
    /// was placed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "LineProcessor::produce_next_line",
            skip_all,
            fields(servo_profiling = true),
            level = "trace",
        )
    )]
    pub fn produce_next_line(&mut self) -> Result<Option<Line>, LineLayoutError> {
        if self.sequence.is_empty() || self.bounds.inline_end == self.bounds.inline_start {
            return Ok(None);
        }

        let strategy = AlignmentStrategy::from(self.options.text_align);
        let (fit, mut placer) = self.run_fitting(strategy);
        let forced = fit.placed == 0;
        let mut end = fit.placed;
        if forced {
            end = fit.skip_index.unwrap_or(self.sequence.len());
            self.placements.reset(self.sequence.len());
            placer = RunPlacer::new(
                AlignmentStrategy::Skip,
                self.line_start(),
                self.options.debug.trace_fitting,
            );
            placer.handle_element(
                &self.sequence,
                &self.breakpoints,
                &mut self.placements,
                0,
                end,
            );
        }

        end = self.absorb_line_end(&mut placer, end);
        let white_space = self
            .sequence
            .white_space_by_item(end, self.options.white_space);
        placer.collapse_trailing_ignorables(
            &self.sequence,
            &white_space,
            &mut self.placements,
            end,
        );

        let fully_fits = end == self.sequence.len();
        let finish_strategy = if fully_fits || !self.has_visible_content_after(end) {
            match placer
                .strategy()
                .perform_last_line_alignment(self.options.justify_last_line, fully_fits)
            {
                LastLineAlignment::Finish(strategy) => strategy,
                LastLineAlignment::LeftSubPass => {
                    placer = self.left_sub_pass(end, &white_space);
                    AlignmentStrategy::Left
                },
            }
        } else {
            placer.strategy()
        };
        placer.finish(
            finish_strategy,
            &self.sequence,
            &self.breakpoints,
            &mut self.placements,
        );

        let mut warnings = Vec::new();
        let content_end = placer
            .content_end(&self.placements)
            .unwrap_or_else(|| self.line_start());
        let overflow = forced || content_end > self.bounds.inline_end;
        if overflow {
            let excess = if content_end > self.bounds.inline_end {
                content_end - self.bounds.inline_end
            } else {
                Au(0)
            };
            if self.options.debug.warn_overflow {
                warn!("Forced {end} items onto a line, overflowing by {excess:?}");
            } else {
                debug!("Forced {end} items onto a line, overflowing by {excess:?}");
            }
            warnings.push(LayoutWarning::Overflow { excess });
        }

        let (fragments, open) = self.build_fragments(end, &white_space, &mut warnings)?;

        let continuation = open.iter().map(|id| {
            InlineItem::StartBox(BoxStart {
                id: *id,
                is_first_fragment: false,
            })
        });
        self.sequence.items.splice(0..end, continuation);
        self.trim_leading_ignorables();
        self.first_line = false;

        if fragments.is_empty() {
            return Ok(None);
        }

        let line = Line {
            band: self.bounds.band,
            inline_start: self.bounds.inline_start,
            inline_end: self.bounds.inline_end,
            fragments,
            consumed: end,
            is_last: self.sequence.is_empty(),
            overflow,
            warnings,
        };
        if self.options.debug.dump_lines {
            match serde_json::to_string(&line) {
                Ok(json) => debug!("Line: {json}"),
                Err(error) => warn!("Could not serialize line: {error}"),
            }
        }
        Ok(Some(line))
    }

    /// Whether a leaf that is not ignorable is waiting behind the line at `end`.
    fn has_visible_content_after(&self, end: usize) -> bool {
        self.sequence.items[end..]
            .iter()
            .any(|item| item.leaf().is_some_and(|leaf| !leaf.is_ignorable()))
    }

    /// Place the open boxes and the items `[0, end)` again from the line start with a
    /// fresh Left placer. Used for a last line whose END markers did not fit.
    fn left_sub_pass(&mut self, end: usize, white_space: &[WhiteSpace]) -> RunPlacer {
        self.placements.reset(self.sequence.len());
        let mut placer = RunPlacer::new(
            AlignmentStrategy::Left,
            self.line_start(),
            self.options.debug.trace_fitting,
        );

        let sequence = &self.sequence;
        let breakpoints = &self.breakpoints;
        let placements = &mut self.placements;
        fit_runs(sequence, self.options.white_space, |start, count| {
            let count = count.min(end.saturating_sub(start));
            if count == 0 {
                return start;
            }
            placer.handle_element(sequence, breakpoints, placements, start, count)
        });
        placer.collapse_trailing_ignorables(sequence, white_space, placements, end);
        placer
    }

    /// The boxes opened but not closed in `[0, end)`, outermost first.
    fn open_boxes(&self, end: usize) -> SmallVec<[BoxId; 4]> {
        let mut open = SmallVec::new();
        for item in &self.sequence.items[..end] {
            match item {
                InlineItem::StartBox(start) => open.push(start.id),
                InlineItem::EndBox(_) => {
                    open.pop();
                },
                InlineItem::Content(_) => {},
            }
        }
        open
    }

    /// Drop the ignorable items that directly follow the line at `end` and pull the END
    /// markers behind them onto the line, so that the next line neither starts with
    /// filler nor with an empty piece of a box. An END whose inset does not fit in the
    /// current segment stays behind and its box is split. Returns the new end of the line.
    fn absorb_line_end(&mut self, placer: &mut RunPlacer, mut end: usize) -> usize {
        let mut open = self.open_boxes(end);
        loop {
            let white_space = self
                .sequence
                .white_space_of(open.last().copied(), self.options.white_space);
            let (closes_open_box, is_trimmable) = match self.sequence.items.get(end) {
                Some(InlineItem::EndBox(id)) => (
                    open.last() == Some(id) &&
                        placer.fits(&self.sequence, &self.breakpoints, end),
                    false,
                ),
                Some(item) => (
                    false,
                    item.is_ignorable_leaf() && !white_space.preserve_spaces(),
                ),
                None => (false, false),
            };

            if closes_open_box {
                placer.append(&self.sequence, &mut self.placements, end);
                open.pop();
                end += 1;
            } else if is_trimmable {
                self.sequence.items.remove(end);
            } else {
                return end;
            }
        }
    }

    /// Drop ignorable leaves at the start of the remaining sequence, looking through
    /// START markers.
    fn trim_leading_ignorables(&mut self) {
        let mut open = None;
        let mut index = 0;
        while index < self.sequence.items.len() {
            let is_trimmable = match &self.sequence.items[index] {
                InlineItem::StartBox(start) => {
                    open = Some(start.id);
                    index += 1;
                    continue;
                },
                InlineItem::Content(leaf) => {
                    leaf.is_ignorable() &&
                        !self
                            .sequence
                            .white_space_of(open, self.options.white_space)
                            .preserve_spaces()
                },
                InlineItem::EndBox(_) => false,
            };
            if !is_trimmable {
                break;
            }
            self.sequence.items.remove(index);
        }
    }

    /// Turn the placed items `[0, end)` into fragments. Returns the top-level fragments
    /// and the boxes that are split at the end of the line, outermost first.
    fn build_fragments(
        &self,
        end: usize,
        white_space: &[WhiteSpace],
        warnings: &mut Vec<LayoutWarning>,
    ) -> Result<(Vec<LineFragment>, SmallVec<[BoxId; 4]>), LineLayoutError> {
        let items = &self.sequence.items[..end];
        let last_visible = items
            .iter()
            .rposition(|item| item.leaf().is_some_and(|leaf| !leaf.is_ignorable()));

        let mut stack: Vec<BoxFragment> = Vec::new();
        let mut fragments = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let placement = self.placements[index];
            match item {
                InlineItem::StartBox(start) => {
                    let template =
                        self.sequence
                            .boxes
                            .get(start.id)
                            .ok_or(LineLayoutError::UnknownBox {
                                index,
                                id: start.id,
                            })?;
                    stack.push(BoxFragment {
                        id: start.id,
                        tag: template.tag,
                        position: placement.position,
                        width: Au(0),
                        children: Vec::new(),
                        is_first_fragment: start.is_first_fragment,
                        is_last_fragment: false,
                    });
                },
                InlineItem::EndBox(id) => {
                    let mut fragment = match stack.pop() {
                        Some(fragment) if fragment.id == *id => fragment,
                        other => {
                            return Err(LineLayoutError::UnbalancedSequence {
                                index,
                                expected: other.map(|fragment| fragment.id),
                                found: *id,
                            });
                        },
                    };
                    fragment.width = placement.end() - fragment.position;
                    fragment.is_last_fragment = true;
                    attach(&mut stack, &mut fragments, LineFragment::Box(fragment));
                },
                InlineItem::Content(leaf) => {
                    // Ignorable leaves only show up between visible ones.
                    let visible = !leaf.is_ignorable() ||
                        white_space[index].preserve_spaces() ||
                        last_visible.is_some_and(|last| index < last);
                    if !visible {
                        continue;
                    }
                    attach(
                        &mut stack,
                        &mut fragments,
                        LineFragment::Leaf(LeafFragment {
                            leaf: leaf.clone(),
                            position: placement.position,
                            width: placement.width,
                        }),
                    );
                },
            }
        }

        let open: SmallVec<[BoxId; 4]> = stack.iter().map(|fragment| fragment.id).collect();
        let line_end = self.placements[end - 1].end();
        while let Some(mut fragment) = stack.pop() {
            fragment.width = line_end - fragment.position;
            if fragment.width <= Au(0) {
                warn!(
                    "Box {} split at the end of a line has no content on it",
                    fragment.id.0
                );
                warnings.push(LayoutWarning::EmptySplitBox { id: fragment.id });
                fragment.width = Au(1);
            }
            attach(&mut stack, &mut fragments, LineFragment::Box(fragment));
        }
        Ok((fragments, open))
    }
}

fn attach(stack: &mut [BoxFragment], fragments: &mut Vec<LineFragment>, fragment: LineFragment) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(fragment),
        None => fragments.push(fragment),
    }
}

/// Lay out a whole paragraph, stacking lines of `line_height` below the band of
/// `bounds`. Stops early if the band is degenerate.
pub fn layout_paragraph(
    sequence: InlineSequence,
    options: &LineLayoutOptions,
    bounds: LineBounds,
    grid: &dyn PageGrid,
    line_height: Au,
) -> Result<Vec<Line>, LineLayoutError> {
    let mut processor = LineProcessor::new(options.clone());
    processor.init(sequence, bounds, grid)?;

    let mut lines = Vec::new();
    let mut bounds = bounds;
    while processor.has_next() {
        match processor.produce_next_line()? {
            Some(line) => lines.push(line),
            None if bounds.inline_end == bounds.inline_start => break,
            None => {},
        }
        bounds.band = LineBand {
            block_size: line_height,
            ..bounds.band
        }
        .next();
        processor.set_line_bounds(bounds, grid)?;
    }
    Ok(lines)
}
