/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Horizontal page and column breaks. A report page may be cut into several columns by
//! its page grid; a line crossing such a cut is laid out as several physical segments,
//! and no run of content may straddle a segment boundary.

use app_units::Au;
use log::trace;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The vertical band occupied by a line.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LineBand {
    pub block_start: Au,
    pub block_size: Au,
}

impl LineBand {
    pub fn new(block_start: Au, block_size: Au) -> LineBand {
        LineBand {
            block_start,
            block_size,
        }
    }

    /// The band directly below this one, with the same block size.
    pub fn next(&self) -> LineBand {
        LineBand::new(self.block_start + self.block_size, self.block_size)
    }
}

/// The extent of the line a [`crate::LineProcessor`] is currently filling.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct LineBounds {
    pub band: LineBand,
    pub inline_start: Au,
    pub inline_end: Au,

    /// Let content run into the last column instead of splitting one column early.
    pub allow_overflow: bool,
}

impl LineBounds {
    pub fn new(inline_start: Au, inline_end: Au) -> LineBounds {
        LineBounds {
            band: LineBand::default(),
            inline_start,
            inline_end,
            allow_overflow: false,
        }
    }

    pub fn with_band(mut self, band: LineBand) -> LineBounds {
        self.band = band;
        self
    }

    pub fn with_overflow(mut self, allow_overflow: bool) -> LineBounds {
        self.allow_overflow = allow_overflow;
        self
    }

    pub fn inline_size(&self) -> Au {
        self.inline_end - self.inline_start
    }
}

/// Supplies the horizontal break coordinates of the page grid for a band.
pub trait PageGrid {
    /// The break coordinates intersecting `band`. They need not be sorted or limited to
    /// the line's extent.
    fn horizontal_breaks(&self, band: &LineBand) -> Vec<Au>;
}

/// A page without horizontal breaks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPageGrid;

impl PageGrid for NoPageGrid {
    fn horizontal_breaks(&self, _: &LineBand) -> Vec<Au> {
        Vec::new()
    }
}

/// A grid whose breaks are the same for every band, such as fixed page columns.
#[derive(Clone, Debug, Default)]
pub struct ColumnGrid {
    breaks: Vec<Au>,
}

impl ColumnGrid {
    pub fn new(breaks: Vec<Au>) -> ColumnGrid {
        ColumnGrid { breaks }
    }
}

impl PageGrid for ColumnGrid {
    fn horizontal_breaks(&self, _: &LineBand) -> Vec<Au> {
        self.breaks.clone()
    }
}

impl<F> PageGrid for F
where
    F: Fn(&LineBand) -> Vec<Au>,
{
    fn horizontal_breaks(&self, band: &LineBand) -> Vec<Au> {
        self(band)
    }
}

/// The in-range breakpoints of the current line, ending with the line end. Segment `i`
/// of the line spans from the previous breakpoint (or the line start) to breakpoint `i`.
#[derive(Clone, Debug, Default)]
pub struct Breakpoints {
    key: Option<(LineBand, Au, Au, bool)>,
    start: Au,
    breaks: SmallVec<[Au; 4]>,
}

impl Breakpoints {
    pub fn new() -> Breakpoints {
        Breakpoints::default()
    }

    /// Recomputes the breakpoints for `bounds` unless they were already computed for
    /// the same band and extent. Returns true if they were recomputed.
    pub fn update(&mut self, bounds: &LineBounds, grid: &dyn PageGrid) -> bool {
        let key = (
            bounds.band,
            bounds.inline_start,
            bounds.inline_end,
            bounds.allow_overflow,
        );
        if self.key == Some(key) {
            return false;
        }

        self.key = Some(key);
        self.start = bounds.inline_start;
        self.breaks = Breakpoints::compute(
            bounds.inline_start,
            bounds.inline_end,
            &grid.horizontal_breaks(&bounds.band),
            bounds.allow_overflow,
        );
        trace!(
            "Breakpoints for [{:?}, {:?}): {:?}",
            bounds.inline_start, bounds.inline_end, self.breaks
        );
        true
    }

    /// Filters `supplied` to the coordinates strictly inside `(start, end)`, drops the
    /// last of them in overflow mode and appends `end`.
    pub fn compute(start: Au, end: Au, supplied: &[Au], allow_overflow: bool) -> SmallVec<[Au; 4]> {
        let mut breaks: SmallVec<[Au; 4]> = supplied
            .iter()
            .copied()
            .filter(|position| *position > start && *position < end)
            .collect();
        breaks.sort_unstable();
        breaks.dedup();
        if allow_overflow {
            breaks.pop();
        }
        breaks.push(end);
        breaks
    }

    pub fn as_slice(&self) -> &[Au] {
        &self.breaks
    }

    pub fn segment_count(&self) -> usize {
        self.breaks.len()
    }

    pub fn segment_start(&self, segment: usize) -> Au {
        match segment {
            0 => self.start,
            _ => self.breaks[segment - 1],
        }
    }

    pub fn segment_end(&self, segment: usize) -> Au {
        self.breaks[segment]
    }
}
