/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]

//! Line fitting and alignment for inline content in paginated layout.
//!
//! Upstream code flattens a paragraph into an [`InlineSequence`] of measured leaves and
//! inline box markers. A [`LineProcessor`] then cuts the sequence into [`Line`]s one at
//! a time, respecting the column breaks of the page grid, the alignment mode of the
//! paragraph and the white-space mode of each box. Boxes that do not fit on one line are
//! split, and continue on the next line.

mod alignment;
mod error;
mod fitting;
mod fragment;
mod options;
mod page_grid;
mod placement;
mod processor;
mod sequence;
mod sizing;

pub use alignment::{AlignmentStrategy, LastLineAlignment};
pub use error::{LayoutWarning, LineLayoutError};
pub use fitting::{FitResult, fit_runs};
pub use fragment::{BoxFragment, LeafFragment, Line, LineFragment};
pub use options::{DebugOptions, LineLayoutOptions, TextAlign, WhiteSpace};
pub use page_grid::{Breakpoints, ColumnGrid, LineBand, LineBounds, NoPageGrid, PageGrid};
pub use placement::{Placement, PlacementBuffer};
pub use processor::{LineProcessor, layout_paragraph};
pub use sequence::{
    BoxId, BoxStart, InlineBoxTemplate, InlineBoxes, InlineInsets, InlineItem, InlineLeaf,
    InlineSequence, InlineSequenceBuilder, ItemKind, LeafContent, LeafFlags, Tag,
};
pub use sizing::ContentSizes;
