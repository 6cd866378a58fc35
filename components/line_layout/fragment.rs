/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The output of line fitting: one [`Line`] per call to
//! [`crate::LineProcessor::produce_next_line`], holding a tree of positioned fragments.

use app_units::Au;
use serde::Serialize;

use crate::error::LayoutWarning;
use crate::page_grid::LineBand;
use crate::sequence::{BoxId, InlineLeaf, Tag};

#[derive(Clone, Debug, Serialize)]
pub enum LineFragment {
    Box(BoxFragment),
    Leaf(LeafFragment),
}

impl LineFragment {
    pub fn position(&self) -> Au {
        match self {
            LineFragment::Box(fragment) => fragment.position,
            LineFragment::Leaf(fragment) => fragment.position,
        }
    }

    pub fn width(&self) -> Au {
        match self {
            LineFragment::Box(fragment) => fragment.width,
            LineFragment::Leaf(fragment) => fragment.width,
        }
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a LeafFragment>) {
        match self {
            LineFragment::Box(fragment) => {
                for child in &fragment.children {
                    child.collect_leaves(leaves);
                }
            },
            LineFragment::Leaf(fragment) => leaves.push(fragment),
        }
    }
}

/// The part of an inline box that lies on one line. A box split across lines produces
/// one `BoxFragment` per line, all sharing the same [`BoxId`].
#[derive(Clone, Debug, Serialize)]
pub struct BoxFragment {
    pub id: BoxId,
    pub tag: Option<Tag>,
    pub position: Au,
    pub width: Au,
    pub children: Vec<LineFragment>,

    /// Whether the inline-start insets of the box were applied on this line.
    pub is_first_fragment: bool,

    /// Whether the box ends on this line, so that its inline-end insets were applied.
    pub is_last_fragment: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LeafFragment {
    pub leaf: InlineLeaf,
    pub position: Au,
    pub width: Au,
}

impl LeafFragment {
    pub fn end(&self) -> Au {
        self.position + self.width
    }
}

/// One physical line.
#[derive(Clone, Debug, Serialize)]
pub struct Line {
    pub band: LineBand,
    pub inline_start: Au,
    pub inline_end: Au,
    pub fragments: Vec<LineFragment>,

    /// The number of items of the working sequence this line took, not counting
    /// ignorable items that were trimmed after it.
    pub consumed: usize,

    /// Whether this line exhausted the sequence.
    pub is_last: bool,

    /// Whether content was forced onto this line past its inline end.
    pub overflow: bool,

    pub warnings: Vec<LayoutWarning>,
}

impl Line {
    /// All leaf fragments of the line in sequence order, including the ones nested in
    /// boxes.
    pub fn leaves(&self) -> Vec<&LeafFragment> {
        let mut leaves = Vec::new();
        for fragment in &self.fragments {
            fragment.collect_leaves(&mut leaves);
        }
        leaves
    }

    /// The inline end of the rightmost fragment, or the line start for an empty line.
    pub fn content_end(&self) -> Au {
        self.fragments
            .iter()
            .map(|fragment| fragment.position() + fragment.width())
            .max()
            .unwrap_or(self.inline_start)
    }
}
