/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;

use app_units::Au;
use serde::Serialize;

use crate::sequence::BoxId;

/// Errors produced by the line processor. All of these indicate a bug in the code that
/// produced the inline sequence or drives the processor, never a layout situation that
/// can be recovered from by trying again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineLayoutError {
    /// The inline end of the line lies before its inline start.
    InvalidLineBounds { start: Au, end: Au },
    /// An END item closed a box that was not open, or closed the wrong box.
    UnbalancedSequence {
        index: usize,
        expected: Option<BoxId>,
        found: BoxId,
    },
    /// A START item was never closed by a matching END item.
    UnclosedBox { id: BoxId },
    /// An item referenced a box that is not part of the sequence's box arena.
    UnknownBox { index: usize, id: BoxId },
}

impl fmt::Display for LineLayoutError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineLayoutError::InvalidLineBounds { start, end } => write!(
                f,
                "line end {:?} lies before line start {:?}",
                end, start
            ),
            LineLayoutError::UnbalancedSequence {
                index,
                expected: Some(expected),
                found,
            } => write!(
                f,
                "END of box {} at index {} while box {} is open",
                found.0, index, expected.0
            ),
            LineLayoutError::UnbalancedSequence {
                index,
                expected: None,
                found,
            } => write!(
                f,
                "END of box {} at index {} with no open box",
                found.0, index
            ),
            LineLayoutError::UnclosedBox { id } => write!(f, "box {} is never closed", id.0),
            LineLayoutError::UnknownBox { index, id } => {
                write!(f, "item {} refers to unknown box {}", index, id.0)
            },
        }
    }
}

impl std::error::Error for LineLayoutError {}

/// Non-fatal conditions recorded while producing a line. These never abort layout, but
/// the caller may want to surface them as rendering warnings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LayoutWarning {
    /// Nothing fit on the line, so content was placed anyway and extends past the line
    /// end by `excess`.
    Overflow { excess: Au },
    /// A box split at the end of the line had no content on this line. It was given a
    /// width of one app unit.
    EmptySplitBox { id: BoxId },
}
