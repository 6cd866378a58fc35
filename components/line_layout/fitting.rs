/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The fitting pass. It splits the working sequence into runs that must stay on the
//! same line and hands them, in order, to a placement callback until one is refused.
//!
//! A run boundary is allowed between items `i - 1` and `i` when:
//!
//! * item `i - 1` is not a START (a box never ends a line right after opening),
//! * item `i` is not an END (a box never starts a line by closing),
//! * item `i - 1` is not a space followed by non-space content (spaces stay with the
//!   word after them), and
//! * the white-space mode on both sides allows wrapping.

use log::trace;
use smallvec::SmallVec;

use crate::options::WhiteSpace;
use crate::sequence::{InlineItem, InlineSequence};

/// The outcome of one fitting pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FitResult {
    /// The length of the prefix that was placed.
    pub placed: usize,

    /// The end of the first run, if it does not cover the whole sequence. Forcing this
    /// prefix onto a line always makes progress.
    pub skip_index: Option<usize>,

    /// The last boundary seen by the pass. Nothing consults it yet; it marks where a
    /// finer-grained breaking strategy would start looking.
    pub breakable_index: Option<usize>,
}

fn is_run_boundary(
    previous: &InlineItem,
    current: &InlineItem,
    previous_white_space: WhiteSpace,
    current_white_space: WhiteSpace,
) -> bool {
    if matches!(previous, InlineItem::StartBox(_)) || matches!(current, InlineItem::EndBox(_)) {
        return false;
    }
    if previous.is_space() && current.leaf().is_some_and(|leaf| !leaf.is_space()) {
        return false;
    }
    previous_white_space.allow_wrap() && current_white_space.allow_wrap()
}

/// Walk `sequence` and call `handle_element(start, count)` once per run. The callback
/// returns the index up to which it placed items; a return value `<= start` ends the
/// pass, and the placed prefix stops at the previous run.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "LineLayout::fit_runs",
        skip_all,
        fields(servo_profiling = true),
        level = "trace",
    )
)]
pub fn fit_runs<F>(sequence: &InlineSequence, default: WhiteSpace, mut handle_element: F) -> FitResult
where
    F: FnMut(usize, usize) -> usize,
{
    let items = sequence.items();
    let mut result = FitResult::default();
    if items.is_empty() {
        return result;
    }

    let mut context: SmallVec<[WhiteSpace; 8]> = SmallVec::new();
    let mut run_start = 0;
    let mut previous_white_space = default;

    for (index, item) in items.iter().enumerate() {
        let enclosing = context.last().copied().unwrap_or(default);
        let white_space = match item {
            InlineItem::StartBox(start) => {
                context.push(sequence.white_space_of(Some(start.id), default));
                enclosing
            },
            InlineItem::EndBox(_) => {
                context.pop();
                context.last().copied().unwrap_or(default)
            },
            InlineItem::Content(_) => enclosing,
        };

        if index > 0 &&
            is_run_boundary(
                &items[index - 1],
                item,
                previous_white_space,
                white_space,
            )
        {
            result.breakable_index = Some(index);
            if result.skip_index.is_none() {
                result.skip_index = Some(index);
            }

            let processed_up_to = handle_element(run_start, index - run_start);
            trace!("Run [{run_start}, {index}) placed up to {processed_up_to}");
            if processed_up_to <= run_start {
                result.placed = run_start;
                return result;
            }
            run_start = index;
        }
        previous_white_space = white_space;
    }

    let processed_up_to = handle_element(run_start, items.len() - run_start);
    trace!(
        "Final run [{run_start}, {}) placed up to {processed_up_to}",
        items.len()
    );
    result.placed = if processed_up_to <= run_start {
        run_start
    } else {
        items.len()
    };
    result
}
