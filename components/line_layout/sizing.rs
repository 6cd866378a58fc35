/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Intrinsic inline sizes of a paragraph.

use app_units::Au;
use serde::Serialize;

use crate::fitting::fit_runs;
use crate::options::WhiteSpace;
use crate::sequence::InlineSequence;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ContentSizes {
    /// The widest run that cannot be broken.
    pub min_content: Au,
    /// The width of the whole paragraph on a single line.
    pub max_content: Au,
}

impl InlineSequence {
    /// The min-content and max-content inline sizes, using the default white-space mode
    /// for items outside of any box.
    pub fn content_sizes(&self) -> ContentSizes {
        self.content_sizes_with(WhiteSpace::Normal)
    }

    pub fn content_sizes_with(&self, white_space: WhiteSpace) -> ContentSizes {
        let mut sizes = ContentSizes::default();
        fit_runs(self, white_space, |start, count| {
            // A run that starts a line loses its leading spaces.
            let run_size = (start..start + count)
                .skip_while(|index| self.items[*index].is_ignorable_leaf())
                .map(|index| self.item_inline_size(index))
                .fold(Au(0), |total, size| total + size);
            sizes.min_content = sizes.min_content.max(run_size);
            start + count
        });
        sizes.max_content = (0..self.len())
            .map(|index| self.item_inline_size(index))
            .fold(Au(0), |total, size| total + size);
        sizes
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sequence::{InlineBoxTemplate, InlineInsets, InlineSequenceBuilder};

    #[test]
    fn test_content_sizes() {
        let sequence = InlineSequenceBuilder::new()
            .text("Hello", Au(50))
            .space(Au(10))
            .start_box(InlineBoxTemplate::new(
                None,
                InlineInsets::padding(Au(5)),
                WhiteSpace::Normal,
            ))
            .text("World", Au(60))
            .end_box()
            .finish()
            .unwrap();
        let sizes = sequence.content_sizes();
        assert_eq!(sizes.min_content, Au(70));
        assert_eq!(sizes.max_content, Au(130));
    }

    #[test]
    fn test_nowrap_content_sizes() {
        let sequence = InlineSequenceBuilder::new()
            .text("Hello", Au(50))
            .space(Au(10))
            .text("World", Au(50))
            .finish()
            .unwrap();
        assert_eq!(sequence.content_sizes().min_content, Au(50));

        let sizes = sequence.content_sizes_with(WhiteSpace::NoWrap);
        assert_eq!(sizes.min_content, Au(110));
        assert_eq!(sizes.max_content, Au(110));
    }
}
