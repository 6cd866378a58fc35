/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::{Index, IndexMut};

use app_units::Au;
use serde::Serialize;

/// The inline position and width the fitting pass assigned to one sequence item.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub position: Au,
    pub width: Au,
}

impl Placement {
    pub fn end(&self) -> Au {
        self.position + self.width
    }
}

/// Placements parallel to the working sequence. The buffer is reused between fitting
/// attempts: [`PlacementBuffer::reset`] overwrites the entries instead of reallocating.
#[derive(Clone, Debug, Default)]
pub struct PlacementBuffer {
    placements: Vec<Placement>,
}

impl PlacementBuffer {
    pub fn new() -> PlacementBuffer {
        PlacementBuffer::default()
    }

    /// Zero the first `len` placements and make them the active range.
    pub fn reset(&mut self, len: usize) {
        self.placements.truncate(len);
        for placement in self.placements.iter_mut() {
            *placement = Placement::default();
        }
        self.placements.resize(len, Placement::default());
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }
}

impl Index<usize> for PlacementBuffer {
    type Output = Placement;

    fn index(&self, index: usize) -> &Placement {
        &self.placements[index]
    }
}

impl IndexMut<usize> for PlacementBuffer {
    fn index_mut(&mut self, index: usize) -> &mut Placement {
        &mut self.placements[index]
    }
}
