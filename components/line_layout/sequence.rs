/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The flattened inline sequence of a paragraph: measured leaves interleaved with the
//! START and END markers of the inline boxes that contain them.
//!
//! For example, `<p>I <b>like truffles</b></p>` flattens to:
//!
//! ```text
//! Content("I") Content(space) Start(b) Content("like") Content(space) Content("truffles") End(b)
//! ```
//!
//! Boxes are stored once in an [`InlineBoxes`] arena and referenced by [`BoxId`] from
//! both their START and END item.

use app_units::Au;
use bitflags::bitflags;
use log::warn;
use serde::Serialize;

use crate::error::LineLayoutError;
use crate::fragment::LineFragment;
use crate::options::WhiteSpace;

/// The index of an inline box in an [`InlineBoxes`] arena.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BoxId(pub usize);

/// An opaque identifier of the node that generated a leaf or a box.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Tag(pub usize);

/// The classification of one position in an inline sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ItemKind {
    Start,
    Content,
    End,
}

/// Padding, border and margin of an inline box in the inline axis.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct InlineInsets {
    pub padding_start: Au,
    pub padding_end: Au,
    pub border_start: Au,
    pub border_end: Au,
    pub margin_start: Au,
    pub margin_end: Au,
}

impl InlineInsets {
    pub fn zero() -> InlineInsets {
        InlineInsets::default()
    }

    /// Insets with the same padding on both sides and no border or margin.
    pub fn padding(padding: Au) -> InlineInsets {
        InlineInsets {
            padding_start: padding,
            padding_end: padding,
            ..InlineInsets::default()
        }
    }

    pub fn inline_start_sum(&self) -> Au {
        self.padding_start + self.border_start + self.margin_start
    }

    pub fn inline_end_sum(&self) -> Au {
        self.padding_end + self.border_end + self.margin_end
    }
}

/// The box-model data of an inline box, shared by every line the box appears on.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InlineBoxTemplate {
    pub tag: Option<Tag>,
    pub insets: InlineInsets,
    pub white_space: WhiteSpace,
}

impl InlineBoxTemplate {
    pub fn new(tag: Option<Tag>, insets: InlineInsets, white_space: WhiteSpace) -> Self {
        InlineBoxTemplate {
            tag,
            insets,
            white_space,
        }
    }
}

/// Arena of the inline boxes of one paragraph.
#[derive(Clone, Debug, Default)]
pub struct InlineBoxes {
    templates: Vec<InlineBoxTemplate>,
}

impl InlineBoxes {
    pub fn new() -> InlineBoxes {
        InlineBoxes::default()
    }

    pub fn push(&mut self, template: InlineBoxTemplate) -> BoxId {
        self.templates.push(template);
        BoxId(self.templates.len() - 1)
    }

    pub fn get(&self, id: BoxId) -> Option<&InlineBoxTemplate> {
        self.templates.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct LeafFlags: u8 {
        /// The leaf has no visible rendering and may be dropped at line edges.
        const IGNORABLE = 1 << 0;
        /// A space that must keep its measured width when a line is justified.
        const NO_STRETCH = 1 << 1;
    }
}

/// What a leaf renders.
#[derive(Clone, Debug, Serialize)]
pub enum LeafContent {
    /// A run of text that has already been shaped and measured.
    Text(String),
    /// An inter-word space.
    Space,
    /// An atomic inline, such as an inline-block, with its own already laid out
    /// contents.
    Atomic(Vec<LineFragment>),
    /// A zero-width mark, for example an anchor.
    Mark,
}

/// A measured leaf of the inline sequence.
#[derive(Clone, Debug, Serialize)]
pub struct InlineLeaf {
    pub tag: Option<Tag>,
    pub content: LeafContent,
    pub inline_size: Au,
    #[serde(skip_serializing)]
    pub flags: LeafFlags,
}

impl InlineLeaf {
    pub fn new(content: LeafContent, inline_size: Au) -> InlineLeaf {
        InlineLeaf {
            tag: None,
            content,
            inline_size,
            flags: LeafFlags::empty(),
        }
    }

    pub fn text(text: &str, inline_size: Au) -> InlineLeaf {
        InlineLeaf::new(LeafContent::Text(text.to_owned()), inline_size)
    }

    pub fn space(inline_size: Au) -> InlineLeaf {
        InlineLeaf::new(LeafContent::Space, inline_size)
    }

    pub fn atomic(inline_size: Au, children: Vec<LineFragment>) -> InlineLeaf {
        InlineLeaf::new(LeafContent::Atomic(children), inline_size)
    }

    pub fn mark() -> InlineLeaf {
        InlineLeaf::new(LeafContent::Mark, Au(0))
    }

    pub fn with_tag(mut self, tag: Tag) -> InlineLeaf {
        self.tag = Some(tag);
        self
    }

    pub fn with_flags(mut self, flags: LeafFlags) -> InlineLeaf {
        self.flags.insert(flags);
        self
    }

    pub fn is_space(&self) -> bool {
        matches!(self.content, LeafContent::Space)
    }

    /// Whether this leaf has no visible rendering of its own. Ignorable leaves are
    /// trimmed from the edges of lines unless white-space is preserved.
    pub fn is_ignorable(&self) -> bool {
        matches!(self.content, LeafContent::Space | LeafContent::Mark) ||
            self.flags.contains(LeafFlags::IGNORABLE)
    }

    /// Whether justification may widen this leaf.
    pub fn is_stretchable(&self) -> bool {
        self.is_space() && !self.flags.contains(LeafFlags::NO_STRETCH)
    }
}

/// The START marker of an inline box.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct BoxStart {
    pub id: BoxId,

    /// False for the synthetic START that continues a box split at a line break. The
    /// inline-start insets are only applied to the first fragment.
    pub is_first_fragment: bool,
}

/// One position in an inline sequence.
#[derive(Clone, Debug, Serialize)]
pub enum InlineItem {
    StartBox(BoxStart),
    Content(InlineLeaf),
    EndBox(BoxId),
}

impl InlineItem {
    pub fn start(id: BoxId) -> InlineItem {
        InlineItem::StartBox(BoxStart {
            id,
            is_first_fragment: true,
        })
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            InlineItem::StartBox(_) => ItemKind::Start,
            InlineItem::Content(_) => ItemKind::Content,
            InlineItem::EndBox(_) => ItemKind::End,
        }
    }

    pub fn leaf(&self) -> Option<&InlineLeaf> {
        match self {
            InlineItem::Content(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub(crate) fn is_ignorable_leaf(&self) -> bool {
        self.leaf().is_some_and(InlineLeaf::is_ignorable)
    }

    pub(crate) fn is_space(&self) -> bool {
        self.leaf().is_some_and(InlineLeaf::is_space)
    }
}

/// A validated, balanced inline sequence together with the boxes it refers to.
#[derive(Clone, Debug, Default)]
pub struct InlineSequence {
    pub(crate) boxes: InlineBoxes,
    pub(crate) items: Vec<InlineItem>,
}

impl InlineSequence {
    /// Creates a sequence, checking that every START has a matching END, that boxes
    /// nest properly and that every referenced box exists.
    pub fn new(
        boxes: InlineBoxes,
        items: Vec<InlineItem>,
    ) -> Result<InlineSequence, LineLayoutError> {
        let mut open = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match item {
                InlineItem::StartBox(start) => {
                    if boxes.get(start.id).is_none() {
                        return Err(LineLayoutError::UnknownBox {
                            index,
                            id: start.id,
                        });
                    }
                    open.push(start.id);
                },
                InlineItem::EndBox(id) => match open.pop() {
                    Some(expected) if expected == *id => {},
                    expected => {
                        return Err(LineLayoutError::UnbalancedSequence {
                            index,
                            expected,
                            found: *id,
                        });
                    },
                },
                InlineItem::Content(_) => {},
            }
        }

        if let Some(id) = open.pop() {
            return Err(LineLayoutError::UnclosedBox { id });
        }

        Ok(InlineSequence { boxes, items })
    }

    pub fn items(&self) -> &[InlineItem] {
        &self.items
    }

    pub fn boxes(&self) -> &InlineBoxes {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The white-space mode in effect inside `id`, falling back to `default` for items
    /// outside of any box.
    pub(crate) fn white_space_of(&self, id: Option<BoxId>, default: WhiteSpace) -> WhiteSpace {
        id.and_then(|id| self.boxes.get(id))
            .map_or(default, |template| template.white_space)
    }

    /// The white-space mode of the context each of the first `end` items sits in. For
    /// START and END items that is the context around the box, not the box itself.
    pub(crate) fn white_space_by_item(&self, end: usize, default: WhiteSpace) -> Vec<WhiteSpace> {
        let mut open: Vec<BoxId> = Vec::new();
        let mut result = Vec::with_capacity(end);
        for item in &self.items[..end] {
            match item {
                InlineItem::StartBox(start) => {
                    result.push(self.white_space_of(open.last().copied(), default));
                    open.push(start.id);
                },
                InlineItem::EndBox(_) => {
                    open.pop();
                    result.push(self.white_space_of(open.last().copied(), default));
                },
                InlineItem::Content(_) => {
                    result.push(self.white_space_of(open.last().copied(), default))
                },
            }
        }
        result
    }

    /// The inline-start inset contributed by a START item.
    pub(crate) fn start_inset(&self, start: &BoxStart) -> Au {
        if !start.is_first_fragment {
            return Au(0);
        }
        self.boxes
            .get(start.id)
            .map_or(Au(0), |template| template.insets.inline_start_sum())
    }

    /// The inline-end inset contributed by an END item.
    pub(crate) fn end_inset(&self, id: BoxId) -> Au {
        self.boxes
            .get(id)
            .map_or(Au(0), |template| template.insets.inline_end_sum())
    }

    /// The measured inline size of the item at `index`, including box insets.
    pub(crate) fn item_inline_size(&self, index: usize) -> Au {
        match &self.items[index] {
            InlineItem::StartBox(start) => self.start_inset(start),
            InlineItem::Content(leaf) => leaf.inline_size,
            InlineItem::EndBox(id) => self.end_inset(*id),
        }
    }
}

/// Builds an [`InlineSequence`] the way a flattening pass walks the box tree.
#[derive(Debug, Default)]
pub struct InlineSequenceBuilder {
    boxes: InlineBoxes,
    items: Vec<InlineItem>,
    open: Vec<BoxId>,
}

impl InlineSequenceBuilder {
    pub fn new() -> InlineSequenceBuilder {
        InlineSequenceBuilder::default()
    }

    pub fn start_box(&mut self, template: InlineBoxTemplate) -> &mut Self {
        let id = self.boxes.push(template);
        self.open.push(id);
        self.items.push(InlineItem::start(id));
        self
    }

    pub fn end_box(&mut self) -> &mut Self {
        match self.open.pop() {
            Some(id) => self.items.push(InlineItem::EndBox(id)),
            None => warn!("Ignoring the end of an inline box that was never started."),
        }
        self
    }

    pub fn leaf(&mut self, leaf: InlineLeaf) -> &mut Self {
        self.items.push(InlineItem::Content(leaf));
        self
    }

    pub fn text(&mut self, text: &str, inline_size: Au) -> &mut Self {
        self.leaf(InlineLeaf::text(text, inline_size))
    }

    pub fn space(&mut self, inline_size: Au) -> &mut Self {
        self.leaf(InlineLeaf::space(inline_size))
    }

    /// Closes any boxes that are still open and validates the result.
    pub fn finish(&mut self) -> Result<InlineSequence, LineLayoutError> {
        while let Some(id) = self.open.pop() {
            self.items.push(InlineItem::EndBox(id));
        }
        InlineSequence::new(
            std::mem::take(&mut self.boxes),
            std::mem::take(&mut self.items),
        )
    }
}
