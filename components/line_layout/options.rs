/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration for a [`crate::LineProcessor`]. Options can be built in code, loaded
//! from JSON, or extended with a comma-separated debug string.

use app_units::Au;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// The alignment mode of the lines of a paragraph.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, EnumString, Eq, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// The subset of the CSS `white-space` property that influences line fitting.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, EnumString, Eq, IntoStaticStr, PartialEq, Serialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    #[default]
    Normal,
    #[serde(rename = "nowrap")]
    #[strum(serialize = "nowrap")]
    NoWrap,
    Pre,
    PreWrap,
}

impl WhiteSpace {
    /// Whether spaces are rendered verbatim, in which case they are never trimmed from
    /// the start or end of a line.
    pub fn preserve_spaces(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap)
    }

    /// Whether lines may be broken between items governed by this value.
    pub fn allow_wrap(self) -> bool {
        matches!(self, WhiteSpace::Normal | WhiteSpace::PreWrap)
    }
}

/// Diagnostic switches, usually set from a string such as `"trace-fitting,dump-lines"`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DebugOptions {
    /// Log every run handed to the alignment strategy.
    pub trace_fitting: bool,

    /// Log each produced line as JSON.
    pub dump_lines: bool,

    /// Log forced overflow at `warn` level instead of `debug`.
    pub warn_overflow: bool,
}

impl DebugOptions {
    pub fn extend(&mut self, debug_string: &str) -> Result<(), String> {
        for option in debug_string.split(',') {
            match option.trim() {
                "trace-fitting" => self.trace_fitting = true,
                "dump-lines" => self.dump_lines = true,
                "warn-overflow" => self.warn_overflow = true,
                "" => {},
                _ => return Err(String::from(option)),
            };
        }
        Ok(())
    }
}

/// Paragraph-level settings for line fitting.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct LineLayoutOptions {
    /// How lines are aligned within their band.
    pub text_align: TextAlign,

    /// Justify the last line of the paragraph too. Ignored unless `text_align` is
    /// [`TextAlign::Justify`].
    pub justify_last_line: bool,

    /// The white-space mode of items that are not inside any box.
    pub white_space: WhiteSpace,

    /// Indentation of the first line of the paragraph (`text-indent`).
    pub text_indent: Au,

    pub debug: DebugOptions,
}

impl LineLayoutOptions {
    pub fn from_json(json: &str) -> Result<LineLayoutOptions, serde_json::Error> {
        serde_json::from_str(json)
    }
}
