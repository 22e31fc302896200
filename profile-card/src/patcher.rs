// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field patching with dot-leader alignment.
//!
//! Each tracked metric owns a value element (`<id>`) and an optional leader
//! element (`<id>_dots`). Patching writes the formatted value into the first
//! and a run of dots into the second so the value lines up with the column
//! width the template was designed for. Missing elements are skipped.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    document::{Document, ElementPath},
    metrics::{FieldDescriptor, MetricValue, MetricsBundle}
};

/// Suffix appended to a value identifier to address its leader element.
pub const DOTS_SUFFIX: &str = "_dots";

/// Computes the dot leader that pads `value` to `width` characters.
///
/// Gaps of zero, one and two characters map to `""`, `" "` and `". "`. Wider
/// gaps produce a space, `gap` dots and a closing space.
///
/// # Example
///
/// ```
/// use profile_card::dot_leader;
///
/// assert_eq!(dot_leader("250", 10), " ....... ");
/// assert_eq!(dot_leader("", 1), " ");
/// assert_eq!(dot_leader("12345678", 10), ". ");
/// ```
pub fn dot_leader(value: &str, width: usize) -> String {
    let gap = width.saturating_sub(value.chars().count());
    match gap {
        0 => String::new(),
        1 => " ".to_owned(),
        2 => ". ".to_owned(),
        _ => {
            let mut leader = String::with_capacity(gap + 2);
            leader.push(' ');
            leader.extend(std::iter::repeat_n('.', gap));
            leader.push(' ');
            leader
        }
    }
}

/// Patches a single field by direct lookup.
///
/// Sets the text of the element identified by `id` and the leader of
/// `id_dots`. Absent elements are tolerated.
pub fn apply_field(document: &mut Document, id: &str, value: &MetricValue, width: usize) {
    let text = value.to_string();
    let leader = dot_leader(&text, width);

    match document.root.find_by_id_mut(id) {
        Some(element) => element.set_text(&text),
        None => debug!(id, "value element not present, skipping")
    }

    let dots_id = format!("{id}{DOTS_SUFFIX}");
    if let Some(element) = document.root.find_by_id_mut(&dots_id) {
        element.set_text(&leader);
    }
}

/// Applies many fields against one document using a shared identifier index.
///
/// The index is built once on construction. Patching only rewrites text, so
/// recorded element paths stay valid for the lifetime of the patcher.
#[derive(Debug)]
pub struct FieldPatcher<'a> {
    document: &'a mut Document,
    index:    HashMap<String, ElementPath>
}

impl<'a> FieldPatcher<'a> {
    /// Indexes `document` for patching.
    pub fn new(document: &'a mut Document) -> Self {
        let index = document.id_index();
        Self {
            document,
            index
        }
    }

    /// Patches one field; returns `true` when the value element was found.
    pub fn apply(&mut self, field: &FieldDescriptor) -> bool {
        let text = field.value.to_string();
        let leader = dot_leader(&text, field.width);

        let found = self.set_text(field.id, &text);
        if !found {
            debug!(id = field.id, "value element not present, skipping");
        }
        self.set_text(&format!("{}{DOTS_SUFFIX}", field.id), &leader);
        found
    }

    fn set_text(&mut self, id: &str, text: &str) -> bool {
        let Some(path) = self.index.get(id) else {
            return false;
        };
        match self.document.element_at_mut(path) {
            Some(element) => {
                element.set_text(text);
                true
            }
            None => false
        }
    }
}

/// Patches all tracked metrics of `bundle` into `document`.
///
/// Returns the number of value elements that were present.
pub fn apply_metrics(document: &mut Document, bundle: &MetricsBundle) -> usize {
    let mut patcher = FieldPatcher::new(document);
    bundle
        .descriptors()
        .iter()
        .filter(|field| patcher.apply(field))
        .count()
}
