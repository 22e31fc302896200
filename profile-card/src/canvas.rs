// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Minimal card document built from scratch.
//!
//! Generate mode skips the reference templates entirely. The canvas carries a
//! background, a title and a metrics section whose value and leader elements
//! use the protected identifiers, so the field patcher and the injector treat
//! it exactly like a template.

use crate::{
    document::{Document, Element, Node},
    injector::Theme
};

const WIDTH: &str = "900";
const HEIGHT: &str = "540";
const SANS_FONT: &str = "Segoe UI, Ubuntu, Sans-Serif";
const METRICS_X: &str = "380";
const METRICS_Y: u32 = 350;
const METRICS_LINE_HEIGHT: u32 = 20;

/// One piece of a metrics row: literal label text or a patchable slot.
enum Segment {
    Label(&'static str),
    Slot(&'static str)
}

const METRIC_ROWS: &[&[Segment]] = &[
    &[Segment::Label("Uptime:"), Segment::Slot("age_data_dots"), Segment::Slot("age_data")],
    &[
        Segment::Label("Followers:"),
        Segment::Slot("follower_data_dots"),
        Segment::Slot("follower_data")
    ],
    &[
        Segment::Label("Repos:"),
        Segment::Slot("repo_data_dots"),
        Segment::Slot("repo_data"),
        Segment::Label(" {Contributed: "),
        Segment::Slot("contrib_data"),
        Segment::Label("}")
    ],
    &[
        Segment::Label("Commits:"),
        Segment::Slot("commit_data_dots"),
        Segment::Slot("commit_data"),
        Segment::Label(" | Stars:"),
        Segment::Slot("star_data_dots"),
        Segment::Slot("star_data")
    ],
    &[
        Segment::Label("Lines of Code:"),
        Segment::Slot("loc_data_dots"),
        Segment::Slot("loc_data"),
        Segment::Label(" ( "),
        Segment::Slot("loc_add"),
        Segment::Label("++, "),
        Segment::Slot("loc_del_dots"),
        Segment::Slot("loc_del"),
        Segment::Label("-- )")
    ]
];

/// Builds the blank canvas for `theme`, titled with `title`.
///
/// # Example
///
/// ```
/// use profile_card::{Theme, build_canvas};
///
/// let canvas = build_canvas(Theme::Dark, "octocat");
/// assert!(canvas.root.find_by_id("follower_data").is_some());
/// ```
pub fn build_canvas(theme: Theme, title: &str) -> Document {
    let foreground = theme.foreground();
    let mut svg = Element::new("svg")
        .with_attribute("xmlns", "http://www.w3.org/2000/svg")
        .with_attribute("version", "1.1")
        .with_attribute("width", WIDTH)
        .with_attribute("height", HEIGHT);

    svg.push_element(
        Element::new("rect")
            .with_attribute("x", "0")
            .with_attribute("y", "0")
            .with_attribute("width", WIDTH)
            .with_attribute("height", HEIGHT)
            .with_attribute("rx", "8")
            .with_attribute("fill", theme.background())
    );

    let mut heading = sans_text("20", "24", foreground, "14px");
    heading.set_text(title);
    svg.push_element(heading);

    let mut y = METRICS_Y;
    for row in METRIC_ROWS {
        svg.push_element(metrics_row(row, y, foreground));
        y += METRICS_LINE_HEIGHT;
    }

    Document::new(svg)
}

fn sans_text(x: &str, y: &str, fill: &str, size: &str) -> Element {
    Element::new("text")
        .with_attribute("x", x)
        .with_attribute("y", y)
        .with_attribute("fill", fill)
        .with_attribute("font-size", size)
        .with_attribute("font-family", SANS_FONT)
}

fn metrics_row(segments: &[Segment], y: u32, fill: &str) -> Element {
    let mut text = sans_text(METRICS_X, &y.to_string(), fill, "12px");
    for segment in segments {
        match segment {
            Segment::Label(label) => text.children.push(Node::Text((*label).to_owned())),
            Segment::Slot(id) => text.push_element(Element::new("tspan").with_attribute("id", *id))
        }
    }
    text
}
