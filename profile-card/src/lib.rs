// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dark and light GitHub profile card generation.
//!
//! The library patches SVG profile cards in place: it fills metric values and
//! their dot leaders into elements addressed by identifier, strips template
//! content the card no longer uses and injects an ASCII-art block plus a block
//! of static profile fields. Every step is idempotent, so running the pipeline
//! against its own output changes nothing but the metric values.

mod canvas;
mod config;
mod document;
mod error;
pub mod github;
mod injector;
mod locator;
mod metrics;
mod patcher;
mod render;

pub use canvas::build_canvas;
pub use config::{CardConfig, DEFAULT_ASCII_SOURCES, ProfileField, default_profile_fields};
pub use document::{Document, Element, ElementPath, Node};
pub use error::{Error, io_error, svg_io_error};
pub use injector::{
    ASCII_BLOCK_ID, ASCII_LINES, InjectionReport, PROFILE_BLOCK_ID, PROTECTED_IDS, StripReason,
    Theme, apply_customizations, build_ascii_block, inject_ascii, inject_profile_fields,
    load_ascii_lines, normalize_ascii_lines, split_ascii_lines, strip_reason,
    strip_template_content
};
pub use locator::{
    DEFAULT_REFERENCE_DIR, DocumentOrigin, LocatedDocument, ensure_document, reference_path
};
pub use metrics::{
    AgeSpan, DEFAULT_BIRTHDAY, FieldDescriptor, MetricValue, MetricsBundle, format_age,
    group_thousands, parse_birthday
};
pub use patcher::{DOTS_SUFFIX, FieldPatcher, apply_field, apply_metrics, dot_leader};
pub use render::{
    DEFAULT_DARK_OUTPUT, DEFAULT_LIGHT_OUTPUT, RenderMode, RenderPlan, RenderedCard, render_card,
    render_cards
};
