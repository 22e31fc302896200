// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Card rendering pipeline.
//!
//! For every output path the pipeline obtains a document (blank canvas or
//! located template), patches the tracked metrics, applies the content
//! injector and writes the result back to the output path.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    canvas::build_canvas,
    config::ProfileField,
    error::Error,
    injector::{InjectionReport, Theme, apply_customizations},
    locator::{DEFAULT_REFERENCE_DIR, DocumentOrigin, LocatedDocument, ensure_document},
    metrics::MetricsBundle,
    patcher::apply_metrics
};

/// Default output path of the dark card.
pub const DEFAULT_DARK_OUTPUT: &str = "dark_mode.svg";
/// Default output path of the light card.
pub const DEFAULT_LIGHT_OUTPUT: &str = "light_mode.svg";

/// How the starting document is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Patch the existing target or its reference template.
    Patch,
    /// Build a blank canvas from scratch.
    Generate
}

/// Inputs shared by every card of one run.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    /// Output paths, rendered in order.
    pub outputs:        Vec<PathBuf>,
    /// Directory holding reference templates.
    pub reference_dir:  PathBuf,
    /// Document source selection.
    pub mode:           RenderMode,
    /// Title written onto generated canvases.
    pub title:          String,
    /// Normalized ASCII-art lines.
    pub ascii_lines:    Vec<String>,
    /// Static profile lines.
    pub profile_fields: Vec<ProfileField>
}

impl RenderPlan {
    /// Creates a plan for the default dark and light outputs.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            outputs:        vec![
                PathBuf::from(DEFAULT_DARK_OUTPUT),
                PathBuf::from(DEFAULT_LIGHT_OUTPUT),
            ],
            reference_dir:  PathBuf::from(DEFAULT_REFERENCE_DIR),
            mode:           RenderMode::Patch,
            title:          title.into(),
            ascii_lines:    Vec::new(),
            profile_fields: Vec::new()
        }
    }
}

/// Summary of one written card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    /// Written file.
    pub path:           PathBuf,
    /// Template origin; `None` for generated canvases.
    pub origin:         Option<DocumentOrigin>,
    /// Number of metric value elements found and patched.
    pub patched_fields: usize,
    /// Injector outcome, including the theme.
    pub injection:      InjectionReport
}

/// Renders every output of `plan` with the same metrics.
///
/// # Errors
///
/// Stops at the first card that fails to resolve, parse or write.
pub fn render_cards(plan: &RenderPlan, metrics: &MetricsBundle) -> Result<Vec<RenderedCard>, Error> {
    plan.outputs
        .iter()
        .map(|output| render_card(plan, output, metrics))
        .collect()
}

/// Renders a single card to `output`.
///
/// If the reference template cannot be copied to `output`, the reference is
/// patched and written instead; [`RenderedCard::path`] names the file
/// actually written.
///
/// # Errors
///
/// Returns template resolution, parse and write errors.
pub fn render_card(
    plan: &RenderPlan,
    output: &Path,
    metrics: &MetricsBundle
) -> Result<RenderedCard, Error> {
    let filename = output
        .file_name()
        .map_or_else(|| output.to_string_lossy(), |name| name.to_string_lossy());

    let (mut document, origin, destination) = match plan.mode {
        RenderMode::Generate => (
            build_canvas(Theme::from_filename(&filename), &plan.title),
            None,
            output.to_path_buf()
        ),
        RenderMode::Patch => {
            let located = ensure_document(output, &plan.reference_dir)?;
            let destination = write_target(output, &located);
            (located.document, Some(located.origin), destination)
        }
    };

    let patched_fields = apply_metrics(&mut document, metrics);
    let injection =
        apply_customizations(&mut document, &filename, &plan.ascii_lines, &plan.profile_fields);
    document.write_to(&destination)?;

    info!(
        path = %destination.display(),
        theme = injection.theme.as_str(),
        patched_fields,
        "wrote card"
    );

    Ok(RenderedCard {
        path: destination,
        origin,
        patched_fields,
        injection
    })
}

/// Path the patched document is written to.
///
/// When the template could not be copied next to `output`, the reference
/// itself is patched in place.
fn write_target(output: &Path, located: &LocatedDocument) -> PathBuf {
    match located.origin {
        DocumentOrigin::ReadFromReference => {
            warn!(
                output = %output.display(),
                reference = %located.source.display(),
                "output path unavailable, patching reference template in place"
            );
            located.source.clone()
        }
        DocumentOrigin::Existing | DocumentOrigin::CopiedFromReference => output.to_path_buf()
    }
}
