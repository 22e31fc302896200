// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Idempotent content injection.
//!
//! Injection runs in three steps against the root element:
//!
//! 1. a strip pass that removes template styling and right-column content not
//!    owned by the field patcher,
//! 2. the ASCII-art block (`#ascii_block`),
//! 3. the profile-fields block (`#profile_block`).
//!
//! Both blocks are removed before being rebuilt, so applying the injector to
//! its own output yields the same document.

use std::{fs, path::Path};

use tracing::{debug, info, warn};

use crate::{
    config::ProfileField,
    document::{Document, Element},
    error::Error
};

/// Number of lines in the ASCII-art block.
pub const ASCII_LINES: usize = 25;
/// Identifier of the injected ASCII-art group.
pub const ASCII_BLOCK_ID: &str = "ascii_block";
/// Identifier of the injected profile-fields group.
pub const PROFILE_BLOCK_ID: &str = "profile_block";

const ASCII_X: &str = "15";
const ASCII_Y: u32 = 30;
const ASCII_LINE_HEIGHT: u32 = 12;
const ASCII_FONT_FAMILY: &str =
    "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, \"Liberation Mono\", \"Courier New\", monospace";
const ASCII_FONT_SIZE: &str = "10px";
const ASCII_CLASS: &str = "ascii";

const PROFILE_X: u32 = 390;
const PROFILE_Y: u32 = 90;
const PROFILE_LINE_HEIGHT: u32 = 18;
const PROFILE_CLASS: &str = "value";

/// Horizontal offset at which template text is considered right-column
/// content.
pub const RIGHT_COLUMN_X: f64 = 380.0;

/// Identifiers managed by the field patcher; never stripped.
pub const PROTECTED_IDS: &[&str] = &[
    "age_data",
    "age_data_dots",
    "follower_data",
    "follower_data_dots",
    "commit_data",
    "commit_data_dots",
    "star_data",
    "star_data_dots",
    "repo_data",
    "repo_data_dots",
    "contrib_data",
    "loc_data",
    "loc_data_dots",
    "loc_add",
    "loc_del",
    "loc_del_dots"
];

const RESERVED_CLASSES: &[&str] = &["ascii", "key", "value", "cc"];

const TEMPLATE_KEYWORDS: &[&str] = &[
    "os:", "uptime:", "host:", "kernel:", "ide:", "languages", "hobbies", "contact", "linkedin",
    "discord", "portfolio", "andrew", "grant", "ttm", "idea"
];

/// Visual variant of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Light text on a dark background.
    Dark,
    /// Dark text on a light background.
    Light
}

impl Theme {
    /// Selects the theme from a target filename.
    ///
    /// # Example
    ///
    /// ```
    /// use profile_card::Theme;
    ///
    /// assert_eq!(Theme::from_filename("out/Dark_Mode.svg"), Theme::Dark);
    /// assert_eq!(Theme::from_filename("light_mode.svg"), Theme::Light);
    /// ```
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_lowercase().contains("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Foreground colour used for injected text.
    pub fn foreground(self) -> &'static str {
        match self {
            Self::Dark => "#c9d1d9",
            Self::Light => "#24292f"
        }
    }

    /// Background colour used by the blank canvas.
    pub fn background(self) -> &'static str {
        match self {
            Self::Dark => "#0d1117",
            Self::Light => "#ffffff"
        }
    }

    /// Lowercase theme name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light"
        }
    }
}

/// Outcome of one [`apply_customizations`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionReport {
    /// Theme derived from the filename.
    pub theme:          Theme,
    /// Elements removed by the strip pass.
    pub stripped:       usize,
    /// Whether the ASCII block was injected.
    pub ascii_injected: bool,
    /// Number of profile lines injected.
    pub profile_lines:  usize
}

/// Strips template content and injects the ASCII and profile blocks.
///
/// ASCII failures are logged and leave no block behind; they never abort the
/// run.
pub fn apply_customizations(
    document: &mut Document,
    filename: &str,
    ascii_lines: &[String],
    profile_fields: &[ProfileField]
) -> InjectionReport {
    let theme = Theme::from_filename(filename);
    let stripped = strip_template_content(&mut document.root);

    let ascii_injected = match inject_ascii(&mut document.root, ascii_lines, theme) {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, filename, "skipping ASCII block");
            false
        }
    };
    let profile_lines = inject_profile_fields(&mut document.root, profile_fields);

    debug!(
        filename,
        theme = theme.as_str(),
        stripped,
        ascii_injected,
        profile_lines,
        "applied customizations"
    );

    InjectionReport {
        theme,
        stripped,
        ascii_injected,
        profile_lines
    }
}

/// Reason an element is removed by the strip pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripReason {
    /// Carries a reserved template-styling class.
    ReservedClass,
    /// Text positioned in the right column.
    RightColumn,
    /// Text containing a template label keyword.
    TemplateKeyword
}

/// Decides whether the strip pass removes `element`.
///
/// Rules are evaluated in order and the first match wins; the protected
/// identifier check comes first so it overrides every removal rule.
pub fn strip_reason(element: &Element) -> Option<StripReason> {
    if element.any_in_subtree(&is_protected) {
        return None;
    }
    if element
        .attribute("class")
        .is_some_and(|class| RESERVED_CLASSES.contains(&class.trim()))
    {
        return Some(StripReason::ReservedClass);
    }
    if !is_text_bearing(element) {
        return None;
    }
    if element
        .attribute("x")
        .and_then(|x| x.trim().parse::<f64>().ok())
        .is_some_and(|x| x >= RIGHT_COLUMN_X)
    {
        return Some(StripReason::RightColumn);
    }
    let content = element.text_content().trim().to_lowercase();
    if TEMPLATE_KEYWORDS
        .iter()
        .any(|keyword| content.contains(keyword))
    {
        return Some(StripReason::TemplateKeyword);
    }
    None
}

/// Removes template content below `root`; returns the number of removed
/// elements.
pub fn strip_template_content(root: &mut Element) -> usize {
    root.retain_descendants(&mut |element: &Element| match strip_reason(element) {
        Some(reason) => {
            debug!(name = %element.name, id = ?element.id(), ?reason, "stripping element");
            true
        }
        None => false
    })
}

/// Loads ASCII art from the first readable candidate and normalizes it to
/// [`ASCII_LINES`] lines.
///
/// Invalid UTF-8 sequences are dropped. Missing or unreadable candidates
/// yield blank lines.
pub fn load_ascii_lines<P>(candidates: &[P]) -> Vec<String>
where
    P: AsRef<Path>
{
    for candidate in candidates {
        let path = candidate.as_ref();
        if !path.exists() {
            continue;
        }
        match fs::read(path) {
            Ok(bytes) => {
                info!(path = %path.display(), "loaded ASCII art");
                let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
                return normalize_ascii_lines(split_ascii_lines(&text));
            }
            Err(error) => warn!(path = %path.display(), %error, "failed to read ASCII art")
        }
    }
    debug!("no ASCII art source found, using blank lines");
    normalize_ascii_lines(Vec::new())
}

/// Splits on every line boundary: `\n`, `\r`, `\r\n`, vertical tab, form
/// feed, the file/group/record separators, NEL and the Unicode line and
/// paragraph separators. A trailing boundary does not open an empty line.
pub fn split_ascii_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(character) = chars.next() {
        match character {
            '\r' => {
                chars.next_if_eq(&'\n');
                lines.push(std::mem::take(&mut current));
            }
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => lines.push(std::mem::take(&mut current)),
            other => current.push(other)
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Pads with empty lines or truncates to exactly [`ASCII_LINES`] lines.
pub fn normalize_ascii_lines(mut lines: Vec<String>) -> Vec<String> {
    lines.resize(ASCII_LINES, String::new());
    lines
}

/// Builds the detached ASCII-art group.
///
/// # Errors
///
/// Returns [`Error::Injection`] when a line contains characters that cannot be
/// represented in XML 1.0.
pub fn build_ascii_block(lines: &[String], theme: Theme) -> Result<Element, Error> {
    let mut group = Element::new("g").with_attribute("id", ASCII_BLOCK_ID);
    for (index, line) in lines.iter().enumerate() {
        if let Some(invalid) = line.chars().find(|character| !is_xml_char(*character)) {
            return Err(Error::injection(format!(
                "ASCII line {} contains U+{:04X}, which XML cannot carry",
                index + 1,
                u32::from(invalid)
            )));
        }
        let y = ASCII_Y + line_offset(index, ASCII_LINE_HEIGHT)?;
        let mut text = Element::new("text")
            .with_attribute("x", ASCII_X)
            .with_attribute("y", y.to_string())
            .with_attribute("fill", theme.foreground())
            .with_attribute("font-family", ASCII_FONT_FAMILY)
            .with_attribute("font-size", ASCII_FONT_SIZE)
            .with_attribute("class", ASCII_CLASS);
        text.set_text(line);
        group.push_element(text);
    }
    Ok(group)
}

/// Replaces the ASCII block under `root`.
///
/// The previous block is always removed. The new block is only attached once
/// fully built, so a failure leaves no block at all.
///
/// # Errors
///
/// Propagates [`build_ascii_block`] failures.
pub fn inject_ascii(root: &mut Element, lines: &[String], theme: Theme) -> Result<(), Error> {
    while root.remove_by_id(ASCII_BLOCK_ID).is_some() {}
    let block = build_ascii_block(lines, theme)?;
    root.push_element(block);
    Ok(())
}

/// Replaces the profile block under `root`; returns the number of lines.
///
/// Each line is a `text` element wrapping a `tspan` that carries the field
/// identifier, so the line stays addressable by the field patcher.
pub fn inject_profile_fields(root: &mut Element, fields: &[ProfileField]) -> usize {
    while root.remove_by_id(PROFILE_BLOCK_ID).is_some() {}

    let mut group = Element::new("g").with_attribute("id", PROFILE_BLOCK_ID);
    let mut y = PROFILE_Y;
    for field in fields {
        let mut tspan = Element::new("tspan").with_attribute("id", field.id.as_str());
        tspan.set_text(&field.text);
        let mut text = Element::new("text")
            .with_attribute("x", PROFILE_X.to_string())
            .with_attribute("y", y.to_string())
            .with_attribute("class", PROFILE_CLASS);
        text.push_element(tspan);
        group.push_element(text);
        y = y.saturating_add(PROFILE_LINE_HEIGHT);
    }
    root.push_element(group);
    fields.len()
}

fn is_protected(element: &Element) -> bool {
    element.id().is_some_and(|id| PROTECTED_IDS.contains(&id))
}

fn is_text_bearing(element: &Element) -> bool {
    matches!(element.local_name(), "text" | "tspan")
}

fn is_xml_char(character: char) -> bool {
    matches!(
        character,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn line_offset(index: usize, line_height: u32) -> Result<u32, Error> {
    u32::try_from(index)
        .ok()
        .and_then(|index| index.checked_mul(line_height))
        .ok_or_else(|| Error::injection("too many ASCII lines"))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::default_profile_fields;

    const TEMPLATE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" font-family="ConsolasFallback,Consolas,monospace" width="985px" height="530px" font-size="16px">
<style>
.key {fill: #ffa657;}
.value {fill: #a5d6ff;}
.cc {fill: #616e7f;}
</style>
<rect width="985px" height="530px" fill="#161b22" rx="15"/>
<text x="15" y="30" fill="#c9d1d9" class="ascii">
<tspan x="15" y="30">  old art  </tspan>
</text>
<text x="390" y="30" fill="#c9d1d9">
<tspan x="390" y="30">andrew@grant</tspan> -———————————————————————————————————————————-—-
<tspan x="390" y="50" class="cc">. </tspan><tspan class="key">OS</tspan>:<tspan class="value">Windows 10, Android 14, Linux</tspan>
<tspan x="390" y="70" class="cc">. </tspan><tspan class="key">Uptime</tspan>:<tspan class="cc" id="age_data_dots"> ...... </tspan><tspan class="value" id="age_data">1 year</tspan>
</text>
<text x="390" y="450" fill="#c9d1d9">
<tspan x="390" y="450" class="cc">. </tspan><tspan class="key">Followers</tspan>:<tspan class="cc" id="follower_data_dots"> .. </tspan><tspan class="value" id="follower_data">1</tspan>
</text>
<text x="390" y="490" fill="#c9d1d9">Discord: andrew#1234</text>
<text x="20" y="500" fill="#c9d1d9">Hobbies: chess</text>
<text x="20" y="520" fill="#c9d1d9">footer</text>
</svg>"##;

    fn lines(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("line {index}")).collect()
    }

    fn customized(document: &mut Document, filename: &str) -> InjectionReport {
        apply_customizations(
            document,
            filename,
            &normalize_ascii_lines(lines(3)),
            &default_profile_fields()
        )
    }

    fn count_ids(element: &Element, id: &str) -> usize {
        usize::from(element.id() == Some(id))
            + element
                .elements()
                .map(|child| count_ids(child, id))
                .sum::<usize>()
    }

    #[test]
    fn theme_detection_is_case_insensitive() {
        assert_eq!(Theme::from_filename("DARK_mode.svg"), Theme::Dark);
        assert_eq!(Theme::from_filename("mode.svg"), Theme::Light);
    }

    #[test]
    fn protected_identifiers_survive_every_heuristic() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        customized(&mut document, "dark_mode.svg");

        for id in ["age_data", "age_data_dots", "follower_data", "follower_data_dots"] {
            assert!(document.root.find_by_id(id).is_some(), "{id} was stripped");
        }
    }

    #[test]
    fn strip_reason_prefers_protection() {
        let element = Element::new("tspan")
            .with_attribute("id", "star_data")
            .with_attribute("class", "value")
            .with_attribute("x", "500");
        assert_eq!(strip_reason(&element), None);

        let mut wrapper = Element::new("text").with_attribute("x", "400");
        wrapper.set_text("Uptime: ");
        wrapper.push_element(Element::new("tspan").with_attribute("id", "loc_del"));
        assert_eq!(strip_reason(&wrapper), None);
    }

    #[test]
    fn strip_reason_evaluates_rules_in_order() {
        let styled = Element::new("tspan")
            .with_attribute("class", " key ")
            .with_attribute("x", "400");
        assert_eq!(strip_reason(&styled), Some(StripReason::ReservedClass));

        let right = Element::new("text").with_attribute("x", "380");
        assert_eq!(strip_reason(&right), Some(StripReason::RightColumn));

        let mut label = Element::new("text").with_attribute("x", "10");
        label.set_text("  LinkedIn: someone ");
        assert_eq!(strip_reason(&label), Some(StripReason::TemplateKeyword));

        let mut plain = Element::new("text").with_attribute("x", "379.5");
        plain.set_text("footer");
        assert_eq!(strip_reason(&plain), None);
    }

    #[test]
    fn strip_reason_ignores_non_text_geometry() {
        let rect = Element::new("rect").with_attribute("x", "400");
        assert_eq!(strip_reason(&rect), None);

        let unparsable = Element::new("text").with_attribute("x", "400 410");
        assert_eq!(strip_reason(&unparsable), None);
    }

    #[test]
    fn strip_pass_removes_template_content_only() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        let removed = strip_template_content(&mut document.root);
        let output = document.to_xml_string().expect("serializes");

        assert!(removed > 0);
        assert!(!output.contains("old art"));
        assert!(!output.contains("Discord"));
        assert!(!output.contains("Hobbies"));
        assert!(!output.contains("Windows 10"));
        assert!(!output.contains("andrew@grant"));
        assert!(output.contains("footer"));
        assert!(output.contains("<rect"));
        assert!(output.contains("<style>"));
    }

    #[test]
    fn injection_adds_exactly_one_block_each() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        let report = customized(&mut document, "light_mode.svg");

        assert_eq!(report.theme, Theme::Light);
        assert!(report.ascii_injected);
        assert_eq!(report.profile_lines, 13);
        assert_eq!(count_ids(&document.root, ASCII_BLOCK_ID), 1);
        assert_eq!(count_ids(&document.root, PROFILE_BLOCK_ID), 1);
    }

    #[test]
    fn injection_is_idempotent() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        customized(&mut document, "dark_mode.svg");
        let once = document.to_xml_string().expect("serializes");

        let mut reparsed = Document::parse(&once).expect("reparses");
        customized(&mut reparsed, "dark_mode.svg");
        let twice = reparsed.to_xml_string().expect("serializes");

        customized(&mut document, "dark_mode.svg");
        let in_memory = document.to_xml_string().expect("serializes");

        assert_eq!(once, twice);
        assert_eq!(once, in_memory);
        assert_eq!(count_ids(&document.root, ASCII_BLOCK_ID), 1);
        assert_eq!(count_ids(&document.root, PROFILE_BLOCK_ID), 1);
    }

    #[test]
    fn ascii_block_uses_layout_and_theme_colour() {
        let block = build_ascii_block(&normalize_ascii_lines(lines(2)), Theme::Dark)
            .expect("block builds");
        let texts: Vec<&Element> = block.elements().collect();

        assert_eq!(texts.len(), ASCII_LINES);
        assert_eq!(texts[0].attribute("x"), Some("15"));
        assert_eq!(texts[0].attribute("y"), Some("30"));
        assert_eq!(texts[1].attribute("y"), Some("42"));
        assert_eq!(texts[24].attribute("y"), Some("318"));
        assert_eq!(texts[0].attribute("fill"), Some("#c9d1d9"));
        assert_eq!(texts[0].attribute("font-size"), Some("10px"));
        assert_eq!(texts[0].attribute("class"), Some("ascii"));
        assert_eq!(texts[1].text(), "line 1");
        assert_eq!(texts[2].text(), "");

        let light = build_ascii_block(&lines(1), Theme::Light).expect("block builds");
        assert_eq!(
            light.elements().next().and_then(|text| text.attribute("fill")),
            Some("#24292f")
        );
    }

    #[test]
    fn failed_ascii_injection_leaves_no_block() {
        let mut document = Document::parse(TEMPLATE).expect("parses");
        customized(&mut document, "dark_mode.svg");
        assert_eq!(count_ids(&document.root, ASCII_BLOCK_ID), 1);

        let mut broken = normalize_ascii_lines(lines(3));
        broken[1] = "bell\u{7}".to_owned();
        let report = apply_customizations(
            &mut document,
            "dark_mode.svg",
            &broken,
            &default_profile_fields()
        );

        assert!(!report.ascii_injected);
        assert_eq!(count_ids(&document.root, ASCII_BLOCK_ID), 0);
        assert_eq!(count_ids(&document.root, PROFILE_BLOCK_ID), 1);
    }

    #[test]
    fn profile_block_keeps_field_ids_addressable() {
        let mut root = Element::new("svg");
        let fields = vec![
            ProfileField::new("name_data", "Name: Mona"),
            ProfileField::new("ide_data", "IDE: Helix"),
        ];
        assert_eq!(inject_profile_fields(&mut root, &fields), 2);

        let name = root.find_by_id("name_data").expect("addressable");
        assert_eq!(name.text(), "Name: Mona");
        let block = root.find_by_id(PROFILE_BLOCK_ID).expect("block");
        let rows: Vec<&Element> = block.elements().collect();
        assert_eq!(rows[0].attribute("x"), Some("390"));
        assert_eq!(rows[0].attribute("y"), Some("90"));
        assert_eq!(rows[1].attribute("y"), Some("108"));
        assert_eq!(rows[1].attribute("class"), Some("value"));
    }

    #[test]
    fn ascii_normalization_pads_and_truncates() {
        assert_eq!(normalize_ascii_lines(lines(10)).len(), ASCII_LINES);
        assert_eq!(normalize_ascii_lines(lines(25)), lines(25));
        let truncated = normalize_ascii_lines(lines(40));
        assert_eq!(truncated.len(), ASCII_LINES);
        assert_eq!(truncated[24], "line 24");
        let padded = normalize_ascii_lines(lines(10));
        assert_eq!(padded[9], "line 9");
        assert_eq!(padded[10], "");
    }

    #[test]
    fn load_ascii_lines_prefers_first_existing_candidate() {
        let directory = tempdir().expect("failed to create temp dir");
        let preferred = directory.path().join("25charascii");
        let fallback = directory.path().join("ascii");
        fs::write(&fallback, "fallback\n").expect("failed to write fallback");

        let loaded = load_ascii_lines(&[&preferred, &fallback]);
        assert_eq!(loaded[0], "fallback");

        fs::write(&preferred, "first\r\nsecond\n").expect("failed to write preferred");
        let loaded = load_ascii_lines(&[&preferred, &fallback]);
        assert_eq!(loaded.len(), ASCII_LINES);
        assert_eq!(loaded[0], "first");
        assert_eq!(loaded[1], "second");
    }

    #[test]
    fn split_ascii_lines_honours_every_line_boundary() {
        assert_eq!(split_ascii_lines("a\rb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_ascii_lines("a\r\nb\n"), vec!["a", "b"]);
        assert_eq!(split_ascii_lines("top\u{0c}bottom\n"), vec!["top", "bottom"]);
        assert_eq!(
            split_ascii_lines("1\u{0b}2\u{1c}3\u{1d}4\u{1e}5\u{85}6\u{2028}7\u{2029}8"),
            vec!["1", "2", "3", "4", "5", "6", "7", "8"]
        );
        assert_eq!(split_ascii_lines("a\n\nb"), vec!["a", "", "b"]);
        assert!(split_ascii_lines("").is_empty());
    }

    #[test]
    fn load_ascii_lines_drops_invalid_utf8() {
        let directory = tempdir().expect("failed to create temp dir");
        let source = directory.path().join("ascii");
        fs::write(&source, b"ab\xffcd\n").expect("failed to write source");

        let loaded = load_ascii_lines(&[&source]);
        assert_eq!(loaded[0], "abcd");
    }

    #[test]
    fn form_feed_separated_art_still_injects() {
        let directory = tempdir().expect("failed to create temp dir");
        let source = directory.path().join("ascii");
        fs::write(&source, "top\u{0c}bottom\n").expect("failed to write source");

        let loaded = load_ascii_lines(&[&source]);
        assert_eq!(loaded[0], "top");
        assert_eq!(loaded[1], "bottom");
        assert!(build_ascii_block(&loaded, Theme::Dark).is_ok());
    }

    #[test]
    fn load_ascii_lines_without_sources_is_blank() {
        let directory = tempdir().expect("failed to create temp dir");
        let loaded = load_ascii_lines(&[directory.path().join("nothing")]);
        assert_eq!(loaded, vec![String::new(); ASCII_LINES]);
    }
}
