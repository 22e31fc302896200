// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Card configuration document.
//!
//! The YAML document customizes the static profile fields and the candidate
//! ASCII-art sources. Every key is optional; omitted keys fall back to the
//! built-in defaults.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{self, Error};

/// ASCII-art source files tried in order; the first existing file wins.
pub const DEFAULT_ASCII_SOURCES: &[&str] = &["25charascii", "ascii"];

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use profile_card::CardConfig;
///
/// let yaml = r#"
/// profile_fields:
///   - id: name_data
///     text: "Name: Mona"
/// "#;
/// let config = CardConfig::from_yaml(yaml)?;
/// assert_eq!(config.profile_fields.len(), 1);
/// assert_eq!(config.ascii_sources, vec!["25charascii", "ascii"]);
/// # Ok::<(), profile_card::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CardConfig {
    /// Static profile lines injected into the right column.
    #[serde(default = "default_profile_fields", alias = "profile-fields")]
    pub profile_fields: Vec<ProfileField>,

    /// Candidate ASCII-art files, relative to the working directory.
    #[serde(default = "default_ascii_sources", alias = "ascii-sources")]
    pub ascii_sources: Vec<String>
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            profile_fields: default_profile_fields(),
            ascii_sources:  default_ascii_sources()
        }
    }
}

impl CardConfig {
    /// Parses a configuration document and validates its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed YAML and
    /// [`Error::Configuration`] for empty or duplicate field identifiers.
    pub fn from_yaml(source: &str) -> Result<Self, Error> {
        let config: Self = if source.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(source)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, plus the errors of
    /// [`CardConfig::from_yaml`].
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
        Self::from_yaml(&source)
    }

    fn validate(&self) -> Result<(), Error> {
        let mut seen = std::collections::HashSet::with_capacity(self.profile_fields.len());
        for field in &self.profile_fields {
            let id = field.id.trim();
            if id.is_empty() {
                return Err(Error::configuration("profile field id must not be empty"));
            }
            if !seen.insert(id) {
                return Err(Error::configuration(format!(
                    "profile field id '{id}' is used more than once"
                )));
            }
        }
        Ok(())
    }
}

/// One static line of the profile block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileField {
    /// Identifier carried by the line's `tspan`.
    pub id:   String,
    /// Literal label and value.
    pub text: String
}

impl ProfileField {
    /// Creates a profile field.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id:   id.into(),
            text: text.into()
        }
    }
}

/// Built-in profile lines used when the configuration omits them.
pub fn default_profile_fields() -> Vec<ProfileField> {
    [
        ("name_data", "Name: Octocat"),
        ("os_data", "OS: Linux, macOS"),
        ("host_data", "Host: GitHub"),
        ("kernel_data", "Kernel: Software Engineer"),
        ("ide_data", "IDE: Neovim"),
        ("prog_langs_data", "Programming: Rust, Python, TypeScript"),
        ("languages_comp_data", "Languages.computer: Rust, Python, TypeScript"),
        ("languages_real_data", "Languages.real: English"),
        ("hobbies_software_data", "Hobbies.software: building CLIs"),
        ("hobbies_real_data", "Hobbies.real: hiking, cooking"),
        ("email_personal_data", "Email.personal: octocat@users.noreply.github.com"),
        ("linkedin_data", "LinkedIn: octocat"),
        ("portfolio_data", "Portfolio: github.com/octocat"),
    ]
    .into_iter()
    .map(|(id, text)| ProfileField::new(id, text))
    .collect()
}

fn default_ascii_sources() -> Vec<String> {
    DEFAULT_ASCII_SOURCES
        .iter()
        .map(|source| (*source).to_owned())
        .collect()
}
