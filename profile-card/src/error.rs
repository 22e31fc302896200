#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the profile card crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the library and the CLI.
///
/// Configuration, remote and template errors are fatal for a run. Injection
/// errors are produced while building synthetic blocks and are recovered by
/// the injector itself; they only surface through direct calls to the block
/// builders.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Missing or malformed process configuration.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Human readable message describing the configuration problem.
        message: String
    },
    /// Wraps I/O errors that occur while reading configuration or ASCII files.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// Location of the file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Non-success response from the GitHub API.
    #[error("GitHub API request failed with status {status}: {body}")]
    Remote {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body or API error message.
        body:   String
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// Wraps JSON decoding errors for API payloads.
    #[error("failed to decode API response: {source}")]
    Decode {
        /// Underlying decoding error.
        source: serde_json::Error
    },
    /// Neither the target document nor its reference template exists.
    #[error("SVG template not found: {target:?} (also looked for {reference:?})")]
    TemplateNotFound {
        /// Target document path that was requested.
        target:    PathBuf,
        /// Reference template path that was tried as a fallback.
        reference: PathBuf
    },
    /// Wraps I/O errors that occur while processing SVG files.
    #[error("failed to process SVG at {path:?}: {source}")]
    SvgIo {
        /// Location of the SVG file being processed.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps parsing and serialization errors for SVG markup.
    #[error("failed to parse SVG: {message}")]
    SvgParse {
        /// Human readable message describing the parse failure.
        message: String
    },
    /// Failure while building an injected content block.
    #[error("failed to inject content block: {message}")]
    Injection {
        /// Human readable message describing the failure.
        message: String
    }
}

impl Error {
    /// Constructs a configuration error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the configuration failure.
    pub fn configuration<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Configuration {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Constructs an SVG parse error from the provided displayable value.
    pub fn svg_parse<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::SvgParse {
            message: message.into()
        }
    }

    /// Constructs an injection error from the provided displayable value.
    pub fn injection<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Injection {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Decode {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub {
                source, ..
            } => Self::Remote {
                status: source.status_code.as_u16(),
                body:   source.message
            },
            other => Self::Service {
                message: other.to_string()
            }
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

/// Creates an [`Error::SvgIo`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the SVG file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn svg_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::SvgIo {
        path: path.to_path_buf(),
        source
    }
}
