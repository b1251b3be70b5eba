// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by every fallible operation in this crate.

use core::fmt;

/// Rich error type for text buffer, attribute, atlas and layout-cache
/// operations.
///
/// Carries a non-exhaustive [`ErrorKind`] plus contextual information about
/// the attempted range, so a caller can report a useful diagnostic without
/// this crate needing to allocate a formatted string up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    start: usize,
    end: usize,
    len: usize,
    boundary: Option<BoundaryInfo>,
}

impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The start index of the range provided by the caller.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end index of the range provided by the caller.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The length of the underlying sequence at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the underlying sequence was empty at the time of the error.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extra details for boundary-related errors, if available.
    pub fn boundary(&self) -> Option<BoundaryInfo> {
        self.boundary
    }

    pub(crate) fn invalid_bounds(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidBounds,
            start,
            end,
            len,
            boundary: None,
        }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            start,
            end,
            len,
            boundary: None,
        }
    }

    pub(crate) fn not_on_char_boundary(
        start: usize,
        end: usize,
        len: usize,
        which: Endpoint,
        index: usize,
    ) -> Self {
        Self {
            kind: ErrorKind::NotOnCharBoundary,
            start,
            end,
            len,
            boundary: Some(BoundaryInfo { which, index }),
        }
    }

    pub(crate) fn unknown_attribute_collection(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::UnknownAttributeCollection,
            start,
            end,
            len,
            boundary: None,
        }
    }

    pub(crate) fn atlas_capacity_exceeded(requested_len: usize, capacity: usize) -> Self {
        Self {
            kind: ErrorKind::AtlasCapacityExceeded,
            start: 0,
            end: requested_len,
            len: capacity,
            boundary: None,
        }
    }

    pub(crate) fn no_font_for_run(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::NoFontForRun,
            start,
            end,
            len,
            boundary: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::InvalidBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.start, self.end, self.len
            ),
            ErrorKind::InvalidRange => {
                write!(f, "invalid range {}..{}: start > end", self.start, self.end)
            }
            ErrorKind::NotOnCharBoundary => {
                if let Some(b) = self.boundary {
                    let which = match b.which {
                        Endpoint::Start => "start",
                        Endpoint::End => "end",
                    };
                    write!(
                        f,
                        "range {}..{}: {} index {} not on a codepoint boundary",
                        self.start, self.end, which, b.index
                    )
                } else {
                    write!(f, "range {}..{} not on a codepoint boundary", self.start, self.end)
                }
            }
            ErrorKind::UnknownAttributeCollection => write!(
                f,
                "attribute reference in range {}..{} points at an unregistered collection",
                self.start, self.end
            ),
            ErrorKind::AtlasCapacityExceeded => write!(
                f,
                "atlas entry of size {} exceeds maximum page capacity {}",
                self.end, self.len
            ),
            ErrorKind::NoFontForRun => write!(
                f,
                "no font resolved for run {}..{} (len {})",
                self.start, self.end, self.len
            ),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Provided range indices were out of bounds relative to the sequence length.
    InvalidBounds,
    /// The provided range had `start > end`.
    InvalidRange,
    /// Either `start` or `end` fell inside a codepoint (UTF-8 view only).
    NotOnCharBoundary,
    /// An attribute span referenced a collection that was never registered.
    UnknownAttributeCollection,
    /// A rasterized entry could not fit in any atlas page, even after eviction.
    AtlasCapacityExceeded,
    /// No font could be resolved for a shaping run.
    NoFontForRun,
}

/// Identifies which endpoint of a range failed boundary validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// The `start` endpoint of the range.
    Start,
    /// The `end` endpoint of the range.
    End,
}

/// Details about an offending index that was not on a codepoint boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundaryInfo {
    /// Which endpoint (`start` or `end`) was invalid.
    pub which: Endpoint,
    /// The offending byte index.
    pub index: usize,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

pub(crate) fn check_range(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end {
        return Err(Error::invalid_range(start, end, len));
    }
    if end > len {
        return Err(Error::invalid_bounds(start, end, len));
    }
    Ok(())
}
