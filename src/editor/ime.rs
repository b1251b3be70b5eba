// Copyright 2025 the Wordform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! IME composition buffer (§4.I "IME composition").

use alloc::vec::Vec;

/// A pending IME composition, rendered as a styled overlay at the
/// current selection end until committed or cancelled.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub text: Vec<char>,
    pub caret: u32,
}

impl Composition {
    pub fn new(text: Vec<char>, caret: u32) -> Self {
        Self { text, caret }
    }
}
