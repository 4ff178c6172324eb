//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a numeric identifier.
///
/// Displayed as the category prefix followed by a zero-padded 3-digit number,
/// e.g., `W001`, `E002`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Requested addons that no loader could provide.
    pub const MISSING_ADDONS: Self = Self::new(Category::Warning, 1);
    /// Addons requested by one target that no loader could provide.
    pub const MISSING_TARGET_ADDONS: Self = Self::new(Category::Warning, 2);
    /// A requested target list that the configuration does not declare.
    pub const INVALID_TARGETS: Self = Self::new(Category::Warning, 3);
    /// The addons directory does not exist.
    pub const MISSING_ADDONS_DIR: Self = Self::new(Category::Warning, 4);
    /// A non-writing target that fragment selection did not pick.
    pub const UNUSED_TARGET: Self = Self::new(Category::Warning, 5);
    /// Fragment selection found no `writeFile: false` target.
    pub const NO_FRAGMENT_TARGETS: Self = Self::new(Category::Warning, 6);
    /// An addon directory that a loader rejected as malformed.
    pub const ADDON_LOAD_FAILED: Self = Self::new(Category::Warning, 7);
    /// Fragment selection found no usable target at all.
    pub const NO_TARGET_FOUND: Self = Self::new(Category::Error, 1);
    /// More than one target requested where only one is supported.
    pub const MULTIPLE_TARGETS: Self = Self::new(Category::Error, 2);
    /// An addon failed while registering its hooks.
    pub const ACTIVATION_FAILED: Self = Self::new(Category::Error, 3);
    /// A configuration or project file could not be read or parsed.
    pub const CONFIG_UNREADABLE: Self = Self::new(Category::Error, 4);
    /// A source file could not be read or its output written.
    pub const EMIT_FAILED: Self = Self::new(Category::Error, 5);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
