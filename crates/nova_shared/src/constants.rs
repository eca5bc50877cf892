//! # Field Widths & Budgets
//!
//! **CRITICAL:** Table authors rely on these widths.
//! Changing them changes which effect tables load cleanly.

// =============================================================================
// STRING FIELDS
// =============================================================================

/// Width of a filename field, including the terminator slot.
///
/// A stored filename holds at most `MAX_FILENAME_LEN - 1` characters.
pub const MAX_FILENAME_LEN: usize = 32;

/// Width of a unique-id / asset-name field, including the terminator slot.
pub const NAME_LENGTH: usize = 32;

// =============================================================================
// OBJECT BUDGET
// =============================================================================

/// Global live-object budget shared by every object kind in a level.
pub const MAX_OBJECTS: usize = 5000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_fit_lod_suffix() {
        // base name + "_N" + terminator must fit
        assert!(MAX_FILENAME_LEN > 3);
        assert!(NAME_LENGTH >= MAX_FILENAME_LEN);
    }
}
