//! Tests for the template processor
//!
//! Organized by pipeline stage, with shared fixtures in `helpers`.

use super::*;

// Test helper functions
mod helpers;

mod conditionals;
mod loops;
