//! Unit tests for annotation persistence.
//!
//! These tests verify the coordinate convention, polygon leaf ordering and
//! writer stability of the VOC codec.
