//! Unit tests for configuration loading and precedence.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, query and duration accessors
//! - `loading`: Environment and CLI loading

mod helpers;
