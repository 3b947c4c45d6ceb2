//! Test utilities for mainfiles unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use mainfiles::test_support::ProjectFixture;
//!
//! let fixture = ProjectFixture::new(r#"{ "dependencies": { "a": "1.0.0" } }"#)
//!     .with_module_file("a", "index.js");
//! ```

pub mod fixtures;

pub use fixtures::ProjectFixture;
