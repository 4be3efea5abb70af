//! The SEO metadata engine: page-space enumeration, deterministic metadata
//! synthesis, duplicate detection, corpus auditing and the workflow
//! orchestration tying them together.
//!
//! Persistence is behind the [`traits::SeoStore`] seam; the Postgres
//! implementation lives in `seobot-store`, and `testing::MemoryStore`
//! drives the whole engine in tests.

pub mod dedup;
pub mod pagespace;
pub mod report;
pub mod synth;
pub mod traits;
pub mod workflows;

#[cfg(feature = "test-support")]
pub mod testing;

pub use traits::SeoStore;
