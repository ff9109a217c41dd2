//! Chromium DevTools implementation of the interval-sync page ports.
//!
//! Every port call is a single `Runtime.evaluate` of a generated script. Handles
//! are ids into a page-side registry, so they survive between calls without
//! holding remote object references.

mod page;
mod script;

pub use page::CdpPage;
