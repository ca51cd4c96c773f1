//! The migration core: handlers, drivers, and the filter table that
//! decides which elements/attributes are reference-bearing.
//!
//! This crate owns no I/O policy of its own beyond what [`Handlers`]
//! wraps; orchestration (fetching the root document, writing the root
//! letter, building the envelope) lives in [`root`], called once per tab
//! by the `archiver` binary.

pub mod css_driver;
pub mod filter;
pub mod handlers;
pub mod html_driver;
pub mod root;

pub use handlers::Handlers;
pub use root::{migrate_tab, TabInput};
