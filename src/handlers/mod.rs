//! HTTP handlers for the designer session, catalog and report templates.

pub mod catalog;
pub mod designer;
pub mod templates;
