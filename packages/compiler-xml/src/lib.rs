//! # Framecraft XML Compiler
//!
//! Walks a component tree into the XML export artifact: one `<component>`
//! element per node with optional `<attributes>`, `<style>`, CDATA-wrapped
//! `<content>` and recursively nested `<children>`.

mod compiler;

#[cfg(test)]
mod tests;

pub use compiler::{export_xml, ExportOptions};
