//! writeup - a converter from writeup markup to HTML
//!
//! Writeup is a small line-oriented markup format: `#` headers open nested
//! sections, `*` bullets build lists, `>` and `|` prefixes mark quotes and
//! code, and inline spans cover code, bold, links and file embedding.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

pub mod cli;
pub mod document_config;
pub mod html_exporter;
pub mod pipeline;
pub mod source_model;

pub use document_config::{DocumentConfig, DocumentConfigError};
pub use html_exporter::PageMetadata;
pub use pipeline::{list_dependencies, parse_document, render_html, RenderOptions};
pub use source_model::{Document, ErrorKind, Warning, WriteupError};
