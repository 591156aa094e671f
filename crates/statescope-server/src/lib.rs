//! Web front end for browsing Terraform state backends.
//!
//! Wires a [`BackendList`](statescope_vfs::BackendList) built from a JSON
//! config file to the search engine and renders results as HTML:
//!
//! - `GET /search?backend=<name>&spath=<path>` runs a search and renders
//!   the listing, outputs, and version
//! - `GET /` renders the backend index
//! - `GET /style.css` serves the embedded stylesheet

pub mod app;
pub mod config;
pub mod view;
