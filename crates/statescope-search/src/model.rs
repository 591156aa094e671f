//! Search result and state-file data model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The outcome of one search operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    /// Output name to its raw value, passed through opaquely.
    ///
    /// Empty when the searched directory holds no state file, or when the
    /// candidate failed to load.
    pub outputs: BTreeMap<String, Value>,

    /// The state file's declared tool version. Empty if unavailable.
    ///
    /// Populated together with `outputs` from one successfully parsed
    /// file, or left empty together with it.
    pub terraform_version: String,

    /// Child directory path to its navigation locator.
    ///
    /// One entry per direct subdirectory of the searched path, never one
    /// for a file. Populated whenever the listing succeeds.
    pub subdirs: BTreeMap<String, String>,
}

/// A Terraform state file. Only outputs and the version are parsed;
/// everything else in the document is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct StateFile {
    #[serde(default)]
    pub outputs: BTreeMap<String, Output>,
    #[serde(default)]
    pub terraform_version: String,
}

/// The value of a single output.
#[derive(Debug, Deserialize)]
pub(crate) struct Output {
    #[serde(default)]
    pub value: Value,
}
