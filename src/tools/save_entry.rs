//! MCP `save_entry` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `save_entry` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SaveEntryParams {
    #[schemars(description = "The diary text to save")]
    pub text: String,

    #[schemars(description = "Date of the entry as YYYY-MM-DD. Defaults to today.")]
    pub date: Option<String>,
}
