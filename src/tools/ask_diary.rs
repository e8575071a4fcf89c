//! MCP `ask_diary` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `ask_diary` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AskDiaryParams {
    #[schemars(
        description = "Natural language question about the diary, e.g. 'How did I feel this week?'"
    )]
    pub question: String,
}
