use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListEntriesParams {
    #[schemars(description = "Only list entries whose date starts with this prefix, e.g. '2024-01'")]
    pub date_prefix: Option<String>,
}
