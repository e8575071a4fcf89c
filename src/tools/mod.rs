pub mod ask_diary;
pub mod list_entries;
pub mod save_entry;

use ask_diary::AskDiaryParams;
use list_entries::ListEntriesParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use save_entry::SaveEntryParams;
use std::sync::Arc;

use diarist::diary::types::DateKey;
use diarist::DiaryPipeline;

/// The Diarist MCP tool handler. Holds the shared pipeline and exposes the
/// diary tools via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct DiaryTools {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<DiaryPipeline>,
}

#[tool_router]
impl DiaryTools {
    pub fn new(pipeline: Arc<DiaryPipeline>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            pipeline,
        }
    }

    /// Save a diary note for a date.
    #[tool(description = "Save a diary note. Notes on a date that already has an entry are appended after a blank line; an identical note is not saved twice.")]
    async fn save_entry(
        &self,
        Parameters(params): Parameters<SaveEntryParams>,
    ) -> Result<String, String> {
        let date = match params.date.as_deref() {
            Some(d) => d.parse::<DateKey>().map_err(|e| e.to_string())?,
            None => DateKey::today(),
        };

        tracing::info!(date = %date, text_len = params.text.len(), "save_entry called");

        // File I/O → spawn_blocking
        let pipeline = Arc::clone(&self.pipeline);
        let text = params.text;
        let outcome = tokio::task::spawn_blocking(move || pipeline.save(date, &text))
            .await
            .map_err(|e| format!("save task failed: {e}"))?
            .map_err(|e| e.to_string())?;

        Ok(serde_json::json!({
            "date": date.to_string(),
            "outcome": outcome,
        })
        .to_string())
    }

    /// Answer a question from the most relevant diary entries.
    #[tool(description = "Ask a question about the diary. Returns the three most similar entries with their similarity scores and the model's answer.")]
    async fn ask_diary(
        &self,
        Parameters(params): Parameters<AskDiaryParams>,
    ) -> Result<String, String> {
        tracing::info!(question_len = params.question.len(), "ask_diary called");

        let outcome = self
            .pipeline
            .ask(&params.question)
            .await
            .map_err(|e| e.to_string())?;

        match outcome {
            Some(outcome) => {
                serde_json::to_string(&outcome).map_err(|e| format!("serialization failed: {e}"))
            }
            None => Ok(serde_json::json!({
                "question": params.question,
                "candidates": [],
                "answer": null,
            })
            .to_string()),
        }
    }

    /// List stored diary entries.
    #[tool(description = "List diary entries (date and full text), optionally filtered by date prefix.")]
    async fn list_entries(
        &self,
        Parameters(params): Parameters<ListEntriesParams>,
    ) -> Result<String, String> {
        let pipeline = Arc::clone(&self.pipeline);
        let mut entries = tokio::task::spawn_blocking(move || pipeline.store().entries())
            .await
            .map_err(|e| format!("list task failed: {e}"))?;

        if let Some(prefix) = params.date_prefix.as_deref() {
            entries.retain(|e| e.date.starts_with(prefix));
        }

        tracing::info!(count = entries.len(), "list_entries called");

        serde_json::to_string(&serde_json::json!({
            "total": entries.len(),
            "entries": entries,
        }))
        .map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for DiaryTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Diarist is a personal diary. Use save_entry to write notes, \
                 ask_diary to answer questions from past entries, and list_entries to browse."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
