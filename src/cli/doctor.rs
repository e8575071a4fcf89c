//! CLI `doctor` command: check everything `ask` depends on and print a report.

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use diarist::config::{expand_tilde, DiaristConfig};
use diarist::diary::store::{EntryStore, StoreStatus};

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

/// Run diagnostics and print a health report.
pub async fn doctor(config: &DiaristConfig) -> Result<()> {
    let store = EntryStore::new(config.resolved_entries_path());

    println!("Diarist Health Report");
    println!("=====================");
    println!();
    println!("Diary file:        {}", store.path().display());
    match store.inspect() {
        StoreStatus::Missing => println!("  Status:          not created yet (first `write` creates it)"),
        StoreStatus::Ready(map) => {
            let bytes = std::fs::metadata(store.path()).map(|m| m.len()).unwrap_or(0);
            println!("  Status:          OK");
            println!("  Entries:         {}", map.len());
            println!("  File size:       {}", format_bytes(bytes));
        }
        StoreStatus::Unreadable(reason) => {
            println!("  Status:          UNREADABLE ({reason})");
            println!("  Questions will see an empty diary. The next `write` keeps a copy at");
            println!("  {}", store.backup_path().display());
        }
    }
    println!();

    let cache_dir = expand_tilde(&config.embedding.cache_dir);
    println!("Embedding model:   {}", config.embedding.model);
    for file in ["model.onnx", "tokenizer.json"] {
        let present = cache_dir.join(file).exists();
        println!(
            "  {:<17}{}",
            format!("{file}:"),
            if present { "found" } else { "MISSING" }
        );
    }
    if !cache_dir.join("model.onnx").exists() || !cache_dir.join("tokenizer.json").exists() {
        println!("  Run `diarist model download` to fetch it.");
    }
    println!();

    println!("Language model:    {} via {}", config.generation.model, config.generation.base_url);
    match ollama_models(&config.generation.base_url).await {
        Ok(models) => {
            println!("  Server:          reachable");
            let wanted = &config.generation.model;
            let installed = models
                .iter()
                .any(|m| m == wanted || m.strip_suffix(":latest") == Some(wanted.as_str()));
            if installed {
                println!("  Model:           installed");
            } else {
                println!("  Model:           NOT INSTALLED (run `ollama pull {wanted}`)");
            }
        }
        Err(e) => println!("  Server:          UNREACHABLE ({e:#})"),
    }

    Ok(())
}

async fn ollama_models(base_url: &str) -> Result<Vec<String>> {
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    let response = client.get(&url).send().await?;
    anyhow::ensure!(response.status().is_success(), "HTTP {}", response.status());
    let tags: TagsResponse = response.json().await?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
