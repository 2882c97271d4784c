use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};

use ragline_core::config::Settings;
use ragline_core::data_processor::DataProcessor;
use ragline_core::{preview, Chunker, EmbeddingGateway, GenerationGateway, SourceText};
use ragline_embed::get_default_embedder;
use ragline_generate::OllamaGenerator;
use ragline_rag::RagEngine;
use ragline_vector::LanceIndex;

use crate::args::Command;

const LIST_PREVIEW_CHARS: usize = 80;

type Engine = RagEngine<LanceIndex, OllamaGenerator>;

pub async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let engine = build_engine(settings).await?;
    match command {
        Command::Add { paths } => add(&engine, &paths).await,
        Command::Query { question, top_k, debug, sources } => {
            query(&engine, &question, top_k.unwrap_or(settings.query.top_k), debug, sources).await
        }
        Command::List => list(&engine).await,
        Command::Clear => {
            engine.clear().await?;
            println!("✓ All documents cleared");
            Ok(())
        }
        Command::Info => info(&engine, settings).await,
    }
}

fn index_path(settings: &Settings) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    Ok(settings.index.resolved_path(&cwd))
}

async fn build_engine(settings: &Settings) -> anyhow::Result<Engine> {
    let embedder = get_default_embedder(settings)?;
    let db_path = index_path(settings)?;
    let index = LanceIndex::new(&db_path, &settings.index.collection)
        .await
        .with_context(|| format!("failed to open index at {}", db_path.display()))?;
    let generator = OllamaGenerator::new(&settings.service, &settings.generation)?;
    Ok(RagEngine::new(embedder, index, generator).with_chunker(Chunker::new(settings.chunking.clone())))
}

async fn add(engine: &Engine, paths: &[PathBuf]) -> anyhow::Result<()> {
    let processor = DataProcessor::new();
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paths {msg}")?
            .progress_chars("#>-"),
    );
    let mut sources: Vec<SourceText> = Vec::new();
    for path in paths {
        pb.set_message(path.display().to_string());
        sources.extend(processor.load_path(path).with_context(|| format!("failed to read {}", path.display()))?);
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} files read", sources.len()));

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("embedding and indexing");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = engine.ingest(&sources).await;
    spinner.finish_and_clear();

    let chunks = result?;
    println!("✓ Added {chunks} documents to knowledge base");
    Ok(())
}

async fn query(engine: &Engine, question: &str, top_k: usize, debug: bool, show_sources: bool) -> anyhow::Result<()> {
    let answer = engine.query_with_sources(question, top_k, debug).await?;
    println!("\nAnswer:");
    println!("{}", answer.text);

    if show_sources && answer.grounded {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["#", "ID", "Score", "Source", "Preview"]);
        for (i, hit) in answer.sources.items.iter().enumerate() {
            let source = hit.document.metadata.get("source").map(String::as_str).unwrap_or("-");
            table.add_row(vec![
                (i + 1).to_string(),
                hit.document.id.clone(),
                format!("{:.3}", hit.score),
                source.to_string(),
                hit.document.preview(LIST_PREVIEW_CHARS),
            ]);
        }
        println!("\nSources:\n{table}");
    }
    Ok(())
}

async fn list(engine: &Engine) -> anyhow::Result<()> {
    let docs = engine.list().await?;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Content Preview"]);
    for doc in &docs {
        table.add_row(vec![doc.id.clone(), preview(&doc.text, LIST_PREVIEW_CHARS)]);
    }
    println!("Knowledge Base ({} documents)", docs.len());
    println!("{table}");
    Ok(())
}

async fn info(engine: &Engine, settings: &Settings) -> anyhow::Result<()> {
    let count = engine.count().await?;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["Service URL".to_string(), settings.service.base_url.clone()]);
    table.add_row(vec!["LLM Model".to_string(), engine.generator().model().to_string()]);
    table.add_row(vec!["Embedder".to_string(), engine.embedder().embedder_id().to_string()]);
    table.add_row(vec!["Index Path".to_string(), index_path(settings)?.display().to_string()]);
    table.add_row(vec!["Collection".to_string(), engine.index().collection().to_string()]);
    table.add_row(vec!["Documents".to_string(), count.to_string()]);
    println!("System Information");
    println!("{table}");
    Ok(())
}
