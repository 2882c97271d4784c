use ragline_core::config::Config;
use ragline_embed::get_default_embedder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let embedder = get_default_embedder(&settings)?;
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let embs = embedder.embed_batch(&texts).await?;
    println!("{} B={} dim={}", embedder.embedder_id(), embs.len(), embs[0].len());
    Ok(())
}
