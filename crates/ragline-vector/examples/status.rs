use std::path::Path;

use ragline_core::config::Config;
use ragline_core::IndexGateway;
use ragline_vector::LanceIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let db_path = settings.index.resolved_path(Path::new("."));
    let index = LanceIndex::new(&db_path, &settings.index.collection).await?;
    let docs = index.list().await?;
    println!("{}: documents={} at {}", index.collection(), docs.len(), db_path.display());
    for doc in docs.iter().take(5) {
        println!("  {} {}", doc.id, doc.preview(60));
    }
    Ok(())
}
