use std::path::Path;

use ragline_core::config::Config;
use ragline_embed::get_default_embedder;
use ragline_generate::OllamaGenerator;
use ragline_rag::RagEngine;
use ragline_vector::LanceIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let db_path = settings.index.resolved_path(Path::new("."));

    let embedder = get_default_embedder(&settings)?;
    let index = LanceIndex::new(&db_path, "example").await?;
    let generator = OllamaGenerator::new(&settings.service, &settings.generation)?;
    let rag = RagEngine::new(embedder, index, generator);

    let documents = vec![
        "An ontology is a formal representation of the concepts and relations of a domain.".to_string(),
        "RDF stands for Resource Description Framework, a framework for describing web resources.".to_string(),
        "OWL, the Web Ontology Language, is a W3C standard for expressing complex ontologies.".to_string(),
    ];
    let added = rag.add_documents(&documents).await?;
    println!("added {added} documents");

    for question in ["What is an ontology?", "What does RDF stand for?", "Explain OWL."] {
        println!("\nQ: {question}");
        println!("A: {}", rag.query(question, 2, false).await?);
    }

    rag.clear().await?;
    Ok(())
}
