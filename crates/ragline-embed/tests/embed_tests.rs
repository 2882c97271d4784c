use ragline_core::config::Settings;
use ragline_embed::{get_default_embedder, HashEmbedder};
use ragline_core::EmbeddingGateway;

#[tokio::test]
async fn fake_embedder_shapes_and_determinism() {
    let mut settings = Settings::default();
    settings.embedding.use_fake = true;

    let embedder = get_default_embedder(&settings).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");
    assert_eq!(embedder.dimension(), Some(1024));

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[tokio::test]
async fn shared_words_score_higher_than_unrelated_text() {
    let embedder = HashEmbedder::new(1024);
    let cos = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();

    let doc = embedder.embed("RDF stands for Resource Description Framework").await.unwrap();
    let related = embedder.embed("What does RDF stand for?").await.unwrap();
    let unrelated = embedder.embed("bananas grow in tropical climates").await.unwrap();

    assert!(cos(&doc, &related) > cos(&doc, &unrelated));
}

#[tokio::test]
async fn batch_preserves_input_order() {
    let embedder = HashEmbedder::new(64);
    let texts: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
    let batch = embedder.embed_batch(&texts).await.unwrap();
    for (text, vector) in texts.iter().zip(&batch) {
        assert_eq!(vector, &embedder.embed(text).await.unwrap());
    }
}
