use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

use ragline_core::config::{resolve_with_base, Config};
use ragline_core::data_processor::DataProcessor;
use ragline_core::Error;

#[test]
fn load_path_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let file_path = tmp.path().join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let sources = DataProcessor::new().load_path(&file_path).expect("load");

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].text.trim(), "Short text");
    assert_eq!(sources[0].metadata.get("source").map(String::as_str), Some(&*file_path.to_string_lossy()));
}

#[test]
fn load_directory_is_recursive_sorted_and_filtered() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("a.md"), "alpha").unwrap();
    fs::write(dir.join("nested/c.txt"), "charlie").unwrap();
    fs::write(dir.join("ignored.json"), "{}").unwrap();

    let sources = DataProcessor::new().load_path(dir).expect("load dir");
    let texts: Vec<&str> = sources.iter().map(|s| s.text.as_str()).collect();

    assert_eq!(texts, ["alpha", "bravo", "charlie"]);
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("latin1.txt");
    fs::write(&path, [b'c', b'a', b'f', 0xE9]).unwrap();

    let source = DataProcessor::new().load_file(&path).expect("lossy read");
    assert!(source.text.starts_with("caf"));
}

#[test]
fn missing_path_is_invalid_argument() {
    let err = DataProcessor::new().load_path(Path::new("/definitely/not/here.txt")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn defaults_apply_without_any_files() {
    figment::Jail::expect_with(|jail| {
        let settings = Config::load_from(jail.directory(), "dev").unwrap().settings().unwrap();
        assert_eq!(settings.service.base_url, "http://localhost:11434");
        assert_eq!(settings.embedding.model, "mxbai-embed-large");
        assert_eq!(settings.generation.model, "qwen2.5vl:72b");
        assert_eq!(settings.query.top_k, 3);
        assert_eq!(settings.chunking.short_segment_threshold, 50);
        assert_eq!(settings.index.collection, "documents");
        Ok(())
    });
}

#[test]
fn env_file_and_app_vars_layer_over_base_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [generation]
            model = "llama3"

            [query]
            top_k = 4
            "#,
        )?;
        jail.create_file("config.test.toml", "[index]\ncollection = \"test_docs\"\n")?;
        jail.set_env("APP_QUERY__TOP_K", "7");
        jail.set_env("APP_SERVICE__BASE_URL", "http://gpu-box:11434");

        let config = Config::load_from(jail.directory(), "test").unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.generation.model, "llama3");
        assert_eq!(settings.index.collection, "test_docs");
        assert_eq!(settings.query.top_k, 7);
        assert_eq!(settings.service.base_url, "http://gpu-box:11434");
        assert_eq!(config.get::<String>("generation.model").unwrap(), "llama3");
        Ok(())
    });
}

#[test]
fn zero_top_k_is_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[query]\ntop_k = 0\n")?;
        let err = Config::load_from(jail.directory(), "dev").err().expect("must fail");
        assert!(err.to_string().contains("top_k"), "unexpected error: {err}");
        Ok(())
    });
}

#[test]
fn relative_index_paths_resolve_against_base() {
    let base = Path::new("/srv/ragline");
    assert_eq!(resolve_with_base(base, "data/lancedb"), base.join("data/lancedb"));
    assert_eq!(resolve_with_base(base, "/var/lib/idx"), Path::new("/var/lib/idx"));
}
