//! End-to-end ingestion: CSV bytes on disk to a normalized corpus

use reviewguard_core::{CanonicalSentiment, NormalizerConfig};
use reviewguard_dataset::{
    prepare_corpus, read_dataset, DatasetConfig, DatasetProvider, LabelMethod, LocalFileProvider,
    TextEncoding,
};
use std::io::Write;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn plain_config() -> DatasetConfig {
    DatasetConfig {
        normalizer: NormalizerConfig::without_stemming(),
        ..DatasetConfig::default()
    }
}

#[test]
fn test_turkish_semicolon_file() {
    init_tracing();

    let rows = [
        ("\"Ürün çok güzel, hızlı kargo\"", "Olumlu"),
        ("\"Kargo geç geldi, kutu ezik\"", "Olumsuz"),
        ("Fiyatına göre idare eder", "Nötr"),
        ("Tekrar sipariş vereceğim", "bilinmiyor"),
    ];
    let mut text = String::from("Yorum;Duygu\n");
    for _ in 0..10 {
        for (review, label) in rows {
            text.push_str(&format!("{review};{label}\n"));
        }
    }
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1254.encode(&text);
    assert!(!unmappable);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    assert_eq!(TextEncoding::detect(&bytes), TextEncoding::Windows1254);

    let dataset = read_dataset(file.path()).unwrap();
    assert_eq!(dataset.columns(), &["Yorum".to_string(), "Duygu".to_string()]);
    assert_eq!(dataset.len(), 40);

    let (schema, corpus) = prepare_corpus(&dataset, &plain_config()).unwrap();
    assert_eq!(schema.text_column.as_deref(), Some("Yorum"));
    assert_eq!(schema.label_column.as_deref(), Some("Duygu"));
    assert_eq!(schema.label_method, LabelMethod::NameMatch);
    assert_eq!(schema.rating_column, None);

    assert!(corpus.labels_available);
    assert_eq!(corpus.len(), 30);
    assert_eq!(corpus.stats.unresolved_labels, 10);
    assert_eq!(corpus.records[0].raw, "Ürün çok güzel, hızlı kargo");
    assert_eq!(corpus.records[0].normalized, "ürün çok güzel, hızlı kargo");
    assert_eq!(corpus.records[0].sentiment, Some(CanonicalSentiment::Positive));
    assert_eq!(corpus.records[2].sentiment, Some(CanonicalSentiment::Neutral));
}

#[test]
fn test_bom_file_with_content_detected_label() {
    init_tracing();

    let labels = ["-1", "0", "1"];
    let mut text = String::from("\u{feff}a,b,c\n");
    for i in 0..120 {
        text.push_str(&format!(
            "{},ürün numarası {i} hakkında kısa değerlendirme,{}\n",
            i + 1,
            labels[i % 3]
        ));
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.csv");
    std::fs::write(&path, text.as_bytes()).unwrap();

    let dataset = LocalFileProvider::new(&path).fetch().unwrap();
    assert_eq!(dataset.columns()[0], "a");

    let mut config = plain_config();
    config.schema.min_label_rows = 50;

    let (schema, corpus) = prepare_corpus(&dataset, &config).unwrap();
    assert_eq!(schema.text_column.as_deref(), Some("b"));
    assert_eq!(schema.label_column.as_deref(), Some("c"));
    assert_eq!(schema.label_method, LabelMethod::ContentAnalysis);
    assert_eq!(schema.rating_column, None);

    assert_eq!(corpus.len(), 120);
    assert_eq!(corpus.records[0].sentiment, Some(CanonicalSentiment::Negative));
    assert_eq!(corpus.records[2].sentiment, Some(CanonicalSentiment::Neutral));
}
