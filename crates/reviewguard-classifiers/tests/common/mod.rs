//! Shared fixtures for the integration tests
#![allow(dead_code)]

use reviewguard_classifiers::EngineConfig;
use reviewguard_core::{NormalizerConfig, TextNormalizer};

pub const DUPLICATE_REVIEW: &str = "Kargo zamanında geldi, teşekkürler";
pub const DUPLICATE_COUNT: usize = 12;
pub const SPAM_COUNT: usize = 48;
pub const REAL_COUNT: usize = 240;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        normalizer: NormalizerConfig::without_stemming(),
        ..EngineConfig::default()
    }
}

/// 300 raw reviews: specific genuine reviews, link spam, and one genuine
/// review repeated verbatim
pub fn synthetic_reviews() -> Vec<String> {
    let products = ["Ayakkabı", "Mont", "Çanta", "Telefon kılıfı", "Saat", "Gömlek"];
    let qualities = [
        "kaliteli malzeme",
        "rahat kalıp",
        "renk fotoğraftaki gibi",
        "dikişleri sağlam",
        "boyutu tam",
    ];
    let closings = [
        "fiyatına değer",
        "herkese öneririm",
        "paketleme özenliydi",
        "ikinci kez aldım",
    ];

    let mut reviews: Vec<String> = (0..REAL_COUNT)
        .map(|i| {
            format!(
                "{} {}, {}. Sipariş no {}",
                products[i % products.len()],
                qualities[(i / products.len()) % qualities.len()],
                closings[(i / 30) % closings.len()],
                i
            )
        })
        .collect();

    reviews.extend((0..SPAM_COUNT).map(|i| {
        format!("Kampanyayı kaçırmayın! http://indirim.co/{i} adresinden hemen sipariş verin")
    }));
    reviews.extend(std::iter::repeat(DUPLICATE_REVIEW.to_string()).take(DUPLICATE_COUNT));
    reviews
}

pub fn normalize_all(reviews: &[String]) -> Vec<String> {
    let normalizer = TextNormalizer::without_stemming().unwrap();
    reviews.iter().map(|r| normalizer.normalize(r)).collect()
}

/// Fixed query set for comparing engines
pub fn probe_reviews() -> Vec<&'static str> {
    vec![
        "Kampanyayı kaçırmayın http://x.co",
        "Mont rahat kalıp, fiyatına değer",
        DUPLICATE_REVIEW,
        "ÇOK GÜZEL ÜRÜN!!!! 🎉🎉🎉",
        "iletişim: satis@magaza.com",
        "",
    ]
}
