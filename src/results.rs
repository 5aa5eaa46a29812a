// src/results.rs
//
// Mocked shopping results. The catalog is static; a real backend would slot in
// behind `SearchBackend`.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::Serialize;

use crate::geometry::ImageRegion;

pub const EMPTY_HINT: &str = "Upload and select an item to see results.";
pub const CLEARED_HINT: &str = "Selection cleared. Draw a new box to search again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: &'static str,
    pub merchant: &'static str,
    pub price: f64,
    pub rating: f32,
    /// How closely the item matches the query region, 0..=1.
    pub match_score: f32,
    pub url: &'static str,
}

/// What gets searched for: the selected region of the source image.
pub struct SearchQuery {
    pub region: ImageRegion,
    pub crop: RgbaImage,
}

pub trait SearchBackend {
    fn search(&self, query: &SearchQuery) -> Vec<SearchResult>;
}

/// Returns the same catalog whatever the query.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCatalog;

const CATALOG: &[SearchResult] = &[
    SearchResult {
        title: "Classic Denim Jacket",
        merchant: "Northline Outfitters",
        price: 79.00,
        rating: 4.6,
        match_score: 0.94,
        url: "https://shop.example.com/denim-jacket",
    },
    SearchResult {
        title: "Oversized Trucker Jacket",
        merchant: "Harbor & Co",
        price: 64.50,
        rating: 4.2,
        match_score: 0.88,
        url: "https://shop.example.com/trucker-jacket",
    },
    SearchResult {
        title: "Washed Denim Overshirt",
        merchant: "Fieldhouse",
        price: 48.99,
        rating: 4.4,
        match_score: 0.81,
        url: "https://shop.example.com/denim-overshirt",
    },
    SearchResult {
        title: "Sherpa-Lined Denim Jacket",
        merchant: "Alpine Supply",
        price: 112.00,
        rating: 4.8,
        match_score: 0.77,
        url: "https://shop.example.com/sherpa-denim",
    },
    SearchResult {
        title: "Cropped Denim Jacket",
        merchant: "Mercer Street",
        price: 58.00,
        rating: 3.9,
        match_score: 0.72,
        url: "https://shop.example.com/cropped-denim",
    },
    SearchResult {
        title: "Chore Coat, Indigo",
        merchant: "Workshop Goods",
        price: 95.00,
        rating: 4.5,
        match_score: 0.66,
        url: "https://shop.example.com/chore-coat",
    },
    SearchResult {
        title: "Light Wash Jean Jacket",
        merchant: "Budget Basics",
        price: 29.99,
        rating: 3.7,
        match_score: 0.61,
        url: "https://shop.example.com/light-wash",
    },
    SearchResult {
        title: "Corduroy Trucker Jacket",
        merchant: "Harbor & Co",
        price: 72.00,
        rating: 4.2,
        match_score: 0.54,
        url: "https://shop.example.com/corduroy-trucker",
    },
];

impl SearchBackend for MockCatalog {
    fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        log::info!(
            "mock search for {}x{} region at ({}, {})",
            query.crop.width(),
            query.crop.height(),
            query.region.x,
            query.region.y
        );
        CATALOG.to_vec()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Match,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Match, SortKey::PriceAsc, SortKey::PriceDesc, SortKey::Rating];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Match => "Best match",
            SortKey::PriceAsc => "Price: low to high",
            SortKey::PriceDesc => "Price: high to low",
            SortKey::Rating => "Rating",
        }
    }

    pub fn next(self) -> SortKey {
        let i = SortKey::ALL.iter().position(|k| *k == self).unwrap_or(0);
        SortKey::ALL[(i + 1) % SortKey::ALL.len()]
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "match" => Ok(SortKey::Match),
            "price-asc" => Ok(SortKey::PriceAsc),
            "price-desc" => Ok(SortKey::PriceDesc),
            "rating" => Ok(SortKey::Rating),
            other => Err(format!(
                "unknown sort key `{other}` (expected match, price-asc, price-desc or rating)"
            )),
        }
    }
}

/// Stable: equal keys keep catalog order.
pub fn sort_results(results: &mut [SearchResult], key: SortKey) {
    match key {
        SortKey::Match => results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score)),
        SortKey::PriceAsc => results.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => results.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Rating => results.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} · {} · ${:.2} · ★ {:.1} · {:.0}% match",
            self.title,
            self.merchant,
            self.price,
            self.rating,
            self.match_score * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(results: &[SearchResult]) -> Vec<&'static str> {
        results.iter().map(|r| r.title).collect()
    }

    #[test]
    fn price_sorts_both_ways() {
        let mut results = CATALOG.to_vec();
        sort_results(&mut results, SortKey::PriceAsc);
        assert_eq!(results[0].title, "Light Wash Jean Jacket");
        sort_results(&mut results, SortKey::PriceDesc);
        assert_eq!(results[0].title, "Sherpa-Lined Denim Jacket");
    }

    #[test]
    fn rating_ties_keep_catalog_order() {
        let mut results = CATALOG.to_vec();
        sort_results(&mut results, SortKey::Rating);
        let ties: Vec<_> = titles(&results)
            .into_iter()
            .filter(|t| *t == "Oversized Trucker Jacket" || *t == "Corduroy Trucker Jacket")
            .collect();
        assert_eq!(ties, ["Oversized Trucker Jacket", "Corduroy Trucker Jacket"]);
    }

    #[test]
    fn match_is_descending() {
        let mut results = CATALOG.to_vec();
        sort_results(&mut results, SortKey::PriceAsc);
        sort_results(&mut results, SortKey::Match);
        assert!(results.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn sort_key_parses_and_cycles() {
        assert_eq!("price-desc".parse::<SortKey>(), Ok(SortKey::PriceDesc));
        assert!("cheapest".parse::<SortKey>().is_err());
        assert_eq!(SortKey::Rating.next(), SortKey::Match);
    }

    #[test]
    fn card_line_formats_price_and_score() {
        let line = CATALOG[0].to_string();
        assert_eq!(line, "Classic Denim Jacket · Northline Outfitters · $79.00 · ★ 4.6 · 94% match");
    }
}
