use serde::{Deserialize, Serialize};

/// Placeholder stored when a listing item has no title element.
pub const MISSING_TITLE: &str = "No title found";
/// Placeholder stored when a listing item has no price element.
pub const MISSING_PRICE: &str = "No price found";

/// One listing item as found in the page, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
    pub title: String,
    pub price_text: String,
    /// Empty when the item has no thumbnail.
    pub image_url: String,
}

/// A new or re-priced product recorded by a scrape session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    #[serde(rename = "product_title")]
    pub title: String,
    /// Fixed two-decimal text, e.g. `"123.45"`.
    #[serde(rename = "product_price")]
    pub price: String,
    #[serde(rename = "path_to_image")]
    pub image_path: String,
}

/// Outcome of one completed session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub scraped_count: usize,
    pub products: Vec<Product>,
}

impl ScrapeSummary {
    pub fn push(&mut self, product: Product) {
        self.products.push(product);
        self.scraped_count = self.products.len();
    }
}
