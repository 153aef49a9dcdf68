use scraper::{ElementRef, Html, Selector};

use crate::models::{MISSING_PRICE, MISSING_TITLE, RawProduct};
use crate::utils::error::{AppError, Result};

const ITEM_SELECTOR: &str = "li.product";
const TITLE_SELECTOR: &str = "h2.woo-loop-product__title";
const PRICE_SELECTOR: &str = "span.woocommerce-Price-amount.amount";
const IMAGE_SELECTOR: &str = "img.mf-product-thumbnail";

/// Pulls product cards out of a WooCommerce listing page.
pub struct ProductExtractor {
    item: Selector,
    title: Selector,
    price: Selector,
    image: Selector,
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::Internal(format!("Invalid CSS selector '{}': {:?}", selector, e)))
}

impl ProductExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            item: compile(ITEM_SELECTOR)?,
            title: compile(TITLE_SELECTOR)?,
            price: compile(PRICE_SELECTOR)?,
            image: compile(IMAGE_SELECTOR)?,
        })
    }

    /// Every product item in document order. Missing fields fall back to placeholder text.
    pub fn extract(&self, html: &str) -> Vec<RawProduct> {
        let document = Html::parse_document(html);

        document
            .select(&self.item)
            .map(|item| RawProduct {
                title: self
                    .first_text(item, &self.title)
                    .unwrap_or_else(|| MISSING_TITLE.to_string()),
                price_text: self
                    .first_text(item, &self.price)
                    .unwrap_or_else(|| MISSING_PRICE.to_string()),
                image_url: item
                    .select(&self.image)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }

    fn first_text(&self, item: ElementRef<'_>, selector: &Selector) -> Option<String> {
        item.select(selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    }
}
