//! CSS selector fallback chains for Amazon product pages.
//!
//! Each field has a fixed priority list of selectors, tried in order; the
//! first one yielding non-empty text wins. This tolerates markup drift
//! across page template variants. Update these chains when parsing starts
//! failing: capture an HTML sample, adjust the chain, add a test fixture.

use scraper::Selector;
use std::sync::LazyLock;

fn chain(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
}

/// Product title.
pub static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        "#productTitle",
        "h1.product-title",
        r#"h1[data-test-id="product-title"]"#,
        ".product-title-word-break",
    ])
});

/// Current price.
pub static PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        ".a-price .a-offscreen",
        "#priceblock_ourprice",
        "#priceblock_dealprice",
        ".a-price-whole",
        ".a-color-price",
    ])
});

/// Pre-discount (strikethrough) price.
pub static ORIGINAL_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        ".a-text-strike",
        "#priceblock_listprice",
        r#".a-price.a-text-price span[aria-hidden="true"]"#,
        ".a-text-price",
    ])
});

/// Star rating text.
pub static RATING: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        r#"span[data-hook="rating-out-of-text"]"#,
        ".a-icon-star .a-icon-alt",
        "#acrPopover .a-color-base",
    ])
});

/// Review count text.
pub static REVIEWS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        "#acrCustomerReviewText",
        r#"span[data-hook="total-review-count"]"#,
        "#reviewsMedley .a-color-secondary",
    ])
});

/// Description blocks; the first two matches are joined.
pub static DESCRIPTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        "#feature-bullets .a-list-item",
        "#productDescription p",
        "#product-description",
        ".a-spacing-mini:not(.a-spacing-top-small)",
    ])
});

/// Feature bullets.
pub static FEATURES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        "#feature-bullets .a-list-item",
        ".a-unordered-list .a-list-item",
    ])
});

/// Image elements, most specific first.
pub static IMAGE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    chain(&[
        "#imgBlkFront",
        "#landingImage",
        "#main-image",
        ".a-dynamic-image",
        "#imgTagWrapperId img",
        ".image-wrapper img",
        ".a-stretch-horizontal img",
        "img[data-old-hires]",
        "img[data-a-dynamic-image]",
    ])
});

/// Canonical link tag, used when expanding short links lands on an
/// intermediate marketing page.
pub static CANONICAL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="canonical"]"#).unwrap());

/// Social-metadata URL tag, second priority after the canonical link.
pub static OG_URL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:url"]"#).unwrap());

/// Any anchor; scanned for a product-id marker as the last resort.
pub static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
