//! Image reference resolution for inventory documents.
//!
//! The POS writes `imageUrls` (up to ten storage URLs) and mirrors the first
//! entry into the legacy `imageUrl` field. Older documents only carry
//! `imageUrl` or `imageURL`.

use serde_json::Value;

use bazaar_core::COMPOSITE_ID_SEP;

use crate::db::Record;

/// Maximum number of images kept per product.
pub const MAX_IMAGES: usize = 10;

/// Whether a candidate looks like an absolute http(s) URL.
///
/// Candidates containing the composite id separator are rejected so a
/// product id stored in an image field is never rendered as an image.
#[must_use]
pub fn is_valid_image_url(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty()
        && !trimmed.contains(COMPOSITE_ID_SEP)
        && (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
}

/// Ordered, validated image URLs for a document, at most [`MAX_IMAGES`].
///
/// A non-empty `imageUrls` array is authoritative even when none of its
/// entries survive validation; the legacy single-image fields are only read
/// when the array is absent or empty.
#[must_use]
pub fn resolve(data: &Record) -> Vec<String> {
    if let Some(Value::Array(urls)) = data.get("imageUrls")
        && !urls.is_empty()
    {
        return urls
            .iter()
            .filter_map(Value::as_str)
            .filter(|url| is_valid_image_url(url))
            .map(|url| url.trim().to_owned())
            .take(MAX_IMAGES)
            .collect();
    }

    ["imageUrl", "imageURL"]
        .iter()
        .filter_map(|key| data.get(*key).and_then(Value::as_str))
        .find(|url| !url.is_empty())
        .map(str::trim)
        .filter(|url| is_valid_image_url(url))
        .map(|url| vec![url.to_owned()])
        .unwrap_or_default()
}
