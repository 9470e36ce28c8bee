use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};
use tracing::warn;

/// Locale-aware text ordering for list sorting.
///
/// Secondary strength: case is ignored, accents are not. `Émile` sorts
/// with the E's, not after `Zoe`.
pub struct TextCollator {
    inner: Option<Collator>,
}

impl TextCollator {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => TextCollator {
                inner: Some(collator),
            },
            Err(e) => {
                warn!("Collation data unavailable, sorting by lowercase text: {e}");
                TextCollator { inner: None }
            }
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.inner {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

impl Default for TextCollator {
    fn default() -> Self {
        Self::new()
    }
}
