//! Per-entity icon cache.
//!
//! Icons load asynchronously through the browser; the renderer only ever asks
//! the cache synchronously and draws an initial glyph on a miss.

use std::collections::HashMap;

/// Load state of one icon.
#[derive(Clone, Debug)]
pub enum IconState<I> {
	Loading,
	Ready(I),
	Failed,
}

/// Icons keyed by entity id. Generic over the image handle so the cache logic
/// does not depend on the DOM.
#[derive(Clone, Debug)]
pub struct IconCache<I> {
	entries: HashMap<String, IconState<I>>,
}

impl<I> Default for IconCache<I> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<I> IconCache<I> {
	/// Whether a fetch should be started for `id`. Marks it loading if so.
	pub fn begin_load(&mut self, id: &str) -> bool {
		if self.entries.contains_key(id) {
			return false;
		}
		self.entries.insert(id.to_string(), IconState::Loading);
		true
	}

	pub fn finish(&mut self, id: &str, image: I) {
		self.entries.insert(id.to_string(), IconState::Ready(image));
	}

	pub fn fail(&mut self, id: &str) {
		self.entries.insert(id.to_string(), IconState::Failed);
	}

	/// The loaded image, if any. Loading and failed entries both miss.
	pub fn get(&self, id: &str) -> Option<&I> {
		match self.entries.get(id) {
			Some(IconState::Ready(image)) => Some(image),
			_ => None,
		}
	}

	pub fn state(&self, id: &str) -> Option<&IconState<I>> {
		self.entries.get(id)
	}
}

/// Up to two uppercase initials from a display name, `?` for blank names.
///
/// "TypeScript" -> "T", "Node js" -> "NJ", "c++" -> "C".
pub fn fallback_glyph(name: &str) -> String {
	let initials: String = name
		.split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == '.')
		.filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
		.take(2)
		.flat_map(char::to_uppercase)
		.collect();
	if initials.is_empty() {
		"?".to_string()
	} else {
		initials
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn glyph_uses_word_initials() {
		assert_eq!(fallback_glyph("TypeScript"), "T");
		assert_eq!(fallback_glyph("node js"), "NJ");
		assert_eq!(fallback_glyph("google cloud platform"), "GC");
		assert_eq!(fallback_glyph("c++"), "C");
		assert_eq!(fallback_glyph("   "), "?");
	}

	#[test]
	fn cache_only_requests_once_and_misses_until_ready() {
		let mut cache: IconCache<u32> = IconCache::default();
		assert!(cache.begin_load("rust"));
		assert!(!cache.begin_load("rust"));
		assert!(cache.get("rust").is_none());

		cache.finish("rust", 7);
		assert_eq!(cache.get("rust"), Some(&7));

		assert!(cache.begin_load("go"));
		cache.fail("go");
		assert!(cache.get("go").is_none());
		assert!(matches!(cache.state("go"), Some(IconState::Failed)));
		assert!(!cache.begin_load("go"));
	}
}
