//! Cache key derivation.

use std::fmt;

use crate::content::query::FetchQuery;

const PREFIX: &str = "contentstack";
const SEPARATOR: char = ':';

/// Deterministic cache key for one [`FetchQuery`].
///
/// Every query field takes part in the key and each component is escaped,
/// so ids containing `:` cannot make two different queries collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&FetchQuery> for CacheKey {
    fn from(query: &FetchQuery) -> Self {
        let mut key = KeyWriter::new(PREFIX);

        match query.entry_id() {
            Some(entry_id) => {
                key.push("entry");
                key.push(query.content_type_id());
                key.push(query.locale());
                key.push(entry_id);
                key.flag("embedded", query.include_embedded());
                key.optional("ref", query.reference_name());
            }
            None => {
                key.push("entries");
                key.push(query.content_type_id());
                key.push(query.locale());
                key.flag("embedded", query.include_embedded());
                key.optional("sort", query.sort_field());
                key.flag("desc", query.sort_descending());
                key.flag("count", query.include_count());
                key.optional("skip", query.skip().map(|n| n.to_string()).as_deref());
                key.optional("take", query.take().map(|n| n.to_string()).as_deref());
            }
        }

        CacheKey(key.finish())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct KeyWriter {
    buf: String,
}

impl KeyWriter {
    fn new(prefix: &str) -> Self {
        Self {
            buf: prefix.to_string(),
        }
    }

    fn push(&mut self, component: &str) {
        self.buf.push(SEPARATOR);
        for c in component.chars() {
            if c == SEPARATOR || c == '\\' {
                self.buf.push('\\');
            }
            self.buf.push(c);
        }
    }

    fn flag(&mut self, name: &str, value: bool) {
        self.push(&format!("{}={}", name, u8::from(value)));
    }

    // `name_` for absent, `name=value` for present.
    fn optional(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(v) => self.push(&format!("{}={}", name, v)),
            None => self.push(&format!("{}_", name)),
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}
