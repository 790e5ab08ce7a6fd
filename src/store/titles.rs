/// Titles as stored in the container, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTitles {
    /// Fixed-width byte strings, possibly NUL-padded
    Bytes(Vec<Vec<u8>>),
    /// Already decoded text
    Text(Vec<String>),
}

/// Lower-cased, trimmed lookup key for a title or query
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Decodes a stored title.
///
/// Trailing NUL padding is removed and invalid UTF-8 sequences are dropped.
pub fn decode_title(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    raw[..end]
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect()
}

/// In-memory title index with its parallel normalized keys
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: Vec<String>,
    keys: Vec<String>,
}

impl From<RawTitles> for TitleIndex {
    fn from(raw: RawTitles) -> Self {
        match raw {
            RawTitles::Bytes(entries) => Self::new(entries.iter().map(|e| decode_title(e)).collect()),
            RawTitles::Text(titles) => Self::new(titles),
        }
    }
}

impl TitleIndex {
    pub fn new(titles: Vec<String>) -> Self {
        let keys = titles.iter().map(|t| normalize(t)).collect();
        Self { titles, keys }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Original title text at `index`
    pub fn title(&self, index: usize) -> Option<&str> {
        self.titles.get(index).map(String::as_str)
    }

    /// First index whose key equals the normalized `title`
    pub fn position(&self, title: &str) -> Option<usize> {
        let key = normalize(title);
        self.keys.iter().position(|k| *k == key)
    }

    /// Titles whose key contains the normalized `query`, in index order
    pub fn search(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        self.keys
            .iter()
            .zip(&self.titles)
            .filter(|(key, _)| key.contains(&needle))
            .map(|(_, title)| title.clone())
            .take(limit)
            .collect()
    }
}
