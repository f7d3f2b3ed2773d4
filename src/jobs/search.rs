/// A search term matched as literal text, ignoring case.
///
/// The term is lowercased once; each candidate cell is lowercased per comparison.
/// No character in the term has special meaning.
#[derive(Debug, Clone)]
pub struct Needle {
    raw: String,
    folded: String,
}

impl Needle {
    pub fn new(term: &str) -> Self {
        Self {
            raw: term.to_string(),
            folded: term.to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, haystack: &str) -> bool {
        if self.folded.is_empty() {
            return true;
        }
        haystack.to_lowercase().contains(&self.folded)
    }
}
