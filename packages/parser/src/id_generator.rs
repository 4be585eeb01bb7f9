use crc32fast::Hasher;

/// Stable per-document seed from the document title and root id
pub fn document_seed(title: &str, root_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(title.as_bytes());
    hasher.update(&[0]);
    hasher.update(root_id.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential ID generator for new nodes within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(title: &str, root_id: &str) -> Self {
        Self::from_seed(document_seed(title, root_id))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Next `<seed>-<n>` id for which `taken` returns false
    pub fn next_unique(&mut self, taken: impl Fn(&str) -> bool) -> String {
        loop {
            self.count += 1;
            let candidate = format!("{}-{}", self.seed, self.count);
            if !taken(&candidate) {
                return candidate;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_seed_is_stable() {
        let a = document_seed("Plans", "root");
        assert_eq!(a, document_seed("Plans", "root"));
        assert_ne!(a, document_seed("Plans", "other"));
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::from_seed("abc".to_string());
        assert_eq!(gen.next_unique(|_| false), "abc-1");
        assert_eq!(gen.next_unique(|_| false), "abc-2");
    }

    #[test]
    fn test_skips_taken_ids() {
        let mut gen = IdGenerator::from_seed("abc".to_string());
        let taken = ["abc-1", "abc-2"];
        assert_eq!(gen.next_unique(|id| taken.contains(&id)), "abc-3");
        assert!(gen.next_unique(|_| false).ends_with("-4"));
        assert!(gen.seed().starts_with("abc"));
    }
}
