//! Partition of the chapter listing into downloadable and locked entries.

use crate::model::ChapterEntry;

/// Counts of linked vs. unlinked listing rows. The listing itself is never filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub total: usize,
    pub available: usize,
}

impl Availability {
    /// True when every chapter has a link (vacuously true for an empty listing).
    pub fn all_available(&self) -> bool {
        self.available == self.total
    }

    pub fn unavailable(&self) -> usize {
        self.total.saturating_sub(self.available)
    }
}

pub fn classify(chapters: &[ChapterEntry]) -> Availability {
    Availability {
        total: chapters.len(),
        available: chapters.iter().filter(|c| c.is_available()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_linked_is_all_available() {
        let a = classify(&[
            ChapterEntry::linked("1", "https://author.today/reader/1/1"),
            ChapterEntry::linked("2", "https://author.today/reader/1/2"),
        ]);
        assert!(a.all_available());
        assert_eq!(a.unavailable(), 0);
    }

    #[test]
    fn mixed_listing_is_partial() {
        let a = classify(&[
            ChapterEntry::linked("1", "https://author.today/reader/1/1"),
            ChapterEntry::unlinked("2"),
            ChapterEntry::unlinked("3"),
        ]);
        assert!(!a.all_available());
        assert_eq!(a.total, 3);
        assert_eq!(a.available, 1);
        assert_eq!(a.unavailable(), 2);
    }

    #[test]
    fn unavailable_never_underflows() {
        let a = Availability {
            total: 1,
            available: 3,
        };
        assert_eq!(a.unavailable(), 0);
    }

    #[test]
    fn empty_listing_counts_as_available() {
        assert!(classify(&[]).all_available());
    }
}
