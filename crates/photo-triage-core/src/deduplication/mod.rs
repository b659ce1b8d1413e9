use crate::processing::Fingerprint;

/// Answer from a duplicate lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// Within tolerance of an earlier accepted file (named here)
    Match(String),

    /// Nothing close enough; the fingerprint is now accepted
    NoMatch,
}

/// Fingerprints accepted so far in one scan, in insertion order.
///
/// Lookups are first-match-wins over the accepted entries, not nearest
/// match, so an earlier file is always the canonical one. Duplicates are
/// never inserted, which means a chain of near matches cannot drift away
/// from the original.
#[derive(Debug, Clone)]
pub struct DuplicateIndex {
    tolerance: u32,
    accepted: Vec<(Fingerprint, String)>,
}

impl DuplicateIndex {
    pub fn new(tolerance: u32) -> Self {
        Self {
            tolerance,
            accepted: Vec::new(),
        }
    }

    /// Look `fingerprint` up and accept it when no earlier entry matches
    pub fn query(&mut self, fingerprint: Fingerprint, file: &str) -> DuplicateCheck {
        match self.find(&fingerprint) {
            Some(original) => DuplicateCheck::Match(original.to_string()),
            None => {
                self.accepted.push((fingerprint, file.to_string()));
                DuplicateCheck::NoMatch
            }
        }
    }

    /// First accepted file within tolerance, without modifying the index
    pub fn find(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.accepted
            .iter()
            .find(|(accepted, _)| accepted.is_similar(fingerprint, self.tolerance))
            .map(|(_, file)| file.as_str())
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }
}
