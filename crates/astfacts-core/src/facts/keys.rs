//! Key allocation.

use crate::error::FactError;

/// Hands out `<trunk>_<n>` keys with a strictly increasing `n`.
///
/// One instance is shared by every file of a run so keys never collide
/// across files.
#[derive(Debug, Clone)]
pub struct KeyManager {
    trunk: u64,
    num: u64,
}

impl KeyManager {
    /// Parse a trunk key of the form `<int>` or `<int>_<int>`.
    ///
    /// The first generated key is `<trunk>_<initial + 1>`, where `initial`
    /// is the suffix of the trunk key or 0 when there is none.
    pub fn new(trunk_key: &str) -> Result<Self, FactError> {
        let invalid = || FactError::InvalidTrunkFormat(trunk_key.to_string());

        let (trunk, num) = match trunk_key.split_once('_') {
            Some((trunk, num)) => (parse_part(trunk), parse_part(num)),
            None => (parse_part(trunk_key), Some(0)),
        };

        match (trunk, num) {
            (Some(trunk), Some(num)) => Ok(Self { trunk, num }),
            _ => Err(invalid()),
        }
    }

    /// Allocate the next key.
    pub fn next_key(&mut self) -> String {
        self.num += 1;
        format!("{}_{}", self.trunk, self.num)
    }

    pub fn trunk(&self) -> u64 {
        self.trunk
    }

    /// Suffix of the most recently allocated key.
    pub fn last(&self) -> u64 {
        self.num
    }
}

fn parse_part(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_trunk_starts_at_one() {
        let mut keys = KeyManager::new("5").unwrap();
        assert_eq!(keys.next_key(), "5_1");
        assert_eq!(keys.next_key(), "5_2");
        assert_eq!(keys.trunk(), 5);
    }

    #[test]
    fn test_suffixed_trunk_continues_after_suffix() {
        let mut keys = KeyManager::new("12_40").unwrap();
        assert_eq!(keys.next_key(), "12_41");
        assert_eq!(keys.last(), 41);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for bad in ["abc", "", "1_2_3", "_1", "1_", "-4", "+4", "1_x", " 1"] {
            assert!(
                matches!(KeyManager::new(bad), Err(FactError::InvalidTrunkFormat(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
