use chrono::{DateTime, Utc};

/// Mints recipe ids from the wall clock.
///
/// An id is the Unix time in milliseconds; ids minted within the same
/// millisecond (or after the clock stepped backwards) get a `_<n>` suffix on
/// the last issued millisecond, so the sequence never repeats within a
/// process.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last_millis: i64,
    seq: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_at(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        if millis > self.last_millis {
            self.last_millis = millis;
            self.seq = 0;
            millis.to_string()
        } else {
            self.seq += 1;
            format!("{}_{}", self.last_millis, self.seq)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_plain_millis_when_clock_advances() {
        let mut ids = IdGenerator::new();
        let t = Utc.timestamp_millis_opt(1_714_000_000_000).unwrap();
        assert_eq!(ids.next_at(t), "1714000000000");
        let later = Utc.timestamp_millis_opt(1_714_000_000_005).unwrap();
        assert_eq!(ids.next_at(later), "1714000000005");
    }

    #[test]
    fn test_suffix_within_same_millisecond() {
        let mut ids = IdGenerator::new();
        let t = Utc.timestamp_millis_opt(1_714_000_000_000).unwrap();
        let minted: Vec<String> = (0..3).map(|_| ids.next_at(t)).collect();
        assert_eq!(
            minted,
            vec!["1714000000000", "1714000000000_1", "1714000000000_2"]
        );
    }

    #[test]
    fn test_clock_going_backwards_never_repeats() {
        let mut ids = IdGenerator::new();
        let mut seen = HashSet::new();
        for millis in [10_i64, 12, 11, 12, 9, 13] {
            let t = Utc.timestamp_millis_opt(millis).unwrap();
            assert!(seen.insert(ids.next_at(t)));
        }
    }
}
