//! Local id generation and timestamps.

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns a random local id: two concatenated base-36 fragments.
///
/// Not cryptographically strong; only meant to avoid collisions between
/// records created on one machine.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(26);
    for _ in 0..2 {
        let len = rng.gen_range(10..=13);
        id.extend((0..len).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char));
    }
    id
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_alphabet() {
        let id = generate_id();
        assert!(id.len() >= 20 && id.len() <= 26, "length {}", id.len());
        assert!(id.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_generate_id_unique() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000);
    }
}
