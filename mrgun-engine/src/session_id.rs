//! Server-generated `session_id` (§3, §4.4 step 6):
//! `{operator_id}_{unix_ms_now}_{16 random hex chars}`.

use mrgun_common::ids::OperatorId;
use rand::RngCore;

pub fn generate(operator_id: OperatorId, unix_ms_now: i64) -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{operator_id}_{unix_ms_now}_{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_matches_spec() {
        let operator_id = OperatorId::generate();
        let id = generate(operator_id, 1_700_000_000_123);
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], "1700000000123");
        assert_eq!(parts[2].len(), 16);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn two_calls_differ() {
        let operator_id = OperatorId::generate();
        assert_ne!(
            generate(operator_id, 1_700_000_000_000),
            generate(operator_id, 1_700_000_000_000)
        );
    }
}
