//! Proof-of-work gate for block commits
//!
//! A candidate proof is valid when the SHA-256 digest of the previous proof
//! concatenated with the candidate starts with a run of hex zeros. The gate
//! only simulates mining cost before a commit; there is no distributed
//! adversary in this design, so it is not a security mechanism.

use crate::config::PowConfig;
use crate::crypto::hash_bytes;
use crate::{Error, Result};

/// Proof value used for commits when the proof-of-work gate is disabled
pub const PLACEHOLDER_PROOF: u64 = 12345;

/// Check whether `candidate` is a valid proof for `last_proof`
pub fn valid_proof(last_proof: u64, candidate: u64, difficulty: usize) -> bool {
    let digest = hash_bytes(format!("{}{}", last_proof, candidate).as_bytes());
    hex::encode(digest)
        .bytes()
        .take(difficulty)
        .all(|b| b == b'0')
}

/// Search increasing candidates until one satisfies the difficulty predicate
///
/// Deterministic given `last_proof`: the smallest valid candidate wins.
/// Bounded by `config.max_iterations` so a caller is never stuck searching
/// indefinitely; exhaustion is retryable with a larger bound.
pub fn find_proof(last_proof: u64, config: &PowConfig) -> Result<u64> {
    for candidate in 0..config.max_iterations {
        if valid_proof(last_proof, candidate, config.difficulty) {
            return Ok(candidate);
        }
    }

    Err(Error::ProofSearchExhausted {
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pow_config(difficulty: usize, max_iterations: u64) -> PowConfig {
        PowConfig {
            enabled: true,
            difficulty,
            max_iterations,
        }
    }

    #[test]
    fn test_zero_difficulty_accepts_first_candidate() {
        let config = pow_config(0, 10);
        assert_eq!(find_proof(100, &config).unwrap(), 0);
    }

    #[test]
    fn test_found_proof_satisfies_predicate() {
        let config = pow_config(1, 1_000);
        let proof = find_proof(100, &config).unwrap();
        assert!(valid_proof(100, proof, 1));
    }

    #[test]
    fn test_search_is_deterministic() {
        let config = pow_config(2, 100_000);
        assert_eq!(
            find_proof(7, &config).unwrap(),
            find_proof(7, &config).unwrap()
        );
    }

    #[test]
    fn test_proofs_valid_for_their_own_seed() {
        let config = pow_config(2, 100_000);
        let a = find_proof(1, &config).unwrap();
        let b = find_proof(2, &config).unwrap();
        assert!(valid_proof(1, a, 2));
        assert!(valid_proof(2, b, 2));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let config = pow_config(64, 10);
        let result = find_proof(100, &config);
        assert!(matches!(
            result,
            Err(Error::ProofSearchExhausted { iterations: 10 })
        ));
    }
}
