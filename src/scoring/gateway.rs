//! Hidden-scoring gateway.
//!
//! The round engine consumes scoring as an injected capability: encrypt a
//! feature vector under keeper-supplied randomness, then recover only the
//! aggregate weighted sum through an all-ones weight selector. No party,
//! including the keeper who supplied the randomness, learns an individual
//! weight. The real cryptographic scheme (functional encryption over
//! committed vectors) lives outside this crate; [`SealedWeightScorer`] is a
//! faithful stand-in for its input/output contract.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::scoring::features::FeatureVector;
use crate::utils::constants::{DEFAULT_HIDDEN_WEIGHTS, FEATURE_DIM, FEATURE_SCALE, NONCE_LENGTH};

// ═══════════════════════════════════════════════════════════════════════════════
// ENCRYPTED VECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// An encrypted feature vector: opaque payload plus the randomness seed
/// that binds it to one reveal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVector {
    /// Masked feature components
    payload: [u64; FEATURE_DIM],
    /// Keeper-supplied randomness the keystream was derived from
    seed: [u8; NONCE_LENGTH],
}

// ═══════════════════════════════════════════════════════════════════════════════
// HIDDEN SCORER CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// The hidden-scoring capability consumed by the round engine.
///
/// `weight_selector` picks which weights participate; the engine always
/// passes all ones so the result is the full hidden-weighted sum.
pub trait HiddenScorer {
    /// Encrypt a feature vector under caller-supplied randomness
    fn encrypt_vector(
        &self,
        features: &FeatureVector,
        randomness: &[u8; NONCE_LENGTH],
    ) -> EncryptedVector;

    /// Recover the selected weighted sum from a ciphertext
    fn weighted_sum(
        &self,
        ciphertext: &EncryptedVector,
        weight_selector: &[u8; FEATURE_DIM],
    ) -> Result<i64>;
}

/// The all-ones selector: every weight participates
pub const ALL_ONES_SELECTOR: [u8; FEATURE_DIM] = [1; FEATURE_DIM];

// ═══════════════════════════════════════════════════════════════════════════════
// SEALED-WEIGHT SCORER
// ═══════════════════════════════════════════════════════════════════════════════

/// Scorer holding the weight vector sealed inside; callers only ever see
/// aggregate sums. Masking uses a SHA256 keystream derived from the
/// caller's randomness, standing in for the external functional-encryption
/// scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedWeightScorer {
    weights: [i64; FEATURE_DIM],
}

impl Default for SealedWeightScorer {
    fn default() -> Self {
        Self::new(DEFAULT_HIDDEN_WEIGHTS)
    }
}

impl SealedWeightScorer {
    /// Seal a weight vector. There is no accessor back out.
    pub fn new(weights: [i64; FEATURE_DIM]) -> Self {
        Self { weights }
    }

    fn keystream(seed: &[u8; NONCE_LENGTH]) -> [u64; FEATURE_DIM] {
        let mut stream = [0u64; FEATURE_DIM];
        for (i, word) in stream.iter_mut().enumerate() {
            let mut hasher = Sha256::new();
            hasher.update(b"fairliq:mask:");
            hasher.update(seed);
            hasher.update((i as u64).to_be_bytes());
            let digest = hasher.finalize();
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            *word = u64::from_be_bytes(bytes);
        }
        stream
    }
}

impl HiddenScorer for SealedWeightScorer {
    fn encrypt_vector(
        &self,
        features: &FeatureVector,
        randomness: &[u8; NONCE_LENGTH],
    ) -> EncryptedVector {
        let stream = Self::keystream(randomness);
        let mut payload = [0u64; FEATURE_DIM];
        for i in 0..FEATURE_DIM {
            payload[i] = features.as_slice()[i] ^ stream[i];
        }
        EncryptedVector {
            payload,
            seed: *randomness,
        }
    }

    fn weighted_sum(
        &self,
        ciphertext: &EncryptedVector,
        weight_selector: &[u8; FEATURE_DIM],
    ) -> Result<i64> {
        let stream = Self::keystream(&ciphertext.seed);

        let mut sum: i128 = 0;
        for i in 0..FEATURE_DIM {
            if weight_selector[i] == 0 {
                continue;
            }
            let feature = ciphertext.payload[i] ^ stream[i];
            sum += (self.weights[i] as i128) * (feature as i128);
        }

        let score = sum / FEATURE_SCALE as i128;
        if score > i64::MAX as i128 || score < i64::MIN as i128 {
            return Err(Error::Overflow {
                operation: "hidden weighted sum".into(),
            });
        }
        Ok(score as i64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-SCORE STUB
// ═══════════════════════════════════════════════════════════════════════════════

/// Deterministic stub returning a fixed score regardless of input, for
/// engine tests that want to force eligibility one way or the other
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedScoreScorer(
    /// The score every reveal will receive
    pub i64,
);

impl HiddenScorer for FixedScoreScorer {
    fn encrypt_vector(
        &self,
        features: &FeatureVector,
        randomness: &[u8; NONCE_LENGTH],
    ) -> EncryptedVector {
        EncryptedVector {
            payload: *features.as_slice(),
            seed: *randomness,
        }
    }

    fn weighted_sum(
        &self,
        _ciphertext: &EncryptedVector,
        _weight_selector: &[u8; FEATURE_DIM],
    ) -> Result<i64> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::random_nonce;

    fn features() -> FeatureVector {
        FeatureVector([1330, 500, 751, 0, 200])
    }

    #[test]
    fn test_sealed_score_matches_plain_inner_product() {
        let scorer = SealedWeightScorer::default();
        let randomness = random_nonce();

        let ciphertext = scorer.encrypt_vector(&features(), &randomness);
        let score = scorer.weighted_sum(&ciphertext, &ALL_ONES_SELECTOR).unwrap();

        // [2000, -1000, -1500, 300, -300] . [1330, 500, 751, 0, 200] / 1000
        let expected = (2000 * 1330 - 1000 * 500 - 1500 * 751 - 300 * 200) / 1000;
        assert_eq!(score, expected);
    }

    #[test]
    fn test_ciphertext_hides_features() {
        let scorer = SealedWeightScorer::default();
        let ciphertext = scorer.encrypt_vector(&features(), &random_nonce());

        // Masked payload does not expose the raw features
        assert_ne!(ciphertext.payload, *features().as_slice());
    }

    #[test]
    fn test_distinct_randomness_distinct_ciphertexts() {
        let scorer = SealedWeightScorer::default();
        let a = scorer.encrypt_vector(&features(), &random_nonce());
        let b = scorer.encrypt_vector(&features(), &random_nonce());
        assert_ne!(a, b);

        // Same score recovered from either
        let sa = scorer.weighted_sum(&a, &ALL_ONES_SELECTOR).unwrap();
        let sb = scorer.weighted_sum(&b, &ALL_ONES_SELECTOR).unwrap();
        assert_eq!(sa, sb);
    }

    #[test]
    fn test_selector_masks_weights_out() {
        let scorer = SealedWeightScorer::new([1000, 1000, 1000, 1000, 1000]);
        let ciphertext = scorer.encrypt_vector(&features(), &random_nonce());

        let mut selector = ALL_ONES_SELECTOR;
        selector[0] = 0;
        let partial = scorer.weighted_sum(&ciphertext, &selector).unwrap();
        let full = scorer.weighted_sum(&ciphertext, &ALL_ONES_SELECTOR).unwrap();

        assert_eq!(full - partial, 1330);
    }

    #[test]
    fn test_fixed_scorer_ignores_input() {
        let scorer = FixedScoreScorer(-42);
        let ciphertext = scorer.encrypt_vector(&features(), &random_nonce());
        assert_eq!(
            scorer.weighted_sum(&ciphertext, &ALL_ONES_SELECTOR).unwrap(),
            -42
        );
    }
}
