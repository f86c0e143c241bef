//! Offline embedding provider using the hashing trick.
//!
//! Each lower-cased word is hashed (FNV-1a) into one of `dimensions`
//! buckets with a hash-derived sign, and the result is L2-normalised, so cosine
//! similarity between two texts approximates their word overlap. Needs no
//! network and no API key, which makes it the default for local use and tests.

use async_trait::async_trait;
use ragdesk_core::error::RetrievalError;
use ragdesk_core::retrieval::EmbeddingProvider;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(&word.to_lowercase());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ b as u64).wrapping_mul(FNV_PRIME))
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, RetrievalError> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn deterministic_and_fixed_length() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed("Reset the VPN password").await.unwrap();
        let b = embedder.embed("Reset the VPN password").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn case_and_punctuation_insensitive() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("printer offline!").await.unwrap();
        let b = embedder.embed("PRINTER, offline").await.unwrap();
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn overlapping_texts_score_higher() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed("reset email password").await.unwrap();
        let close = embedder.embed("how to reset your email password").await.unwrap();
        let far = embedder.embed("quarterly sales figures for the north region").await.unwrap();
        assert!(cosine(&query, &close) > cosine(&query, &far));
    }

    #[tokio::test]
    async fn empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(8);
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
