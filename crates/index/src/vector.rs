//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and top-k ranking shared by every index backend.

use ragdesk_core::error::RetrievalError;
use ragdesk_core::retrieval::{IndexedDocument, SearchHit};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank documents by cosine similarity to a query embedding.
///
/// Returns at most `k` hits sorted by descending similarity. Ties keep
/// insertion order.
pub fn rank_by_similarity(
    documents: &[IndexedDocument],
    query_embedding: &[f32],
    k: usize,
) -> Vec<SearchHit> {
    let mut scored: Vec<(f32, &IndexedDocument)> = documents
        .iter()
        .map(|doc| (cosine_similarity(&doc.embedding, query_embedding), doc))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
        .into_iter()
        .map(|(score, doc)| SearchHit::new(doc.text.clone(), score))
        .collect()
}

/// Reject a query whose length differs from the stored embeddings, which
/// happens when the index was built with a different embedding provider.
pub fn check_dimensions(
    documents: &[IndexedDocument],
    query_embedding: &[f32],
) -> Result<(), RetrievalError> {
    match documents.first() {
        Some(first) if first.embedding.len() != query_embedding.len() => {
            Err(RetrievalError::Index(format!(
                "query has {} dimensions but the index stores {}; re-ingest with the current embedding provider",
                query_embedding.len(),
                first.embedding.len()
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, embedding: Vec<f32>) -> IndexedDocument {
        IndexedDocument::new(text, embedding)
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite_vectors() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn ranks_by_similarity() {
        let query = vec![1.0, 0.0, 0.0];
        let docs = vec![
            doc("orthogonal", vec![0.0, 1.0, 0.0]),
            doc("identical", vec![1.0, 0.0, 0.0]),
            doc("partial", vec![0.5, 0.5, 0.0]),
        ];

        let hits = rank_by_similarity(&docs, &query, 10);
        let texts: Vec<_> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["identical", "partial", "orthogonal"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn respects_k() {
        let query = vec![1.0, 0.0];
        let docs: Vec<_> = (0..10)
            .map(|i| doc(&format!("d{i}"), vec![1.0, i as f32 * 0.1]))
            .collect();
        assert_eq!(rank_by_similarity(&docs, &query, 3).len(), 3);
    }

    #[test]
    fn dimension_mismatch_detected() {
        let docs = vec![doc("a", vec![1.0, 0.0])];
        assert!(check_dimensions(&docs, &[1.0, 0.0]).is_ok());
        assert!(matches!(
            check_dimensions(&docs, &[1.0, 0.0, 0.0]),
            Err(RetrievalError::Index(_))
        ));
        assert!(check_dimensions(&[], &[1.0]).is_ok());
    }

    #[test]
    fn empty_documents() {
        assert!(rank_by_similarity(&[], &[1.0], 5).is_empty());
    }
}
