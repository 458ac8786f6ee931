use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    application::services::{EmbeddingEngine, SearchHit, VectorIndex},
    domain::{DocumentMetadata, DomainError, QueryFilters},
    infrastructure::embeddings::SimpleEmbedEngine,
};

/// How stored texts are compared against a query.
enum Scorer {
    /// Inner product over L2-normalized embeddings.
    Vector {
        engine: Arc<dyn EmbeddingEngine>,
        fallback: SimpleEmbedEngine,
        dims: usize,
    },
    /// Fraction of query words present in the document text.
    KeywordOverlap,
}

struct IndexEntry {
    text: String,
    lowered: String,
    metadata: DocumentMetadata,
}

/// Append-only, exact nearest-neighbour index held entirely in memory.
///
/// Vectors live in one flat row-major matrix; row `i` belongs to entry `i`.
/// A linear scan is fine for corpora in the hundreds of documents.
pub struct InMemoryIndex {
    scorer: Scorer,
    entries: Vec<IndexEntry>,
    matrix: Vec<f32>,
}

impl InMemoryIndex {
    /// Index backed by an embedding engine. Texts the engine cannot embed are
    /// embedded with the deterministic hash engine of the same dimension.
    pub fn with_engine(engine: Arc<dyn EmbeddingEngine>) -> Self {
        let dims = engine
            .dims()
            .unwrap_or(crate::infrastructure::embeddings::DEFAULT_SIMPLE_DIMENSIONS);
        Self {
            scorer: Scorer::Vector {
                engine,
                fallback: SimpleEmbedEngine::with_dimensions(dims),
                dims,
            },
            entries: Vec::new(),
            matrix: Vec::new(),
        }
    }

    /// Index that scores by keyword overlap and never embeds anything.
    pub fn keyword_overlap() -> Self {
        Self {
            scorer: Scorer::KeywordOverlap,
            entries: Vec::new(),
            matrix: Vec::new(),
        }
    }

    /// Appends `texts` with their metadata. Returns how many entries were stored.
    pub fn add(
        &mut self,
        texts: Vec<String>,
        metadata: Vec<DocumentMetadata>,
    ) -> Result<usize, DomainError> {
        if texts.len() != metadata.len() {
            return Err(DomainError::validation(format!(
                "{} texts supplied with {} metadata entries",
                texts.len(),
                metadata.len()
            )));
        }

        let mut added = 0;
        for (text, metadata) in texts.into_iter().zip(metadata) {
            if text.trim().is_empty() {
                warn!(target: "docsmith::index", "skipping empty knowledge text");
                continue;
            }

            if let Scorer::Vector { .. } = self.scorer {
                match self.embed_normalized(&text) {
                    Some(vector) => self.matrix.extend_from_slice(&vector),
                    None => {
                        warn!(
                            target: "docsmith::index",
                            text = %text,
                            "text produced no usable embedding; skipped"
                        );
                        continue;
                    }
                }
            }

            self.entries.push(IndexEntry {
                lowered: text.to_lowercase(),
                text,
                metadata,
            });
            added += 1;
        }

        debug!(target: "docsmith::index", added, total = self.entries.len(), "index grown");
        Ok(added)
    }

    /// Embeds with the configured engine, degrading to the hash engine, and
    /// returns a unit-length vector. `None` if no non-zero vector is obtainable.
    fn embed_normalized(&self, text: &str) -> Option<Vec<f32>> {
        let Scorer::Vector {
            engine,
            fallback,
            dims,
        } = &self.scorer
        else {
            return None;
        };

        let primary = engine.embed(text).and_then(|vector| {
            if vector.len() == *dims {
                Ok(vector)
            } else {
                Err(DomainError::embedding(format!(
                    "expected {dims} dimensions, got {}",
                    vector.len()
                )))
            }
        });

        let mut vector = match primary {
            Ok(vector) => vector,
            Err(err) => {
                warn!(
                    target: "docsmith::index",
                    engine = engine.model(),
                    error = %err,
                    "embedding engine failed, using hash fallback"
                );
                fallback.embed(text).ok()?
            }
        };

        normalize(&mut vector).then_some(vector)
    }

    fn vector_scores(&self, query: &str, filters: &QueryFilters) -> Vec<(usize, f32)> {
        let Scorer::Vector { dims, .. } = &self.scorer else {
            return Vec::new();
        };
        let Some(query_vector) = self.embed_normalized(query) else {
            return Vec::new();
        };

        self.matrix
            .chunks_exact(*dims)
            .enumerate()
            .filter(|(idx, _)| filters.matches(&self.entries[*idx].metadata))
            .map(|(idx, row)| {
                let dot = row.iter().zip(&query_vector).map(|(a, b)| a * b).sum::<f32>();
                (idx, dot.clamp(-1.0, 1.0))
            })
            .collect()
    }

    fn keyword_scores(&self, query: &str, filters: &QueryFilters) -> Vec<(usize, f32)> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| filters.matches(&entry.metadata))
            .filter_map(|(idx, entry)| {
                let present = words
                    .iter()
                    .filter(|word| entry.lowered.contains(word.as_str()))
                    .count();
                (present > 0).then(|| (idx, present as f32 / words.len() as f32))
            })
            .collect()
    }
}

impl VectorIndex for InMemoryIndex {
    fn search(
        &self,
        query: &str,
        limit: usize,
        filters: &QueryFilters,
    ) -> Result<Vec<SearchHit>, DomainError> {
        if self.entries.is_empty() || limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut scored = match self.scorer {
            Scorer::Vector { .. } => self.vector_scores(query, filters),
            Scorer::KeywordOverlap => self.keyword_scores(query, filters),
        };

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| {
                let entry = &self.entries[idx];
                SearchHit {
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    score,
                }
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn scoring(&self) -> String {
        match &self.scorer {
            Scorer::Vector { engine, dims, .. } => format!("vector:{}:{}", engine.model(), dims),
            Scorer::KeywordOverlap => "keyword-overlap".to_string(),
        }
    }
}

/// Scales `vector` to unit L2 norm in place. Returns `false` for a zero vector.
fn normalize(vector: &mut [f32]) -> bool {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON || !norm.is_finite() {
        return false;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, KnowledgeDocument, KnowledgeKind};

    fn docs(items: &[(Domain, KnowledgeKind, &str)]) -> (Vec<String>, Vec<DocumentMetadata>) {
        items
            .iter()
            .map(|(domain, kind, content)| {
                let doc = KnowledgeDocument::new(*domain, *kind, *content);
                (doc.text.clone(), doc.metadata())
            })
            .unzip()
    }

    struct FailingEngine;

    impl EmbeddingEngine for FailingEngine {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            Err(DomainError::embedding("model offline"))
        }

        fn dims(&self) -> Option<usize> {
            Some(32)
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::default()));
        assert!(index
            .search("anything", 5, &QueryFilters::default())
            .unwrap()
            .is_empty());
        let keyword = InMemoryIndex::keyword_overlap();
        assert!(keyword
            .search("anything", 5, &QueryFilters::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn mismatched_metadata_is_rejected() {
        let mut index = InMemoryIndex::keyword_overlap();
        assert!(index.add(vec!["a".into()], vec![]).is_err());
    }

    #[test]
    fn stored_vectors_have_unit_norm() {
        let mut index = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::with_dimensions(64)));
        let (texts, meta) = docs(&[
            (Domain::Banking, KnowledgeKind::BestPractice, "Encrypt all financial data"),
            (Domain::Healthcare, KnowledgeKind::ValidationRule, "Patient consent required"),
        ]);
        assert_eq!(index.add(texts, meta).unwrap(), 2);
        for row in index.matrix.chunks_exact(64) {
            let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn vector_search_is_sorted_truncated_and_filtered() {
        let mut index = InMemoryIndex::with_engine(Arc::new(SimpleEmbedEngine::default()));
        let (texts, meta) = docs(&[
            (Domain::Banking, KnowledgeKind::BestPractice, "Maintain real-time fraud monitoring"),
            (Domain::Banking, KnowledgeKind::BestPractice, "Encrypt all financial data"),
            (Domain::CardsPayment, KnowledgeKind::BestPractice, "Real-time fraud detection"),
        ]);
        index.add(texts, meta).unwrap();

        let hits = index
            .search("real-time fraud monitoring", 2, &QueryFilters::default())
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].metadata.content, "Maintain real-time fraud monitoring");

        let cards_only = index
            .search("real-time fraud", 5, &QueryFilters::domain(Domain::CardsPayment))
            .unwrap();
        assert_eq!(cards_only.len(), 1);
        assert_eq!(cards_only[0].metadata.domain, Domain::CardsPayment);
    }

    #[test]
    fn failing_engine_degrades_to_hash_embeddings() {
        let mut index = InMemoryIndex::with_engine(Arc::new(FailingEngine));
        let (texts, meta) = docs(&[(Domain::Logistics, KnowledgeKind::BestPractice, "Track shipments")]);
        assert_eq!(index.add(texts, meta).unwrap(), 1);

        let hits = index
            .search("track shipments", 1, &QueryFilters::default())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn keyword_overlap_scores_fraction_of_query_words() {
        let mut index = InMemoryIndex::keyword_overlap();
        let (texts, meta) = docs(&[
            (Domain::Banking, KnowledgeKind::BestPractice, "require multi-factor authentication"),
            (Domain::Healthcare, KnowledgeKind::BestPractice, "audit trails"),
        ]);
        index.add(texts, meta).unwrap();

        let hits = index
            .search("multi-factor authentication banking", 5, &QueryFilters::default())
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-6);

        let partial = index
            .search("authentication ledger", 5, &QueryFilters::default())
            .unwrap();
        assert!((partial[0].score - 0.5).abs() < 1e-6);
        assert_eq!(index.scoring(), "keyword-overlap");
    }
}
