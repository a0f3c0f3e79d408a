//! Program embeddings.

use async_trait::async_trait;

use crate::error::{OracleError, OracleResult};

/// Maps a program to a fixed-length vector.
///
/// Near-identical programs should land near each other; niche assignment
/// relies on it.
#[async_trait]
pub trait EmbeddingSpace: Send + Sync {
    async fn embed(&self, program: &str) -> OracleResult<Vec<f64>>;

    /// Name of this embedding backend.
    fn name(&self) -> &str;
}

/// Deterministic local embedding: identifier tokens hashed into buckets.
///
/// Each token contributes to the bucket picked by its blake3 hash; counts are
/// log-damped and the vector is L2-normalized. Programs without any tokens
/// cannot be embedded.
#[derive(Clone, Debug)]
pub struct HashedEmbedding {
    dimensions: usize,
}

impl HashedEmbedding {
    pub const DEFAULT_DIMENSIONS: usize = 256;

    pub fn new(dimensions: usize) -> OracleResult<Self> {
        if dimensions == 0 {
            return Err(OracleError::InvalidConfig(
                "embedding dimensions must be at least 1".into(),
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = blake3::hash(token.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(head) % self.dimensions as u64) as usize
    }

    /// Synchronous core of [`EmbeddingSpace::embed`].
    pub fn embed_text(&self, program: &str) -> OracleResult<Vec<f64>> {
        let mut counts = vec![0u32; self.dimensions];
        let mut tokens = 0usize;
        for token in program
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| !t.is_empty())
        {
            counts[self.bucket(token)] += 1;
            tokens += 1;
        }

        if tokens == 0 {
            return Err(OracleError::Embedding("program contains no tokens".into()));
        }

        let mut vector: Vec<f64> = counts
            .into_iter()
            .map(|n| if n == 0 { 0.0 } else { 1.0 + f64::from(n).ln() })
            .collect();
        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        for x in &mut vector {
            *x /= norm;
        }
        Ok(vector)
    }
}

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }
}

#[async_trait]
impl EmbeddingSpace for HashedEmbedding {
    async fn embed(&self, program: &str) -> OracleResult<Vec<f64>> {
        self.embed_text(program)
    }

    fn name(&self) -> &str {
        "hashed-embedding"
    }
}
