use crate::error::IndexError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// Exact nearest-neighbour index over L2 distance.
///
/// Vectors are stored contiguously in insertion order and never change after
/// construction; a new document gets a new index.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimensions: usize,
    vectors: Vec<f32>,
}

impl FlatL2Index {
    pub fn build(dimensions: usize, embeddings: &[Vec<f32>]) -> Result<Self, IndexError> {
        let mut vectors = Vec::with_capacity(dimensions * embeddings.len());
        for embedding in embeddings {
            ensure_dimensions(dimensions, embedding.len())?;
            vectors.extend_from_slice(embedding);
        }

        Ok(Self {
            dimensions,
            vectors,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.vectors.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the `min(k, len)` stored vectors closest to `query`, nearest
    /// first. Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        ensure_dimensions(self.dimensions, query.len())?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(index, stored)| Neighbor {
                index,
                distance: squared_l2(stored, query),
            })
            .collect();

        neighbors.sort_by(|left, right| {
            left.distance
                .total_cmp(&right.distance)
                .then(left.index.cmp(&right.index))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

fn ensure_dimensions(expected: usize, actual: usize) -> Result<(), IndexError> {
    if expected != actual {
        return Err(IndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| {
            let delta = a - b;
            delta * delta
        })
        .sum()
}
