/// A dense vector table keyed by record id.
///
/// All rows share one dimensionality. Row order is preserved from the
/// producing stage so that derived tables stay aligned with their input.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorTable {
    keys: Vec<String>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl VectorTable {
    pub fn new(dim: usize) -> Self {
        Self {
            keys: Vec::new(),
            vectors: Vec::new(),
            dim,
        }
    }

    /// Appends a row. Returns `false` (and stores nothing) when the vector
    /// dimensionality does not match the table.
    pub fn push(&mut self, key: String, vector: Vec<f32>) -> bool {
        if vector.len() != self.dim {
            return false;
        }
        self.keys.push(key);
        self.vectors.push(vector);
        true
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.vectors[i].as_slice())
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.vectors[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.vectors.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_dimension() {
        let mut table = VectorTable::new(3);
        assert!(table.push("a".into(), vec![1.0, 2.0, 3.0]));
        assert!(!table.push("b".into(), vec![1.0]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn preserves_row_order() {
        let mut table = VectorTable::new(1);
        table.push("b".into(), vec![2.0]);
        table.push("a".into(), vec![1.0]);
        assert_eq!(table.keys(), ["b", "a"]);
        assert_eq!(table.get("a"), Some(&[1.0][..]));
        assert_eq!(table.get("c"), None);
    }
}
