/// Fixed-dimension vectors stored back to back in one buffer.
///
/// Row `i` occupies `data[i * dim..(i + 1) * dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArena {
    dim: usize,
    data: Vec<f32>,
}

impl VectorArena {
    /// `len` zero vectors of dimension `dim`.
    pub fn zeros(len: usize, dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; len * dim],
        }
    }

    /// `len` vectors filled by repeated calls to `f`, row by row.
    pub fn from_fn(len: usize, dim: usize, mut f: impl FnMut() -> f32) -> Self {
        Self {
            dim,
            data: (0..len * dim).map(|_| f()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row `i`. Panics if out of range.
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Mutable row `i`. Panics if out of range.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
