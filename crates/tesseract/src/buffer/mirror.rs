use super::element::Element;
use super::shape::Shape;

/// CPU-side copy of a buffer's texture.
///
/// Holds one element per texel, including the padding texels past the logical
/// length, so the byte view can be uploaded or filled without conversion.
#[derive(Debug, Clone)]
pub struct Mirror<E, S> {
    shape: S,
    data: Vec<E>,
}

impl<E: Element, S: Shape> Mirror<E, S> {
    pub fn new(shape: S) -> Self {
        let (w, h) = shape.texture_size();
        Self { shape, data: vec![E::zeroed(); w as usize * h as usize] }
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    #[inline]
    pub fn get(&self, index: S::Index) -> E {
        self.data[self.shape.offset(index)]
    }

    #[inline]
    pub fn set(&mut self, index: S::Index, value: E) {
        let offset = self.shape.offset(index);
        self.data[offset] = value;
    }

    /// Overwrites every logical element with `f(index)`.
    pub fn map<F>(&mut self, mut f: F)
    where
        F: FnMut(S::Index) -> E,
    {
        for i in 0..self.shape.len() {
            let index = self.shape.index_of(i);
            self.set(index, f(index));
        }
    }

    /// Logical elements in row-major order.
    pub fn data(&self) -> &[E] {
        &self.data[..self.shape.len()]
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }
}
