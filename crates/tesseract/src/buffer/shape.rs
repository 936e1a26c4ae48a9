use std::fmt;

use tesseract_script::Indexing;

/// Logical extents of a buffer; absent dimensions are 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Extents {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Texture dimensions saturate, so oversized shapes fail the device limit check.
fn texels(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Square texture side for `length` elements: `max(4, ceil(sqrt(length)))`.
pub fn pack(length: usize) -> (u32, u32) {
    let length = length as u128;
    let mut side = (length as f64).sqrt().ceil() as u128;
    // Float rounding can land one off for large lengths.
    while side * side < length {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= length {
        side -= 1;
    }
    let side = u32::try_from(side.max(4)).unwrap_or(u32::MAX);
    (side, side)
}

/// Mapping from a logical shape onto texture storage.
pub trait Shape: Copy + fmt::Debug + 'static {
    type Index: Copy + fmt::Debug;

    const INDEXING: Indexing;

    fn extents(&self) -> Extents;

    /// Number of logical elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Texture width and height in texels.
    fn texture_size(&self) -> (u32, u32);

    /// Offset of `index` in the texel array.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of range.
    fn offset(&self, index: Self::Index) -> usize;

    /// Logical coordinate of the `i`-th element in row-major order.
    fn index_of(&self, i: usize) -> Self::Index;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Shape1D {
    pub width: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Shape2D {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Shape3D {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Shape for Shape1D {
    type Index = usize;
    const INDEXING: Indexing = Indexing::D1;

    fn extents(&self) -> Extents {
        Extents { width: texels(self.width), height: 1, depth: 1 }
    }

    fn len(&self) -> usize {
        self.width
    }

    fn texture_size(&self) -> (u32, u32) {
        pack(self.width)
    }

    fn offset(&self, x: usize) -> usize {
        assert!(x < self.width, "index {x} out of bounds for width {}", self.width);
        x
    }

    fn index_of(&self, i: usize) -> usize {
        i
    }
}

impl Shape for Shape2D {
    type Index = (usize, usize);
    const INDEXING: Indexing = Indexing::D2;

    fn extents(&self) -> Extents {
        Extents { width: texels(self.width), height: texels(self.height), depth: 1 }
    }

    fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    fn texture_size(&self) -> (u32, u32) {
        (texels(self.width), texels(self.height))
    }

    fn offset(&self, (x, y): (usize, usize)) -> usize {
        assert!(
            x < self.width && y < self.height,
            "index ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        x + y * self.width
    }

    fn index_of(&self, i: usize) -> (usize, usize) {
        (i % self.width, i / self.width)
    }
}

impl Shape for Shape3D {
    type Index = (usize, usize, usize);
    const INDEXING: Indexing = Indexing::D3;

    fn extents(&self) -> Extents {
        Extents {
            width: texels(self.width),
            height: texels(self.height),
            depth: texels(self.depth),
        }
    }

    fn len(&self) -> usize {
        self.width.saturating_mul(self.height).saturating_mul(self.depth)
    }

    fn texture_size(&self) -> (u32, u32) {
        pack(self.len())
    }

    fn offset(&self, (x, y, z): (usize, usize, usize)) -> usize {
        assert!(
            x < self.width && y < self.height && z < self.depth,
            "index ({x}, {y}, {z}) out of bounds for {}x{}x{}",
            self.width,
            self.height,
            self.depth
        );
        x + y * self.width + z * self.width * self.height
    }

    fn index_of(&self, i: usize) -> (usize, usize, usize) {
        let plane = self.width * self.height;
        (i % self.width, (i / self.width) % self.height, i / plane)
    }
}
