//! Describes how to slice the bytes of one vertex into attributes.

use std::fmt;

/// The scalar types a vertex attribute can be made of.
///
/// The set is closed: an attribute of any other type simply can't be described.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl ScalarType {
    /// Width of one scalar in bytes.
    pub fn size_of(self) -> usize {
        match self {
            ScalarType::Float => 4,
            ScalarType::UnsignedInt => 4,
            ScalarType::UnsignedByte => 1,
        }
    }

    /// Bytes are read as normalized `[0, 1]` values, everything else as-is.
    pub fn normalized(self) -> bool {
        self == ScalarType::UnsignedByte
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarType::Float => f.write_str("f32"),
            ScalarType::UnsignedInt => f.write_str("u32"),
            ScalarType::UnsignedByte => f.write_str("u8"),
        }
    }
}

/// One attribute: `count` consecutive scalars of type `scalar`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayoutElement {
    pub scalar: ScalarType,
    pub count: u32,
}

impl LayoutElement {
    /// Bytes this attribute occupies in each vertex.
    pub fn size(&self) -> usize {
        self.count as usize * self.scalar.size_of()
    }

    pub fn normalized(&self) -> bool {
        self.scalar.normalized()
    }
}

/// An ordered list of attributes making up one vertex.
///
/// Attributes are laid out back to back in the order they were pushed, so the byte offset of an
/// attribute is the sum of the sizes of those pushed before it, and the stride is the sum of all
/// of them. Elements can't be removed or changed once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    elements: Vec<LayoutElement>,
    stride: usize,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute of `count` scalars of type `scalar`.
    pub fn push(&mut self, count: u32, scalar: ScalarType) -> &mut Self {
        let element = LayoutElement { scalar, count };
        self.stride += element.size();
        self.elements.push(element);
        self
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, count: u32, scalar: ScalarType) -> Self {
        self.push(count, scalar);
        self
    }

    pub fn push_f32(&mut self, count: u32) -> &mut Self {
        self.push(count, ScalarType::Float)
    }

    pub fn push_u32(&mut self, count: u32) -> &mut Self {
        self.push(count, ScalarType::UnsignedInt)
    }

    pub fn push_u8(&mut self, count: u32) -> &mut Self {
        self.push(count, ScalarType::UnsignedByte)
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Byte offset of each element within a vertex, in push order.
    pub fn offsets(&self) -> Vec<usize> {
        self.iter().map(|(offset, _)| offset).collect()
    }

    /// Elements paired with their byte offsets.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LayoutElement)> + '_ {
        self.elements.iter().scan(0, |offset, element| {
            let at = *offset;
            *offset += element.size();
            Some((at, element))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_has_no_stride() {
        let layout = VertexLayout::new();
        assert_eq!(layout.stride(), 0);
        assert!(layout.is_empty());
        assert!(layout.offsets().is_empty());
    }

    #[test]
    fn position_color_uv() {
        let mut layout = VertexLayout::new();
        layout.push(3, ScalarType::Float);
        layout.push(4, ScalarType::Float);
        layout.push(2, ScalarType::Float);

        assert_eq!(layout.stride(), 36);
        assert_eq!(layout.len(), 3);
        assert_eq!(layout.offsets(), vec![0, 12, 28]);
    }

    #[test]
    fn mixed_scalars() {
        let layout = VertexLayout::new()
            .with(2, ScalarType::Float)
            .with(4, ScalarType::UnsignedByte)
            .with(1, ScalarType::UnsignedInt);

        assert_eq!(layout.stride(), 8 + 4 + 4);
        assert_eq!(layout.offsets(), vec![0, 8, 12]);
        assert!(!layout.elements()[0].normalized());
        assert!(layout.elements()[1].normalized());
    }

    #[test]
    fn stride_is_running_sum() {
        let pushes = [
            (1, ScalarType::UnsignedByte),
            (3, ScalarType::Float),
            (2, ScalarType::UnsignedInt),
            (4, ScalarType::UnsignedByte),
            (4, ScalarType::Float),
        ];

        let mut layout = VertexLayout::new();
        let mut expected_offsets = vec![];
        let mut total = 0;
        for &(count, scalar) in &pushes {
            expected_offsets.push(total);
            layout.push(count, scalar);
            total += count as usize * scalar.size_of();

            assert_eq!(layout.stride(), total);
            assert_eq!(layout.offsets(), expected_offsets);
        }
    }

    #[test]
    fn typed_pushes_match_generic_push() {
        let mut typed = VertexLayout::new();
        typed.push_f32(3).push_u8(4).push_u32(1);

        let generic = VertexLayout::new()
            .with(3, ScalarType::Float)
            .with(4, ScalarType::UnsignedByte)
            .with(1, ScalarType::UnsignedInt);

        assert_eq!(typed, generic);
    }
}
