use crate::buffer::BufferRef;

/// A value bound to a declared uniform.
#[derive(Debug, Clone, Copy)]
pub enum UniformValue<'a> {
    Int(i32),
    Float(f32),
    Buffer(BufferRef<'a>),
}

impl UniformValue<'_> {
    /// Name of the value's kind, as written in thread programs.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Buffer(b) => b.desc.kind.to_string(),
        }
    }
}

/// Named uniform bindings for one [`Program::execute`](crate::Program::execute).
///
/// ```ignore
/// let uniforms = Uniforms::new().buffer("input", input.binding()).float("scale", 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Uniforms<'a> {
    values: Vec<(String, UniformValue<'a>)>,
}

impl<'a> Uniforms<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `name`, replacing an earlier binding of the same name.
    pub fn set(mut self, name: &str, value: UniformValue<'a>) -> Self {
        match self.values.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
        self
    }

    pub fn int(self, name: &str, value: i32) -> Self {
        self.set(name, UniformValue::Int(value))
    }

    pub fn float(self, name: &str, value: f32) -> Self {
        self.set(name, UniformValue::Float(value))
    }

    pub fn buffer(self, name: &str, buffer: BufferRef<'a>) -> Self {
        self.set(name, UniformValue::Buffer(buffer))
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue<'a>> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue<'a>)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}
