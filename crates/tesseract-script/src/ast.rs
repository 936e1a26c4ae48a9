use std::fmt;

// ── Indexing ──────────────────────────────────────────────────────────────

/// Dimensionality of a thread function (number of integer parameters).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Indexing {
    D1,
    D2,
    D3,
}

impl Indexing {
    pub fn from_rank(rank: usize) -> Option<Self> {
        match rank {
            1 => Some(Self::D1),
            2 => Some(Self::D2),
            3 => Some(Self::D3),
            _ => None,
        }
    }

    #[inline]
    pub fn rank(self) -> usize {
        match self {
            Self::D1 => 1,
            Self::D2 => 2,
            Self::D3 => 3,
        }
    }
}

impl fmt::Display for Indexing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.rank())
    }
}

// ── ElementKind ───────────────────────────────────────────────────────────

/// Element stored per texel: a 32-bit float (byte-encoded) or an RGBA8 color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float,
    Color,
}

impl ElementKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "float" => Some(Self::Float),
            "color" => Some(Self::Color),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Float => "float",
            Self::Color => "color",
        })
    }
}

// ── BufferKind ────────────────────────────────────────────────────────────

/// The six buffer kinds, in the order the compiler rewrites them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Float1D,
    Float2D,
    Float3D,
    Color1D,
    Color2D,
    Color3D,
}

impl BufferKind {
    pub const ALL: [BufferKind; 6] = [
        Self::Float1D,
        Self::Float2D,
        Self::Float3D,
        Self::Color1D,
        Self::Color2D,
        Self::Color3D,
    ];

    pub fn new(element: ElementKind, indexing: Indexing) -> Self {
        match (element, indexing) {
            (ElementKind::Float, Indexing::D1) => Self::Float1D,
            (ElementKind::Float, Indexing::D2) => Self::Float2D,
            (ElementKind::Float, Indexing::D3) => Self::Float3D,
            (ElementKind::Color, Indexing::D1) => Self::Color1D,
            (ElementKind::Color, Indexing::D2) => Self::Color2D,
            (ElementKind::Color, Indexing::D3) => Self::Color3D,
        }
    }

    pub fn element(self) -> ElementKind {
        match self {
            Self::Float1D | Self::Float2D | Self::Float3D => ElementKind::Float,
            Self::Color1D | Self::Color2D | Self::Color3D => ElementKind::Color,
        }
    }

    pub fn indexing(self) -> Indexing {
        match self {
            Self::Float1D | Self::Color1D => Indexing::D1,
            Self::Float2D | Self::Color2D => Indexing::D2,
            Self::Float3D | Self::Color3D => Indexing::D3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Float1D => "Float1D",
            Self::Float2D => "Float2D",
            Self::Float3D => "Float3D",
            Self::Color1D => "Color1D",
            Self::Color2D => "Color2D",
            Self::Color3D => "Color3D",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Declarations ──────────────────────────────────────────────────────────

/// Declared type of a `uniform <Type> <name>;` line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformType {
    Int,
    Float,
    Buffer(BufferKind),
}

impl UniformType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            _ => BufferKind::ALL
                .into_iter()
                .find(|kind| kind.name() == name)
                .map(Self::Buffer),
        }
    }
}

impl fmt::Display for UniformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Buffer(kind) => kind.fmt(f),
        }
    }
}

/// `[<outputs>] thread (<params>)` as parsed from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadFunction {
    pub indexing: Indexing,
    pub outputs: Vec<ElementKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDeclaration {
    pub name: String,
    pub ty: UniformType,
}
