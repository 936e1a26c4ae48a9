//! Compile-time binding table.
//!
//! Every uniform lives in bind group 0. The layout is fixed at compile time:
//!
//! | binding | contents |
//! |---------|----------|
//! | 0 | `nc_uniform_block`: built-ins, scalars and companion extents |
//! | 1 | shared nearest/clamp sampler |
//! | 2.. | one texture per buffer declaration, in declaration order |
//!
//! The block is std140 with 4-byte scalar members packed back to back, so a
//! program needs one uniform buffer however many uniforms it declares.

use crate::ast::{BufferKind, Indexing, UniformDeclaration, UniformType};

pub const UNIFORM_BLOCK_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;
const FIRST_TEXTURE_BINDING: u32 = 2;

pub const UNIFORM_BLOCK_NAME: &str = "nc_uniform_block";

/// std140 block sizes round up to a vec4.
const BLOCK_ALIGN: u32 = 16;
const MEMBER_SIZE: u32 = 4;

/// Built-in members at the head of the block, in order.
pub const BUILTIN_MEMBERS: [&str; 5] = [
    "nc_thread_viewport_width",
    "nc_thread_viewport_height",
    "nc_thread_output_width",
    "nc_thread_output_height",
    "nc_thread_output_depth",
];

/// Companion members of a buffer kind, without the `nc_uniform_<name>_` prefix.
pub fn companion_members(kind: BufferKind) -> &'static [&'static str] {
    const ALL: [&str; 5] = ["textureWidth", "textureHeight", "width", "height", "depth"];
    match kind.indexing() {
        Indexing::D1 => &ALL[..3],
        Indexing::D2 => &ALL[..4],
        Indexing::D3 => &ALL,
    }
}

/// Byte size of a block holding `members` 4-byte scalars.
pub fn block_size(members: usize) -> u32 {
    let raw = members as u32 * MEMBER_SIZE;
    raw.div_ceil(BLOCK_ALIGN).max(1) * BLOCK_ALIGN
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MemberType {
    Int,
    Float,
}

impl MemberType {
    fn glsl(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMember {
    /// Shader-visible name.
    pub name: String,
    pub ty: MemberType,
    /// Byte offset within `nc_uniform_block`.
    pub offset: u32,
}

/// Bindings of one uniform declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub declaration: UniformDeclaration,
    /// Texture binding, present for buffer declarations only.
    pub texture_binding: Option<u32>,
    /// The scalar itself, or the buffer's companion extents.
    pub members: Vec<BlockMember>,
}

impl UniformSlot {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    pub fn texture_name(&self) -> String {
        format!("nc_uniform_{}_texture", self.declaration.name)
    }

    /// The GLSL that replaces the `uniform <Type> <name>;` line.
    ///
    /// Scalars and extents live in the shared block, so only buffers leave
    /// anything behind.
    pub fn glsl_declaration(&self) -> String {
        match self.texture_binding {
            Some(binding) => format!(
                "layout(set = 0, binding = {binding}) uniform texture2D {};",
                self.texture_name()
            ),
            None => String::new(),
        }
    }
}

/// Binding slots for all declarations, indexed by declaration position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    builtins: Vec<BlockMember>,
    slots: Vec<UniformSlot>,
    block_size: u32,
}

impl BindingTable {
    pub fn new(uniforms: &[UniformDeclaration]) -> Self {
        let mut offset = 0;
        let mut member = |name: String, ty: MemberType| {
            let m = BlockMember { name, ty, offset };
            offset += MEMBER_SIZE;
            m
        };

        let builtins: Vec<_> = BUILTIN_MEMBERS.iter().map(|n| member(n.to_string(), MemberType::Int)).collect();

        let mut next_texture = FIRST_TEXTURE_BINDING;
        let mut slots = Vec::with_capacity(uniforms.len());
        for declaration in uniforms {
            let (texture_binding, members) = match declaration.ty {
                UniformType::Int => (None, vec![member(declaration.name.clone(), MemberType::Int)]),
                UniformType::Float => (None, vec![member(declaration.name.clone(), MemberType::Float)]),
                UniformType::Buffer(kind) => {
                    let texture = next_texture;
                    next_texture += 1;
                    let members = companion_members(kind)
                        .iter()
                        .map(|m| member(format!("nc_uniform_{}_{m}", declaration.name), MemberType::Int))
                        .collect();
                    (Some(texture), members)
                }
            };
            slots.push(UniformSlot { declaration: declaration.clone(), texture_binding, members });
        }

        let members = builtins.len() + slots.iter().map(|s| s.members.len()).sum::<usize>();
        Self { builtins, slots, block_size: block_size(members) }
    }

    pub fn builtins(&self) -> &[BlockMember] {
        &self.builtins
    }

    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    pub fn get(&self, position: usize) -> Option<&UniformSlot> {
        self.slots.get(position)
    }

    /// Declaration position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name() == name)
    }

    pub fn by_name(&self, name: &str) -> Option<&UniformSlot> {
        self.position(name).map(|i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Byte size of `nc_uniform_block`.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of texture bindings.
    pub fn texture_count(&self) -> usize {
        self.slots.iter().filter(|s| s.texture_binding.is_some()).count()
    }

    /// GLSL for the shared block and sampler.
    pub fn glsl_uniforms(&self) -> String {
        let mut out = format!("layout(set = 0, binding = {UNIFORM_BLOCK_BINDING}) uniform {UNIFORM_BLOCK_NAME} {{\n");
        let members = self.builtins.iter().chain(self.slots.iter().flat_map(|s| &s.members));
        for m in members {
            out.push_str(&format!("  {} {};\n", m.ty.glsl(), m.name));
        }
        out.push_str("};\n");
        out.push_str(&format!("layout(set = 0, binding = {SAMPLER_BINDING}) uniform sampler nc_sampler;\n"));
        out
    }
}
