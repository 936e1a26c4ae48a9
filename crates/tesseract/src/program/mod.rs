//! Compiled thread programs and their execution.
//!
//! A [`Program`] owns one render pipeline built from a [`Script`]. Each
//! [`Program::execute`] validates the invocation, fills the program's single
//! uniform block, binds the uniform textures and draws the shared quad once
//! into every output.

mod shader;
mod uniforms;
mod validate;

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use tesseract_script::bindings::{BindingTable, SAMPLER_BINDING, UNIFORM_BLOCK_BINDING};
use tesseract_script::glsl::TEXCOORD_LOCATION;
use tesseract_script::{Script, transform};

use crate::buffer::{BufferDesc, BufferRef, TEXTURE_FORMAT};
use crate::context::Shared;
use crate::error::{ExecuteError, ProgramError, Stage, Violation};
use crate::quad::{INDEX_COUNT, Position, Texcoord};

pub use uniforms::{UniformValue, Uniforms};

// ── program ───────────────────────────────────────────────────────────────

pub struct Program {
    shared: Rc<Shared>,
    script: Script,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    reads_texcoord: bool,
}

impl Program {
    pub(crate) fn new(shared: Rc<Shared>, source: &str) -> Result<Self, ProgramError> {
        let script = transform(source)?;
        let vertex = shader::compile(Stage::Vertex, &script.vertex)?;
        let fragment = shader::compile(Stage::Fragment, &script.fragment)?;
        check_limits(&script, &shared.gpu.limits())?;

        let reads_texcoord = shader::reads_location(&vertex, TEXCOORD_LOCATION);
        let device = shared.gpu.device();

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tesseract vertex shader"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(vertex)),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tesseract fragment shader"),
            source: wgpu::ShaderSource::Naga(Cow::Owned(fragment)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tesseract program bgl"),
            entries: &layout_entries(&script.bindings),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tesseract program pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let vertex_buffers = vertex_buffer_layouts(reads_texcoord);
        let targets: Vec<_> = script
            .thread
            .outputs
            .iter()
            .map(|_| {
                Some(wgpu::ColorTargetState {
                    format: TEXTURE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tesseract program pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let block_size = script.bindings.block_size() as u64;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tesseract program uniforms"),
            size: block_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "program compiled: {} thread, {} output(s), {} uniform(s), {} uniform bytes",
            script.thread.indexing,
            script.thread.outputs.len(),
            script.uniforms.len(),
            block_size
        );

        Ok(Self {
            shared,
            script,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            reads_texcoord,
        })
    }

    /// The compiled script, including generated shader text.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Runs the thread function once per texel of `outputs`.
    ///
    /// Nothing is written to the GPU unless validation passes.
    pub fn execute(&self, outputs: &[BufferRef<'_>], uniforms: &Uniforms<'_>) -> Result<(), ExecuteError> {
        let descs: Vec<BufferDesc> = outputs.iter().map(|o| o.desc).collect();

        let violations = validate::validate(&self.script, &descs, uniforms);
        if !violations.is_empty() {
            for v in &violations {
                log::warn!("execute rejected: {v}");
            }
            return Err(ExecuteError::Validation(violations));
        }
        let Some(first) = descs.first() else {
            return Err(ExecuteError::Validation(vec![Violation::OutputCount {
                expected: self.script.thread.outputs.len(),
                found: 0,
            }]));
        };
        check_attachments(&descs, &self.shared.gpu.limits())?;

        let gpu = &self.shared.gpu;
        let bytes = uniform_bytes(&self.script.bindings, first, uniforms);
        gpu.queue().write_buffer(&self.uniform_buffer, 0, &bytes);
        let bind_group = self.bind_group(uniforms);

        let mut encoder = gpu.device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tesseract execute encoder"),
        });

        let attachments: Vec<_> = outputs
            .iter()
            .map(|o| {
                Some(wgpu::RenderPassColorAttachment {
                    view: o.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })
            })
            .collect();

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tesseract execute pass"),
                color_attachments: &attachments,
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (width, height) = first.texture_size;
            let quad = &self.shared.quad;
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
            rpass.set_vertex_buffer(0, quad.positions.slice(..));
            if self.reads_texcoord {
                rpass.set_vertex_buffer(1, quad.texcoords.slice(..));
            }
            rpass.set_index_buffer(quad.indices.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..INDEX_COUNT, 0, 0..1);
        }

        gpu.queue().submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn bind_group(&self, uniforms: &Uniforms<'_>) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: UNIFORM_BLOCK_BINDING,
                resource: self.uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(&self.shared.sampler),
            },
        ];

        for slot in self.script.bindings.slots() {
            let Some(binding) = slot.texture_binding else { continue };
            let view = match uniforms.get(slot.name()) {
                Some(UniformValue::Buffer(b)) => b.view,
                _ => &self.shared.placeholder_view,
            };
            entries.push(wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }

        self.shared.gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tesseract program bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("thread", &self.script.thread)
            .field("uniforms", &self.script.uniforms)
            .field("reads_texcoord", &self.reads_texcoord)
            .finish_non_exhaustive()
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        self.uniform_buffer.destroy();
        log::debug!("program released");
    }
}

/// Companion values in member order: texture extents, then logical extents.
fn companion_values(desc: &BufferDesc) -> [i32; 5] {
    let (tw, th) = desc.texture_size;
    let e = desc.extents;
    [tw, th, e.width, e.height, e.depth].map(|v| v as i32)
}

/// Contents of `nc_uniform_block` for one invocation.
///
/// Built-ins describe output 0. Unsupplied declarations stay zero.
fn uniform_bytes(bindings: &BindingTable, first: &BufferDesc, uniforms: &Uniforms<'_>) -> Vec<u8> {
    let mut bytes = vec![0u8; bindings.block_size() as usize];
    let mut put = |offset: u32, value: &[u8]| {
        let start = offset as usize;
        bytes[start..start + value.len()].copy_from_slice(value);
    };

    for (member, value) in bindings.builtins().iter().zip(companion_values(first)) {
        put(member.offset, bytemuck::bytes_of(&value));
    }

    for slot in bindings.slots() {
        let Some(value) = uniforms.get(slot.name()) else { continue };
        match (value, slot.members.first()) {
            (UniformValue::Int(v), Some(member)) => put(member.offset, bytemuck::bytes_of(v)),
            (UniformValue::Float(v), Some(member)) => put(member.offset, bytemuck::bytes_of(v)),
            (UniformValue::Buffer(b), _) => {
                for (member, value) in slot.members.iter().zip(companion_values(&b.desc)) {
                    put(member.offset, bytemuck::bytes_of(&value));
                }
            }
            (_, None) => {}
        }
    }

    bytes
}

/// Render-target checks that validation cannot see: device limits and empty textures.
fn check_attachments(outputs: &[BufferDesc], limits: &wgpu::Limits) -> Result<(), ExecuteError> {
    if outputs.len() > limits.max_color_attachments as usize {
        return Err(ExecuteError::IncompleteAttachment {
            index: limits.max_color_attachments as usize,
            reason: format!("device supports {} color attachments", limits.max_color_attachments),
        });
    }
    for (index, desc) in outputs.iter().enumerate() {
        let (width, height) = desc.texture_size;
        let reason = if width == 0 || height == 0 {
            format!("texture is empty ({width}x{height})")
        } else if width > limits.max_texture_dimension_2d || height > limits.max_texture_dimension_2d {
            format!("texture {width}x{height} exceeds {}", limits.max_texture_dimension_2d)
        } else {
            continue;
        };
        return Err(ExecuteError::IncompleteAttachment { index, reason });
    }
    Ok(())
}

/// Slot 0 always holds positions; slot 1 only when the vertex stage reads texcoords.
fn vertex_buffer_layouts(reads_texcoord: bool) -> Vec<wgpu::VertexBufferLayout<'static>> {
    let mut layouts = vec![Position::layout()];
    if reads_texcoord {
        layouts.push(Texcoord::layout());
    }
    layouts
}

fn layout_entries(bindings: &BindingTable) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BLOCK_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];
    entries.extend(bindings.slots().iter().filter_map(|s| s.texture_binding).map(|binding| {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }));
    entries
}

/// Rejects programs the device could never run.
fn check_limits(script: &Script, limits: &wgpu::Limits) -> Result<(), ProgramError> {
    let outputs = script.thread.outputs.len() as u32;
    let bytes_per_target = TEXTURE_FORMAT.target_pixel_byte_cost().unwrap_or(4);
    let max_outputs = limits
        .max_color_attachments
        .min(limits.max_color_attachment_bytes_per_sample / bytes_per_target);
    if outputs > max_outputs {
        return Err(ProgramError::Limit { what: "thread outputs", requested: outputs, limit: max_outputs });
    }

    let block = script.bindings.block_size();
    if block as u64 > limits.max_uniform_buffer_binding_size as u64 {
        return Err(ProgramError::Limit {
            what: "uniform bytes",
            requested: block,
            limit: limits.max_uniform_buffer_binding_size as u32,
        });
    }

    let textures = script.bindings.texture_count() as u32;
    if textures > limits.max_sampled_textures_per_shader_stage {
        return Err(ProgramError::Limit {
            what: "buffer uniforms",
            requested: textures,
            limit: limits.max_sampled_textures_per_shader_stage,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{BufferId, Extents};
    use tesseract_script::BufferKind;

    fn script(src: &str) -> Script {
        transform(src).unwrap()
    }

    fn desc(kind: BufferKind, extents: Extents, texture_size: (u32, u32)) -> BufferDesc {
        BufferDesc { id: BufferId::next(), kind, extents, texture_size }
    }

    fn read_i32(bytes: &[u8], offset: u32) -> i32 {
        bytemuck::pod_read_unaligned(&bytes[offset as usize..offset as usize + 4])
    }

    #[test]
    fn layout_entries_follow_binding_table() {
        let s = script("uniform Color1D c;\nuniform float f;\nuniform Float2D g;\n[color] thread (int x) { }");
        let bindings: Vec<_> = layout_entries(&s.bindings).iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2, 3]);
    }

    #[test]
    fn uniform_bytes_place_builtins_and_scalars() {
        let s = script("uniform int n;\nuniform float scale;\nuniform Float1D unused;\n[float] thread (int x, int y, int z) { }");
        let out = desc(BufferKind::Float3D, Extents { width: 3, height: 2, depth: 4 }, (5, 5));
        let uniforms = Uniforms::new().int("n", -7).float("scale", 0.25);

        let bytes = uniform_bytes(&s.bindings, &out, &uniforms);
        assert_eq!(bytes.len(), s.bindings.block_size() as usize);
        let builtins: Vec<_> = s.bindings.builtins().iter().map(|m| read_i32(&bytes, m.offset)).collect();
        assert_eq!(builtins, vec![5, 5, 3, 2, 4]);

        let n = s.bindings.by_name("n").unwrap().members[0].offset;
        assert_eq!(read_i32(&bytes, n), -7);
        let scale = s.bindings.by_name("scale").unwrap().members[0].offset;
        assert_eq!(f32::from_bits(read_i32(&bytes, scale) as u32), 0.25);
        for member in &s.bindings.by_name("unused").unwrap().members {
            assert_eq!(read_i32(&bytes, member.offset), 0);
        }
    }

    #[test]
    fn empty_and_oversized_attachments() {
        let limits = wgpu::Limits::default();
        let ok = desc(BufferKind::Float2D, Extents { width: 4, height: 4, depth: 1 }, (4, 4));
        let empty = desc(BufferKind::Float2D, Extents { width: 0, height: 4, depth: 1 }, (0, 4));
        assert!(check_attachments(&[ok], &limits).is_ok());

        let err = check_attachments(&[ok, empty], &limits).unwrap_err();
        assert!(matches!(err, ExecuteError::IncompleteAttachment { index: 1, .. }), "{err}");

        let side = limits.max_texture_dimension_2d + 1;
        let huge = desc(BufferKind::Float2D, Extents { width: side, height: 1, depth: 1 }, (side, 1));
        assert!(matches!(
            check_attachments(&[huge], &limits),
            Err(ExecuteError::IncompleteAttachment { index: 0, .. })
        ));
    }

    #[test]
    fn texcoord_buffer_only_when_read() {
        let module = shader::compile(
            Stage::Vertex,
            "#version 450\nlayout(location = 0) in vec3 p;\nvoid main() { gl_Position = vec4(p, 1.0); }\n",
        )
        .unwrap();
        let reads = shader::reads_location(&module, TEXCOORD_LOCATION);
        assert!(!reads);
        assert_eq!(vertex_buffer_layouts(reads).len(), 1);
        assert_eq!(vertex_buffer_layouts(true).len(), 2);
    }

    #[test]
    fn output_limit() {
        let outputs = vec!["float"; 9].join(", ");
        let s = script(&format!("[{outputs}] thread (int x) {{ }}"));
        let err = check_limits(&s, &wgpu::Limits::default()).unwrap_err();
        assert!(matches!(err, ProgramError::Limit { what: "thread outputs", requested: 9, .. }));
        let four = script("[float, float, float, float] thread (int x) { }");
        assert!(check_limits(&four, &wgpu::Limits::default()).is_ok());
    }

    #[test]
    fn many_scalar_uniforms_fit() {
        let decls: String = (0..64).map(|i| format!("uniform int n{i};\n")).collect();
        let s = script(&format!("{decls}[float] thread (int x) {{ }}"));
        assert!(check_limits(&s, &wgpu::Limits::default()).is_ok());
        assert_eq!(layout_entries(&s.bindings).len(), 2);
    }

    #[test]
    fn texture_limit() {
        let limits = wgpu::Limits::default();
        let count = limits.max_sampled_textures_per_shader_stage + 1;
        let decls: String = (0..count).map(|i| format!("uniform Float1D b{i};\n")).collect();
        let s = script(&format!("{decls}[float] thread (int x) {{ }}"));
        let err = check_limits(&s, &limits).unwrap_err();
        assert!(matches!(err, ProgramError::Limit { what: "buffer uniforms", .. }));
    }
}
