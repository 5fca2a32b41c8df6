use shaderbox_common::{ImageData, ObjectId, Viewport};
use shaderbox_scene::{
    Camera, InitError, Material, MeshObject, RenderBackend, RenderError, Scene, ShaderProgram,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::layout::{FrameUniforms, ObjectUniforms, Vertex};
use crate::shaders;
use crate::upload::{mesh_vertices, same_image, texture_pixels};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A rendered but not yet presented surface texture.
pub struct FrameTarget {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl FrameTarget {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        self.texture.present();
    }
}

struct Pipelines {
    wave: wgpu::RenderPipeline,
    displace: wgpu::RenderPipeline,
    standard: wgpu::RenderPipeline,
    sky: wgpu::RenderPipeline,
}

/// Uploaded state for one mesh object. Geometry is uploaded once.
struct GpuObject {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Image currently bound, `None` for the white fallback. Held so its
    /// allocation cannot be reused by a different image.
    texture: Option<Arc<ImageData>>,
}

/// wgpu implementation of [`RenderBackend`] drawing to a window surface.
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: wgpu::TextureView,
    pipelines: Pipelines,
    frame_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    environment: Option<Arc<ImageData>>,
    objects: BTreeMap<ObjectId, GpuObject>,
    frame: Option<FrameTarget>,
}

impl WgpuBackend {
    /// Creates the surface, picks an adapter and builds all pipelines.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        viewport: Viewport,
    ) -> Result<Self, InitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| InitError::SurfaceCreation(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(InitError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shaderbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| InitError::DeviceRequest(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| InitError::SurfaceCreation("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame_layout = texture_uniform_layout(&device, "frame_layout");
        let object_layout = texture_uniform_layout(&device, "object_layout");
        let pipelines = Pipelines::new(&device, format, &frame_layout, &object_layout);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = upload_image(&device, &queue, &ImageData::solid([255; 4]), "white_texture");

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = bind_group(
            &device,
            &frame_layout,
            &frame_buffer,
            &white,
            &sampler,
            "frame_bind_group",
        );
        let depth = depth_view(&device, config.width, config.height);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            pipelines,
            frame_layout,
            object_layout,
            sampler,
            white,
            frame_buffer,
            frame_bind_group,
            environment: None,
            objects: BTreeMap::new(),
            frame: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Hands out the last rendered frame for overlay drawing and
    /// presentation. `None` if the last render was skipped.
    pub fn take_frame(&mut self) -> Option<FrameTarget> {
        self.frame.take()
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth = depth_view(&self.device, self.config.width, self.config.height);
    }

    fn sync_environment(&mut self, scene: &Scene) {
        let env = scene
            .environment
            .as_ref()
            .filter(|image| image.is_valid());
        if same_image(env, self.environment.as_ref()) {
            return;
        }
        let uploaded = env.map(|image| upload_image(&self.device, &self.queue, image, "environment"));
        let view = uploaded.as_ref().unwrap_or(&self.white);
        self.frame_bind_group = bind_group(
            &self.device,
            &self.frame_layout,
            &self.frame_buffer,
            view,
            &self.sampler,
            "frame_bind_group",
        );
        self.environment = env.cloned();
        tracing::debug!(loaded = env.is_some(), "environment bound");
    }

    fn sync_object(&mut self, id: ObjectId, mesh: &MeshObject, uniforms: &ObjectUniforms) {
        let texture = match &mesh.material {
            Material::Shader(shader) => shader.uniforms.texture.as_ref().filter(|t| t.is_valid()),
            Material::Standard(_) => None,
        };

        let object = match self.objects.entry(id) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                let data = mesh.geometry.tessellate();
                let vertices = mesh_vertices(&data);
                let uniform_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("object_uniforms"),
                            contents: bytemuck::bytes_of(uniforms),
                            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        });
                let bind_group = bind_group(
                    &self.device,
                    &self.object_layout,
                    &uniform_buffer,
                    &self.white,
                    &self.sampler,
                    "object_bind_group",
                );
                tracing::debug!(
                    object = %id.short(),
                    vertices = vertices.len(),
                    "mesh uploaded"
                );
                entry.insert(GpuObject {
                    vertices: self
                        .device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("object_vertices"),
                            contents: bytemuck::cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        }),
                    indices: self
                        .device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("object_indices"),
                            contents: bytemuck::cast_slice(&data.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        }),
                    index_count: data.indices.len() as u32,
                    uniforms: uniform_buffer,
                    bind_group,
                    texture: None,
                })
            }
        };

        self.queue
            .write_buffer(&object.uniforms, 0, bytemuck::bytes_of(uniforms));
        if !same_image(texture, object.texture.as_ref()) {
            let uploaded =
                texture.map(|image| upload_image(&self.device, &self.queue, image, "object_texture"));
            object.bind_group = bind_group(
                &self.device,
                &self.object_layout,
                &object.uniforms,
                uploaded.as_ref().unwrap_or(&self.white),
                &self.sampler,
                "object_bind_group",
            );
            object.texture = texture.cloned();
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, viewport: Viewport) {
        self.config.width = viewport.width.max(1);
        self.config.height = viewport.height.max(1);
        self.reconfigure();
        tracing::debug!(
            width = self.config.width,
            height = self.config.height,
            "surface resized"
        );
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<(), RenderError> {
        // An untaken frame from the previous call is dropped unpresented.
        self.frame = None;

        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.sync_environment(scene);
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(scene, camera)),
        );

        let mut draws = Vec::new();
        for (id, object) in scene.iter() {
            let Some(mesh) = object.as_mesh().filter(|_| object.visible) else {
                continue;
            };
            let uniforms = ObjectUniforms::new(scene.world_matrix(id), &mesh.material);
            self.sync_object(id, mesh, &uniforms);
            let program = match &mesh.material {
                Material::Shader(shader) => Some(shader.program),
                Material::Standard(_) => None,
            };
            draws.push((id, program));
        }

        let show_sky = self.environment.is_some() && scene.show_environment;
        let bg = scene.background;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            if show_sky {
                pass.set_pipeline(&self.pipelines.sky);
                pass.draw(0..3, 0..1);
            }
            for (id, program) in &draws {
                let Some(object) = self.objects.get(id) else {
                    continue;
                };
                pass.set_pipeline(self.pipelines.get(*program));
                pass.set_bind_group(1, &object.bind_group, &[]);
                pass.set_vertex_buffer(0, object.vertices.slice(..));
                pass.set_index_buffer(object.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.frame = Some(FrameTarget { texture, view });
        Ok(())
    }
}

impl Pipelines {
    /// `None` selects the lit standard pipeline.
    fn get(&self, program: Option<ShaderProgram>) -> &wgpu::RenderPipeline {
        match program {
            Some(ShaderProgram::Wave) => &self.wave,
            Some(ShaderProgram::Displace) => &self.displace,
            None => &self.standard,
        }
    }

    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[frame_layout, object_layout],
            push_constant_ranges: &[],
        });
        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[frame_layout],
            push_constant_ranges: &[],
        });

        let mesh = |label: &str, source: String, cull: Option<wgpu::Face>| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&mesh_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::buffer_layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: cull,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let wave = mesh(
            "wave_pipeline",
            shaders::program_source(ShaderProgram::Wave),
            Some(wgpu::Face::Back),
        );
        // Displaced planes are seen from both sides.
        let displace = mesh(
            "displace_pipeline",
            shaders::program_source(ShaderProgram::Displace),
            None,
        );
        let standard = mesh(
            "standard_pipeline",
            shaders::standard_source(),
            Some(wgpu::Face::Back),
        );

        let sky_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::sky_source().into()),
        });
        let sky = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_pipeline"),
            layout: Some(&sky_layout),
            vertex: wgpu::VertexState {
                module: &sky_module,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_module,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Self {
            wave,
            displace,
            standard,
            sky,
        }
    }
}

/// Uniform buffer, 2D texture and sampler, visible to both stages.
fn texture_uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: stages,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: stages,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: stages,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    texture: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(texture),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn upload_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &ImageData,
    label: &str,
) -> wgpu::TextureView {
    let max_dim = device.limits().max_texture_dimension_2d;
    let pixels = texture_pixels(image, max_dim);
    if (pixels.width, pixels.height) != (image.width, image.height) {
        tracing::warn!(
            label,
            width = image.width,
            height = image.height,
            max_dim,
            "image exceeds the texture limit, downsampled"
        );
    }
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: pixels.width,
                height: pixels.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &pixels.bytes,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
