use std::cell::OnceCell;
use std::thread::LocalKey;

/// Leak `make()` into `slot` on first use; later calls get the same reference.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn leak_once<T: 'static>(
    slot: &'static LocalKey<OnceCell<&'static T>>,
    make: impl FnOnce() -> T,
) -> &'static T {
    slot.with(|cell| *cell.get_or_init(|| Box::leak(Box::new(make()))))
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use gpu::geometry::FrameGeometry;
    use gpu::{Globals, GlobePass, LineVertex, RenderFrame, SurfaceVertex};
    use std::borrow::Cow;
    use std::cell::OnceCell;
    use wasm_bindgen::prelude::*;

    thread_local! {
        static INSTANCE: OnceCell<&'static ::wgpu::Instance> = const { OnceCell::new() };
    }

    #[derive(Debug)]
    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub _canvas: web_sys::HtmlCanvasElement,
        pub globe_pipeline: ::wgpu::RenderPipeline,
        pub translucent_globe_pipeline: ::wgpu::RenderPipeline,
        pub mesh_pipeline: ::wgpu::RenderPipeline,
        pub line_pipeline: ::wgpu::RenderPipeline,
        pub uniform_buffer: ::wgpu::Buffer,
        pub uniform_bind_group: ::wgpu::BindGroup,
        pub depth_view: ::wgpu::TextureView,
    }

    const SURFACE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_dir: vec3<f32>,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
) -> VsOut {
    var out: VsOut;
    out.position = globals.view_proj * vec4<f32>(position, 1.0);
    out.normal = normal;
    out.color = color;
    return out;
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    let l = normalize(globals.light_dir);
    let shade = 0.35 + 0.65 * max(dot(n, l), 0.0);
    return vec4<f32>(fs_in.color.rgb * shade, fs_in.color.a);
}
"#;

    const LINE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    light_dir: vec3<f32>,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.position = globals.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    return fs_in.color;
}
"#;

    const SURFACE_ATTRIBUTES: [::wgpu::VertexAttribute; 3] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];
    const LINE_ATTRIBUTES: [::wgpu::VertexAttribute; 2] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("atlas-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    struct PipelineSpec<'a> {
        label: &'a str,
        shader: &'a ::wgpu::ShaderModule,
        buffer: ::wgpu::VertexBufferLayout<'a>,
        topology: ::wgpu::PrimitiveTopology,
        blend: ::wgpu::BlendState,
        depth_write: bool,
    }

    fn create_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        format: ::wgpu::TextureFormat,
        spec: PipelineSpec<'_>,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: spec.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[spec.buffer],
            },
            fragment: Some(::wgpu::FragmentState {
                module: spec.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(spec.blend),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: spec.topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                // Corridor caps and the globe patch are not consistently wound.
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: spec.depth_write,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn surface_layout() -> ::wgpu::VertexBufferLayout<'static> {
        ::wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SurfaceVertex>() as ::wgpu::BufferAddress,
            step_mode: ::wgpu::VertexStepMode::Vertex,
            attributes: &SURFACE_ATTRIBUTES,
        }
    }

    pub async fn init_wgpu_from_canvas(
        canvas: web_sys::HtmlCanvasElement,
    ) -> Result<WgpuContext, JsValue> {
        let width = canvas.width();
        let height = canvas.height();

        // `wgpu::Surface` must not outlive its `wgpu::Instance`; one instance
        // lives for the page and is shared by every mount.
        let instance = super::leak_once(&INSTANCE, || {
            ::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            })
        });

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("atlas-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let surface_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("atlas-surface-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SURFACE_SHADER)),
        });
        let line_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("atlas-line-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(LINE_SHADER)),
        });

        // Uniform rather than storage binding: WebGL2 has no storage buffers.
        let uniform_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("atlas-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("atlas-globals-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("atlas-globals-bg"),
            layout: &uniform_bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("atlas-pipeline-layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            immediate_size: 0,
        });

        let globe_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            format,
            PipelineSpec {
                label: "atlas-globe-pipeline",
                shader: &surface_shader,
                buffer: surface_layout(),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                blend: ::wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );
        // See-through globe: blended over the corridors, never hides them.
        let translucent_globe_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            format,
            PipelineSpec {
                label: "atlas-translucent-globe-pipeline",
                shader: &surface_shader,
                buffer: surface_layout(),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );
        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            format,
            PipelineSpec {
                label: "atlas-corridor-pipeline",
                shader: &surface_shader,
                buffer: surface_layout(),
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
            },
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            format,
            PipelineSpec {
                label: "atlas-line-pipeline",
                shader: &line_shader,
                buffer: ::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &LINE_ATTRIBUTES,
                },
                topology: ::wgpu::PrimitiveTopology::LineList,
                blend: ::wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
            },
        );

        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            _canvas: canvas,
            globe_pipeline,
            translucent_globe_pipeline,
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_view,
        })
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    struct Batch {
        vertices: ::wgpu::Buffer,
        indices: Option<::wgpu::Buffer>,
        count: u32,
    }

    impl Batch {
        fn indexed<V: bytemuck::Pod>(
            device: &::wgpu::Device,
            label: &str,
            vertices: &[V],
            indices: &[u32],
        ) -> Option<Self> {
            if vertices.is_empty() || indices.is_empty() {
                return None;
            }
            Some(Self {
                vertices: vertex_buffer(device, label, vertices),
                indices: Some(device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                })),
                count: indices.len() as u32,
            })
        }

        fn list<V: bytemuck::Pod>(device: &::wgpu::Device, label: &str, vertices: &[V]) -> Option<Self> {
            if vertices.is_empty() {
                return None;
            }
            Some(Self {
                vertices: vertex_buffer(device, label, vertices),
                indices: None,
                count: vertices.len() as u32,
            })
        }

        fn draw(&self, rpass: &mut ::wgpu::RenderPass<'_>, pipeline: &::wgpu::RenderPipeline) {
            rpass.set_pipeline(pipeline);
            rpass.set_vertex_buffer(0, self.vertices.slice(..));
            match &self.indices {
                Some(indices) => {
                    rpass.set_index_buffer(indices.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..self.count, 0, 0..1);
                }
                None => rpass.draw(0..self.count, 0..1),
            }
        }
    }

    fn vertex_buffer<V: bytemuck::Pod>(device: &::wgpu::Device, label: &str, data: &[V]) -> ::wgpu::Buffer {
        device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: ::wgpu::BufferUsages::VERTEX,
        })
    }

    pub fn render_scene(
        ctx: &WgpuContext,
        frame: &RenderFrame,
        geometry: &FrameGeometry,
    ) -> Result<(), JsValue> {
        let surface_texture = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
        let view = surface_texture
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        let globals = Globals {
            view_proj: frame.camera.view_proj,
            light_dir: frame.light_dir,
            _pad: 0.0,
        };
        ctx.queue
            .write_buffer(&ctx.uniform_buffer, 0, bytemuck::bytes_of(&globals));

        let globe = Batch::indexed(
            &ctx.device,
            "atlas-globe",
            &geometry.globe_vertices,
            &geometry.globe_indices,
        );
        let corridors = Batch::indexed(
            &ctx.device,
            "atlas-corridors",
            &geometry.mesh_vertices,
            &geometry.mesh_indices,
        );
        let lines = Batch::list(&ctx.device, "atlas-lines", &geometry.lines);

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("atlas-frame-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("atlas-scene-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                            r: 0.004,
                            g: 0.008,
                            b: 0.016,
                            a: 1.0,
                        }),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            rpass.set_bind_group(0, &ctx.uniform_bind_group, &[]);

            if frame.globe.pass == GlobePass::BeforeOpaque
                && let Some(globe) = &globe
            {
                globe.draw(&mut rpass, &ctx.globe_pipeline);
            }
            if let Some(corridors) = &corridors {
                corridors.draw(&mut rpass, &ctx.mesh_pipeline);
            }
            if let Some(lines) = &lines {
                lines.draw(&mut rpass, &ctx.line_pipeline);
            }
            if frame.globe.pass == GlobePass::AfterOpaque
                && let Some(globe) = &globe
            {
                globe.draw(&mut rpass, &ctx.translucent_globe_pipeline);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::RenderFrame;
    use gpu::geometry::FrameGeometry;
    use wasm_bindgen::prelude::JsValue;

    #[derive(Debug, Default)]
    pub struct WgpuContext;

    pub async fn init_wgpu_from_canvas(
        _canvas: web_sys::HtmlCanvasElement,
    ) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn resize_wgpu(_ctx: &mut WgpuContext, _width: u32, _height: u32) {}

    pub fn render_scene(
        _ctx: &WgpuContext,
        _frame: &RenderFrame,
        _geometry: &FrameGeometry,
    ) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{WgpuContext, init_wgpu_from_canvas, render_scene, resize_wgpu};

#[cfg(test)]
mod tests {
    use super::leak_once;
    use std::cell::OnceCell;

    thread_local! {
        static SLOT: OnceCell<&'static Vec<u32>> = const { OnceCell::new() };
    }

    #[test]
    fn leaks_a_single_value_per_thread() {
        let mut made = 0;
        let first = leak_once(&SLOT, || {
            made += 1;
            vec![1]
        });
        let second = leak_once(&SLOT, || {
            made += 1;
            vec![2]
        });
        assert_eq!(made, 1);
        assert!(std::ptr::eq(first, second));
        assert_eq!(second, &vec![1]);
    }
}
