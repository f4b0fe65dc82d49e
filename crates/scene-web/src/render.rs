mod helpers;
mod targets;

use crate::constants::{OVERLAY_MIN_ALPHA, STAR_QUAD};
use glam::{Mat4, Vec3};
use helpers::{PipelineSpec, ADDITIVE};
use scene_core::{
    hex_color, FrameSnapshot, RenderBackend, StaticScene, AMBIENT_COLOR, AMBIENT_INTENSITY,
    BACKGROUND_ALPHA, CORE_WGSL, GRID_COLOR, KEY_LIGHT_POSITION, OVERLAY_WGSL, PORTAL_POSITION,
    RIM_LIGHT_DISTANCE, RIM_LIGHT_POSITION, STARS_WGSL, STICKS_WGSL,
};
use targets::{DepthTarget, DEPTH_FORMAT};
use web_sys as web;

// ===================== Uniform and vertex layouts =====================

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct CoreUniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    base: [f32; 4],
    emissive: [f32; 4],
    key_color: [f32; 4],
    key_dir: [f32; 4],
    rim_color: [f32; 4],
    rim_pos: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct StarUniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    rotation: [[f32; 4]; 4],
    params: [f32; 4],
    fog_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct StickUniforms {
    view_proj: [[f32; 4]; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct OverlayUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PairInstance {
    a: [f32; 3],
    b: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PortalVertex {
    pos: [f32; 3],
    uv: [f32; 2],
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const PAIR_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32x3];
const PORTAL_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

fn vec3_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

fn pair_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PairInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &PAIR_ATTRS,
    }
}

impl CoreUniforms {
    fn from_frame(frame: &FrameSnapshot<'_>, view_proj: Mat4) -> Self {
        let v = frame.visual;
        let key_dir = Vec3::from(KEY_LIGHT_POSITION).normalize();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: v.camera_position.extend(v.fog_density).to_array(),
            base: v.core_color.extend(v.roughness).to_array(),
            emissive: (v.emissive_color * v.emissive_intensity)
                .extend(v.metalness)
                .to_array(),
            key_color: v.key_color.extend(v.key_intensity).to_array(),
            key_dir: key_dir.extend(v.transmission).to_array(),
            rim_color: v.rim_color.extend(v.rim_intensity).to_array(),
            rim_pos: Vec3::from(RIM_LIGHT_POSITION)
                .extend(RIM_LIGHT_DISTANCE)
                .to_array(),
            ambient: hex_color(AMBIENT_COLOR).extend(AMBIENT_INTENSITY).to_array(),
            fog_color: v.fog_color.extend(1.0).to_array(),
        }
    }
}

// ===================== GPU resources =====================

struct Pipelines {
    core: wgpu::RenderPipeline,
    stars: wgpu::RenderPipeline,
    sticks: wgpu::RenderPipeline,
    grid: wgpu::RenderPipeline,
    portal: wgpu::RenderPipeline,
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = helpers::uniform_buffer(device, label, std::mem::size_of::<T>());
        let bind_group = helpers::uniform_bind_group(device, label, layout, &buffer);
        Self { buffer, bind_group }
    }
}

/// Buffers allocated by `upload`. Dropping this without `destroy_all` would
/// leave freeing to the GC, so `release` always goes through it.
struct GpuResources {
    core_positions: wgpu::Buffer,
    core_normals: wgpu::Buffer,
    core_vertices: u32,
    star_quad: wgpu::Buffer,
    star_instances: wgpu::Buffer,
    star_count: u32,
    stick_box: wgpu::Buffer,
    stick_instances: wgpu::Buffer,
    stick_vertices: u32,
    stick_count: u32,
    grid: wgpu::Buffer,
    grid_vertices: u32,
    portal: wgpu::Buffer,
    portal_vertices: u32,
    core_u: UniformSlot,
    stars_u: UniformSlot,
    sticks_u: UniformSlot,
    grid_u: UniformSlot,
    portal_u: UniformSlot,
}

impl GpuResources {
    fn buffers(&self) -> [&wgpu::Buffer; 13] {
        [
            &self.core_positions,
            &self.core_normals,
            &self.star_quad,
            &self.star_instances,
            &self.stick_box,
            &self.stick_instances,
            &self.grid,
            &self.portal,
            &self.core_u.buffer,
            &self.stars_u.buffer,
            &self.sticks_u.buffer,
            &self.grid_u.buffer,
            &self.portal_u.buffer,
        ]
    }

    fn destroy_all(&self) {
        for b in self.buffers() {
            b.destroy();
        }
    }
}

// ===================== WebGPU state =====================

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    uniform_bgl: wgpu::BindGroupLayout,
    pipelines: Pipelines,
    depth: Option<DepthTarget>,
    res: Option<GpuResources>,
    premultiplied: bool,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = *caps
            .formats
            .first()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // Palette colours are linear; render through an sRGB view so the
        // canvas gets encoded output even when it only offers unorm storage.
        let view_format = format.add_srgb_suffix();
        let premultiplied = caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied);
        let alpha_mode = if premultiplied {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format != format {
                vec![view_format]
            } else {
                vec![]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_bgl = helpers::uniform_layout(&device);
        let pipelines = build_pipelines(&device, &uniform_bgl, view_format);
        log::info!(
            "[gpu] surface {}x{} format={:?} view={:?} alpha={:?}",
            width,
            height,
            format,
            view_format,
            alpha_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            uniform_bgl,
            pipelines,
            depth: None,
            res: None,
            premultiplied,
        })
    }

    fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn clear_color(&self, background: Vec3) -> wgpu::Color {
        let a = BACKGROUND_ALPHA as f64;
        let k = if self.premultiplied { a } else { 1.0 };
        wgpu::Color {
            r: background.x as f64 * k,
            g: background.y as f64 * k,
            b: background.z as f64 * k,
            a,
        }
    }
}

fn build_pipelines(
    device: &wgpu::Device,
    bgl: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
) -> Pipelines {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_pl"),
        bind_group_layouts: &[bgl],
        push_constant_ranges: &[],
    });
    let module = |label: &str, src: &'static str| {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(src.into()),
        })
    };
    let core_shader = module("core_shader", CORE_WGSL);
    let stars_shader = module("stars_shader", STARS_WGSL);
    let sticks_shader = module("sticks_shader", STICKS_WGSL);
    let overlay_shader = module("overlay_shader", OVERLAY_WGSL);

    let core = helpers::make_pipeline(
        device,
        &layout,
        color_format,
        DEPTH_FORMAT,
        PipelineSpec {
            label: "core_pipeline",
            shader: &core_shader,
            vs_entry: "vs_main",
            fs_entry: "fs_main",
            buffers: &[vec3_layout(&POSITION_ATTRS), vec3_layout(&NORMAL_ATTRS)],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: true,
        },
    );
    let stars = helpers::make_pipeline(
        device,
        &layout,
        color_format,
        DEPTH_FORMAT,
        PipelineSpec {
            label: "stars_pipeline",
            shader: &stars_shader,
            vs_entry: "vs_main",
            fs_entry: "fs_main",
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &CORNER_ATTRS,
                },
                pair_layout(),
            ],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: false,
        },
    );
    let sticks = helpers::make_pipeline(
        device,
        &layout,
        color_format,
        DEPTH_FORMAT,
        PipelineSpec {
            label: "sticks_pipeline",
            shader: &sticks_shader,
            vs_entry: "vs_main",
            fs_entry: "fs_main",
            buffers: &[vec3_layout(&POSITION_ATTRS), pair_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: ADDITIVE,
            depth_write: false,
        },
    );
    let grid = helpers::make_pipeline(
        device,
        &layout,
        color_format,
        DEPTH_FORMAT,
        PipelineSpec {
            label: "grid_pipeline",
            shader: &overlay_shader,
            vs_entry: "vs_grid",
            fs_entry: "fs_grid",
            buffers: &[vec3_layout(&POSITION_ATTRS)],
            topology: wgpu::PrimitiveTopology::LineList,
            blend: ADDITIVE,
            depth_write: false,
        },
    );
    let portal = helpers::make_pipeline(
        device,
        &layout,
        color_format,
        DEPTH_FORMAT,
        PipelineSpec {
            label: "portal_pipeline",
            shader: &overlay_shader,
            vs_entry: "vs_portal",
            fs_entry: "fs_portal",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PortalVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &PORTAL_ATTRS,
            }],
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_write: false,
        },
    );
    Pipelines {
        core,
        stars,
        sticks,
        grid,
        portal,
    }
}

impl RenderBackend for GpuState {
    type Error = wgpu::SurfaceError;

    fn upload(&mut self, scene: &StaticScene) -> Result<(), Self::Error> {
        let d = &self.device;
        let zeros = vec![Vec3::ZERO; scene.core_vertex_count];
        let star_instances: Vec<PairInstance> = scene
            .stars
            .positions
            .iter()
            .zip(&scene.stars.colors)
            .map(|(p, c)| PairInstance {
                a: p.to_array(),
                b: c.to_array(),
            })
            .collect();
        let stick_instances: Vec<PairInstance> = scene
            .sticks
            .offsets
            .iter()
            .zip(&scene.sticks.orientations)
            .map(|(o, e)| PairInstance {
                a: o.to_array(),
                b: e.to_array(),
            })
            .collect();
        let portal: Vec<PortalVertex> = scene
            .portal
            .positions
            .iter()
            .zip(&scene.portal.uvs)
            .map(|(p, uv)| PortalVertex {
                pos: p.to_array(),
                uv: uv.to_array(),
            })
            .collect();
        let bgl = &self.uniform_bgl;

        let res = GpuResources {
            core_positions: helpers::vertex_buffer(d, "core_positions", bytemuck::cast_slice(&zeros)),
            core_normals: helpers::vertex_buffer(d, "core_normals", bytemuck::cast_slice(&zeros)),
            core_vertices: scene.core_vertex_count as u32,
            star_quad: helpers::vertex_buffer(d, "star_quad", bytemuck::cast_slice(&STAR_QUAD)),
            star_instances: helpers::vertex_buffer(
                d,
                "star_instances",
                bytemuck::cast_slice(&star_instances),
            ),
            star_count: star_instances.len() as u32,
            stick_box: helpers::vertex_buffer(
                d,
                "stick_box",
                bytemuck::cast_slice(&scene.sticks.box_vertices),
            ),
            stick_instances: helpers::vertex_buffer(
                d,
                "stick_instances",
                bytemuck::cast_slice(&stick_instances),
            ),
            stick_vertices: scene.sticks.box_vertices.len() as u32,
            stick_count: stick_instances.len() as u32,
            grid: helpers::vertex_buffer(d, "grid_lines", bytemuck::cast_slice(&scene.grid)),
            grid_vertices: scene.grid.len() as u32,
            portal: helpers::vertex_buffer(d, "portal_disc", bytemuck::cast_slice(&portal)),
            portal_vertices: portal.len() as u32,
            core_u: UniformSlot::new::<CoreUniforms>(d, bgl, "core_uniforms"),
            stars_u: UniformSlot::new::<StarUniforms>(d, bgl, "star_uniforms"),
            sticks_u: UniformSlot::new::<StickUniforms>(d, bgl, "stick_uniforms"),
            grid_u: UniformSlot::new::<OverlayUniforms>(d, bgl, "grid_uniforms"),
            portal_u: UniformSlot::new::<OverlayUniforms>(d, bgl, "portal_uniforms"),
        };
        if let Some(old) = self.res.replace(res) {
            old.destroy_all();
        }
        if self.depth.is_none() {
            self.depth = Some(DepthTarget::new(d, self.config.width, self.config.height));
        }
        log::debug!("[gpu] uploaded stars={} core={}", scene.stars.len(), scene.core_vertex_count);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        if let Some(depth) = self.depth.as_mut() {
            depth.recreate(&self.device, width, height);
        }
        log::debug!("[gpu] resized {}x{}", width, height);
    }

    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<(), Self::Error> {
        let (Some(res), Some(depth)) = (self.res.as_ref(), self.depth.as_ref()) else {
            return Ok(());
        };
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ wgpu::SurfaceError::OutOfMemory) => return Err(e),
            Err(e) => {
                log::debug!("[gpu] surface {:?}; reconfiguring", e);
                self.reconfigure();
                return Ok(());
            }
        };
        let target = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });

        let v = frame.visual;
        let view = frame.camera.view_matrix();
        let view_proj = frame.camera.projection_matrix() * view;
        let vp = view_proj.to_cols_array_2d();
        let q = &self.queue;

        q.write_buffer(&res.core_positions, 0, bytemuck::cast_slice(frame.positions));
        q.write_buffer(&res.core_normals, 0, bytemuck::cast_slice(frame.normals));
        q.write_buffer(
            &res.core_u.buffer,
            0,
            bytemuck::bytes_of(&CoreUniforms::from_frame(frame, view_proj)),
        );
        let rotation =
            Mat4::from_rotation_x(v.star_rotation.x) * Mat4::from_rotation_y(v.star_rotation.y);
        q.write_buffer(
            &res.stars_u.buffer,
            0,
            bytemuck::bytes_of(&StarUniforms {
                view_proj: vp,
                view: view.to_cols_array_2d(),
                rotation: rotation.to_cols_array_2d(),
                params: [v.star_size, v.star_opacity, v.fog_density, 0.0],
                fog_color: v.fog_color.extend(1.0).to_array(),
            }),
        );
        q.write_buffer(
            &res.sticks_u.buffer,
            0,
            bytemuck::bytes_of(&StickUniforms {
                view_proj: vp,
                params: [v.time, v.stick_intensity, 0.0, 0.0],
            }),
        );
        let draw_grid = v.grid_visible && v.grid_opacity > OVERLAY_MIN_ALPHA;
        if draw_grid {
            q.write_buffer(
                &res.grid_u.buffer,
                0,
                bytemuck::bytes_of(&OverlayUniforms {
                    view_proj: vp,
                    model: Mat4::IDENTITY.to_cols_array_2d(),
                    color: hex_color(GRID_COLOR).extend(v.grid_opacity).to_array(),
                    params: [v.time, 0.0, 0.0, 0.0],
                }),
            );
        }
        let draw_portal = v.portal_alpha > OVERLAY_MIN_ALPHA;
        if draw_portal {
            let model = Mat4::from_translation(PORTAL_POSITION)
                * Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2)
                * Mat4::from_scale(Vec3::splat(v.portal_scale));
            q.write_buffer(
                &res.portal_u.buffer,
                0,
                bytemuck::bytes_of(&OverlayUniforms {
                    view_proj: vp,
                    model: model.to_cols_array_2d(),
                    color: [1.0, 1.0, 1.0, v.portal_alpha],
                    params: [v.time, 0.0, 0.0, 0.0],
                }),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(v.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.pipelines.core);
            rpass.set_bind_group(0, &res.core_u.bind_group, &[]);
            rpass.set_vertex_buffer(0, res.core_positions.slice(..));
            rpass.set_vertex_buffer(1, res.core_normals.slice(..));
            rpass.draw(0..res.core_vertices, 0..1);

            if res.star_count > 0 {
                rpass.set_pipeline(&self.pipelines.stars);
                rpass.set_bind_group(0, &res.stars_u.bind_group, &[]);
                rpass.set_vertex_buffer(0, res.star_quad.slice(..));
                rpass.set_vertex_buffer(1, res.star_instances.slice(..));
                rpass.draw(0..STAR_QUAD.len() as u32, 0..res.star_count);
            }

            if res.stick_count > 0 {
                rpass.set_pipeline(&self.pipelines.sticks);
                rpass.set_bind_group(0, &res.sticks_u.bind_group, &[]);
                rpass.set_vertex_buffer(0, res.stick_box.slice(..));
                rpass.set_vertex_buffer(1, res.stick_instances.slice(..));
                rpass.draw(0..res.stick_vertices, 0..res.stick_count);
            }

            if draw_grid {
                rpass.set_pipeline(&self.pipelines.grid);
                rpass.set_bind_group(0, &res.grid_u.bind_group, &[]);
                rpass.set_vertex_buffer(0, res.grid.slice(..));
                rpass.draw(0..res.grid_vertices, 0..1);
            }

            if draw_portal {
                rpass.set_pipeline(&self.pipelines.portal);
                rpass.set_bind_group(0, &res.portal_u.bind_group, &[]);
                rpass.set_vertex_buffer(0, res.portal.slice(..));
                rpass.draw(0..res.portal_vertices, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(res) = self.res.take() {
            res.destroy_all();
        }
        if let Some(depth) = self.depth.take() {
            depth.destroy();
        }
        log::info!("[gpu] released");
    }

    fn live_handles(&self) -> usize {
        let buffers = self.res.as_ref().map(|r| r.buffers().len()).unwrap_or(0);
        buffers + usize::from(self.depth.is_some())
    }
}
