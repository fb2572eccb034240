use std::sync::Arc;
use wgpu::{BindGroup, Device, RenderPipeline, Surface, SurfaceConfiguration, Texture, TextureView};

use super::gpu_context::GpuContext;
use super::window::WindowDimensions;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Blits a window's RGBA8 frame onto its wgpu surface.
///
/// The frame is uploaded into a texture of the window's fixed frame size and
/// drawn with a fullscreen triangle, so the surface itself may be any size.
pub struct SurfaceRenderer {
    gpu: Arc<GpuContext>,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    render_pipeline: RenderPipeline,
    texture: Texture,
    bind_group: BindGroup,
    frame: WindowDimensions,
}

impl SurfaceRenderer {
    /// Configure `surface` at `surface_size` physical pixels for frames of
    /// `frame` dimensions
    pub fn new(
        gpu: Arc<GpuContext>,
        surface: Surface<'static>,
        surface_size: (u32, u32),
        frame: WindowDimensions,
    ) -> Result<Self> {
        let surface_caps = surface.get_capabilities(gpu.adapter());
        let Some(&first_format) = surface_caps.formats.first() else {
            return Err("Surface is not supported by the selected adapter".into());
        };

        // Frames carry raw bytes; a linear target keeps them unconverted
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(first_format);

        let surface_config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: surface_size.0.max(1),
            height: surface_size.1.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(gpu.device(), &surface_config);

        let texture = Self::create_frame_texture(gpu.device(), frame);
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (render_pipeline, bind_group) =
            Self::create_render_pipeline(gpu.device(), &texture_view, surface_format);

        Ok(Self {
            gpu,
            surface,
            surface_config,
            render_pipeline,
            texture,
            bind_group,
            frame,
        })
    }

    /// Upload one frame and present it
    pub fn render_pixels(&mut self, pixels: &[u8]) -> Result<()> {
        let expected_size = self.frame.frame_len();
        if pixels.len() != expected_size {
            return Err(format!(
                "Invalid pixel buffer size: expected {} bytes, got {}",
                expected_size,
                pixels.len()
            )
            .into());
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Skip this frame; the next pass draws into the fresh swapchain
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        self.gpu.queue().write_texture(
            self.texture.as_image_copy(),
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.frame.row_len() as u32),
                rows_per_image: Some(self.frame.height),
            },
            wgpu::Extent3d {
                width: self.frame.width,
                height: self.frame.height,
                depth_or_array_layers: 1,
            },
        );

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Blit Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.gpu.queue().submit(Some(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    /// Follow a change of the window's physical size. The frame texture keeps
    /// its fixed dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        self.surface
            .configure(self.gpu.device(), &self.surface_config);
    }

    fn create_frame_texture(device: &Device, frame: WindowDimensions) -> Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Window Frame Texture"),
            size: wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn create_render_pipeline(
        device: &Device,
        texture_view: &TextureView,
        surface_format: wgpu::TextureFormat,
    ) -> (RenderPipeline, BindGroup) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Frame Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../display.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = Self::create_bind_group(device, &bind_group_layout, texture_view);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frame Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Frame Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        (pipeline, bind_group)
    }

    fn create_bind_group(
        device: &Device,
        layout: &wgpu::BindGroupLayout,
        texture_view: &TextureView,
    ) -> BindGroup {
        // Nearest keeps pixels crisp when the surface is scaled
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_texture_row_pitch() {
        // Rows are uploaded unpadded; wgpu only requires 256-byte alignment for
        // buffer-to-texture copies, not for queue writes
        let frame = WindowDimensions::new(3, 2);
        assert_eq!(frame.row_len(), 12);
        assert_eq!(frame.frame_len(), frame.row_len() * frame.height as usize);
    }

    #[test]
    fn test_shader_declares_entry_points() {
        let source = include_str!("../display.wgsl");
        assert!(source.contains("fn vs_main"));
        assert!(source.contains("fn fs_main"));
    }
}
