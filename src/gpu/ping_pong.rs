//! Double-buffered state textures.
//!
//! The step pass reads one texture and writes the other, then the roles swap.
//! Cell values are stored as `Rgba32Float` so repeated steps do not lose
//! precision the way an 8-bit target would.

use crate::state::StateBuffer;

pub(crate) const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// GPU resources for the two state textures.
pub(crate) struct PingPong {
    textures: [wgpu::Texture; 2],
    views: [wgpu::TextureView; 2],
    /// `bind_groups[i]` samples `textures[i]`.
    bind_groups: [wgpu::BindGroup; 2],
    /// Index of the texture holding the latest state.
    current: usize,
    width: u32,
    height: u32,
}

impl PingPong {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        width: u32,
        height: u32,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let textures = [0usize, 1].map(|i| create_state_texture(device, width, height, i));
        let views = [0usize, 1].map(|i| textures[i].create_view(&wgpu::TextureViewDescriptor::default()));
        let bind_groups = [0usize, 1].map(|i| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("State Bind Group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&views[i]),
                    },
                ],
            })
        });

        Self {
            textures,
            views,
            bind_groups,
            current: 0,
            width,
            height,
        }
    }

    /// Bind group reading the latest state.
    pub fn current_bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_groups[self.current]
    }

    /// View the next step writes into.
    pub fn next_view(&self) -> &wgpu::TextureView {
        &self.views[1 - self.current]
    }

    /// Make the texture just written the current one.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Upload an RGBA8 buffer into the current texture.
    ///
    /// Buffers that do not match the texture size are dropped.
    pub fn upload(&mut self, queue: &wgpu::Queue, state: &StateBuffer) -> bool {
        if state.width() != self.width || state.height() != self.height {
            return false;
        }

        let texels: Vec<f32> = state.as_bytes().iter().map(|&b| b as f32 / 255.0).collect();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.textures[self.current],
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 16),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        true
    }
}

fn create_state_texture(device: &wgpu::Device, width: u32, height: u32, index: usize) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(if index == 0 { "State Texture A" } else { "State Texture B" }),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: STATE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}
