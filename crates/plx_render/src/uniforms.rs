//! Uniform storage for one frame's draws.
//!
//! Uniform writes issued through the queue all land before the render pass
//! executes, so a single slot cannot be rewritten between draws. Each draw
//! gets its own slot in one buffer instead, addressed with a dynamic offset.
//! The whole frame is written with one `write_buffer` call.

use wgpu::util::DeviceExt;

use crate::camera::ProjectionUniform;
use crate::parallax_pipeline::{DrawUniform, ParallaxPipeline};

pub struct FrameUniforms {
    pub projection_buffer: wgpu::Buffer,
    pub draw_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    stride: u32,
    capacity: usize,
    staging: Vec<u8>,
}

/// Rounds `size` up to the next multiple of `alignment`.
pub fn uniform_stride(size: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

impl FrameUniforms {
    pub fn new(
        device: &wgpu::Device,
        pipeline: &ParallaxPipeline,
        projection: ProjectionUniform,
        capacity: usize,
        alignment: u32,
    ) -> Self {
        let capacity = capacity.max(1);
        let stride = uniform_stride(std::mem::size_of::<DrawUniform>() as u32, alignment);

        let projection_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Projection Uniform Buffer"),
            contents: bytemuck::cast_slice(&[projection]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: stride as u64 * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = pipeline.create_frame_bind_group(device, &projection_buffer, &draw_buffer);

        Self {
            projection_buffer,
            draw_buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::with_capacity(stride as usize * capacity),
        }
    }

    /// Dynamic offset of draw slot `index`.
    pub fn offset(&self, index: usize) -> u32 {
        self.stride * index as u32
    }

    /// Uploads `draws` into consecutive slots. Draws beyond capacity are
    /// dropped with a warning; returns how many were written.
    pub fn write(&mut self, queue: &wgpu::Queue, draws: &[DrawUniform]) -> usize {
        let count = draws.len().min(self.capacity);
        if count < draws.len() {
            log::warn!(
                "{} draws requested but uniform buffer holds {}",
                draws.len(),
                self.capacity
            );
        }
        if count == 0 {
            return 0;
        }
        pack_draws(&mut self.staging, &draws[..count], self.stride);
        queue.write_buffer(&self.draw_buffer, 0, &self.staging);
        count
    }

    pub fn destroy(self) {
        self.projection_buffer.destroy();
        self.draw_buffer.destroy();
    }
}

fn pack_draws(staging: &mut Vec<u8>, draws: &[DrawUniform], stride: u32) {
    staging.clear();
    staging.resize(stride as usize * draws.len(), 0);
    for (slot, draw) in staging.chunks_exact_mut(stride as usize).zip(draws) {
        let bytes = bytemuck::bytes_of(draw);
        slot[..bytes.len()].copy_from_slice(bytes);
    }
}
