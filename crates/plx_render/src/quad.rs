use wgpu::util::DeviceExt;

use crate::vertex::UNIT_QUAD;

/// The single quad every layer and the player sprite are drawn with.
pub struct QuadMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl QuadMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Unit Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&UNIT_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: UNIT_QUAD.len() as u32,
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }

    pub fn destroy(self) {
        self.vertex_buffer.destroy();
    }
}
