use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ProjectionUniform {
    pub matrix: [[f32; 4]; 4],
}

/// Fixed screen-space projection: origin at the bottom-left corner, one unit
/// per pixel. There is no camera movement; scrolling happens in texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenCamera {
    pub width: f32,
    pub height: f32,
}

impl ScreenCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.width, 0.0, self.height, -1.0, 1.0)
    }

    pub fn build_uniform(&self) -> ProjectionUniform {
        ProjectionUniform {
            matrix: self.projection().to_cols_array_2d(),
        }
    }
}
