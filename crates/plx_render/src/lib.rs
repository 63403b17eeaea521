pub mod camera;
pub mod gpu_context;
pub mod parallax_pipeline;
pub mod quad;
pub mod texture;
pub mod uniforms;
pub mod vertex;

pub use camera::{ProjectionUniform, ScreenCamera};
pub use gpu_context::{pick_surface_format, GpuContext};
pub use parallax_pipeline::{DrawUniform, ParallaxPipeline};
pub use quad::QuadMesh;
pub use texture::{read_image, DecodedImage, PixelFormat, Texture};
pub use uniforms::FrameUniforms;
pub use vertex::{QuadVertex, UNIT_QUAD};
