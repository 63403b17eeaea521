//! Image decoding and GPU texture upload.
//!
//! Decoding picks the texel layout from the source image's channel count.
//! Every texture is sampled with linear filtering, linear mip blending and
//! repeat addressing; the repeat mode is what lets a layer scroll forever by
//! shifting its texture coordinates. The GPU API has no mipmap generator, so
//! the chain is downsampled on the CPU before upload.
//!
//! Texels are uploaded as plain `Unorm` and the surface is non-sRGB, so
//! image values reach the screen unconverted and blending works on them
//! directly.

use std::path::Path;

use image::imageops::FilterType;
use image::{GenericImageView, GrayImage, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8,
    /// Three-channel source. Expanded to four channels on decode because
    /// there is no three-byte texel format to upload into.
    Rgb8,
    /// Single channel, sampled as red.
    R8,
}

impl PixelFormat {
    pub fn from_channel_count(channels: u8) -> Self {
        match channels {
            4 => Self::Rgba8,
            3 => Self::Rgb8,
            _ => Self::R8,
        }
    }

    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Rgba8 | Self::Rgb8 => wgpu::TextureFormat::Rgba8Unorm,
            Self::R8 => wgpu::TextureFormat::R8Unorm,
        }
    }

    pub fn bytes_per_texel(self) -> u32 {
        match self {
            Self::Rgba8 | Self::Rgb8 => 4,
            Self::R8 => 1,
        }
    }
}

/// A decoded image in upload layout: tightly packed rows, top row first.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {e}"))?;
    let (width, height) = img.dimensions();
    let format = PixelFormat::from_channel_count(img.color().channel_count());
    let pixels = match format {
        PixelFormat::Rgba8 | PixelFormat::Rgb8 => img.to_rgba8().into_raw(),
        PixelFormat::R8 => img.to_luma8().into_raw(),
    };
    Ok(DecodedImage {
        format,
        width,
        height,
        pixels,
    })
}

/// Reads and decodes an image file.
pub fn read_image(path: &Path) -> Result<DecodedImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read failed: {e}"))?;
    decode_image(&bytes)
}

/// Rejects images the device cannot hold in a single 2D texture.
pub fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("image is empty ({width}x{height})"));
    }
    if width > max_dimension || height > max_dimension {
        return Err(format!(
            "image is {width}x{height}, device limit is {max_dimension} per side"
        ));
    }
    Ok(())
}

/// Texel a failed load falls back to: opaque black.
pub const FALLBACK_TEXEL: [u8; 4] = [0, 0, 0, 255];

/// Number of levels in a full mip chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builds every mip level, base level first. Each level is downsampled from
/// the previous one.
pub fn build_mip_chain(image: &DecodedImage) -> Result<Vec<MipLevel>, String> {
    let expected = image.width as usize
        * image.height as usize
        * image.format.bytes_per_texel() as usize;
    if image.pixels.len() != expected {
        return Err(format!(
            "pixel buffer is {} bytes, expected {} for {}x{}",
            image.pixels.len(),
            expected,
            image.width,
            image.height
        ));
    }

    let count = mip_level_count(image.width, image.height);
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(MipLevel {
        width: image.width,
        height: image.height,
        pixels: image.pixels.clone(),
    });

    for level in 1..count {
        let width = (image.width >> level).max(1);
        let height = (image.height >> level).max(1);
        let Some(prev) = levels.last() else {
            break;
        };
        let pixels = match image.format {
            PixelFormat::Rgba8 | PixelFormat::Rgb8 => {
                let src = RgbaImage::from_raw(prev.width, prev.height, prev.pixels.clone())
                    .ok_or_else(|| format!("mip level {} has a malformed buffer", level - 1))?;
                image::imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
            PixelFormat::R8 => {
                let src = GrayImage::from_raw(prev.width, prev.height, prev.pixels.clone())
                    .ok_or_else(|| format!("mip level {} has a malformed buffer", level - 1))?;
                image::imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
        };
        levels.push(MipLevel {
            width,
            height,
            pixels,
        });
    }

    Ok(levels)
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
    /// False when the image could not be loaded and the texture is blank.
    pub loaded: bool,
}

impl Texture {
    /// Loads an image file into a texture. Failures are logged and yield a
    /// blank texture so the caller always gets something to bind.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Self {
        let label = path.display().to_string();
        log::info!("Loading image: {}", label);

        let result =
            read_image(path).and_then(|image| Self::from_decoded(device, queue, &image, &label));

        match result {
            Ok(texture) => texture,
            Err(err) => {
                log::error!("Failed to load texture '{}': {}", label, err);
                Self::blank(device, queue, &label)
            }
        }
    }

    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        label: &str,
    ) -> Result<Self, String> {
        check_dimensions(
            image.width,
            image.height,
            device.limits().max_texture_dimension_2d,
        )?;
        let levels = build_mip_chain(image)?;
        let texture = Self::upload(device, queue, image.format, &levels, label);
        Ok(Self::finish(device, texture, (image.width, image.height), true))
    }

    /// A 1x1 opaque black texture, so a layer whose image failed shows up
    /// as a dark band instead of vanishing.
    pub fn blank(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> Self {
        let level = MipLevel {
            width: 1,
            height: 1,
            pixels: FALLBACK_TEXEL.to_vec(),
        };
        let texture = Self::upload(device, queue, PixelFormat::Rgba8, &[level], label);
        Self::finish(device, texture, (1, 1), false)
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: PixelFormat,
        levels: &[MipLevel],
        label: &str,
    ) -> wgpu::Texture {
        let (width, height) = levels.first().map_or((1, 1), |l| (l.width, l.height));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len().max(1) as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let bytes_per_texel = format.bytes_per_texel();
        for (mip_level, level) in levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_texel * level.width),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }
        texture
    }

    fn finish(
        device: &wgpu::Device,
        texture: wgpu::Texture,
        size: (u32, u32),
        loaded: bool,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Layer Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
            size,
            loaded,
        }
    }

    pub fn destroy(self) {
        self.texture.destroy();
    }
}
