//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Texture side length is `1 << TEX_LOG_DIM`
pub const TEX_LOG_DIM: u32 = 7;

/// Side length of every texture (square, power of two)
pub const TEX_DIM: usize = 1 << TEX_LOG_DIM;

/// Fractional bits of interpolated texture coordinates
pub const TEX_PRECISION: u32 = 12;

/// Largest stream stride: X Y Z U V
pub const VDIM: usize = 5;

/// A pipeline vertex: position followed by trailing attributes.
/// How many entries are live depends on the stream kind.
pub type Vert = [i32; VDIM];

/// RGB color (0-255 per channel), packed as 0x00RRGGBB in buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to the packed 0x00RRGGBB buffer format
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Convert to [u8; 4] RGBA (opaque) for presenting
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Error type for texture construction and loading
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("texture must be 128x128, got {width}x{height}")]
    Size { width: usize, height: usize },
    #[error("texture needs {expected} texels, got {len}")]
    PixelCount { len: usize, expected: usize },
}

/// Square texture of `TEX_DIM` x `TEX_DIM` packed 0x00RRGGBB texels.
/// No mipmaps, no alpha.
#[derive(Debug, Clone)]
pub struct Texture {
    pixels: Vec<u32>,
    pub name: String,
}

impl Texture {
    /// Wrap an existing texel array (row-major, `TEX_DIM * TEX_DIM` entries)
    pub fn from_pixels(pixels: Vec<u32>, name: impl Into<String>) -> Result<Self, TextureError> {
        if pixels.len() != TEX_DIM * TEX_DIM {
            return Err(TextureError::PixelCount {
                len: pixels.len(),
                expected: TEX_DIM * TEX_DIM,
            });
        }
        Ok(Self { pixels, name: name.into() })
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_image(img, name)
    }

    /// Load texture from raw encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width as usize != TEX_DIM || height as usize != TEX_DIM {
            return Err(TextureError::Size {
                width: width as usize,
                height: height as usize,
            });
        }

        let pixels = rgb
            .pixels()
            .map(|p| Color::new(p[0], p[1], p[2]).to_packed())
            .collect();

        Ok(Self { pixels, name })
    }

    /// Checkerboard with a solid border and a thick diagonal stripe
    pub fn checkerboard(light: Color, dark: Color, stripe: Color) -> Self {
        const CELL: usize = 0x10;
        let mut pixels = Vec::with_capacity(TEX_DIM * TEX_DIM);
        for y in 0..TEX_DIM {
            for x in 0..TEX_DIM {
                let border = x < CELL || y < CELL || x >= TEX_DIM - CELL || y >= TEX_DIM - CELL;
                let color = if x.abs_diff(y) < 3 {
                    stripe
                } else if border || ((x ^ y) & CELL) != 0 {
                    dark
                } else {
                    light
                };
                pixels.push(color.to_packed());
            }
        }
        Self { pixels, name: "checkerboard".to_string() }
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Get texel at x,y coordinates (wrapping)
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        Color::from_packed(self.pixels[(y % TEX_DIM) * TEX_DIM + (x % TEX_DIM)])
    }
}

/// Layout of a vertex stream flowing through clip, project and scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// X Y Z
    Flat,
    /// X Y Z U V
    Textured,
}

impl StreamKind {
    /// Number of live entries per vertex
    pub const fn dim(self) -> usize {
        match self {
            StreamKind::Flat => 3,
            StreamKind::Textured => 5,
        }
    }
}

/// How polygons are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterMode {
    /// Solid polygon color, depth shaded
    Flat,
    /// Affine texture mapping, depth shaded; untextured polygons fall back to flat
    Textured,
}

/// Which polygon orientations are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CullMode {
    /// Draw both orientations
    None,
    /// Discard front faces (draw back faces only)
    Front,
    /// Discard back faces (draw front faces only)
    Back,
}

impl CullMode {
    /// Whether a polygon with the given orientation is discarded
    pub fn culls(self, back_face: bool) -> bool {
        match self {
            CullMode::None => false,
            CullMode::Front => !back_face,
            CullMode::Back => back_face,
        }
    }

    /// Next mode in the Back -> None -> Front -> Back cycle
    pub fn cycle(self) -> Self {
        match self {
            CullMode::Back => CullMode::None,
            CullMode::None => CullMode::Front,
            CullMode::Front => CullMode::Back,
        }
    }
}

/// Rasterizer settings
#[derive(Debug, Clone)]
pub struct RasterSettings {
    /// Field of view exponent (>= 8, larger is narrower)
    pub fov: u32,
    /// Flat or textured fill
    pub raster_mode: RasterMode,
    /// Back-face culling mode
    pub cull_mode: CullMode,
    /// When set, replaces every polygon's own texture in textured mode
    pub texture_override: Option<usize>,
}

impl RasterSettings {
    pub const MIN_FOV: u32 = 8;
    pub const MAX_FOV: u32 = 18;

    pub fn fov_is_valid(fov: u32) -> bool {
        (Self::MIN_FOV..=Self::MAX_FOV).contains(&fov)
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            fov: 9,
            raster_mode: RasterMode::Textured,
            cull_mode: CullMode::Back,
            texture_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_packing() {
        let c = Color::new(0x12, 0x34, 0x56);
        assert_eq!(c.to_packed(), 0x123456);
        assert_eq!(Color::from_packed(0x00ff8001), Color::new(0xff, 0x80, 0x01));
    }

    #[test]
    fn test_texture_size_is_checked() {
        assert!(matches!(
            Texture::from_pixels(vec![0; 16], "small"),
            Err(TextureError::PixelCount { len: 16, expected: 16384 })
        ));
        let tex = Texture::from_pixels(vec![0x00abcdef; TEX_DIM * TEX_DIM], "flat").unwrap();
        assert_eq!(tex.get_pixel(3, 200), Color::from_packed(0xabcdef));
    }

    #[test]
    fn test_checkerboard_has_border_and_stripe() {
        let tex = Texture::checkerboard(Color::WHITE, Color::BLACK, Color::RED);
        assert_eq!(tex.pixels().len(), TEX_DIM * TEX_DIM);
        assert_eq!(tex.get_pixel(0, 5), Color::BLACK);
        assert_eq!(tex.get_pixel(40, 40), Color::RED);
        assert_eq!(tex.get_pixel(20, 40), Color::WHITE);
    }

    #[test]
    fn test_cull_modes() {
        assert!(!CullMode::None.culls(true));
        assert!(!CullMode::None.culls(false));
        assert!(CullMode::Back.culls(true));
        assert!(!CullMode::Back.culls(false));
        assert!(CullMode::Front.culls(false));
        assert_eq!(CullMode::Back.cycle().cycle().cycle(), CullMode::Back);
    }
}
