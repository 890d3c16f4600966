// The drawing primitives the compositor needs
//
// Everything in glcomp draws through this trait. The GL implementation
// talks to the driver, the headless one only hands out ids. Rects are
// always given from the top left of the bound target.
//
// Austin Shafer - 2020
use cgmath::{Matrix3, Matrix4};
use utils::region::Rect;
use utils::{anyhow, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Which corner the first row of a texture belongs to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Origin {
    TopLeft,
    /// GL's own convention, framebuffer textures use this
    BottomLeft,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse "#rrggbb" or "#rrggbbaa"
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(anyhow!("Invalid color \"{}\"", hex));
        }

        let channel = |i: usize| -> Result<f32> {
            let val = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| anyhow!("Invalid color \"{}\"", hex))?;
            Ok(val as f32 / 255.0)
        };

        Ok(Self {
            r: channel(0)?,
            g: channel(1)?,
            b: channel(2)?,
            a: match digits.len() {
                8 => channel(3)?,
                _ => 1.0,
            },
        })
    }

    /// Blend towards white by `factor` (0 to 1)
    pub fn lighter(&self, factor: f32) -> Self {
        let mix = |c: f32| c + (1.0 - c) * factor;
        Self::new(mix(self.r), mix(self.g), mix(self.b), self.a)
    }

    pub fn with_alpha(&self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A shader uniform value
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec2([f32; 2]),
    Vec4([f32; 4]),
    Mat3(Matrix3<f32>),
    Mat4(Matrix4<f32>),
}

pub trait RenderBackend {
    /// The size of the output's back buffer changed
    fn resize(&mut self, size: (u32, u32));

    /// Clear the bound target
    fn clear(&mut self, color: Color);

    /// Set the drawing area of the bound target, in pixels from the top
    /// left
    fn viewport(&mut self, rect: Rect<i32>);

    /// Clear only `rect` of the bound target, in pixels from the top
    /// left
    fn scissor_clear(&mut self, rect: Rect<i32>, color: Color);

    fn create_framebuffer(&mut self, size: (u32, u32)) -> Result<FramebufferId>;

    /// Draw into `fb`, or into the output if None
    fn bind_framebuffer(&mut self, fb: Option<FramebufferId>);

    /// The color attachment of a framebuffer, to blit it somewhere
    fn framebuffer_texture(&self, fb: FramebufferId) -> Option<TextureId>;

    fn destroy_framebuffer(&mut self, fb: FramebufferId);

    /// Upload tightly packed RGBA8 pixels
    fn create_texture(&mut self, size: (u32, u32), rgba: &[u8]) -> Result<TextureId>;

    fn destroy_texture(&mut self, tex: TextureId);

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId>;

    /// Draw the unit quad with `program`
    ///
    /// The vertex stage maps the quad with the `u_target` and
    /// `u_source` uniforms.
    fn draw_quad(
        &mut self,
        program: ProgramId,
        uniforms: &[(&str, Uniform)],
        texture: Option<TextureId>,
    ) -> Result<()>;

    /// Read back RGBA8 pixels of the bound target, top row first
    fn read_pixels(&mut self, rect: Rect<i32>) -> Result<Vec<u8>>;
}
