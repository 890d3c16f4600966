// Drop shadows
//
// The shadow is drawn into the surface's intermediate framebuffer
// before the decorations. Afterwards the area the window covers is
// cleared again so translucent clients don't show their own shadow.
//
// Austin Shafer - 2020
use super::backend::{Color, Uniform};
use super::transform::target_transform;
use super::RenderContext;
use crate::hollywood::atmosphere::surface::SHADOW_THRESHOLD;
use crate::hollywood::atmosphere::{DecorationMetrics, Surface, SurfaceType};
use cgmath::{Matrix3, SquareMatrix};
use utils::region::Rect;
use utils::Result;

/// Direction the light comes from
pub const LIGHT_ANGLE: f32 = 95.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShadowParams {
    /// Height of the window above the desktop
    pub sp_z: f32,
    pub sp_radius: f32,
    pub sp_corner: f32,
    pub sp_sigma: f32,
}

impl ShadowParams {
    pub fn from_light_angle(angle: f32) -> Self {
        let z = 1.0 + (4.0 * angle).sin();
        let r = 28.0 + z;

        Self {
            sp_z: z,
            sp_radius: r,
            sp_corner: r * (0.5 + 0.5 * (2.0 * angle).cos()),
            sp_sigma: 10.0 * z,
        }
    }
}

/// Popups get a lighter shadow
pub fn shadow_color(surf: &Surface) -> Color {
    match surf.s_type {
        SurfaceType::Popup => Color::BLACK.with_alpha(0.30),
        _ => Color::BLACK.with_alpha(0.45),
    }
}

pub struct ShadowRenderer {
    sr_params: ShadowParams,
}

impl ShadowRenderer {
    pub fn new() -> Self {
        Self {
            sr_params: ShadowParams::from_light_angle(LIGHT_ANGLE),
        }
    }

    /// Paint the shadow of `surf` into the bound framebuffer
    ///
    /// `fb_size` is the size of the bound framebuffer, which must be
    /// the surface's render size at `scale`. Does nothing for surfaces
    /// without a shadow.
    pub fn paint(
        &self,
        ctx: &mut RenderContext,
        surf: &Surface,
        metrics: &DecorationMetrics,
        scale: f32,
        fb_size: (f32, f32),
    ) -> Result<()> {
        let shadow = surf.shadow_size();
        if shadow <= SHADOW_THRESHOLD || surf.is_special() {
            return Ok(());
        }

        let sm = shadow * scale;
        let hsm = sm / 2.0;
        let fb_rect = Rect::new(0.0, 0.0, fb_size.0, fb_size.1);
        let quad = Rect::new(hsm, hsm, fb_size.0 - sm, fb_size.1 - sm);
        // the window itself, relative to the quad
        let casting = [hsm, hsm, fb_size.0 - 2.0 * sm, fb_size.1 - 2.0 * sm];

        let prog = ctx.shadow_program()?;
        let uniforms = [
            ("u_target", Uniform::Mat4(target_transform(&quad, &fb_rect))),
            ("u_source", Uniform::Mat3(Matrix3::identity())),
            ("u_size", Uniform::Vec2([quad.width(), quad.height()])),
            ("u_box", Uniform::Vec4(casting)),
            ("u_corner", Uniform::Float(self.sr_params.sp_corner * scale)),
            ("u_sigma", Uniform::Float(self.sr_params.sp_sigma * scale)),
            ("u_color", Uniform::Vec4(shadow_color(surf).as_array())),
        ];
        ctx.backend().draw_quad(prog, &uniforms, None)?;

        let decorated = surf.server_decorated();
        let border = match decorated {
            true => metrics.dm_border * scale,
            false => 0.0,
        };
        let mut height = surf.s_size.1 * scale;
        if decorated {
            height += metrics.dm_decoration * scale;
        }

        ctx.backend().scissor_clear(
            Rect::new(
                (sm + border) as i32,
                (sm + border) as i32,
                (surf.s_size.0 * scale) as i32,
                height as i32,
            ),
            Color::TRANSPARENT,
        );
        Ok(())
    }
}
