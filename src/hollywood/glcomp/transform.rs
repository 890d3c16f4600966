// Quad placement math
//
// Every draw is the unit quad (0,0)-(1,1) with y pointing down. The
// target matrix places it in clip space, the source matrix picks the
// part of the texture it samples.
//
// Austin Shafer - 2020
use super::Origin;
use cgmath::{Matrix3, Matrix4, Vector3};
use utils::region::Rect;

/// Map the unit quad onto `rect` inside `viewport`
///
/// Both rects are in pixels with the origin at the top left.
pub fn target_transform(rect: &Rect<f32>, viewport: &Rect<f32>) -> Matrix4<f32> {
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        return Matrix4::from_scale(0.0);
    }

    let sx = 2.0 * rect.width() / viewport.width();
    let sy = 2.0 * rect.height() / viewport.height();
    let x0 = -1.0 + 2.0 * (rect.left() - viewport.left()) / viewport.width();
    let y0 = 1.0 - 2.0 * (rect.top() - viewport.top()) / viewport.height();

    Matrix4::from_translation(Vector3::new(x0, y0, 0.0))
        * Matrix4::from_nonuniform_scale(sx, -sy, 1.0)
}

/// Map the unit quad onto the `native` part of a texture
///
/// `native` is in the texture's own pixel space: rows counted from the
/// top for TopLeft textures and from the bottom for BottomLeft ones.
/// The result yields normalized texture coordinates.
pub fn source_transform(native: &Rect<f32>, tex_size: (f32, f32), origin: Origin) -> Matrix3<f32> {
    let (tw, th) = tex_size;
    if tw <= 0.0 || th <= 0.0 {
        return Matrix3::from_scale(0.0);
    }

    let su = native.width() / tw;
    let (sv, tv) = match origin {
        Origin::TopLeft => (native.height() / th, native.top() / th),
        // quad row 0 is the top of the region, which is the highest row
        Origin::BottomLeft => (-native.height() / th, (native.top() + native.height()) / th),
    };

    // cgmath takes columns
    Matrix3::new(su, 0.0, 0.0, 0.0, sv, 0.0, native.left() / tw, tv, 1.0)
}

/// Convert a top-left based viewport into a BottomLeft texture's space
///
/// A viewport shorter than the buffer sits at the bottom of the
/// texture's rows.
pub fn flip_viewport(src: &Rect<f32>, buffer_height: f32) -> Rect<f32> {
    if src.height() == buffer_height {
        return *src;
    }

    Rect::new(
        src.left(),
        buffer_height - src.height() - src.top(),
        src.width(),
        src.height(),
    )
}
