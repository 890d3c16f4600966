// GLSL sources for the compositor's programs
//
// All programs share the quad vertex stage. Fragment stages get the
// position inside the quad in pixels as v_pixel, which the SDF
// programs need.
//
// Austin Shafer - 2020

pub const QUAD_VERTEX: &str = r#"#version 330 core
layout(location = 0) in vec2 a_pos;

uniform mat4 u_target;
uniform mat3 u_source;
uniform vec2 u_size;

out vec2 v_uv;
out vec2 v_pixel;

void main() {
    v_uv = (u_source * vec3(a_pos, 1.0)).xy;
    v_pixel = a_pos * u_size;
    gl_Position = u_target * vec4(a_pos, 0.0, 1.0);
}
"#;

pub const BLIT_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
in vec2 v_pixel;

uniform sampler2D u_texture;
uniform float u_alpha;

out vec4 frag_color;

void main() {
    frag_color = texture(u_texture, v_uv) * u_alpha;
}
"#;

/// Rounded title bar panel with a one pixel stroke
pub const PANEL_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
in vec2 v_pixel;

uniform vec2 u_size;
uniform float u_radius;
uniform vec4 u_color;
uniform vec4 u_stroke;
uniform float u_stroke_width;

out vec4 frag_color;

float rounded_box(vec2 p, vec2 half_size, float r) {
    vec2 q = abs(p) - half_size + vec2(r);
    return min(max(q.x, q.y), 0.0) + length(max(q, 0.0)) - r;
}

void main() {
    vec2 half_size = u_size * 0.5;
    float dist = rounded_box(v_pixel - half_size, half_size, u_radius);

    float fill = clamp(0.5 - dist, 0.0, 1.0);
    float edge = clamp(0.5 - abs(dist + u_stroke_width * 0.5) + u_stroke_width * 0.5, 0.0, 1.0);

    vec4 color = mix(u_color, u_stroke, edge * u_stroke.a);
    frag_color = vec4(color.rgb, 1.0) * color.a * fill;
}
"#;

/// Drop shadow of a rounded box
///
/// Uses the closed form blur of a box along x integrated over y,
/// sampled a few times to account for the rounded corners.
pub const SHADOW_FRAGMENT: &str = r#"#version 330 core
in vec2 v_uv;
in vec2 v_pixel;

// x, y, w, h of the casting box inside the quad
uniform vec4 u_box;
uniform float u_corner;
uniform float u_sigma;
uniform vec4 u_color;

out vec4 frag_color;

float gaussian(float x, float sigma) {
    const float pi = 3.141592653589793;
    return exp(-(x * x) / (2.0 * sigma * sigma)) / (sqrt(2.0 * pi) * sigma);
}

vec2 erf(vec2 x) {
    vec2 s = sign(x), a = abs(x);
    x = 1.0 + (0.278393 + (0.230389 + 0.078108 * (a * a)) * a) * a;
    x *= x;
    return s - s / (x * x);
}

float shadow_x(float x, float y, float sigma, float corner, vec2 half_size) {
    float delta = min(half_size.y - corner - abs(y), 0.0);
    float curved = half_size.x - corner + sqrt(max(0.0, corner * corner - delta * delta));
    vec2 integral = 0.5 + 0.5 * erf((x + vec2(-curved, curved)) * (sqrt(0.5) / sigma));
    return integral.y - integral.x;
}

float rounded_box_shadow(vec2 lower, vec2 upper, vec2 point, float sigma, float corner) {
    vec2 center = (lower + upper) * 0.5;
    vec2 half_size = (upper - lower) * 0.5;
    point -= center;

    float low = point.y - half_size.y;
    float high = point.y + half_size.y;
    float start = clamp(-3.0 * sigma, low, high);
    float end = clamp(3.0 * sigma, low, high);

    float step = (end - start) / 4.0;
    float y = start + step * 0.5;
    float value = 0.0;
    for (int i = 0; i < 4; i++) {
        value += shadow_x(point.x, point.y - y, sigma, corner, half_size) * gaussian(y, sigma) * step;
        y += step;
    }

    return value;
}

void main() {
    float alpha = rounded_box_shadow(u_box.xy, u_box.xy + u_box.zw, v_pixel, u_sigma, u_corner);
    frag_color = vec4(u_color.rgb, 1.0) * u_color.a * alpha;
}
"#;
