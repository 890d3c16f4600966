// OpenGL implementation of RenderBackend
//
// Handles are kept in maps keyed by our own ids so nothing outside
// this file sees a glow type.
//
// Austin Shafer - 2020
extern crate glow;

use super::backend::*;
use super::RenderError;
use glow::HasContext;
use utils::region::Rect;
use utils::{log, Result};

use std::collections::HashMap;

/// The unit quad as a triangle strip
const QUAD: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];

struct GlFramebuffer {
    f_fb: glow::Framebuffer,
    f_texture: TextureId,
    f_size: (u32, u32),
}

pub struct GlBackend {
    gb_gl: glow::Context,
    gb_vao: glow::VertexArray,
    gb_vbo: glow::Buffer,
    gb_next_id: u32,
    gb_textures: HashMap<u32, glow::Texture>,
    gb_framebuffers: HashMap<u32, GlFramebuffer>,
    gb_programs: HashMap<u32, glow::Program>,
    gb_output_size: (u32, u32),
    /// Size of whatever is bound, for flipping rects into GL's space
    gb_target_size: (u32, u32),
}

impl GlBackend {
    /// Set up the shared quad geometry
    ///
    /// `gl` must be current on this thread for the lifetime of the
    /// backend.
    pub fn new(gl: glow::Context, output_size: (u32, u32)) -> Result<Self> {
        let bytes: Vec<u8> = QUAD.iter().flat_map(|f| f.to_ne_bytes()).collect();

        let (vao, vbo) = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| RenderError::Shader(e))?;
            let vbo = gl.create_buffer().map_err(|e| RenderError::Shader(e))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 8, 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_vertex_array(None);

            // everything we draw is premultiplied
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
            (vao, vbo)
        };

        log::info!(
            "Using GL backend with output size {}x{}",
            output_size.0,
            output_size.1
        );
        Ok(Self {
            gb_gl: gl,
            gb_vao: vao,
            gb_vbo: vbo,
            gb_next_id: 1,
            gb_textures: HashMap::new(),
            gb_framebuffers: HashMap::new(),
            gb_programs: HashMap::new(),
            gb_output_size: output_size,
            gb_target_size: output_size,
        })
    }

    fn next_id(&mut self) -> u32 {
        let ret = self.gb_next_id;
        self.gb_next_id += 1;
        ret
    }

    /// Turn a top left rect into GL's bottom left window coordinates
    fn to_gl_rect(&self, rect: &Rect<i32>) -> (i32, i32, i32, i32) {
        let height = self.gb_target_size.1 as i32;
        (
            rect.left(),
            height - rect.top() - rect.height(),
            rect.width(),
            rect.height(),
        )
    }

    fn alloc_texture(&mut self, size: (u32, u32), rgba: Option<&[u8]>) -> Result<TextureId> {
        let gl = &self.gb_gl;
        let tex = unsafe {
            let tex = gl.create_texture().map_err(|e| RenderError::Texture(e))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(tex));
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                size.0 as i32,
                size.1 as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                rgba,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
            tex
        };

        let id = self.next_id();
        self.gb_textures.insert(id, tex);
        Ok(TextureId(id))
    }

    fn compile_stage(&self, ty: u32, src: &str) -> Result<glow::Shader> {
        let gl = &self.gb_gl;
        unsafe {
            let shader = gl.create_shader(ty).map_err(|e| RenderError::Shader(e))?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let info = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(RenderError::Shader(info).into());
            }
            Ok(shader)
        }
    }
}

impl RenderBackend for GlBackend {
    fn resize(&mut self, size: (u32, u32)) {
        self.gb_output_size = size;
        self.gb_target_size = size;
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            self.gb_gl.clear_color(color.r, color.g, color.b, color.a);
            self.gb_gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn viewport(&mut self, rect: Rect<i32>) {
        let (x, y, w, h) = self.to_gl_rect(&rect);
        unsafe { self.gb_gl.viewport(x, y, w, h) };
    }

    fn scissor_clear(&mut self, rect: Rect<i32>, color: Color) {
        let (x, y, w, h) = self.to_gl_rect(&rect);
        unsafe {
            self.gb_gl.enable(glow::SCISSOR_TEST);
            self.gb_gl.scissor(x, y, w, h);
            self.gb_gl.clear_color(color.r, color.g, color.b, color.a);
            self.gb_gl.clear(glow::COLOR_BUFFER_BIT);
            self.gb_gl.disable(glow::SCISSOR_TEST);
        }
    }

    fn create_framebuffer(&mut self, size: (u32, u32)) -> Result<FramebufferId> {
        let texture = self.alloc_texture(size, None)?;
        let tex = match self.gb_textures.get(&texture.0) {
            Some(t) => *t,
            None => return Err(RenderError::InvalidHandle("texture").into()),
        };

        let gl = &self.gb_gl;
        let fb = unsafe {
            let fb = match gl.create_framebuffer() {
                Ok(fb) => fb,
                Err(e) => {
                    self.destroy_texture(texture);
                    return Err(RenderError::Framebuffer(size.0, size.1, e).into());
                }
            };
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fb));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(tex),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(fb);
                self.destroy_texture(texture);
                return Err(RenderError::Framebuffer(
                    size.0,
                    size.1,
                    format!("status {:#x}", status),
                )
                .into());
            }
            fb
        };

        let id = self.next_id();
        self.gb_framebuffers.insert(
            id,
            GlFramebuffer {
                f_fb: fb,
                f_texture: texture,
                f_size: size,
            },
        );
        Ok(FramebufferId(id))
    }

    fn bind_framebuffer(&mut self, fb: Option<FramebufferId>) {
        let (handle, size) = match fb.and_then(|f| self.gb_framebuffers.get(&f.0)) {
            Some(f) => (Some(f.f_fb), f.f_size),
            None => (None, self.gb_output_size),
        };

        self.gb_target_size = size;
        unsafe { self.gb_gl.bind_framebuffer(glow::FRAMEBUFFER, handle) };
    }

    fn framebuffer_texture(&self, fb: FramebufferId) -> Option<TextureId> {
        self.gb_framebuffers.get(&fb.0).map(|f| f.f_texture)
    }

    fn destroy_framebuffer(&mut self, fb: FramebufferId) {
        if let Some(f) = self.gb_framebuffers.remove(&fb.0) {
            unsafe { self.gb_gl.delete_framebuffer(f.f_fb) };
            self.destroy_texture(f.f_texture);
        }
    }

    fn create_texture(&mut self, size: (u32, u32), rgba: &[u8]) -> Result<TextureId> {
        let expected = size.0 as usize * size.1 as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::Texture(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                size.0,
                size.1,
                rgba.len()
            ))
            .into());
        }

        self.alloc_texture(size, Some(rgba))
    }

    fn destroy_texture(&mut self, tex: TextureId) {
        if let Some(t) = self.gb_textures.remove(&tex.0) {
            unsafe { self.gb_gl.delete_texture(t) };
        }
    }

    fn compile_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId> {
        let vert = self.compile_stage(glow::VERTEX_SHADER, vertex)?;
        let frag = match self.compile_stage(glow::FRAGMENT_SHADER, fragment) {
            Ok(f) => f,
            Err(e) => {
                unsafe { self.gb_gl.delete_shader(vert) };
                return Err(e);
            }
        };

        let gl = &self.gb_gl;
        let prog = unsafe {
            let prog = gl.create_program().map_err(|e| RenderError::Shader(e))?;
            gl.attach_shader(prog, vert);
            gl.attach_shader(prog, frag);
            gl.link_program(prog);

            gl.detach_shader(prog, vert);
            gl.detach_shader(prog, frag);
            gl.delete_shader(vert);
            gl.delete_shader(frag);

            if !gl.get_program_link_status(prog) {
                let info = gl.get_program_info_log(prog);
                gl.delete_program(prog);
                return Err(RenderError::Shader(info).into());
            }
            prog
        };

        let id = self.next_id();
        self.gb_programs.insert(id, prog);
        Ok(ProgramId(id))
    }

    fn draw_quad(
        &mut self,
        program: ProgramId,
        uniforms: &[(&str, Uniform)],
        texture: Option<TextureId>,
    ) -> Result<()> {
        let prog = *self
            .gb_programs
            .get(&program.0)
            .ok_or(RenderError::InvalidHandle("program"))?;
        let tex = match texture {
            Some(t) => Some(
                *self
                    .gb_textures
                    .get(&t.0)
                    .ok_or(RenderError::InvalidHandle("texture"))?,
            ),
            None => None,
        };

        let gl = &self.gb_gl;
        unsafe {
            gl.use_program(Some(prog));

            for (name, val) in uniforms.iter() {
                let loc = gl.get_uniform_location(prog, name);
                match val {
                    Uniform::Float(f) => gl.uniform_1_f32(loc.as_ref(), *f),
                    Uniform::Vec2(v) => gl.uniform_2_f32(loc.as_ref(), v[0], v[1]),
                    Uniform::Vec4(v) => gl.uniform_4_f32(loc.as_ref(), v[0], v[1], v[2], v[3]),
                    Uniform::Mat3(m) => {
                        let arr: &[f32; 9] = m.as_ref();
                        gl.uniform_matrix_3_f32_slice(loc.as_ref(), false, arr);
                    }
                    Uniform::Mat4(m) => {
                        let arr: &[f32; 16] = m.as_ref();
                        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, arr);
                    }
                }
            }

            if let Some(tex) = tex {
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, Some(tex));
                let loc = gl.get_uniform_location(prog, "u_texture");
                gl.uniform_1_i32(loc.as_ref(), 0);
            }

            gl.bind_vertex_array(Some(self.gb_vao));
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }

        Ok(())
    }

    fn read_pixels(&mut self, rect: Rect<i32>) -> Result<Vec<u8>> {
        let (x, y, w, h) = self.to_gl_rect(&rect);
        let stride = w.max(0) as usize * 4;
        let mut pixels = vec![0u8; stride * h.max(0) as usize];

        unsafe {
            self.gb_gl.read_pixels(
                x,
                y,
                w,
                h,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(&mut pixels),
            );
        }

        // GL hands us the bottom row first
        let mut ret = Vec::with_capacity(pixels.len());
        for row in pixels.chunks(stride.max(1)).rev() {
            ret.extend_from_slice(row);
        }
        Ok(ret)
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        let gl = &self.gb_gl;
        unsafe {
            for (_, f) in self.gb_framebuffers.drain() {
                gl.delete_framebuffer(f.f_fb);
            }
            for (_, t) in self.gb_textures.drain() {
                gl.delete_texture(t);
            }
            for (_, p) in self.gb_programs.drain() {
                gl.delete_program(p);
            }
            gl.delete_buffer(self.gb_vbo);
            gl.delete_vertex_array(self.gb_vao);
        }
    }
}
