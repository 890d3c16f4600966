// A backend with no display
//
// Hands out ids and draws nothing. Used when no platform window is
// available, so the rest of the compositor runs unchanged.
//
// Austin Shafer - 2020
use super::backend::*;
use utils::region::Rect;
use utils::Result;

use std::collections::HashMap;

pub struct HeadlessBackend {
    hb_next_id: u32,
    /// framebuffer id to its color attachment
    hb_framebuffers: HashMap<u32, TextureId>,
    hb_output_size: (u32, u32),
}

impl HeadlessBackend {
    pub fn new(output_size: (u32, u32)) -> Self {
        Self {
            hb_next_id: 1,
            hb_framebuffers: HashMap::new(),
            hb_output_size: output_size,
        }
    }

    fn next_id(&mut self) -> u32 {
        let ret = self.hb_next_id;
        self.hb_next_id += 1;
        ret
    }
}

impl RenderBackend for HeadlessBackend {
    fn resize(&mut self, size: (u32, u32)) {
        self.hb_output_size = size;
    }

    fn clear(&mut self, _color: Color) {}

    fn viewport(&mut self, _rect: Rect<i32>) {}

    fn scissor_clear(&mut self, _rect: Rect<i32>, _color: Color) {}

    fn create_framebuffer(&mut self, _size: (u32, u32)) -> Result<FramebufferId> {
        let fb = self.next_id();
        let tex = TextureId(self.next_id());
        self.hb_framebuffers.insert(fb, tex);
        Ok(FramebufferId(fb))
    }

    fn bind_framebuffer(&mut self, _fb: Option<FramebufferId>) {}

    fn framebuffer_texture(&self, fb: FramebufferId) -> Option<TextureId> {
        self.hb_framebuffers.get(&fb.0).cloned()
    }

    fn destroy_framebuffer(&mut self, fb: FramebufferId) {
        self.hb_framebuffers.remove(&fb.0);
    }

    fn create_texture(&mut self, _size: (u32, u32), _rgba: &[u8]) -> Result<TextureId> {
        Ok(TextureId(self.next_id()))
    }

    fn destroy_texture(&mut self, _tex: TextureId) {}

    fn compile_program(&mut self, _vertex: &str, _fragment: &str) -> Result<ProgramId> {
        Ok(ProgramId(self.next_id()))
    }

    fn draw_quad(
        &mut self,
        _program: ProgramId,
        _uniforms: &[(&str, Uniform)],
        _texture: Option<TextureId>,
    ) -> Result<()> {
        Ok(())
    }

    fn read_pixels(&mut self, rect: Rect<i32>) -> Result<Vec<u8>> {
        let w = rect.width().max(0).min(self.hb_output_size.0 as i32) as usize;
        let h = rect.height().max(0).min(self.hb_output_size.1 as i32) as usize;
        Ok(vec![0; w * h * 4])
    }
}
