//! Camera that keeps the vehicle centred on screen

use glam::Vec2;

use crate::Rect;

/// Viewport size in CSS pixels (1 pixel = 1 world unit)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Top-left world offset of the visible area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Viewport,
}

impl Camera {
    /// Centre the viewport on `target`
    pub fn follow(target: Vec2, viewport: Viewport) -> Self {
        Self {
            offset: target - viewport.size() * 0.5,
            viewport,
        }
    }

    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    #[inline]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }

    /// World-space rectangle currently on screen
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.offset, self.viewport.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_centres_target() {
        let cam = Camera::follow(Vec2::new(4000.0, 4000.0), Viewport::new(1280.0, 720.0));
        assert_eq!(cam.offset, Vec2::new(3360.0, 3640.0));
        assert_eq!(cam.world_to_screen(Vec2::new(4000.0, 4000.0)), Vec2::new(640.0, 360.0));
        assert_eq!(cam.screen_to_world(Vec2::ZERO), cam.offset);
    }

    #[test]
    fn test_visible_rect() {
        let cam = Camera::follow(Vec2::new(100.0, 50.0), Viewport::new(400.0, 300.0));
        let rect = cam.visible_rect();
        assert_eq!(rect.min, Vec2::new(-100.0, -100.0));
        assert_eq!(rect.max, Vec2::new(300.0, 200.0));
    }
}
