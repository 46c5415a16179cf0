//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// World-space vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    /// #0f172a
    pub const BACKGROUND: [f32; 4] = rgb(0x0f, 0x17, 0x2a);
    pub const GRID: [f32; 4] = [1.0, 1.0, 1.0, 0.05];
    /// #ef4444
    pub const BOUNDARY: [f32; 4] = rgb(0xef, 0x44, 0x44);
    /// #059669
    pub const TREE: [f32; 4] = rgb(0x05, 0x96, 0x69);
    /// #f97316
    pub const BARRIER: [f32; 4] = rgb(0xf9, 0x73, 0x16);
    /// #64748b
    pub const BLOCK: [f32; 4] = rgb(0x64, 0x74, 0x8b);
    /// #fca5a5
    pub const HUMAN: [f32; 4] = rgb(0xfc, 0xa5, 0xa5);
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.3];

    const fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
    }

    /// Parse `#rrggbb` (or `#rgb`); anything else yields `None`
    pub fn parse_hex(hex: &str) -> Option<[f32; 4]> {
        let digits = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        let (r, g, b) = match digits.len() {
            6 => (
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            ),
            3 => {
                let expand = |i: usize| channel(digits.get(i..i + 1)?).map(|v| v * 17);
                (expand(0)?, expand(1)?, expand(2)?)
            }
            _ => return None,
        };
        Some(rgb(r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::colors::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ffffff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_hex("#000"), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex("#ef4444"), Some(BOUNDARY));
        assert_eq!(parse_hex("ef4444"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(parse_hex("#éé"), None);
    }
}
