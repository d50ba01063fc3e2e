/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use spin3d_core::projection::ScreenPoint;
use spin3d_core::render::clip_segment;
use spin3d_core::{Color as SceneColor, DrawLine, DrawList, DrawTriangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Lines sit slightly in front of the faces they outline
const LINE_DEPTH_BIAS: f32 = 1e-4;

/// ASCII renderer that turns a scene draw list into terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Option<SceneColor>>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![None; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(None);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Rasterize a draw list on top of the current buffers
    pub fn render(&mut self, list: &DrawList) {
        for triangle in &list.triangles {
            self.rasterize_triangle(triangle);
        }
        for line in &list.lines {
            self.rasterize_line(line);
        }
    }

    fn rasterize_triangle(&mut self, triangle: &DrawTriangle) {
        let [v0, v1, v2] = triangle.points;
        let character = shade_char(triangle.color);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    self.plot(x, y, depth, character, triangle.color);
                }
            }
        }
    }

    /// DDA walk over the on-screen part of the segment, one sample per
    /// cell. Returns the number of samples taken.
    fn rasterize_line(&mut self, line: &DrawLine) -> usize {
        let character = line_char(line.to.0 - line.from.0, line.to.1 - line.from.1);
        let Some((from, to)) =
            clip_segment(line.from, line.to, self.width as f32, self.height as f32)
        else {
            return 0;
        };
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let p: ScreenPoint = (
                from.0 + dx * t,
                from.1 + dy * t,
                from.2 + (to.2 - from.2) * t,
            );
            self.plot(
                p.0.floor() as i32,
                p.1.floor() as i32,
                p.2 - LINE_DEPTH_BIAS,
                character,
                line.color,
            );
        }
        steps + 1
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: SceneColor) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = Some(color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                let c = self.char_buffer[idx];

                let color = match self.color_buffer[idx] {
                    Some(color) => {
                        let [r, g, b] = color.to_bytes();
                        Color::Rgb { r, g, b }
                    }
                    None => Color::DarkGrey,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Brightness of a lit color mapped onto the ramp; lit surfaces never
/// render as blank.
fn shade_char(color: SceneColor) -> char {
    let top = LUMINOSITY_RAMP.len() - 1;
    let index = (color.luminance() * top as f32).round() as usize;
    LUMINOSITY_RAMP[index.clamp(1, top)]
}

fn line_char(dx: f32, dy: f32) -> char {
    if dx.abs() > dy.abs() * 2.0 {
        '-'
    } else if dy.abs() > dx.abs() * 2.0 {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        // Screen y grows downward
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(z: f32, color: SceneColor) -> DrawTriangle {
        DrawTriangle {
            points: [(0.0, 0.0, z), (10.0, 0.0, z), (0.0, 10.0, z)],
            color,
        }
    }

    #[test]
    fn test_nearer_triangle_wins() {
        let mut renderer = AsciiRenderer::new(12, 12);
        let list = DrawList {
            width: 12,
            height: 12,
            triangles: vec![
                triangle(0.2, SceneColor::rgb(0.1, 0.1, 0.1)),
                triangle(0.5, SceneColor::WHITE),
            ],
            lines: Vec::new(),
        };
        renderer.render(&list);
        // The far white triangle was drawn second but loses the depth test
        assert_eq!(renderer.char_at(1, 1), Some('.'));
        assert_eq!(renderer.char_at(11, 11), Some(' '));
    }

    #[test]
    fn test_lines_clip_and_pick_glyphs() {
        let mut renderer = AsciiRenderer::new(8, 4);
        let list = DrawList {
            width: 8,
            height: 4,
            triangles: Vec::new(),
            lines: vec![
                DrawLine {
                    from: (-5.0, 1.5, 0.0),
                    to: (20.0, 1.5, 0.0),
                    color: SceneColor::WHITE,
                },
                DrawLine {
                    from: (6.5, 0.0, -0.5),
                    to: (6.5, 3.9, -0.5),
                    color: SceneColor::WHITE,
                },
            ],
        };
        renderer.render(&list);
        assert_eq!(renderer.char_at(0, 1), Some('-'));
        assert_eq!(renderer.char_at(6, 0), Some('|'));
        // The vertical line is nearer, so it wins the shared cell
        assert_eq!(renderer.char_at(6, 1), Some('|'));
    }

    #[test]
    fn test_long_lines_walk_only_visible_cells() {
        let mut renderer = AsciiRenderer::new(8, 4);
        let line = DrawLine {
            from: (-1.0e7, 2.5, 0.0),
            to: (1.0e7, 2.5, 0.0),
            color: SceneColor::WHITE,
        };
        let samples = renderer.rasterize_line(&line);
        assert!(samples <= 8 + 4 + 1, "{samples} samples");
        assert_eq!(renderer.char_at(3, 2), Some('-'));

        let off_screen = DrawLine {
            from: (-1.0e7, -3.0, 0.0),
            to: (-10.0, 9.0, 0.0),
            color: SceneColor::WHITE,
        };
        assert_eq!(renderer.rasterize_line(&off_screen), 0);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.render(&DrawList {
            width: 4,
            height: 4,
            triangles: vec![triangle(0.0, SceneColor::WHITE)],
            lines: Vec::new(),
        });
        assert_eq!(renderer.char_at(0, 0), Some('@'));
        renderer.clear();
        assert_eq!(renderer.char_at(0, 0), Some(' '));

        renderer.resize(2, 3);
        assert_eq!((renderer.width(), renderer.height()), (2, 3));
        assert_eq!(renderer.char_at(2, 0), None);
    }

    #[test]
    fn test_draw_emits_every_cell() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 1);
    }
}
