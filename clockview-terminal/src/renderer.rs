/// ASCII rasterizer for terminal rendering
use clockview_core::scene::DrawItem;
use clockview_core::{Camera, Color as RgbColor, Lighting, Scene, Transform, Triangle};
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Point3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    /// Tone-mapped brightness in [0, 1]
    level: f32,
}

const EMPTY: Cell = Cell {
    character: ' ',
    level: 0.0,
};

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    background: RgbColor,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            background: RgbColor::BLACK,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            background: self.background,
            ..Self::new(width, height)
        };
    }

    /// Clear to the given background color
    pub fn clear(&mut self, background: RgbColor) {
        self.background = background;
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    pub fn render_scene(&mut self, scene: &Scene, camera: &Camera, lighting: &Lighting) {
        for item in scene.draw_items() {
            self.render_item(&item, camera, lighting);
        }
    }

    fn render_item(&mut self, item: &DrawItem<'_>, camera: &Camera, lighting: &Lighting) {
        let normal_matrix = Transform::normal_matrix(&item.world);
        for triangle in &item.mesh.triangles {
            self.render_triangle(triangle, item, &normal_matrix, camera, lighting);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        item: &DrawItem<'_>,
        normal_matrix: &Matrix3<f32>,
        camera: &Camera,
        lighting: &Lighting,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coords, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                &item.world,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *coords = projected,
                None => return, // Behind the near plane
            }
        }

        // Shade at the centroid with the face normal, lit from whichever side
        // faces the camera
        let world: Vec<Point3<f32>> = triangle
            .vertices
            .iter()
            .map(|v| item.world.transform_point(&v.position))
            .collect();
        let centroid = Point3::from((world[0].coords + world[1].coords + world[2].coords) / 3.0);
        let Some(mut normal) = (normal_matrix * triangle.calculate_normal()).try_normalize(1e-6)
        else {
            return;
        };
        if normal.dot(&(camera.position - centroid)) < 0.0 {
            normal = -normal;
        }

        let irradiance = lighting.shade(&centroid, &normal);
        let level = irradiance / (1.0 + irradiance);

        let char_index = (level * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)],
            level,
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.cells.get(y * self.width + x).map(|cell| cell.character)
    }

    /// Number of cells covered by geometry
    pub fn covered(&self) -> usize {
        self.cells.iter().filter(|cell| cell.character != ' ').count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let background = Color::Rgb {
            r: self.background.r,
            g: self.background.g,
            b: self.background.b,
        };
        writer.queue(SetBackgroundColor(background))?;

        let mut last_color = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                let gray = (cell.level * 255.0).round() as u8;
                let color = Color::Rgb {
                    r: gray,
                    g: gray,
                    b: gray,
                };
                if last_color != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    last_color = Some(color);
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
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
    use clockview_core::{Mesh, SceneNode};

    fn cube_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_root(SceneNode::new(Some("cube".into())).with_mesh(Mesh::cuboid(5.0, 5.0, 5.0)));
        scene
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_scene(&cube_scene(), &Camera::new(40, 40), &Lighting::default());
        assert!(renderer.covered() > 0);

        renderer.clear(RgbColor::new(1, 2, 3));
        assert_eq!(renderer.covered(), 0);
        assert_eq!(renderer.char_at(0, 0), Some(' '));
    }

    #[test]
    fn test_cube_covers_screen_center() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_scene(&cube_scene(), &Camera::new(40, 40), &Lighting::default());

        let center = renderer.char_at(20, 10).unwrap();
        assert_ne!(center, ' ');
        assert_eq!(renderer.char_at(0, 0), Some(' '));
    }

    #[test]
    fn test_face_larger_than_screen_is_clipped_not_dropped() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let mut camera = Camera::new(40, 40);
        // Front face is 3 units away and spans far past every screen edge
        camera.position = Point3::new(0.0, 0.0, 8.0);
        renderer.render_scene(&cube_scene(), &camera, &Lighting::default());

        assert_ne!(renderer.char_at(0, 0), Some(' '));
        assert_ne!(renderer.char_at(39, 19), Some(' '));
        assert_ne!(renderer.char_at(20, 10), Some(' '));
        assert!(renderer.covered() > 40 * 20 * 9 / 10);
    }

    #[test]
    fn test_draw_emits_every_cell() {
        let mut renderer = AsciiRenderer::new(8, 3);
        renderer.clear(RgbColor::new(0xFF, 0x00, 0xAA));

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
        // Truecolor background escape for #FF00AA
        assert!(text.contains("48;2;255;0;170"));
    }

    #[test]
    fn test_resize_keeps_background() {
        let mut renderer = AsciiRenderer::new(8, 3);
        renderer.clear(RgbColor::new(9, 9, 9));
        renderer.resize(10, 4);
        assert_eq!((renderer.width(), renderer.height()), (10, 4));
        assert_eq!(renderer.background, RgbColor::new(9, 9, 9));
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }
}
