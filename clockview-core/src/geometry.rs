/// Geometry primitives for 3D rendering
use nalgebra::{Matrix4, Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Degenerate triangles yield a zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned box around the mesh after applying `matrix`
    pub fn bounds(&self, matrix: &Matrix4<f32>) -> Bounds {
        let mut bounds = Bounds::empty();
        for triangle in &self.triangles {
            for vertex in &triangle.vertices {
                bounds.expand(&matrix.transform_point(&vertex.position));
            }
        }
        bounds
    }

    /// Axis-aligned box mesh centred on the origin
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        let mut mesh = Self::with_capacity(12);
        let half = Vector3::new(hx, hy, hz);

        for axis in 0..3 {
            for sign in [1.0f32, -1.0] {
                let mut normal = Vector3::zeros();
                normal[axis] = sign;
                // Two tangent axes, ordered so the winding faces outward
                let (u, v) = if sign > 0.0 {
                    ((axis + 1) % 3, (axis + 2) % 3)
                } else {
                    ((axis + 2) % 3, (axis + 1) % 3)
                };

                let corner = |su: f32, sv: f32| {
                    let mut p = Vector3::zeros();
                    p[axis] = sign * half[axis];
                    p[u] = su * half[u];
                    p[v] = sv * half[v];
                    Vertex::new(p.x, p.y, p.z, normal.x, normal.y, normal.z)
                };

                let (a, b, c, d) = (
                    corner(-1.0, -1.0),
                    corner(1.0, -1.0),
                    corner(1.0, 1.0),
                    corner(-1.0, 1.0),
                );
                mesh.add_triangle(Triangle::new(a, b, c));
                mesh.add_triangle(Triangle::new(a, c, d));
            }
        }

        mesh
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    /// A box that contains nothing; expanding it by a point yields that point
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Center of the box, or the origin for an empty box
    pub fn center(&self) -> Point3<f32> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_normals_point_outward() {
        let mesh = Mesh::cuboid(1.0, 2.0, 3.0);
        assert_eq!(mesh.triangles.len(), 12);

        for triangle in &mesh.triangles {
            let face = triangle.calculate_normal();
            let declared = triangle.vertices[0].normal;
            assert!((face - declared).norm() < 1e-5, "{face:?} vs {declared:?}");
        }
    }

    #[test]
    fn test_bounds_follow_matrix() {
        let mesh = Mesh::cuboid(1.0, 1.0, 1.0);
        let shifted = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        let bounds = mesh.bounds(&shifted);

        assert!((bounds.center() - Point3::new(10.0, 0.0, 0.0)).norm() < 1e-6);
        assert!((bounds.size() - Vector3::new(2.0, 2.0, 2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_empty_bounds() {
        let bounds = Bounds::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.center(), Point3::origin());
        assert_eq!(bounds.size(), Vector3::zeros());
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let v = Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let triangle = Triangle::new(v, v, v);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }
}
