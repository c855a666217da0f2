//! Scene graph: a flat arena of named nodes with parent/child links.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::{Bounds, Mesh};
use crate::transform::{RotationState, Transform};

/// Index of a node inside its [`Scene`]
pub type NodeId = usize;

/// One transform in the scene graph, optionally carrying a mesh
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub translation: Vector3<f32>,
    /// XYZ Euler rotation; starts at the authored orientation
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
    pub mesh: Option<Mesh>,
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            translation: Vector3::zeros(),
            rotation: RotationState::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_translation(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        Transform::local_matrix(&self.translation, &self.rotation, &self.scale)
    }
}

/// A mesh ready to draw, with its accumulated world matrix
pub struct DrawItem<'a> {
    pub node: NodeId,
    pub mesh: &'a Mesh,
    pub world: Matrix4<f32>,
}

/// Node arena plus the list of root nodes
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no parent
    pub fn add_root(&mut self, node: SceneNode) -> NodeId {
        let id = self.push(node);
        self.roots.push(id);
        id
    }

    /// Add a node under `parent`
    ///
    /// # Panics
    /// If `parent` does not belong to this scene.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        let id = self.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    fn push(&mut self, node: SceneNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Insert a new root that adopts every existing root
    pub fn wrap_roots(&mut self, name: Option<String>) -> NodeId {
        let mut group = SceneNode::new(name);
        group.children = std::mem::take(&mut self.roots);
        let id = self.push(group);
        self.roots.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node named `name`, searching depth-first from the roots
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.name.as_deref() == Some(name) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Every mesh in the scene with its world matrix, parents before children
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        let mut items = Vec::new();
        let mut stack: Vec<(NodeId, Matrix4<f32>)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Matrix4::identity()))
            .collect();

        while let Some((id, parent)) = stack.pop() {
            let node = &self.nodes[id];
            let world = parent * node.local_matrix();
            if let Some(mesh) = &node.mesh {
                items.push(DrawItem {
                    node: id,
                    mesh,
                    world,
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }

        items
    }

    /// World-space bounds of all meshes
    pub fn bounds(&self) -> Bounds {
        self.draw_items()
            .iter()
            .map(|item| item.mesh.bounds(&item.world))
            .fold(Bounds::empty(), |acc, b| acc.union(&b))
    }
}

/// A light source that shades every mesh
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Scene lighting: one point light plus ambient fill
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub point: PointLight,
    pub ambient: AmbientLight,
}

impl Lighting {
    /// Lambert irradiance at a world-space surface point. Unbounded; callers
    /// tone-map it.
    ///
    /// Point light falls off with the inverse square of distance.
    pub fn shade(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> f32 {
        let to_light = self.point.position - position;
        let distance_sq = to_light.norm_squared().max(1e-4);
        let diffuse = normal.dot(&to_light.normalize()).max(0.0);
        let direct = self.point.intensity * diffuse / distance_sq;
        let ambient = self.ambient.intensity * std::f32::consts::FRAC_1_PI;

        direct + ambient
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            point: PointLight {
                position: Point3::new(5.0, 5.0, 0.0),
                color: [1.0, 1.0, 1.0],
                intensity: 200.0,
            },
            ambient: AmbientLight {
                color: [1.0, 1.0, 1.0],
                intensity: 2.0,
            },
        }
    }
}
