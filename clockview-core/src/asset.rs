/// GLTF / GLB import into the scene graph
use std::path::Path;

use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};

use crate::clock::ClockModel;
use crate::error::AssetError;
use crate::geometry::{Mesh, Triangle, Vertex};
use crate::scene::{NodeId, Scene, SceneNode};
use crate::transform::RotationState;

/// Read and decode a clock asset from disk
pub fn load_clock_file(path: impl AsRef<Path>) -> Result<ClockModel, AssetError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("read {} bytes from {}", data.len(), path.display());
    load_clock(&data)
}

/// Decode a clock asset (binary GLB, or GLTF JSON with embedded buffers)
pub fn load_clock(data: &[u8]) -> Result<ClockModel, AssetError> {
    ClockModel::from_scene(import_scene(data)?)
}

/// Import the default scene, or the first one when none is marked default
pub fn import_scene(data: &[u8]) -> Result<Scene, AssetError> {
    let (document, buffers, _images) = gltf::import_slice(data)?;
    let source = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(AssetError::NoScene)?;

    let mut scene = Scene::new();
    for node in source.nodes() {
        import_node(&mut scene, None, &node, &buffers);
    }

    log::debug!("imported {} nodes", scene.len());
    Ok(scene)
}

fn import_node(
    scene: &mut Scene,
    parent: Option<NodeId>,
    node: &gltf::Node<'_>,
    buffers: &[gltf::buffer::Data],
) {
    let (translation, rotation, scale) = node.transform().decomposed();

    let mut scene_node = SceneNode::new(node.name().map(str::to_owned));
    scene_node.translation = Vector3::from(translation);
    // GLTF stores quaternions as [x, y, z, w]
    let [x, y, z, w] = rotation.map(f64::from);
    scene_node.rotation =
        RotationState::from_quaternion(&UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)));
    scene_node.scale = Vector3::from(scale);
    scene_node.mesh = node
        .mesh()
        .map(|mesh| read_mesh(&mesh, buffers))
        .filter(|mesh| !mesh.is_empty());

    let id = match parent {
        Some(parent) => scene.add_child(parent, scene_node),
        None => scene.add_root(scene_node),
    };

    for child in node.children() {
        import_node(scene, Some(id), &child, buffers);
    }
}

fn read_mesh(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data]) -> Mesh {
    let mut out = Mesh::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|normals| normals.collect());
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        for corners in indices.chunks_exact(3) {
            if let Some(triangle) = build_triangle(corners, &positions, normals.as_deref()) {
                out.add_triangle(triangle);
            }
        }
    }

    out
}

fn build_triangle(
    corners: &[u32],
    positions: &[[f32; 3]],
    normals: Option<&[[f32; 3]]>,
) -> Option<Triangle> {
    let mut vertices = [Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0); 3];
    for (vertex, &index) in vertices.iter_mut().zip(corners) {
        let index = index as usize;
        vertex.position = Point3::from(*positions.get(index)?);
        if let Some(normal) = normals.and_then(|n| n.get(index)) {
            vertex.normal = Vector3::from(*normal);
        }
    }

    let mut triangle = Triangle::new(vertices[0], vertices[1], vertices[2]);
    if normals.is_none() {
        let flat = triangle.calculate_normal();
        for vertex in &mut triangle.vertices {
            vertex.normal = flat;
        }
    }
    Some(triangle)
}
