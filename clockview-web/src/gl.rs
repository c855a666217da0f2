/// WebGL2 renderer for the clock scene
use std::collections::HashMap;

use clockview_core::scene::NodeId;
use clockview_core::{Lighting, Mesh, Transform, ViewerState};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};

/// Floats per vertex: position then normal
const VERTEX_FLOATS: usize = 6;

/// Surface color of every mesh
const BASE_COLOR: [f32; 3] = [0.9, 0.9, 0.9];

struct Uniforms {
    model: Option<WebGlUniformLocation>,
    normal_matrix: Option<WebGlUniformLocation>,
    view_projection: Option<WebGlUniformLocation>,
    light_position: Option<WebGlUniformLocation>,
    light_color: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    base_color: Option<WebGlUniformLocation>,
}

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    _buffer: WebGlBuffer,
    vertex_count: i32,
}

pub struct GlRenderer {
    gl: Gl,
    program: WebGlProgram,
    uniforms: Uniforms,
    meshes: HashMap<NodeId, GpuMesh>,
}

impl GlRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or_else(|| JsValue::from_str("WebGL2 is not available"))?
            .dyn_into::<Gl>()?;

        let vertex = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fragment = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vertex, &fragment)?;

        let uniforms = Uniforms {
            model: gl.get_uniform_location(&program, "u_model"),
            normal_matrix: gl.get_uniform_location(&program, "u_normal_matrix"),
            view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            light_position: gl.get_uniform_location(&program, "u_light_position"),
            light_color: gl.get_uniform_location(&program, "u_light_color"),
            ambient: gl.get_uniform_location(&program, "u_ambient"),
            base_color: gl.get_uniform_location(&program, "u_base_color"),
        };

        gl.enable(Gl::DEPTH_TEST);

        Ok(Self {
            gl,
            program,
            uniforms,
            meshes: HashMap::new(),
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Clear to the background color and draw the model, if loaded
    pub fn render(&mut self, viewer: &ViewerState) -> Result<(), JsValue> {
        let [r, g, b] = viewer.background().to_unit_rgb();
        self.gl.clear_color(r, g, b, 1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);

        let Some(model) = viewer.model() else {
            return Ok(());
        };

        self.gl.use_program(Some(&self.program));
        self.set_frame_uniforms(viewer);

        for item in model.scene().draw_items() {
            if !self.meshes.contains_key(&item.node) {
                let uploaded = self.upload(item.mesh)?;
                self.meshes.insert(item.node, uploaded);
            }
            let Some(mesh) = self.meshes.get(&item.node) else {
                continue;
            };

            self.gl.uniform_matrix4fv_with_f32_array(
                self.uniforms.model.as_ref(),
                false,
                item.world.as_slice(),
            );
            self.gl.uniform_matrix3fv_with_f32_array(
                self.uniforms.normal_matrix.as_ref(),
                false,
                Transform::normal_matrix(&item.world).as_slice(),
            );
            self.gl.bind_vertex_array(Some(&mesh.vao));
            self.gl.draw_arrays(Gl::TRIANGLES, 0, mesh.vertex_count);
        }

        self.gl.bind_vertex_array(None);
        Ok(())
    }

    fn set_frame_uniforms(&self, viewer: &ViewerState) {
        let view_projection = viewer.camera.view_projection();
        self.gl.uniform_matrix4fv_with_f32_array(
            self.uniforms.view_projection.as_ref(),
            false,
            view_projection.as_slice(),
        );

        let [light, ambient] = light_terms(&viewer.lighting);
        let position = viewer.lighting.point.position;
        self.gl.uniform3f(
            self.uniforms.light_position.as_ref(),
            position.x,
            position.y,
            position.z,
        );
        self.gl
            .uniform3fv_with_f32_array(self.uniforms.light_color.as_ref(), &light);
        self.gl
            .uniform3fv_with_f32_array(self.uniforms.ambient.as_ref(), &ambient);
        self.gl
            .uniform3fv_with_f32_array(self.uniforms.base_color.as_ref(), &BASE_COLOR);
    }

    fn upload(&self, mesh: &Mesh) -> Result<GpuMesh, JsValue> {
        let gl = &self.gl;
        let data = interleave(mesh);

        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| JsValue::from_str("failed to create vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| JsValue::from_str("failed to create buffer"))?;
        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
        let array = js_sys::Float32Array::from(data.as_slice());
        gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);

        let stride = (VERTEX_FLOATS * std::mem::size_of::<f32>()) as i32;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, Gl::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 3, Gl::FLOAT, false, stride, 12);

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            _buffer: buffer,
            vertex_count: (data.len() / VERTEX_FLOATS) as i32,
        })
    }
}

/// Point light and ambient radiance as shader uniforms
fn light_terms(lighting: &Lighting) -> [[f32; 3]; 2] {
    let point = lighting.point.color.map(|c| c * lighting.point.intensity);
    let ambient = lighting
        .ambient
        .color
        .map(|c| c * lighting.ambient.intensity * std::f32::consts::FRAC_1_PI);
    [point, ambient]
}

/// Flatten triangles into `[px, py, pz, nx, ny, nz]` per vertex
fn interleave(mesh: &Mesh) -> Vec<f32> {
    let mut data = Vec::with_capacity(mesh.triangles.len() * 3 * VERTEX_FLOATS);
    for triangle in &mesh.triangles {
        for vertex in &triangle.vertices {
            data.extend_from_slice(vertex.position.coords.as_slice());
            data.extend_from_slice(vertex.normal.as_slice());
        }
    }
    data
}

fn compile_shader(gl: &Gl, kind: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| JsValue::from_str("failed to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        Ok(shader)
    } else {
        let info = gl.get_shader_info_log(&shader).unwrap_or_default();
        Err(JsValue::from_str(&format!("shader compile failed: {info}")))
    }
}

fn link_program(gl: &Gl, vertex: &WebGlShader, fragment: &WebGlShader) -> Result<WebGlProgram, JsValue> {
    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("failed to create program"))?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if linked {
        Ok(program)
    } else {
        let info = gl.get_program_info_log(&program).unwrap_or_default();
        Err(JsValue::from_str(&format!("program link failed: {info}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave_layout() {
        let mesh = Mesh::cuboid(1.0, 1.0, 1.0);
        let data = interleave(&mesh);
        assert_eq!(data.len(), 12 * 3 * VERTEX_FLOATS);

        let first = &mesh.triangles[0].vertices[0];
        assert_eq!(data[0], first.position.x);
        assert_eq!(data[2], first.position.z);
        assert_eq!(data[3], first.normal.x);
        assert_eq!(data[5], first.normal.z);
    }

    #[test]
    fn test_light_terms_match_default_lighting() {
        let [point, ambient] = light_terms(&Lighting::default());
        assert_eq!(point, [200.0; 3]);
        for channel in ambient {
            assert!((channel - 2.0 / std::f32::consts::PI).abs() < 1e-6);
        }
    }
}
