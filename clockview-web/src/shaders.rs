//! GLSL ES 3.00 sources for the WebGL2 renderer.
//!
//! Lighting matches `Lighting::shade` in the core crate: inverse-square point
//! light plus ambient divided by π, then Reinhard tone mapping.

pub const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_model;
uniform mat3 u_normal_matrix;
uniform mat4 u_view_projection;

out vec3 v_world;
out vec3 v_normal;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = u_normal_matrix * a_normal;
    gl_Position = u_view_projection * world;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_world;
in vec3 v_normal;

uniform vec3 u_light_position;
uniform vec3 u_light_color;
uniform vec3 u_ambient;
uniform vec3 u_base_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) {
        n = -n;
    }

    vec3 to_light = u_light_position - v_world;
    float distance_sq = max(dot(to_light, to_light), 1e-4);
    float diffuse = max(dot(n, normalize(to_light)), 0.0) / distance_sq;

    vec3 irradiance = u_light_color * diffuse + u_ambient;
    frag_color = vec4(u_base_color * irradiance / (1.0 + irradiance), 1.0);
}
"#;
