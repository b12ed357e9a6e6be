//! GLSL sources for the face mesh and the sphere billboards
//!
//! Attribute locations match the vertex arrays built by
//! [`Triangle`](crate::shape::Triangle) and the sphere pool.

/// Face-mesh vertex shader
pub const SHAPE_VERTEX_SOURCE: &str = r"#version 130

uniform mat4 u_view;
uniform mat4 u_projection;

in vec3 a_position;
in vec3 a_barycentric;
in vec2 a_tex_coord;
in vec3 a_normal;
in vec3 a_wire;

out vec3 v_position;
out vec3 v_barycentric;
out vec2 v_tex_coord;
out vec3 v_normal;
out vec3 v_wire;

void main() {
    gl_Position = u_projection * u_view * vec4(a_position, 1.0);
    v_position = a_position;
    v_barycentric = a_barycentric;
    v_tex_coord = a_tex_coord;
    v_normal = a_normal;
    v_wire = a_wire;
}
";

const SHAPE_FRAGMENT_BODY: &str = r"
uniform vec4 u_spheres[MAX_SPHERES];
uniform float u_faceHighlight;

in vec3 v_position;
in vec3 v_barycentric;
in vec2 v_tex_coord;
in vec3 v_normal;
in vec3 v_wire;

out vec4 frag_color;

// Strongest glow cast onto this fragment by any enabled sphere
float sphere_glow() {
    float glow = 0.0;
    for (int i = 0; i < MAX_SPHERES; i++) {
        float radius = u_spheres[i].w;
        if (radius == 0.0) continue;

        float reach = radius * 4.0;
        float falloff = 1.0 - distance(v_position, u_spheres[i].xyz) / reach;
        glow = max(glow, pow(clamp(falloff, 0.0, 1.0), 2.0));
    }
    return glow;
}

void main() {
    // inner edges are pushed out of range so only polygon boundaries draw
    vec3 edge_bary = (1.0 - v_wire) + v_barycentric;
    float edge_distance = min(edge_bary.x, min(edge_bary.y, edge_bary.z));
    float width = fwidth(edge_distance);
    float edge = 1.0 - smoothstep(width * 0.5, width * 2.0, edge_distance);

    float glow = sphere_glow();
    float face_alpha = mix(0.1, 0.8, u_faceHighlight);

    vec4 face_color = vec4(mix(vec3(0.0, 1.0, 0.0), vec3(1.0), glow), max(face_alpha, glow));
    vec4 wire_color = vec4(0.0, 1.0, 0.0, 0.8);
    frag_color = mix(face_color, wire_color, edge);
}
";

/// Face-mesh fragment shader sized for `capacity` sphere slots
pub fn shape_fragment_source(capacity: usize) -> String {
    format!("#version 130\n\n#define MAX_SPHERES {capacity}\n{SHAPE_FRAGMENT_BODY}")
}

/// Sphere billboard vertex shader
///
/// Expands a unit quad around `u_center.xyz` in view space, scaled by
/// `u_center.w`.
pub const SPHERE_VERTEX_SOURCE: &str = r"#version 130

uniform mat4 u_view;
uniform mat4 u_projection;
uniform vec4 u_center;

in vec2 a_corner;

out vec2 v_corner;

void main() {
    vec4 center = u_view * vec4(u_center.xyz, 1.0);
    vec4 corner = center + vec4(a_corner * u_center.w, 0.0, 0.0);
    gl_Position = u_projection * corner;
    v_corner = a_corner;
}
";

/// Sphere billboard fragment shader
pub const SPHERE_FRAGMENT_SOURCE: &str = r"#version 130

uniform sampler2D u_texture;

in vec2 v_corner;

out vec4 frag_color;

void main() {
    float r2 = dot(v_corner, v_corner);
    if (r2 > 1.0) discard;

    vec3 normal = vec3(v_corner, sqrt(1.0 - r2));
    vec2 uv = normal.xy * 0.5 + 0.5;
    vec4 texel = texture(u_texture, uv);
    float shade = 0.4 + 0.6 * normal.z;
    frag_color = vec4(texel.rgb * shade, texel.a);
}
";
