//! OBJ file loader for polygon meshes
//!
//! Unlike a render-mesh loader this keeps every `f` record as one polygon:
//! no triangulation, no vertex deduplication, corner order untouched.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use super::{PolygonFace, PolygonMesh};
use crate::foundation::math::{utils, Vec2, Vec3};

/// Errors raised while reading an OBJ file
#[derive(Error, Debug)]
pub enum ObjError {
    /// Underlying read failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
    /// A face refers to a vertex attribute that does not exist
    #[error("Line {line}: {kind} index {index} is out of range ({available} defined)")]
    IndexOutOfRange {
        /// 1-based line number
        line: usize,
        /// Attribute pool the index refers to
        kind: &'static str,
        /// Index as written in the file
        index: i64,
        /// Number of entries in the pool at that point
        available: usize,
    },
    /// A face has fewer than three corners
    #[error("Line {line}: face has {corners} corners, at least 3 are required")]
    MalformedFace {
        /// 1-based line number
        line: usize,
        /// Number of corners found
        corners: usize,
    },
}

/// Wavefront OBJ reader producing [`PolygonMesh`] values
pub struct ObjLoader;

struct Pools {
    positions: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

struct Corner {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

impl ObjLoader {
    /// Load an OBJ file from disk
    pub fn load_polygons<P: AsRef<Path>>(path: P) -> Result<PolygonMesh, ObjError> {
        let file = File::open(path.as_ref())?;
        let mesh = Self::parse(BufReader::new(file))?;
        log::debug!(
            "Parsed {} faces ({} corners) from {}",
            mesh.face_count(),
            mesh.corner_count(),
            path.as_ref().display()
        );
        Ok(mesh)
    }

    /// Parse OBJ records from any buffered reader
    pub fn parse<R: BufRead>(reader: R) -> Result<PolygonMesh, ObjError> {
        let mut pools = Pools {
            positions: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
        };
        let mut faces = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = number + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            match keyword {
                "v" => {
                    let [x, y, z] = parse_floats::<3>(&values, line_no, "vertex")?;
                    pools.positions.push(Vec3::new(x, y, z));
                }
                "vt" => {
                    let [u, v] = parse_floats::<2>(&values, line_no, "texture coordinate")?;
                    pools.tex_coords.push(Vec2::new(u, v));
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3>(&values, line_no, "normal")?;
                    pools.normals.push(Vec3::new(x, y, z));
                }
                "f" => {
                    if values.len() < 3 {
                        return Err(ObjError::MalformedFace { line: line_no, corners: values.len() });
                    }
                    let corners = values
                        .iter()
                        .map(|token| parse_corner(token, line_no, &pools))
                        .collect::<Result<Vec<_>, _>>()?;
                    faces.push(build_face(&corners, &pools));
                }
                _ => {
                    // Groups, smoothing, materials: not needed for the shape
                    log::trace!("Ignoring OBJ record '{}' on line {}", keyword, line_no);
                }
            }
        }

        Ok(PolygonMesh::new(faces))
    }
}

fn parse_floats<const N: usize>(values: &[&str], line: usize, what: &str) -> Result<[f32; N], ObjError> {
    if values.len() < N {
        return Err(ObjError::Parse {
            line,
            message: format!("{what} needs {N} components, found {}", values.len()),
        });
    }

    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = token.parse().map_err(|_| ObjError::Parse {
            line,
            message: format!("invalid {what} component '{token}'"),
        })?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative (relative) OBJ index against a pool
fn resolve_index(token: &str, line: usize, kind: &'static str, available: usize) -> Result<usize, ObjError> {
    let index: i64 = token.parse().map_err(|_| ObjError::Parse {
        line,
        message: format!("invalid {kind} index '{token}'"),
    })?;

    let resolved = match index {
        i if i > 0 => usize::try_from(i - 1).ok(),
        i if i < 0 => usize::try_from(i.unsigned_abs()).ok().and_then(|back| available.checked_sub(back)),
        _ => None,
    };

    resolved
        .filter(|&i| i < available)
        .ok_or(ObjError::IndexOutOfRange { line, kind, index, available })
}

fn parse_corner(token: &str, line: usize, pools: &Pools) -> Result<Corner, ObjError> {
    let mut fields = token.split('/');

    let position = resolve_index(fields.next().unwrap_or_default(), line, "position", pools.positions.len())?;
    let tex_coord = match fields.next() {
        Some(field) if !field.is_empty() => {
            Some(resolve_index(field, line, "texture coordinate", pools.tex_coords.len())?)
        }
        _ => None,
    };
    let normal = match fields.next() {
        Some(field) if !field.is_empty() => Some(resolve_index(field, line, "normal", pools.normals.len())?),
        _ => None,
    };

    Ok(Corner { position, tex_coord, normal })
}

fn build_face(corners: &[Corner], pools: &Pools) -> PolygonFace {
    let positions: Vec<Vec3> = corners.iter().map(|c| pools.positions[c.position]).collect();

    // Corners without an explicit normal fall back to the geometric one
    let face_normal = utils::polygon_normal(&positions).unwrap_or_else(Vec3::zeros);

    let tex_coords = corners
        .iter()
        .map(|c| c.tex_coord.map_or_else(Vec2::zeros, |i| pools.tex_coords[i]))
        .collect();
    let normals = corners
        .iter()
        .map(|c| c.normal.map_or(face_normal, |i| pools.normals[i]))
        .collect();

    PolygonFace { positions, tex_coords, normals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SQUARE_PYRAMID: &str = "\
# square pyramid
o pyramid
v -1 -0.5 -1
v 1 -0.5 -1
v 1 -0.5 1
v -1 -0.5 1
v 0 1.5 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 -1 0
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
f 2 1 5
f 3 2 5
f 4 3 5
f 1 4 5
";

    fn parse(text: &str) -> Result<PolygonMesh, ObjError> {
        ObjLoader::parse(text.as_bytes())
    }

    #[test]
    fn test_ngon_faces_are_preserved() {
        let mesh = parse(SQUARE_PYRAMID).unwrap();

        assert_eq!(mesh.face_count(), 5);
        assert_eq!(mesh.faces[0].corner_count(), 4);
        assert!(mesh.faces[1..].iter().all(|f| f.corner_count() == 3));
        assert!(mesh.faces.iter().all(PolygonFace::is_consistent));
    }

    #[test]
    fn test_corner_order_is_preserved() {
        let mesh = parse(SQUARE_PYRAMID).unwrap();
        let side = &mesh.faces[1];

        assert_eq!(side.positions[0], Vec3::new(1.0, -0.5, -1.0));
        assert_eq!(side.positions[1], Vec3::new(-1.0, -0.5, -1.0));
        assert_eq!(side.positions[2], Vec3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_explicit_attributes_are_used() {
        let mesh = parse(SQUARE_PYRAMID).unwrap();
        let base = &mesh.faces[0];

        assert_eq!(base.tex_coords[2], Vec2::new(1.0, 1.0));
        assert_eq!(base.normals[3], Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_missing_normals_use_face_normal() {
        let mesh = parse(SQUARE_PYRAMID).unwrap();
        let side = &mesh.faces[1];

        let expected = Vec3::new(0.0, 2.0, -4.0).normalize();
        for normal in &side.normals {
            assert_relative_eq!(*normal, expected, epsilon = 1.0e-6);
        }
        assert_eq!(side.tex_coords[0], Vec2::zeros());
    }

    #[test]
    fn test_relative_indices() {
        let mesh = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.faces[0].positions[1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_face_with_two_corners_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::MalformedFace { line: 3, corners: 2 }));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange { line: 4, kind: "position", index: 4, available: 3 }
        ));
    }

    #[test]
    fn test_zero_index_is_rejected() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = parse("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let result = ObjLoader::load_polygons("definitely/not/here.obj");
        assert!(matches!(result, Err(ObjError::Io(_))));
    }
}
