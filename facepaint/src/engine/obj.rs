use std::path::Path;
use std::str::SplitWhitespace;

use thiserror::Error;

use crate::math_prelude::*;

use super::geometry::Geometry;

//Wavefront OBJ subset: v, vt and triangular f statements. Vertices keep the
//file's order so external per-vertex data, like tracked landmarks, can line
//up by index. Texture coordinates attach to the vertex that references them.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read obj file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("obj contains no faces")]
    Empty,
}

pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Geometry, ObjError> {
    let contents = std::fs::read_to_string(path)?;
    parse_obj(&contents)
}

pub fn parse_obj(source: &str) -> Result<Geometry, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();
    //Per vertex, the texcoord index faces referenced it with
    let mut vertex_uv: Vec<Option<usize>> = Vec::new();

    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let malformed = |message: &str| ObjError::Malformed {
            line: line_number,
            message: message.to_string(),
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let x = parse_f32(&mut parts)
                    .ok_or_else(|| malformed("expected three coordinates after v"))?;
                let y = parse_f32(&mut parts)
                    .ok_or_else(|| malformed("expected three coordinates after v"))?;
                let z = parse_f32(&mut parts)
                    .ok_or_else(|| malformed("expected three coordinates after v"))?;
                positions.push(Vec3::new(x, y, z));
                vertex_uv.push(None);
            }
            Some("vt") => {
                let u = parse_f32(&mut parts)
                    .ok_or_else(|| malformed("expected two coordinates after vt"))?;
                let v = parse_f32(&mut parts)
                    .ok_or_else(|| malformed("expected two coordinates after vt"))?;
                texcoords.push(Vec2::new(u, v));
            }
            Some("f") => {
                let mut corners = [(0usize, None); 3];
                for corner in corners.iter_mut() {
                    let part = parts
                        .next()
                        .ok_or_else(|| malformed("expected three vertex references after f"))?;
                    *corner =
                        parse_face_corner(part).ok_or_else(|| malformed("bad vertex reference"))?;
                }
                if parts.next().is_some() {
                    return Err(malformed("only triangular faces are supported"));
                }
                let mut triangle = [0usize; 3];
                for (slot, (vertex, texcoord)) in triangle.iter_mut().zip(corners) {
                    //Indices are one based
                    let vertex = vertex
                        .checked_sub(1)
                        .filter(|index| *index < positions.len())
                        .ok_or_else(|| malformed("vertex index out of range"))?;
                    *slot = vertex;
                    if let Some(texcoord) = texcoord {
                        let texcoord = texcoord
                            .checked_sub(1)
                            .filter(|index| *index < texcoords.len())
                            .ok_or_else(|| malformed("texture coordinate index out of range"))?;
                        vertex_uv[vertex] = Some(texcoord);
                    }
                }
                triangles.push(triangle);
            }
            //Normals, groups and materials are ignored
            _ => continue,
        }
    }

    if triangles.is_empty() {
        return Err(ObjError::Empty);
    }

    let uvs = if texcoords.is_empty() {
        None
    } else {
        Some(
            vertex_uv
                .iter()
                .map(|uv| uv.map_or(Vec2::ZERO, |index| texcoords[index]))
                .collect(),
        )
    };
    Ok(Geometry::new(positions, uvs, triangles))
}

fn parse_f32(parts: &mut SplitWhitespace) -> Option<f32> {
    parts.next()?.parse().ok()
}

//`vertex`, `vertex/texcoord` or `vertex/texcoord/normal`; the normal index
//is ignored.
fn parse_face_corner(part: &str) -> Option<(usize, Option<usize>)> {
    let mut pieces = part.split('/');
    let vertex = pieces.next()?.parse().ok()?;
    let texcoord = match pieces.next() {
        Some("") | None => None,
        Some(piece) => Some(piece.parse().ok()?),
    };
    Some((vertex, texcoord))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
# two triangles
v -1.0 1.0 0.0
v 1.0 1.0 0.0
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
vt 0.0 1.0
vt 1.0 1.0
vt 0.0 0.0
vt 1.0 0.0
f 1/1 3/3 2/2
f 3/3 4/4 2/2
";

    #[test]
    fn parses_square_with_uvs() {
        let geometry = parse_obj(SQUARE).unwrap();
        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.triangle_count(), 2);
        assert_eq!(geometry.triangle(0), [0, 2, 1]);
        let uvs = geometry.uvs().unwrap();
        assert_eq!(uvs[0], Vec2::new(0.0, 1.0));
        assert_eq!(uvs[3], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn rejects_quad_faces() {
        let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let error = parse_obj(source).unwrap_err();
        assert!(matches!(error, ObjError::Malformed { line: 5, .. }));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let source = "v 0 0 0\nv 1 0 0\nf 1 2 7\n";
        assert!(matches!(
            parse_obj(source),
            Err(ObjError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(parse_obj("# nothing\n"), Err(ObjError::Empty)));
    }

    #[test]
    fn vertices_without_texcoords_have_no_uvs() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let geometry = parse_obj(source).unwrap();
        assert!(geometry.uvs().is_none());
    }
}
