//! Wavefront OBJ loading for the backdrop model.

use glam::Vec3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjError {
    #[error("line {line}: malformed vertex")]
    MalformedVertex { line: usize },
    #[error("line {line}: malformed face index `{token}`")]
    MalformedIndex { line: usize, token: String },
    #[error("line {line}: vertex index {index} out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("line {line}: face needs at least three vertices")]
    DegenerateFace { line: usize },
    #[error("model contains no triangles")]
    Empty,
}

/// Flat-shaded triangle soup, three floats per vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Interleaves position and normal, six floats per vertex.
    pub fn interleaved(&self) -> Vec<f32> {
        self.positions
            .chunks_exact(3)
            .zip(self.normals.chunks_exact(3))
            .flat_map(|(position, normal)| position.iter().chain(normal.iter()).copied())
            .collect()
    }
}

pub fn parse_obj(source: &str) -> Result<Mesh, ObjError> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut triangles: Vec<[Vec3; 3]> = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.split('#').next().unwrap_or_default().trim();
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let coords: Vec<f32> = tokens
                    .take(3)
                    .map(str::parse::<f32>)
                    .collect::<Result<_, _>>()
                    .map_err(|_| ObjError::MalformedVertex { line: line_number })?;
                let [x, y, z] = coords[..] else {
                    return Err(ObjError::MalformedVertex { line: line_number });
                };
                vertices.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let corners = tokens
                    .map(|token| resolve_index(token, vertices.len(), line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(ObjError::DegenerateFace { line: line_number });
                }
                for pair in corners[1..].windows(2) {
                    triangles.push([vertices[corners[0]], vertices[pair[0]], vertices[pair[1]]]);
                }
            }
            _ => {}
        }
    }

    if triangles.is_empty() {
        return Err(ObjError::Empty);
    }

    Ok(build_mesh(&triangles))
}

fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<usize, ObjError> {
    let position = token.split('/').next().unwrap_or_default();
    let raw: i64 = position.parse().map_err(|_| ObjError::MalformedIndex {
        line,
        token: token.to_string(),
    })?;

    let count = vertex_count as i64;
    let resolved = match raw {
        0 => None,
        positive if positive > 0 => Some(positive - 1),
        negative => Some(count + negative),
    };

    resolved
        .filter(|value| (0..count).contains(value))
        .map(|value| value as usize)
        .ok_or(ObjError::IndexOutOfRange { line, index: raw })
}

fn build_mesh(triangles: &[[Vec3; 3]]) -> Mesh {
    let (min, max) = triangles.iter().flatten().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), point| (min.min(*point), max.max(*point)),
    );
    let center = (min + max) * 0.5;
    let radius = triangles
        .iter()
        .flatten()
        .map(|point| point.distance(center))
        .fold(0.0_f32, f32::max);
    let scale = if radius > 0.0 { 1.0 / radius } else { 1.0 };

    let mut mesh = Mesh {
        positions: Vec::with_capacity(triangles.len() * 9),
        normals: Vec::with_capacity(triangles.len() * 9),
    };

    for [a, b, c] in triangles {
        let normal = (*b - *a).cross(*c - *a).normalize_or_zero();
        for point in [a, b, c] {
            let placed = (*point - center) * scale;
            mesh.positions.extend_from_slice(&placed.to_array());
            mesh.normals.extend_from_slice(&normal.to_array());
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
o quad
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = parse_obj(QUAD).expect("quad parses");
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for normal in mesh.normals.chunks_exact(3) {
            assert_eq!(normal, &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn model_is_centred_in_unit_sphere() {
        let mesh = parse_obj(QUAD).expect("quad parses");
        let furthest = mesh
            .positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]).length())
            .fold(0.0_f32, f32::max);
        assert!((furthest - 1.0).abs() < 1e-5);
        let first = Vec3::new(mesh.positions[0], mesh.positions[1], mesh.positions[2]);
        let corner = Vec3::new(-1.0, -1.0, 0.0).normalize();
        assert!(first.distance(corner) < 1e-5);
    }

    #[test]
    fn negative_and_slashed_indices_resolve() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3/1/1 -2/2/1 -1/3/1\n";
        let mesh = parse_obj(source).expect("relative indices parse");
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn out_of_range_index_is_reported_with_line() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert_eq!(
            parse_obj(source),
            Err(ObjError::IndexOutOfRange { line: 4, index: 9 })
        );
    }

    #[test]
    fn malformed_records_are_rejected() {
        assert_eq!(parse_obj("v 1 2\n"), Err(ObjError::MalformedVertex { line: 1 }));
        assert_eq!(parse_obj("v 1 x 2\n"), Err(ObjError::MalformedVertex { line: 1 }));
        assert!(matches!(
            parse_obj("v 0 0 0\nf a b c\n"),
            Err(ObjError::MalformedIndex { line: 2, .. })
        ));
        assert_eq!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(ObjError::DegenerateFace { line: 3 })
        );
    }

    #[test]
    fn shipped_model_faces_outward() {
        let mesh = parse_obj(include_str!("../static/models/hero.obj")).expect("hero model parses");
        assert_eq!(mesh.vertex_count(), 20 * 3);

        for (triangle, normals) in mesh
            .positions
            .chunks_exact(9)
            .zip(mesh.normals.chunks_exact(9))
        {
            let centroid = (Vec3::from_slice(&triangle[0..3])
                + Vec3::from_slice(&triangle[3..6])
                + Vec3::from_slice(&triangle[6..9]))
                / 3.0;
            assert!(centroid.dot(Vec3::from_slice(&normals[0..3])) > 0.0);
        }
    }

    #[test]
    fn vertices_without_faces_are_empty() {
        assert_eq!(parse_obj("v 0 0 0\nv 1 1 1\n"), Err(ObjError::Empty));
    }

    #[test]
    fn interleaved_layout_alternates_position_and_normal() {
        let mesh = parse_obj(QUAD).expect("quad parses");
        let interleaved = mesh.interleaved();
        assert_eq!(interleaved.len(), mesh.vertex_count() * 6);
        assert_eq!(&interleaved[3..6], &[0.0, 0.0, 1.0]);
    }
}
