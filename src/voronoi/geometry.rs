use super::Voronoi3D;
use crate::math::determinant3x3;
use crate::primitives::Point3d;

fn tetra_volume(a: Point3d, b: Point3d, c: Point3d, d: Point3d) -> f64 {
    let v1 = b - a;
    let v2 = c - a;
    let v3 = d - a;
    determinant3x3([
        [v1.x, v1.y, v1.z],
        [v2.x, v2.y, v2.z],
        [v3.x, v3.y, v3.z],
    ]) / 6.0
}

fn tetra_centroid(a: Point3d, b: Point3d, c: Point3d, d: Point3d) -> Point3d {
    0.25 * (a + b + c + d)
}

impl Voronoi3D {
    /// Volume and centroid of every real cell, as a sum over the
    /// face-apex tetras of the fan of each face, for both endpoints of
    /// the face.
    pub(super) fn accumulate_cell_moments(&mut self) {
        for face in 0..self.face_neighbors.len() {
            let (n0, n1) = self.face_neighbors[face];
            let vertices = &self.points_in_face[face];
            let first = self.tetra_centers[vertices[0]];
            for j in 0..vertices.len() - 2 {
                let second = self.tetra_centers[vertices[j + 1]];
                let third = self.tetra_centers[vertices[j + 2]];
                for n in [n0, n1] {
                    if n >= self.n_org {
                        continue;
                    }
                    let apex = self.del.points[n];
                    let volume = tetra_volume(first, second, third, apex).abs();
                    self.volumes[n] += volume;
                    self.cm[n] += volume * tetra_centroid(first, second, third, apex);
                }
            }
        }
        for cell in 0..self.n_org {
            self.cm[cell] /= self.volumes[cell];
        }
    }

    /// A rigid (mirrored) ghost has no cell of its own; its centroid is
    /// the reflection of the owning cell's centroid through the plane
    /// of the shared face.
    pub(super) fn set_mirror_centroid(&mut self, face: usize) {
        let (n0, n1) = self.face_neighbors[face];
        let normal = (self.del.points[n0] - self.del.points[n1]).normalize();
        let (real, other) = if n0 >= self.n_org { (n1, n0) } else { (n0, n1) };
        let on_plane = self.tetra_centers[self.points_in_face[face][0]];
        self.cm[other] =
            self.cm[real] - 2.0 * normal * (self.cm[real] - on_plane).dot(normal);
    }
}
