use std::collections::HashSet;

use super::Voronoi3D;
use crate::communication::PointExchange;
use crate::communication::Rank;
use crate::error::BuildError;
use crate::primitives::sphere::face_intersects_sphere;
use crate::primitives::Point3d;
use crate::primitives::Polygon;
use crate::primitives::Sphere;
use crate::simulation_box::most_aligned_face;

/// A generator flagged for duplication: the id of the face (box face in
/// serial mode, process tessellation face in distributed mode) whose
/// far side needs a copy, and the generator index.
pub(super) type GhostCandidate = (usize, usize);

impl Voronoi3D {
    /// Rebuilds the generator-to-tetra incidence lists and picks the
    /// witness tetra connecting a real generator to the outside, which
    /// seeds the serial boundary walk.
    pub(super) fn set_point_tetras(&mut self) {
        self.point_tetras = vec![vec![]; self.n_org];
        self.big_tet = None;
        for (t, tetra) in self.del.tetras.iter().enumerate() {
            if self.del.empty_tetras.contains(&t) {
                continue;
            }
            let mut has_real = false;
            let mut has_outer = false;
            for point in tetra.points {
                if point < self.n_org {
                    self.point_tetras[point].push(t);
                    has_real = true;
                } else {
                    has_outer = true;
                }
            }
            if has_real && has_outer {
                self.big_tet = Some(t);
            }
        }
    }

    fn first_point_to_check(&self) -> Result<usize, BuildError> {
        let big_tet = self.big_tet.ok_or(BuildError::NoSeedFound)?;
        self.del.tetras[big_tet]
            .points
            .into_iter()
            .find(|point| *point < self.n_org)
            .ok_or(BuildError::NoSeedFound)
    }

    /// Every real generator sharing a tetra with a synthetic vertex
    /// (sentinel or ghost). These are the cells known to border the
    /// domain, which makes them the seeds of the distributed walk.
    fn first_check_list(&self) -> Vec<usize> {
        let mut flagged = vec![false; self.n_org];
        for (t, tetra) in self.del.tetras.iter().enumerate() {
            if self.del.empty_tetras.contains(&t) {
                continue;
            }
            if tetra.points.iter().any(|point| *point >= self.n_org) {
                for point in tetra.points {
                    if point < self.n_org {
                        flagged[point] = true;
                    }
                }
            }
        }
        (0..self.n_org).filter(|point| flagged[*point]).collect()
    }

    /// The real Delaunay neighbors of a generator that have not been
    /// popped yet.
    fn points_to_check(&self, point: usize, checked: &[bool]) -> Vec<usize> {
        let mut result = vec![];
        for t in &self.point_tetras[point] {
            for neighbor in self.del.tetras[*t].points {
                if neighbor < self.n_org && !checked[neighbor] {
                    result.push(neighbor);
                }
            }
        }
        result.sort_unstable();
        result.dedup();
        result
    }

    fn circumsphere(&mut self, tetra: usize) -> Sphere {
        let radius = self.radius(tetra);
        Sphere::new(self.tetra_centers[tetra], radius)
    }

    /// Walks the Delaunay neighborhood outward from the seed generator
    /// and flags every generator one of whose circumspheres reaches a
    /// box face. Propagation is monotone: a cell can only reach a
    /// boundary face through a tetra shared with an already flagged
    /// neighbor.
    pub(super) fn serial_find_intersections(
        &mut self,
    ) -> Result<Vec<GhostCandidate>, BuildError> {
        let box_faces = self.sim_box.faces();
        let seed = self.first_point_to_check()?;
        let mut check_stack = vec![seed];
        let mut checked = vec![false; self.n_org];
        let mut will_check = vec![false; self.n_org];
        will_check[seed] = true;
        let mut result = vec![];
        while let Some(current) = check_stack.pop() {
            checked[current] = true;
            let intersecting = self.intersecting_box_faces(&box_faces, current);
            if intersecting.is_empty() {
                continue;
            }
            for face in intersecting {
                result.push((face, current));
            }
            for neighbor in self.points_to_check(current, &checked) {
                if !will_check[neighbor] {
                    check_stack.push(neighbor);
                    will_check[neighbor] = true;
                }
            }
        }
        Ok(result)
    }

    fn intersecting_box_faces(&mut self, box_faces: &[Polygon], point: usize) -> Vec<usize> {
        let mut result = vec![];
        for (face_id, face) in box_faces.iter().enumerate() {
            for t in self.point_tetras[point].clone() {
                let sphere = self.circumsphere(t);
                if face_intersects_sphere(face, &sphere) {
                    result.push(face_id);
                    break;
                }
            }
        }
        result
    }

    /// The distributed analogue of the serial walk. Seeds come from
    /// `first_check_list`; per generator, the faces of the process
    /// tessellation are searched breadth-first starting from this
    /// rank's own cell, crossing into neighbor subdomains only when
    /// `recursive` is set.
    pub(super) fn find_intersections(
        &mut self,
        tproc: &Voronoi3D,
        rank: Rank,
        recursive: bool,
    ) -> Vec<GhostCandidate> {
        let mut check_stack = self.first_check_list();
        let mut checked = vec![false; self.n_org];
        let mut will_check = vec![false; self.n_org];
        for point in &check_stack {
            will_check[*point] = true;
        }
        let mut result = vec![];
        while let Some(current) = check_stack.pop() {
            checked[current] = true;
            let intersecting = self.intersecting_proc_faces(tproc, rank, current, recursive);
            if intersecting.is_empty() {
                continue;
            }
            for face in intersecting {
                result.push((face, current));
            }
            for neighbor in self.points_to_check(current, &checked) {
                if !will_check[neighbor] {
                    check_stack.push(neighbor);
                    will_check[neighbor] = true;
                }
            }
        }
        result
    }

    fn intersecting_proc_faces(
        &mut self,
        tproc: &Voronoi3D,
        rank: Rank,
        point: usize,
        recursive: bool,
    ) -> Vec<usize> {
        let num_procs = tproc.num_cells();
        let mut visited = vec![false; tproc.total_num_faces()];
        let mut to_check: Vec<usize> = tproc.cell_faces(rank as usize).to_vec();
        let mut result = vec![];
        while let Some(face_id) = to_check.pop() {
            if visited[face_id] {
                continue;
            }
            visited[face_id] = true;
            let face = tproc.face_polygon(face_id);
            for t in self.point_tetras[point].clone() {
                let sphere = self.circumsphere(t);
                if !face_intersects_sphere(&face, &sphere) {
                    continue;
                }
                result.push(face_id);
                if recursive {
                    let (n0, n1) = tproc.face_neighbors(face_id);
                    for neighbor in [n0, n1] {
                        if neighbor < num_procs && neighbor != rank as usize {
                            to_check.extend(
                                tproc
                                    .cell_faces(neighbor)
                                    .iter()
                                    .filter(|f| !visited[**f])
                                    .copied(),
                            );
                        }
                    }
                }
                break;
            }
        }
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Serial mode: every flagged generator is mirrored across the box
    /// face it reaches. Each (face, generator) pair is unique, so no
    /// dedup is needed.
    pub(super) fn create_boundary_points(
        &self,
        to_duplicate: &[GhostCandidate],
    ) -> Vec<Point3d> {
        let box_faces = self.sim_box.faces();
        to_duplicate
            .iter()
            .map(|(face, point)| box_faces[*face].mirror(self.del.points[*point]))
            .collect()
    }

    /// Distributed mode: flagged generators whose process face borders
    /// a real peer are shipped there; generators reaching a wall of the
    /// process tessellation are mirrored across the nearest box face.
    /// Both kinds are deduplicated against what previous passes already
    /// produced.
    pub(super) fn create_boundary_points_distributed(
        &mut self,
        to_duplicate: &[GhostCandidate],
        tproc: &Voronoi3D,
        rank: Rank,
        mirrored: &mut [Vec<usize>],
        exchange: &mut PointExchange,
    ) -> Vec<Point3d> {
        let box_faces = self.sim_box.faces();
        let box_normals = self.sim_box.face_normals();
        let num_procs = tproc.num_cells();

        for (face, _) in to_duplicate {
            let (n0, n1) = tproc.face_neighbors(*face);
            for neighbor in [n0, n1] {
                let peer = neighbor as Rank;
                if neighbor < num_procs && peer != rank && !self.duplicated_procs.contains(&peer)
                {
                    self.duplicated_procs.push(peer);
                }
            }
        }
        let kept = exchange.symmetric_peers(&self.duplicated_procs);
        self.realign_peer_records(kept);

        let mut to_send: Vec<Vec<usize>> = vec![vec![]; self.duplicated_procs.len()];
        let mut box_candidates: Vec<Vec<usize>> = vec![vec![]; box_faces.len()];
        for (face, point) in to_duplicate {
            let (n0, n1) = tproc.face_neighbors(*face);
            for (near, far) in [(n1, n0), (n0, n1)] {
                if far == rank as usize {
                    continue;
                }
                if far < num_procs {
                    if let Some(peer) = self
                        .duplicated_procs
                        .iter()
                        .position(|p| *p == far as Rank)
                    {
                        to_send[peer].push(*point);
                    }
                } else {
                    // The far side is a wall of the process
                    // tessellation; mirror across the box face the wall
                    // direction points at.
                    let direction = tproc.mesh_point(far) - tproc.mesh_point(near);
                    let face_id = most_aligned_face(&box_normals, direction);
                    box_candidates[face_id].push(*point);
                }
            }
        }

        for (peer, candidates) in to_send.iter_mut().enumerate() {
            candidates.sort_unstable();
            candidates.dedup();
            let already_shipped: HashSet<usize> =
                self.duplicated_points[peer].iter().copied().collect();
            candidates.retain(|point| !already_shipped.contains(point));
            self.duplicated_points[peer].extend(candidates.iter().copied());
        }

        let mut result = vec![];
        for (face_id, candidates) in box_candidates.iter_mut().enumerate() {
            candidates.sort_unstable();
            candidates.dedup();
            for point in candidates.iter() {
                if mirrored[face_id].contains(point) {
                    continue;
                }
                mirrored[face_id].push(*point);
                result.push(box_faces[face_id].mirror(self.del.points[*point]));
            }
        }

        let incoming = exchange.exchange(&self.duplicated_procs, &to_send, &self.del.points);
        for (peer, payload) in incoming.into_iter().enumerate() {
            for point in payload {
                self.nghost[peer].push(self.del.points.len() + result.len());
                result.push(point);
            }
        }
        result
    }

    /// Reorders the cumulative per-peer records to match the outcome of
    /// the handshake. A peer can only disappear from the symmetric set
    /// if nothing was ever exchanged with it.
    fn realign_peer_records(&mut self, kept: Vec<Rank>) {
        let old_procs = std::mem::take(&mut self.duplicated_procs);
        let mut old_points = std::mem::take(&mut self.duplicated_points);
        let mut old_ghosts = std::mem::take(&mut self.nghost);
        old_points.resize(old_procs.len(), vec![]);
        old_ghosts.resize(old_procs.len(), vec![]);
        for peer in &kept {
            match old_procs.iter().position(|p| p == peer) {
                Some(i) => {
                    self.duplicated_points.push(std::mem::take(&mut old_points[i]));
                    self.nghost.push(std::mem::take(&mut old_ghosts[i]));
                }
                None => {
                    self.duplicated_points.push(vec![]);
                    self.nghost.push(vec![]);
                }
            }
        }
        for (i, peer) in old_procs.iter().enumerate() {
            if !kept.contains(peer) {
                debug_assert!(old_points[i].is_empty() && old_ghosts[i].is_empty());
            }
        }
        self.duplicated_procs = kept;
    }

    /// Assigns every input point to the rank whose subdomain contains
    /// it. Points of other subdomains are shipped to their owners; the
    /// returned list is this rank's own points followed by the received
    /// ones.
    pub(super) fn sort_points_to_subdomain(
        &mut self,
        points: &[Point3d],
        tproc: &Voronoi3D,
        exchange: &mut PointExchange,
    ) -> Result<Vec<Point3d>, BuildError> {
        let rank = exchange.rank();
        let num_procs = tproc.num_cells();
        let real_neighbors: Vec<usize> = tproc
            .neighbors(rank as usize)
            .into_iter()
            .filter(|n| *n < num_procs)
            .collect();
        self.sent_procs = real_neighbors.iter().map(|n| *n as Rank).collect();
        self.sent_points = vec![vec![]; self.sent_procs.len()];
        let mut kept = vec![];
        for (i, point) in points.iter().enumerate() {
            if tproc.cell_contains(rank as usize, *point) {
                kept.push(*point);
                self.self_index.push(i);
                continue;
            }
            if let Some(index) = real_neighbors
                .iter()
                .position(|n| tproc.cell_contains(*n, *point))
            {
                self.sent_points[index].push(i);
                continue;
            }
            let owner = (0..num_procs)
                .filter(|p| *p != rank as usize && !real_neighbors.contains(p))
                .find(|p| tproc.cell_contains(*p, *point));
            match owner {
                Some(owner) => {
                    let peer = owner as Rank;
                    match self.sent_procs.iter().position(|p| *p == peer) {
                        Some(index) => self.sent_points[index].push(i),
                        None => {
                            self.sent_procs.push(peer);
                            self.sent_points.push(vec![i]);
                        }
                    }
                }
                None => {
                    return Err(BuildError::UnassignedPoint {
                        rank,
                        position: *point,
                    })
                }
            }
        }
        // A rank may receive points from a rank it sends nothing to, so
        // the handshake extends the peer list instead of intersecting.
        let talkers = exchange.handshake(&self.sent_procs);
        for talker in talkers {
            if !self.sent_procs.contains(&talker) {
                self.sent_procs.push(talker);
                self.sent_points.push(vec![]);
            }
        }
        let incoming = exchange.exchange(&self.sent_procs, &self.sent_points, points);
        for payload in incoming {
            kept.extend(payload);
        }
        Ok(kept)
    }
}
