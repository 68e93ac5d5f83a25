use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use super::Voronoi3D;
use crate::primitives::Point3d;

fn write_i32(writer: &mut impl Write, value: i32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn write_point(writer: &mut impl Write, point: Point3d) -> io::Result<()> {
    writer.write_all(&point.x.to_le_bytes())?;
    writer.write_all(&point.y.to_le_bytes())?;
    writer.write_all(&point.z.to_le_bytes())
}

fn read_i32(reader: &mut impl Read) -> io::Result<i32> {
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64(reader: &mut impl Read) -> io::Result<f64> {
    let mut buf = [0; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_point(reader: &mut impl Read) -> io::Result<Point3d> {
    Ok(Point3d::new(
        read_f64(reader)?,
        read_f64(reader)?,
        read_f64(reader)?,
    ))
}

impl Voronoi3D {
    /// Writes the tessellation in a fixed little-endian layout: the
    /// real generators, the Voronoi vertices, the face list of every
    /// cell, and the vertex loop of every face.
    pub fn output(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_i32(&mut writer, self.n_org as i32)?;
        for cell in 0..self.n_org {
            write_point(&mut writer, self.del.points[cell])?;
        }
        write_i32(&mut writer, self.tetra_centers.len() as i32)?;
        for center in &self.tetra_centers {
            write_point(&mut writer, *center)?;
        }
        for cell in 0..self.n_org {
            write_i32(&mut writer, self.faces_in_cell[cell].len() as i32)?;
            for face in &self.faces_in_cell[cell] {
                write_i32(&mut writer, *face as i32)?;
            }
        }
        write_i32(&mut writer, self.points_in_face.len() as i32)?;
        for vertex_loop in &self.points_in_face {
            write_i32(&mut writer, vertex_loop.len() as i32)?;
            for vertex in vertex_loop {
                write_i32(&mut writer, *vertex as i32)?;
            }
        }
        writer.flush()
    }
}

/// The contents of a tessellation file, in file order.
pub struct RawTessellation {
    pub generators: Vec<Point3d>,
    pub voronoi_vertices: Vec<Point3d>,
    pub cell_faces: Vec<Vec<i32>>,
    pub face_vertices: Vec<Vec<i32>>,
}

/// Parses a file written by [`Voronoi3D::output`].
pub fn read_tessellation(path: impl AsRef<Path>) -> io::Result<RawTessellation> {
    let mut reader = BufReader::new(File::open(path)?);
    let num_generators = read_i32(&mut reader)? as usize;
    let generators = (0..num_generators)
        .map(|_| read_point(&mut reader))
        .collect::<io::Result<_>>()?;
    let num_vertices = read_i32(&mut reader)? as usize;
    let voronoi_vertices = (0..num_vertices)
        .map(|_| read_point(&mut reader))
        .collect::<io::Result<_>>()?;
    let mut cell_faces = Vec::with_capacity(num_generators);
    for _ in 0..num_generators {
        let num_faces = read_i32(&mut reader)? as usize;
        cell_faces.push(
            (0..num_faces)
                .map(|_| read_i32(&mut reader))
                .collect::<io::Result<_>>()?,
        );
    }
    let num_faces = read_i32(&mut reader)? as usize;
    let mut face_vertices = Vec::with_capacity(num_faces);
    for _ in 0..num_faces {
        let num_vertices = read_i32(&mut reader)? as usize;
        face_vertices.push(
            (0..num_vertices)
                .map(|_| read_i32(&mut reader))
                .collect::<io::Result<_>>()?,
        );
    }
    Ok(RawTessellation {
        generators,
        voronoi_vertices,
        cell_faces,
        face_vertices,
    })
}
