//! Mesh utilities
//! Lights build their meshes as plain owned vertex/index lists so the physics side
//! never has to touch renderer types. Conversion to a bevy mesh happens at the edge.

use bevy::render::{
    mesh::{Indices, Mesh, VertexAttributeValues},
    render_resource::PrimitiveTopology,
};

use crate::physics::light::types::{LightVertex, Topology};

/// Represents a light mesh that is owned by the light that produced it.
/// The index list is interpreted according to `topology`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightMesh {
    pub topology: Topology,
    pub vertices: Vec<LightVertex>,
    pub indices: Vec<u32>,
}

impl LightMesh {
    /// An empty mesh that will be drawn with the given topology
    pub fn empty(topology: Topology) -> Self {
        Self {
            topology,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn new(topology: Topology, vertices: Vec<LightVertex>, indices: Vec<u32>) -> Self {
        Self {
            topology,
            vertices,
            indices,
        }
    }

    /// Drop all vertices and indices but keep the allocation for the next rebuild
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Expands the fan or strip index list into an explicit triangle list.
    /// Strips alternate winding every other triangle so we flip those back.
    pub fn to_triangle_list(&self) -> Vec<u32> {
        if self.indices.len() < 3 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity((self.indices.len() - 2) * 3);
        match self.topology {
            Topology::Fan => {
                let center = self.indices[0];
                for pair in self.indices[1..].windows(2) {
                    out.extend_from_slice(&[center, pair[0], pair[1]]);
                }
            }
            Topology::Strip => {
                for (i, tri) in self.indices.windows(3).enumerate() {
                    if i % 2 == 0 {
                        out.extend_from_slice(&[tri[0], tri[1], tri[2]]);
                    } else {
                        out.extend_from_slice(&[tri[1], tri[0], tri[2]]);
                    }
                }
            }
        }
        out
    }

    /// Converts to a bevy mesh with a triangle list topology.
    /// Attenuation is folded into the vertex color alpha.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);

        let positions: Vec<[f32; 3]> = self
            .vertices
            .iter()
            .map(|v| [v.position.x, v.position.y, 0.0])
            .collect();

        let colors: Vec<[f32; 4]> = self
            .vertices
            .iter()
            .map(|v| {
                let [r, g, b, a] = v.color;
                [r, g, b, a * v.attenuation]
            })
            .collect();

        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            VertexAttributeValues::Float32x3(positions),
        );
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_COLOR,
            VertexAttributeValues::Float32x4(colors),
        );
        mesh.set_indices(Some(Indices::U32(self.to_triangle_list())));
        mesh
    }
}
