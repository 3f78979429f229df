//! The ray handler owns every light and packs their meshes for drawing.
//!
//! Each frame the handler updates its lights in order and appends each light's
//! vertices and indices to two flat buffers at a running cursor. The index
//! offset and count of every packed light are recorded as a [`DrawCommand`]
//! during that same pass, so drawing can never disagree with the packing.
//!
//! Indices are rebased onto the light's first vertex in the shared vertex
//! buffer, so a renderer can draw every command from the same two buffers.

use bevy::ecs::system::Resource;
use bevy::log::{debug, error};
use bevy::math::{Rect, Vec2};
use bytemuck::Zeroable;
use derive_more::{From, Into};
use rayon::prelude::*;

use super::errors::{BufferOverflowError, LightNotFoundError};
use super::geometry::GeometryQuery;
use super::light_source::LightSource;
use super::types::{DrawCommand, LightVertex, Topology};
use crate::physics::util::mesh::LightMesh;

/// Vertices the handler can pack per frame unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 8192;
/// Index capacity is this many times the vertex capacity
pub const INDICES_PER_VERTEX: usize = 3;

/// Identifies a light within its ray handler. Lights are never removed, so this is
/// simply the order the light was added in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct LightId(pub usize);

/// Whatever draws the packed light buffers.
/// The handler uploads both buffers once, then issues one draw per packed light.
pub trait LightRenderer {
    fn load_vertex_data(&mut self, vertices: &[LightVertex]);
    fn load_index_data(&mut self, indices: &[u32]);
    /// Draw `count` indices starting at index `offset`
    fn draw(&mut self, topology: Topology, count: usize, offset: usize);
}

/* ======================================
 * Flat buffers
 * ====================================== */

/// The shared vertex and index arrays and their write cursors
#[derive(Debug, Clone)]
struct LightBuffers {
    vertices: Vec<LightVertex>,
    indices: Vec<u32>,
    vertex_count: usize,
    index_count: usize,
    commands: Vec<DrawCommand>,
}

impl LightBuffers {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: vec![LightVertex::zeroed(); capacity],
            indices: vec![0; capacity * INDICES_PER_VERTEX],
            vertex_count: 0,
            index_count: 0,
            commands: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.commands.clear();
    }

    /// Where the cursors end up if `mesh` is packed at the given cursors
    fn reserve(
        &self,
        light: LightId,
        vertex_start: usize,
        index_start: usize,
        mesh: &LightMesh,
    ) -> Result<(usize, usize), BufferOverflowError> {
        let required_vertices = vertex_start + mesh.vertices.len();
        let required_indices = index_start + mesh.indices.len();
        if required_vertices > self.vertices.len() || required_indices > self.indices.len() {
            let err = BufferOverflowError {
                light,
                required_vertices,
                vertex_capacity: self.vertices.len(),
                required_indices,
                index_capacity: self.indices.len(),
            };
            error!("Light buffers overflowed: {}", err);
            return Err(err);
        }
        Ok((required_vertices, required_indices))
    }

    /// Appends `mesh` at the cursors and records its draw command
    fn pack(
        &mut self,
        light: LightId,
        mesh: &LightMesh,
        scale: f32,
    ) -> Result<(), BufferOverflowError> {
        let (vertex_end, index_end) =
            self.reserve(light, self.vertex_count, self.index_count, mesh)?;
        write_mesh(
            &mut self.vertices[self.vertex_count..vertex_end],
            &mut self.indices[self.index_count..index_end],
            mesh,
            self.vertex_count,
            scale,
        );
        self.commands.push(DrawCommand {
            topology: mesh.topology,
            count: mesh.indices.len(),
            offset: self.index_count,
        });
        self.vertex_count = vertex_end;
        self.index_count = index_end;
        Ok(())
    }
}

/// Copies a mesh into its reserved ranges, scaling positions and rebasing indices
fn write_mesh(
    vertices: &mut [LightVertex],
    indices: &mut [u32],
    mesh: &LightMesh,
    base_vertex: usize,
    scale: f32,
) {
    debug_assert_eq!(vertices.len(), mesh.vertices.len());
    debug_assert_eq!(indices.len(), mesh.indices.len());
    for (dst, src) in vertices.iter_mut().zip(&mesh.vertices) {
        *dst = src.scaled(scale);
    }
    let base_vertex = base_vertex as u32;
    for (dst, src) in indices.iter_mut().zip(&mesh.indices) {
        *dst = src + base_vertex;
    }
}

/* ======================================
 * Ray handler
 * ====================================== */

/// Builds a [`RayHandler`]
pub struct RayHandlerBuilder {
    capacity: usize,
    scale: f32,
    culling_rect: Option<Rect>,
}

impl Default for RayHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RayHandlerBuilder {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            scale: 1.0,
            culling_rect: None,
        }
    }
    /// Maximum vertices packed per frame. Room for three times as many indices is made.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
    /// Packed vertex positions are multiplied by this to go from world to render space
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
    /// Positional lights that can not reach this rect are skipped
    pub fn culling_rect(mut self, culling_rect: Rect) -> Self {
        self.culling_rect = Some(culling_rect);
        self
    }
    pub fn build(self) -> RayHandler {
        RayHandler {
            lights: Vec::new(),
            buffers: LightBuffers::with_capacity(self.capacity),
            scale: self.scale,
            culling_rect: self.culling_rect,
        }
    }
}

/// Owns every light and the flat buffers their meshes are packed into
#[derive(Resource, Debug, Clone)]
pub struct RayHandler {
    lights: Vec<LightSource>,
    buffers: LightBuffers,
    scale: f32,
    culling_rect: Option<Rect>,
}

impl Default for RayHandler {
    fn default() -> Self {
        RayHandlerBuilder::new().build()
    }
}

/// Lights that take part in this frame
fn is_visible(light: &LightSource, culling_rect: Option<Rect>) -> bool {
    light.is_active() && culling_rect.map_or(true, |rect| light.intersects(rect))
}

impl RayHandler {
    /// Registers a light, calculating its mesh right away against `world` and
    /// packing it after the lights already packed this frame.
    /// A light that does not fit is not registered.
    pub fn add_light<W>(
        &mut self,
        mut light: LightSource,
        world: &W,
    ) -> Result<LightId, BufferOverflowError>
    where
        W: GeometryQuery + ?Sized,
    {
        let id = LightId(self.lights.len());
        light.calculate_light_mesh(world);
        if is_visible(&light, self.culling_rect) {
            self.buffers.pack(id, light.get_mesh(), self.scale)?;
        }
        debug!("Registered {} as {:?}", light, id);
        self.lights.push(light);
        Ok(id)
    }

    pub fn add_point_light<W>(
        &mut self,
        position: Vec2,
        num_rays: usize,
        radius: f32,
        world: &W,
    ) -> Result<LightId, BufferOverflowError>
    where
        W: GeometryQuery + ?Sized,
    {
        self.add_light(LightSource::point(position, num_rays, radius), world)
    }

    /// `direction` and `cone_degree` are in degrees
    pub fn add_cone_light<W>(
        &mut self,
        position: Vec2,
        num_rays: usize,
        radius: f32,
        direction: f32,
        cone_degree: f32,
        world: &W,
    ) -> Result<LightId, BufferOverflowError>
    where
        W: GeometryQuery + ?Sized,
    {
        self.add_light(
            LightSource::cone(position, num_rays, radius, direction, cone_degree),
            world,
        )
    }

    /// `direction` is in degrees
    pub fn add_directional_light<W>(
        &mut self,
        num_rays: usize,
        direction: f32,
        world: &W,
    ) -> Result<LightId, BufferOverflowError>
    where
        W: GeometryQuery + ?Sized,
    {
        self.add_light(LightSource::directional(num_rays, direction), world)
    }

    /// Updates every visible light in order and packs it from the start of the buffers.
    /// Stops at the first light that does not fit; the lights before it stay drawable.
    pub fn update<W>(&mut self, delta_seconds: f32, world: &W) -> Result<(), BufferOverflowError>
    where
        W: GeometryQuery + ?Sized,
    {
        let culling_rect = self.culling_rect;
        self.buffers.reset();
        for (i, light) in self.lights.iter_mut().enumerate() {
            if !is_visible(light, culling_rect) {
                continue;
            }
            light.update(delta_seconds, world);
            self.buffers.pack(LightId(i), light.get_mesh(), self.scale)?;
        }
        Ok(())
    }

    /// Same buffers and draw commands as [`RayHandler::update`], computed in parallel.
    ///
    /// Lights are updated in parallel first. A prefix sum over their mesh sizes then
    /// gives every light its own disjoint range of the buffers, which are filled in
    /// parallel. On overflow every visible light has still been updated, but only the
    /// lights before the overflowing one are packed.
    pub fn update_parallel<W>(
        &mut self,
        delta_seconds: f32,
        world: &W,
    ) -> Result<(), BufferOverflowError>
    where
        W: GeometryQuery + Sync + ?Sized,
    {
        let culling_rect = self.culling_rect;
        let scale = self.scale;
        self.buffers.reset();

        self.lights
            .par_iter_mut()
            .filter(|light| is_visible(light, culling_rect))
            .for_each(|light| light.update(delta_seconds, world));

        // Reserve
        let buffers = &self.buffers;
        let mut packed: Vec<&LightMesh> = Vec::new();
        let mut commands = Vec::new();
        let mut overflow = None;
        let (mut vertex_count, mut index_count) = (0, 0);
        for (i, light) in self.lights.iter().enumerate() {
            if !is_visible(light, culling_rect) {
                continue;
            }
            let mesh = light.get_mesh();
            match buffers.reserve(LightId(i), vertex_count, index_count, mesh) {
                Ok((vertex_end, index_end)) => {
                    commands.push(DrawCommand {
                        topology: mesh.topology,
                        count: mesh.indices.len(),
                        offset: index_count,
                    });
                    packed.push(mesh);
                    vertex_count = vertex_end;
                    index_count = index_end;
                }
                Err(err) => {
                    overflow = Some(err);
                    break;
                }
            }
        }

        // Fill
        let mut vertex_rest = &mut self.buffers.vertices[..vertex_count];
        let mut index_rest = &mut self.buffers.indices[..index_count];
        let mut jobs = Vec::with_capacity(packed.len());
        let mut base_vertex = 0;
        for mesh in packed {
            let (vertices, rest) =
                std::mem::take(&mut vertex_rest).split_at_mut(mesh.vertices.len());
            vertex_rest = rest;
            let (indices, rest) = std::mem::take(&mut index_rest).split_at_mut(mesh.indices.len());
            index_rest = rest;
            jobs.push((vertices, indices, mesh, base_vertex));
            base_vertex += mesh.vertices.len();
        }
        jobs.into_par_iter()
            .for_each(|(vertices, indices, mesh, base_vertex)| {
                write_mesh(vertices, indices, mesh, base_vertex, scale);
            });

        self.buffers.vertex_count = vertex_count;
        self.buffers.index_count = index_count;
        self.buffers.commands = commands;
        match overflow {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Uploads the packed buffers and issues one draw per packed light, in packing order
    pub fn draw<R: LightRenderer + ?Sized>(&self, renderer: &mut R) {
        renderer.load_vertex_data(self.get_vertex_data());
        renderer.load_index_data(self.get_index_data());
        for command in &self.buffers.commands {
            renderer.draw(command.topology, command.count, command.offset);
        }
    }

    /// True if any active light lights up the point
    pub fn is_lit(&self, point: Vec2) -> bool {
        self.lights
            .iter()
            .any(|light| light.is_active() && light.contains(point))
    }
}

/* ======================================
 * Getters and setters
 * ====================================== */
impl RayHandler {
    pub fn get_light(&self, id: LightId) -> Option<&LightSource> {
        self.lights.get(id.0)
    }
    /// Changes made through this take effect on the next update
    pub fn get_light_mut(&mut self, id: LightId) -> Option<&mut LightSource> {
        self.lights.get_mut(id.0)
    }
    pub fn try_get_light(&self, id: LightId) -> Result<&LightSource, LightNotFoundError> {
        self.get_light(id).ok_or(LightNotFoundError(id))
    }
    pub fn try_get_light_mut(
        &mut self,
        id: LightId,
    ) -> Result<&mut LightSource, LightNotFoundError> {
        self.get_light_mut(id).ok_or(LightNotFoundError(id))
    }
    pub fn iter_lights(&self) -> impl Iterator<Item = (LightId, &LightSource)> {
        self.lights
            .iter()
            .enumerate()
            .map(|(i, light)| (LightId(i), light))
    }
    pub fn len(&self) -> usize {
        self.lights.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
    /// The vertices packed so far this frame
    pub fn get_vertex_data(&self) -> &[LightVertex] {
        &self.buffers.vertices[..self.buffers.vertex_count]
    }
    /// The indices packed so far this frame
    pub fn get_index_data(&self) -> &[u32] {
        &self.buffers.indices[..self.buffers.index_count]
    }
    pub fn get_vertex_count(&self) -> usize {
        self.buffers.vertex_count
    }
    pub fn get_index_count(&self) -> usize {
        self.buffers.index_count
    }
    /// One command per light packed this frame
    pub fn draw_commands(&self) -> &[DrawCommand] {
        &self.buffers.commands
    }
    pub fn get_vertex_capacity(&self) -> usize {
        self.buffers.vertices.len()
    }
    pub fn get_index_capacity(&self) -> usize {
        self.buffers.indices.len()
    }
    pub fn get_scale(&self) -> f32 {
        self.scale
    }
    /// Takes effect on the next update
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }
    pub fn get_culling_rect(&self) -> Option<Rect> {
        self.culling_rect
    }
    /// Takes effect on the next update
    pub fn set_culling_rect(&mut self, culling_rect: Option<Rect>) {
        self.culling_rect = culling_rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::light::builder::LightSourceBuilder;
    use crate::physics::light::geometry::ObstructionId;
    use crate::physics::light::occluders::{Occluder, OccluderWorld};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Keeps a copy of everything the handler hands it
    #[derive(Default)]
    struct RecordingRenderer {
        vertices: Vec<LightVertex>,
        indices: Vec<u32>,
        draws: Vec<(Topology, usize, usize)>,
    }

    impl LightRenderer for RecordingRenderer {
        fn load_vertex_data(&mut self, vertices: &[LightVertex]) {
            self.vertices = vertices.to_vec();
        }
        fn load_index_data(&mut self, indices: &[u32]) {
            self.indices = indices.to_vec();
        }
        fn draw(&mut self, topology: Topology, count: usize, offset: usize) {
            self.draws.push((topology, count, offset));
        }
    }

    fn world() -> OccluderWorld {
        OccluderWorld::new(Rect::new(-50.0, -50.0, 50.0, 50.0))
    }

    /// A point light with 4 rays, a cone with 10 and a directional light with 6
    fn mixed_handler(world: &OccluderWorld) -> RayHandler {
        let mut handler = RayHandler::default();
        handler.add_point_light(Vec2::ZERO, 4, 10.0, world).unwrap();
        handler
            .add_cone_light(Vec2::new(5.0, 5.0), 10, 8.0, 45.0, 30.0, world)
            .unwrap();
        handler.add_directional_light(6, 30.0, world).unwrap();
        handler
    }

    #[test]
    fn test_add_packs_immediately() {
        let world = world();
        let handler = mixed_handler(&world);
        assert_eq!(handler.len(), 3);
        // 5 + 11 + 12
        assert_eq!(handler.get_vertex_count(), 28);
        assert_eq!(handler.get_index_count(), 28);
        assert_eq!(
            handler.draw_commands(),
            &[
                DrawCommand {
                    topology: Topology::Fan,
                    count: 5,
                    offset: 0,
                },
                DrawCommand {
                    topology: Topology::Fan,
                    count: 11,
                    offset: 5,
                },
                DrawCommand {
                    topology: Topology::Strip,
                    count: 12,
                    offset: 16,
                },
            ]
        );
    }

    #[test]
    fn test_indices_address_shared_buffer() {
        let world = world();
        let handler = mixed_handler(&world);
        let indices = handler.get_index_data();
        assert_eq!(&indices[..5], &[0, 1, 2, 3, 4]);
        assert_eq!(indices[5], 5);
        assert_eq!(indices[15], 15);
        assert_eq!(&indices[16..], &(16..28).collect::<Vec<u32>>()[..]);
        // The cone's centroid sits at its anchor
        assert_eq!(handler.get_vertex_data()[5].position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_update_repacks_from_start() {
        let world = world();
        let mut handler = mixed_handler(&world);
        let before = handler.get_index_data().to_vec();
        handler.update(0.016, &world).unwrap();
        handler.update(0.016, &world).unwrap();
        assert_eq!(handler.get_vertex_count(), 28);
        assert_eq!(handler.get_index_data(), before.as_slice());
        assert_eq!(handler.draw_commands().len(), 3);
    }

    #[test]
    fn test_draw_matches_packing() {
        let world = world();
        let mut handler = mixed_handler(&world);
        handler.update(0.016, &world).unwrap();
        let mut renderer = RecordingRenderer::default();
        handler.draw(&mut renderer);
        assert_eq!(renderer.vertices.len(), 28);
        assert_eq!(renderer.indices.len(), 28);
        assert_eq!(
            renderer.draws,
            vec![
                (Topology::Fan, 5, 0),
                (Topology::Fan, 11, 5),
                (Topology::Strip, 12, 16),
            ]
        );
    }

    #[test]
    fn test_scale() {
        let world = world();
        let mut handler = RayHandlerBuilder::new().scale(0.5).build();
        handler
            .add_point_light(Vec2::new(4.0, 2.0), 4, 10.0, &world)
            .unwrap();
        let vertices = handler.get_vertex_data();
        assert_eq!(vertices[0].position, Vec2::new(2.0, 1.0));
        assert!((vertices[1].position - Vec2::new(7.0, 1.0)).length() < 1e-4);
        // The light itself keeps world coordinates
        let light = handler.get_light(LightId(0)).unwrap();
        assert_eq!(light.get_mesh().vertices[0].position, Vec2::new(4.0, 2.0));
    }

    #[test]
    fn test_add_overflow_is_not_registered() {
        let world = world();
        let mut handler = RayHandlerBuilder::new().capacity(10).build();
        assert_eq!(handler.get_index_capacity(), 30);
        handler
            .add_point_light(Vec2::ZERO, 4, 10.0, &world)
            .unwrap();
        let err = handler
            .add_point_light(Vec2::ZERO, 10, 10.0, &world)
            .unwrap_err();
        assert_eq!(err.light, LightId(1));
        assert_eq!(err.required_vertices, 16);
        assert_eq!(err.vertex_capacity, 10);
        assert_eq!(handler.len(), 1);
        assert_eq!(handler.get_vertex_count(), 5);
        assert_eq!(handler.draw_commands().len(), 1);
    }

    #[test]
    fn test_update_overflow_keeps_earlier_lights() {
        let world = world();
        let mut handler = RayHandlerBuilder::new().capacity(20).build();
        let first = handler
            .add_point_light(Vec2::ZERO, 4, 10.0, &world)
            .unwrap();
        handler.add_point_light(Vec2::ONE, 4, 10.0, &world).unwrap();
        handler
            .add_point_light(Vec2::NEG_ONE, 4, 10.0, &world)
            .unwrap();

        handler.get_light_mut(first).unwrap().set_num_rays(12);
        let err = handler.update(0.016, &world).unwrap_err();
        // 13 + 5 fits, 13 + 5 + 5 does not
        assert_eq!(err.light, LightId(2));
        assert_eq!(err.required_vertices, 23);
        assert_eq!(handler.get_vertex_count(), 18);
        assert_eq!(
            handler.draw_commands(),
            &[
                DrawCommand {
                    topology: Topology::Fan,
                    count: 13,
                    offset: 0,
                },
                DrawCommand {
                    topology: Topology::Fan,
                    count: 5,
                    offset: 13,
                },
            ]
        );
    }

    #[test]
    fn test_inactive_lights_are_skipped() {
        let world = world();
        let mut handler = mixed_handler(&world);
        handler.get_light_mut(LightId(1)).unwrap().set_active(false);
        handler.update(0.016, &world).unwrap();
        assert_eq!(handler.get_vertex_count(), 17);
        assert_eq!(
            handler.draw_commands(),
            &[
                DrawCommand {
                    topology: Topology::Fan,
                    count: 5,
                    offset: 0,
                },
                DrawCommand {
                    topology: Topology::Strip,
                    count: 12,
                    offset: 5,
                },
            ]
        );

        let inactive = LightSourceBuilder::new()
            .num_rays(8)
            .active(false)
            .build_point(Vec2::ZERO, 3.0);
        handler.add_light(inactive, &world).unwrap();
        assert_eq!(handler.len(), 4);
        assert_eq!(handler.get_vertex_count(), 17);
    }

    #[test]
    fn test_culling() {
        let world = world();
        let mut handler = RayHandlerBuilder::new()
            .culling_rect(Rect::new(-10.0, -10.0, 10.0, 10.0))
            .build();
        handler.add_point_light(Vec2::ZERO, 4, 5.0, &world).unwrap();
        handler
            .add_point_light(Vec2::new(40.0, 40.0), 4, 5.0, &world)
            .unwrap();
        handler.add_directional_light(4, 0.0, &world).unwrap();
        assert_eq!(handler.draw_commands().len(), 2);
        assert_eq!(handler.get_vertex_count(), 5 + 8);

        handler.set_culling_rect(None);
        handler.update(0.016, &world).unwrap();
        assert_eq!(handler.draw_commands().len(), 3);
    }

    #[test]
    fn test_is_lit() {
        let world = world().with(
            ObstructionId(1),
            Occluder::Segment {
                start: Vec2::new(3.0, -2.0),
                end: Vec2::new(3.0, 2.0),
            },
        );
        let mut handler = RayHandler::default();
        let id = handler
            .add_point_light(Vec2::ZERO, 200, 10.0, &world)
            .unwrap();
        assert!(handler.is_lit(Vec2::new(1.0, 0.5)));
        assert!(!handler.is_lit(Vec2::new(6.0, 0.5)));
        assert!(!handler.is_lit(Vec2::new(20.0, 0.0)));

        handler.get_light_mut(id).unwrap().set_active(false);
        assert!(!handler.is_lit(Vec2::new(1.0, 0.5)));
    }

    #[test]
    fn test_lookup() {
        let world = world();
        let mut handler = mixed_handler(&world);
        let directional = handler.try_get_light(LightId(2)).unwrap();
        assert!(directional.get_position().is_none());
        assert_eq!(
            handler.try_get_light(LightId(5)).unwrap_err(),
            LightNotFoundError(LightId(5))
        );
        assert!(handler.try_get_light_mut(LightId(3)).is_err());
        let ids: Vec<LightId> = handler.iter_lights().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![LightId(0), LightId(1), LightId(2)]);
        assert_eq!(LightId::from(2usize), LightId(2));
    }

    fn random_world(rng: &mut StdRng) -> OccluderWorld {
        let mut world = world();
        for i in 0..20 {
            let center = Vec2::new(rng.gen_range(-45.0..45.0), rng.gen_range(-45.0..45.0));
            let occluder = match i % 3 {
                0 => Occluder::Circle {
                    center,
                    radius: rng.gen_range(0.5..3.0),
                },
                1 => Occluder::Segment {
                    start: center,
                    end: center + Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)),
                },
                _ => Occluder::Box(Rect::from_center_size(center, Vec2::splat(2.0))),
            };
            world.add(ObstructionId(i), occluder);
        }
        world
    }

    fn random_handler(rng: &mut StdRng, world: &OccluderWorld, capacity: usize) -> RayHandler {
        let mut handler = RayHandlerBuilder::new()
            .capacity(capacity)
            .scale(2.0)
            .build();
        for _ in 0..12 {
            let position = Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
            let light = match rng.gen_range(0..3) {
                0 => LightSource::point(position, rng.gen_range(3..60), rng.gen_range(1.0..20.0)),
                1 => LightSource::cone(
                    position,
                    rng.gen_range(3..60),
                    rng.gen_range(1.0..20.0),
                    rng.gen_range(0.0..360.0),
                    rng.gen_range(10.0..120.0),
                ),
                _ => LightSource::directional(rng.gen_range(3..60), rng.gen_range(0.0..360.0)),
            };
            // Overflow while adding is fine, the light is just not registered
            let _ = handler.add_light(light, world);
        }
        handler
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(7);
        let world = random_world(&mut rng);
        let mut sequential = random_handler(&mut rng, &world, DEFAULT_CAPACITY);
        let mut parallel = sequential.clone();

        sequential.update(0.016, &world).unwrap();
        parallel.update_parallel(0.016, &world).unwrap();
        assert_eq!(sequential.get_vertex_data(), parallel.get_vertex_data());
        assert_eq!(sequential.get_index_data(), parallel.get_index_data());
        assert_eq!(sequential.draw_commands(), parallel.draw_commands());
    }

    #[test]
    fn test_parallel_overflow_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(11);
        let world = random_world(&mut rng);
        let mut sequential = random_handler(&mut rng, &world, DEFAULT_CAPACITY);
        for light in sequential.lights.iter_mut() {
            light.set_num_rays(1000);
        }
        let mut parallel = sequential.clone();

        let seq_err = sequential.update(0.016, &world).unwrap_err();
        let par_err = parallel.update_parallel(0.016, &world).unwrap_err();
        assert_eq!(seq_err, par_err);
        assert_eq!(sequential.get_vertex_data(), parallel.get_vertex_data());
        assert_eq!(sequential.draw_commands(), parallel.draw_commands());
    }

    /// A positional light always lights its own anchor
    #[test]
    fn test_random_lights_contain_their_anchor() {
        let mut rng = StdRng::seed_from_u64(3);
        let world = random_world(&mut rng);
        let handler = random_handler(&mut rng, &world, DEFAULT_CAPACITY);
        for (_, light) in handler.iter_lights() {
            if let Some(position) = light.get_position() {
                if light.get_radius().unwrap_or(0.0) > 0.0 {
                    assert!(handler.is_lit(position));
                }
            }
        }
    }
}
