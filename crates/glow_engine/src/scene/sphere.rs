//! Glowing spheres bouncing inside the polyhedron
//!
//! The pool is allocated once at full capacity. Changing the sphere count
//! only flips `enabled` flags; a slot that becomes enabled again is
//! re-initialized at the origin with a fresh random direction and texture.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::SphereConfig;
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::{shaders, ProgramId, RenderContext, RenderError, RenderResult, UniformValue, VertexArrayId};

/// Two triangles covering `[-1, 1]²`
const QUAD: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// One sphere slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sphere {
    /// Center in world space
    pub pos: Vec3,
    /// Velocity in units per second
    pub vel: Vec3,
    /// Radius
    pub radius: f32,
    /// Whether the slot takes part in simulation and drawing
    pub enabled: bool,
    /// Texture slot sampled by the billboard shader
    pub texture: u32,
}

impl Sphere {
    /// Reset to the origin with a random direction of travel
    pub fn reinitialize<R: Rng + ?Sized>(&mut self, rng: &mut R, radius: f32, speed: f32, texture: u32) {
        self.pos = Vec3::zeros();
        self.vel = random_unit_vector(rng) * speed;
        self.radius = radius;
        self.texture = texture;
    }

    /// Integrate position and bounce off the arena wall
    pub fn update(&mut self, dt: f32, arena_radius: f32) {
        self.pos += self.vel * dt;

        let limit = arena_radius - self.radius;
        let distance = self.pos.norm();
        if distance > limit && distance > 0.0 {
            let normal = self.pos / distance;
            let outward = self.vel.dot(&normal);
            if outward > 0.0 {
                self.vel -= 2.0 * outward * normal;
            }
            self.pos = normal * limit;
        }
    }

    /// Distance from `point` to the center
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        (self.pos - point).norm()
    }

    /// Center and radius packed as `(x, y, z, r)`
    pub fn as_vec4(&self) -> Vec4 {
        Vec4::new(self.pos.x, self.pos.y, self.pos.z, self.radius)
    }
}

/// Uniformly distributed direction, by rejection sampling the unit ball
fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let length_squared = v.norm_squared();
        if length_squared > 1.0e-6 && length_squared <= 1.0 {
            return v / length_squared.sqrt();
        }
    }
}

/// Fixed-capacity sphere pool with its billboard program
#[derive(Debug)]
pub struct SpherePool {
    spheres: Vec<Sphere>,
    textures: Vec<u32>,
    radius: f32,
    speed: f32,
    arena_radius: f32,
    program: ProgramId,
    quad: VertexArrayId,
}

impl SpherePool {
    /// Allocate `config.capacity` disabled slots and upload the billboard quad
    pub fn new(ctx: &mut dyn RenderContext, config: &SphereConfig, textures: Vec<u32>) -> RenderResult<Self> {
        let program = ctx.compile_program(shaders::SPHERE_VERTEX_SOURCE, shaders::SPHERE_FRAGMENT_SOURCE)?;
        let corners = ctx.create_vertex_buffer(2, bytemuck::cast_slice(&QUAD))?;
        let quad = ctx.create_vertex_array(&[(0, corners)])?;

        Ok(Self {
            spheres: vec![Sphere::default(); config.capacity],
            textures,
            radius: config.radius,
            speed: config.speed,
            arena_radius: config.arena_radius,
            program,
            quad,
        })
    }

    /// Enable the first `count` slots and disable the rest
    ///
    /// Slots that were disabled are re-initialized before being enabled.
    /// Returns the number of enabled slots after clamping to capacity.
    pub fn set_count<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> usize {
        let count = count.min(self.spheres.len());
        if count != self.enabled_count() {
            log::debug!("Sphere count set to {} of {}", count, self.spheres.len());
        }

        for (i, sphere) in self.spheres.iter_mut().enumerate() {
            if i >= count {
                sphere.enabled = false;
            } else if !sphere.enabled {
                let texture = self.textures.choose(rng).copied().unwrap_or_default();
                sphere.reinitialize(rng, self.radius, self.speed, texture);
                sphere.enabled = true;
            }
        }
        count
    }

    /// Advance every enabled sphere
    pub fn update(&mut self, dt: f32) {
        for sphere in self.spheres.iter_mut().filter(|s| s.enabled) {
            sphere.update(dt, self.arena_radius);
        }
    }

    /// Bind view and projection on the billboard program
    pub fn upload(&self, ctx: &mut dyn RenderContext, view: &Mat4, projection: &Mat4) -> RenderResult<()> {
        ctx.use_program(self.program)?;
        ctx.set_uniform(self.program, "u_view", UniformValue::Mat4(*view))?;
        ctx.set_uniform(self.program, "u_projection", UniformValue::Mat4(*projection))?;
        Ok(())
    }

    /// Draw the sphere in slot `index` as a textured billboard
    pub fn render_sphere(&self, ctx: &mut dyn RenderContext, index: usize) -> RenderResult<()> {
        let Some(sphere) = self.spheres.get(index).filter(|s| s.enabled) else {
            return Ok(());
        };

        let texture = i32::try_from(sphere.texture).map_err(|_| RenderError::UniformOutOfRange {
            name: "u_texture".to_owned(),
            value: u64::from(sphere.texture),
        })?;
        ctx.use_program(self.program)?;
        ctx.set_uniform(self.program, "u_center", UniformValue::Vec4(sphere.as_vec4()))?;
        ctx.set_uniform(self.program, "u_texture", UniformValue::Int(texture))?;
        ctx.draw_triangles(self.quad, QUAD.len())
    }

    /// All slots, enabled or not
    pub fn slots(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Mutable access to all slots
    pub fn slots_mut(&mut self) -> &mut [Sphere] {
        &mut self.spheres
    }

    /// Enabled spheres with their slot index
    pub fn enabled(&self) -> impl Iterator<Item = (usize, &Sphere)> {
        self.spheres.iter().enumerate().filter(|(_, s)| s.enabled)
    }

    /// Number of enabled slots
    pub fn enabled_count(&self) -> usize {
        self.spheres.iter().filter(|s| s.enabled).count()
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.spheres.len()
    }

    /// Billboard program
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Shared quad vertex array
    pub fn quad(&self) -> VertexArrayId {
        self.quad
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::render::RecordingContext;

    fn pool(capacity: usize) -> (RecordingContext, SpherePool) {
        let mut ctx = RecordingContext::new();
        let config = SphereConfig { capacity, ..SphereConfig::default() };
        let pool = SpherePool::new(&mut ctx, &config, vec![1, 2, 3]).unwrap();
        (ctx, pool)
    }

    #[test]
    fn test_set_count_enables_prefix() {
        let (_ctx, mut pool) = pool(16);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(pool.set_count(3, &mut rng), 3);
        let enabled: Vec<usize> = pool.enabled().map(|(i, _)| i).collect();
        assert_eq!(enabled, vec![0, 1, 2]);

        assert_eq!(pool.set_count(40, &mut rng), 16);
        assert_eq!(pool.enabled_count(), 16);

        pool.set_count(1, &mut rng);
        assert_eq!(pool.enabled_count(), 1);
    }

    #[test]
    fn test_reenabled_slot_is_reinitialized() {
        let (_ctx, mut pool) = pool(4);
        let mut rng = StdRng::seed_from_u64(11);
        pool.set_count(2, &mut rng);
        pool.slots_mut()[0].pos = Vec3::new(1.0, 1.0, 1.0);
        pool.slots_mut()[1].pos = Vec3::new(1.0, 1.0, 1.0);

        // slot 0 stays enabled and keeps its state; slot 1 is recycled
        pool.set_count(1, &mut rng);
        pool.set_count(2, &mut rng);
        assert_eq!(pool.slots()[0].pos, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(pool.slots()[1].pos, Vec3::zeros());

        let sphere = &pool.slots()[1];
        assert_relative_eq!(sphere.vel.norm(), 1.0, epsilon = 1e-5);
        assert!([1, 2, 3].contains(&sphere.texture));
    }

    #[test]
    fn test_spheres_stay_inside_arena() {
        let mut sphere = Sphere {
            vel: Vec3::new(3.0, 0.0, 0.0),
            radius: 1.0,
            enabled: true,
            ..Sphere::default()
        };
        for _ in 0..200 {
            sphere.update(0.05, 6.0);
            assert!(sphere.pos.norm() <= 5.0 + 1e-4);
        }
        assert_relative_eq!(sphere.vel.norm(), 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_disabled_spheres_are_not_drawn() {
        let (mut ctx, mut pool) = pool(4);
        let mut rng = StdRng::seed_from_u64(3);
        pool.set_count(1, &mut rng);
        ctx.take_commands();

        pool.render_sphere(&mut ctx, 2).unwrap();
        assert!(ctx.commands().is_empty());

        pool.render_sphere(&mut ctx, 0).unwrap();
        assert_eq!(ctx.draw_sequence(), vec![pool.quad()]);
    }

    #[test]
    fn test_texture_index_past_i32_is_rejected() {
        let (mut ctx, mut pool) = pool(2);
        let mut rng = StdRng::seed_from_u64(5);
        pool.set_count(1, &mut rng);
        pool.slots_mut()[0].texture = u32::MAX;
        ctx.take_commands();

        let err = pool.render_sphere(&mut ctx, 0).unwrap_err();
        assert_eq!(
            err,
            RenderError::UniformOutOfRange {
                name: "u_texture".to_owned(),
                value: u64::from(u32::MAX),
            }
        );
        assert!(ctx.draw_sequence().is_empty());
    }
}
