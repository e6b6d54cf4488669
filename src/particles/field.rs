//! ParticleField - the generative background
//!
//! A bounded set of particles that push each other apart while the pointer is
//! up and swarm towards it while it is held down. Once per musical bar the
//! whole field can be teleported to a new random cluster.
//!
//! The field never fails: a canvas with no area simply holds no particles,
//! and coincident particles are kept finite with a small epsilon.

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::Particle;

pub const MIN_PARTICLES: usize = 25;
pub const MAX_PARTICLES: usize = 100;

/// Tunable physics constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Distance under which particles repel
    pub repulse_radius: f32,
    pub repulsion_strength: f32,
    /// Distance under which the pointer pulls at full strength
    pub attract_radius: f32,
    pub attract_strength: f32,
    /// Fraction of `attract_strength` applied beyond `attract_radius`
    pub distant_pull: f32,
    /// Width of the uniform jitter added per axis in repulsion mode
    pub noise_strength: f32,
    /// Added before dividing by a distance
    pub epsilon: f32,
    /// Velocity range per axis for freshly spawned particles
    pub spawn_speed: f32,
    /// Velocity range per axis after a teleport
    pub teleport_speed: f32,
    /// Cluster size after a teleport, as a fraction of the short canvas side
    pub teleport_spread: f32,
    /// Minimum distance from the walls for a teleport centre
    pub teleport_margin: f32,
    /// Same margin as a fraction of the canvas size (the larger one wins)
    pub teleport_margin_fraction: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            repulse_radius: 60.0,
            repulsion_strength: 1300.0,
            attract_radius: 400.0,
            attract_strength: 1000.0,
            distant_pull: 0.02,
            noise_strength: 60.0,
            epsilon: 1e-6,
            spawn_speed: 60.0,
            teleport_speed: 80.0,
            teleport_spread: 0.12,
            teleport_margin: 80.0,
            teleport_margin_fraction: 0.08,
            min_radius: 2.0,
            max_radius: 5.0,
        }
    }
}

/// Pointer position in canvas coordinates and whether it is held down
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, pressed: false }
    }

    pub fn press(&mut self, x: f32, y: f32) {
        self.move_to(x, y);
        self.pressed = true;
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    params: PhysicsParams,
    rng: SmallRng,
    /// Particle count to spawn once the canvas has an area
    target_count: usize,
}

impl ParticleField {
    /// Create a field; particles are spawned as soon as the canvas has an area
    ///
    /// `count` is clamped to `1..=MAX_PARTICLES`; `None` picks a random count
    /// between `MIN_PARTICLES` and `MAX_PARTICLES`.
    pub fn new(width: f32, height: f32, count: Option<usize>, mut rng: SmallRng) -> Self {
        let target_count = match count {
            Some(count) => count.clamp(1, MAX_PARTICLES),
            None => rng.gen_range(MIN_PARTICLES..=MAX_PARTICLES),
        };

        let mut field = Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            width: 0.0,
            height: 0.0,
            params: PhysicsParams::default(),
            rng,
            target_count,
        };
        field.resize(width, height);
        field
    }

    /// Deterministic field for a given seed
    pub fn seeded(width: f32, height: f32, count: Option<usize>, seed: u64) -> Self {
        Self::new(width, height, count, SmallRng::seed_from_u64(seed))
    }

    pub fn with_params(mut self, params: PhysicsParams) -> Self {
        self.params = params;
        self
    }

    fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Change the canvas size
    ///
    /// Spawns the particles the first time the canvas becomes usable; existing
    /// particles are pushed back inside the new walls.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;

        if !self.has_area() {
            return;
        }

        if self.particles.is_empty() {
            self.spawn(self.target_count);
        } else {
            for particle in &mut self.particles {
                particle.bounce(width, height);
            }
        }
    }

    fn spawn(&mut self, count: usize) {
        let PhysicsParams {
            min_radius,
            max_radius,
            spawn_speed,
            ..
        } = self.params;

        for _ in 0..count {
            let x = self.rng.gen::<f32>() * self.width;
            let y = self.rng.gen::<f32>() * self.height;
            let radius = min_radius + self.rng.gen::<f32>() * (max_radius - min_radius);
            let vx = (self.rng.gen::<f32>() - 0.5) * spawn_speed;
            let vy = (self.rng.gen::<f32>() - 0.5) * spawn_speed;
            self.particles.push(Particle::new(x, y, radius).with_velocity(vx, vy));
        }
        tracing::debug!(count, width = self.width, height = self.height, "spawned particles");
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32, pointer: &PointerState) {
        if !self.has_area() || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        if pointer.pressed {
            self.attract(dt, pointer);
        } else {
            self.repel(dt);
        }

        for particle in &mut self.particles {
            particle.integrate(dt, self.width, self.height);
        }
    }

    /// Pairwise repulsion plus jitter (O(n^2), n <= MAX_PARTICLES)
    fn repel(&mut self, dt: f32) {
        let PhysicsParams {
            repulse_radius,
            repulsion_strength,
            noise_strength,
            epsilon,
            ..
        } = self.params;

        for i in 0..self.particles.len() {
            let pi = self.particles[i];
            let (mut ax, mut ay) = (0.0f32, 0.0f32);

            for (j, pj) in self.particles.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dx = pi.x - pj.x;
                let dy = pi.y - pj.y;
                let dist2 = dx * dx + dy * dy + epsilon;
                let dist = dist2.sqrt();

                if dist < repulse_radius {
                    let push = (1.0 - dist / repulse_radius) * (repulsion_strength / dist2);
                    ax += (dx / dist) * push;
                    ay += (dy / dist) * push;
                }
            }

            ax += (self.rng.gen::<f32>() - 0.5) * noise_strength;
            ay += (self.rng.gen::<f32>() - 0.5) * noise_strength;
            self.particles[i].apply_force(ax, ay, dt);
        }
    }

    /// Pull every particle towards the pointer
    fn attract(&mut self, dt: f32, pointer: &PointerState) {
        let PhysicsParams {
            attract_radius,
            attract_strength,
            distant_pull,
            epsilon,
            ..
        } = self.params;

        for particle in &mut self.particles {
            let dx = pointer.x - particle.x;
            let dy = pointer.y - particle.y;
            let dist = dx.hypot(dy) + epsilon;

            let strength = if dist < attract_radius {
                attract_strength * (1.0 - dist / attract_radius)
            } else {
                attract_strength * distant_pull
            };
            particle.apply_force((dx / dist) * strength, (dy / dist) * strength, dt);
        }
    }

    /// Move every particle to a fresh random cluster away from the walls
    pub fn teleport(&mut self) {
        if !self.has_area() {
            return;
        }

        let params = self.params;
        let margin_x = params.teleport_margin.max(self.width * params.teleport_margin_fraction);
        let margin_y = params.teleport_margin.max(self.height * params.teleport_margin_fraction);

        let cx = pick_centre(&mut self.rng, self.width, margin_x);
        let cy = pick_centre(&mut self.rng, self.height, margin_y);
        let spread = self.width.min(self.height) * params.teleport_spread;

        tracing::trace!(cx, cy, spread, "teleport");
        self.teleport_to(cx, cy, spread);
    }

    /// Place every particle within `spread` of `(cx, cy)` and reseed velocities
    pub fn teleport_to(&mut self, cx: f32, cy: f32, spread: f32) {
        let speed = self.params.teleport_speed;
        for particle in &mut self.particles {
            particle.x = cx + (self.rng.gen::<f32>() - 0.5) * spread;
            particle.y = cy + (self.rng.gen::<f32>() - 0.5) * spread;
            particle.vx = (self.rng.gen::<f32>() - 0.5) * speed;
            particle.vy = (self.rng.gen::<f32>() - 0.5) * speed;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }
}

/// Random coordinate in `[margin, extent - margin]`, or the middle if that is empty
fn pick_centre(rng: &mut SmallRng, extent: f32, margin: f32) -> f32 {
    let room = extent - 2.0 * margin;
    if room > 0.0 {
        margin + rng.gen::<f32>() * room
    } else {
        extent / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::particle::DAMPING;

    const W: f32 = 1280.0;
    const H: f32 = 720.0;

    fn quiet() -> PhysicsParams {
        PhysicsParams {
            noise_strength: 0.0,
            ..PhysicsParams::default()
        }
    }

    /// Field with hand-placed particles at rest
    fn field_with(points: &[(f32, f32)]) -> ParticleField {
        let mut field = ParticleField::seeded(W, H, Some(points.len()), 1).with_params(quiet());
        for (particle, &(x, y)) in field.particles.iter_mut().zip(points) {
            *particle = Particle::new(x, y, 3.0);
        }
        field
    }

    #[test]
    fn test_spawn_count_and_bounds() {
        let field = ParticleField::seeded(W, H, None, 42);
        assert!((MIN_PARTICLES..=MAX_PARTICLES).contains(&field.len()));
        for p in field.particles() {
            assert!(p.x >= 0.0 && p.x <= W);
            assert!(p.y >= 0.0 && p.y <= H);
            assert!(p.radius >= 2.0 && p.radius < 5.0);
            assert!(p.vx.abs() <= 30.0 && p.vy.abs() <= 30.0);
        }
    }

    #[test]
    fn test_explicit_count_is_clamped() {
        assert_eq!(ParticleField::seeded(W, H, Some(500), 1).len(), MAX_PARTICLES);
        assert_eq!(ParticleField::seeded(W, H, Some(0), 1).len(), 1);
    }

    #[test]
    fn test_zero_canvas_degrades_to_nothing() {
        let mut field = ParticleField::seeded(0.0, 0.0, Some(10), 1);
        let pointer = PointerState::default();

        field.step(0.016, &pointer);
        field.teleport();
        assert!(field.is_empty());

        // Spawns once the canvas gets an area
        field.resize(W, H);
        assert_eq!(field.len(), 10);
    }

    #[test]
    fn test_same_seed_same_motion() {
        let mut a = ParticleField::seeded(W, H, None, 9);
        let mut b = ParticleField::seeded(W, H, None, 9);
        let pointer = PointerState::default();

        for _ in 0..30 {
            a.step(1.0 / 60.0, &pointer);
            b.step(1.0 / 60.0, &pointer);
        }
        a.teleport();
        b.teleport();

        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_lone_particle_decays_geometrically() {
        let mut field = field_with(&[(640.0, 360.0)]);
        field.particles[0].vx = 50.0;
        field.particles[0].vy = -20.0;
        let pointer = PointerState::default();

        let frames = 200;
        for _ in 0..frames {
            field.step(0.001, &pointer);
        }

        let expected = DAMPING.powi(frames);
        let p = field.particles()[0];
        assert!((p.vx - 50.0 * expected).abs() < 1e-3, "vx {}", p.vx);
        assert!((p.vy + 20.0 * expected).abs() < 1e-3, "vy {}", p.vy);
    }

    #[test]
    fn test_close_particles_repel_symmetrically() {
        let mut field = field_with(&[(600.0, 360.0), (610.0, 360.0)]);
        field.step(0.01, &PointerState::default());

        let [left, right] = [field.particles()[0], field.particles()[1]];
        assert!(left.vx < 0.0);
        assert!(right.vx > 0.0);
        assert!((left.vx + right.vx).abs() < 1e-4);
        assert_eq!(left.vy, 0.0);
    }

    #[test]
    fn test_distant_particles_ignore_each_other() {
        let mut field = field_with(&[(100.0, 100.0), (1000.0, 600.0)]);
        field.step(0.01, &PointerState::default());

        for p in field.particles() {
            assert_eq!((p.vx, p.vy), (0.0, 0.0));
        }
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let mut field = field_with(&[(300.0, 300.0), (300.0, 300.0)]);
        field.step(0.016, &PointerState::default());

        for p in field.particles() {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.vx.is_finite() && p.vy.is_finite());
        }
    }

    #[test]
    fn test_pressed_pointer_attracts() {
        let mut field = field_with(&[(200.0, 360.0), (300.0, 100.0), (1200.0, 700.0)]);
        let mut pointer = PointerState::new(0.0, 0.0);
        pointer.press(640.0, 360.0);

        field.step(0.01, &pointer);

        let [a, b, c] = [field.particles()[0], field.particles()[1], field.particles()[2]];
        assert!(a.vx > 0.0);
        assert!(b.vx > 0.0 && b.vy > 0.0);
        assert!(c.vx < 0.0 && c.vy < 0.0);
    }

    #[test]
    fn test_far_pull_is_weaker_than_near_pull() {
        let mut field = field_with(&[(540.0, 360.0), (10.0, 360.0)]);
        field.resize(5000.0, H);
        let mut pointer = PointerState::default();
        pointer.press(640.0, 360.0);

        field.step(0.01, &pointer);

        let near = field.particles()[0].vx;
        let far = field.particles()[1].vx;
        // Inside the radius: 1000 * (1 - 100/400) = 750; outside: 1000 * 0.02 = 20
        assert!((near - 7.5 * DAMPING).abs() < 1e-2, "near {near}");
        assert!((far - 0.2 * DAMPING).abs() < 1e-3, "far {far}");
    }

    #[test]
    fn test_release_returns_to_repulsion() {
        let mut pointer = PointerState::new(10.0, 10.0);
        pointer.press(20.0, 30.0);
        assert!(pointer.pressed);
        assert_eq!((pointer.x, pointer.y), (20.0, 30.0));
        pointer.release();
        assert!(!pointer.pressed);
    }

    #[test]
    fn test_teleport_clusters_inside_margins() {
        let mut field = ParticleField::seeded(W, H, Some(MAX_PARTICLES), 3);
        field.teleport();

        let spread = H * 0.12;
        let margin_x = 80.0f32.max(W * 0.08);
        let margin_y = 80.0f32.max(H * 0.08);

        let (sum_x, sum_y) = field
            .particles()
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let cx = sum_x / field.len() as f32;
        let cy = sum_y / field.len() as f32;
        assert!(cx > margin_x - spread && cx < W - margin_x + spread);
        assert!(cy > margin_y - spread && cy < H - margin_y + spread);

        for p in field.particles() {
            assert!((p.x - cx).abs() <= spread);
            assert!((p.y - cy).abs() <= spread);
            assert!(p.vx.abs() <= 40.0 && p.vy.abs() <= 40.0);
        }
    }

    #[test]
    fn test_teleport_on_small_canvas_uses_centre() {
        let mut field = ParticleField::seeded(100.0, 100.0, Some(5), 3);
        field.teleport();

        for p in field.particles() {
            assert!((p.x - 50.0).abs() <= 6.0);
            assert!((p.y - 50.0).abs() <= 6.0);
        }
    }

    #[test]
    fn test_resize_keeps_particles_inside() {
        let mut field = ParticleField::seeded(W, H, Some(50), 5);
        field.resize(200.0, 100.0);

        assert_eq!(field.len(), 50);
        for p in field.particles() {
            assert!(p.x >= p.radius && p.x <= 200.0 - p.radius);
            assert!(p.y >= p.radius && p.y <= 100.0 - p.radius);
        }
    }
}
