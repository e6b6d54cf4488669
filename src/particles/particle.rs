/// Maximum speed a particle may reach, in canvas units per second
pub const MAX_SPEED: f32 = 400.0;

/// Fraction of velocity kept (and reversed) when hitting a wall
pub const BOUNCE: f32 = 0.6;

/// Per-frame velocity damping
pub const DAMPING: f32 = 0.995;

/// A point mass with a radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub max_speed: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius,
            max_speed: MAX_SPEED,
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    /// Accelerate by `(ax, ay)` for `dt` seconds, capped at `max_speed`
    pub fn apply_force(&mut self, ax: f32, ay: f32, dt: f32) {
        self.vx += ax * dt;
        self.vy += ay * dt;

        let speed = self.speed();
        if speed > self.max_speed {
            let scale = self.max_speed / speed;
            self.vx *= scale;
            self.vy *= scale;
        }
    }

    /// Move, bounce off the walls of a `width` x `height` canvas, then damp
    pub fn integrate(&mut self, dt: f32, width: f32, height: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.bounce(width, height);
        self.damp(DAMPING);
    }

    /// Clamp to the canvas and reflect the perpendicular velocity (inelastic)
    pub fn bounce(&mut self, width: f32, height: f32) {
        let r = self.radius;

        if self.x < r {
            self.x = r;
            self.vx *= -BOUNCE;
        }
        if self.x > width - r {
            self.x = width - r;
            self.vx *= -BOUNCE;
        }
        if self.y < r {
            self.y = r;
            self.vy *= -BOUNCE;
        }
        if self.y > height - r {
            self.y = height - r;
            self.vy *= -BOUNCE;
        }
    }

    pub fn damp(&mut self, factor: f32) {
        self.vx *= factor;
        self.vy *= factor;
    }
}
