//! Kinematics and collision seam
//!
//! The simulation owns every `Body` and hands it to a `Kinematics` backend
//! once per step. The backend integrates velocity, resolves the body against
//! solid geometry, and refreshes the body's blocked flags. Overlap and
//! touching queries are answered by the same backend so a different physics
//! implementation can be dropped in without touching gameplay code.
//!
//! Coordinates are pixels with y pointing down.

use glam::Vec2;

/// Axis-aligned box stored as center + half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    /// Box centered at `center` with full `size`
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Strict overlap (shared edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a0, a1) = (self.min(), self.max());
        let (b0, b1) = (other.min(), other.max());
        a0.x < b1.x && a1.x > b0.x && a0.y < b1.y && a1.y > b0.y
    }

    pub fn expanded(&self, by: f32) -> Aabb {
        Aabb {
            center: self.center,
            half: self.half + Vec2::splat(by),
        }
    }
}

/// Which sides of a body are pressed against something solid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Blocked {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// A simulated body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Downward acceleration; `None` disables gravity
    pub gravity: Option<f32>,
    /// Horizontal deceleration (pixels/s²)
    pub drag_x: f32,
    pub max_velocity: Vec2,
    /// Reverse horizontal velocity instead of stopping on walls
    pub bounce_x: bool,
    pub collide_world_bounds: bool,
    /// Disabled bodies neither move nor collide
    pub enabled: bool,
    pub blocked: Blocked,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            gravity: None,
            drag_x: 0.0,
            max_velocity: Vec2::splat(10_000.0),
            bounce_x: false,
            collide_world_bounds: true,
            enabled: true,
            blocked: Blocked::default(),
        }
    }

    pub fn with_gravity(mut self, gravity: Option<f32>) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_max_velocity(mut self, max_velocity: Vec2) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn with_drag_x(mut self, drag_x: f32) -> Self {
        self.drag_x = drag_x;
        self
    }

    pub fn with_world_bounds(mut self, collide: bool) -> Self {
        self.collide_world_bounds = collide;
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Solid geometry a body can be resolved against
pub trait SolidQuery {
    /// Push every solid box that may intersect `area` into `out`
    fn solids_near(&self, area: &Aabb, out: &mut Vec<Aabb>);
    /// World size in pixels
    fn bounds(&self) -> Vec2;
}

/// Physics backend
pub trait Kinematics {
    /// Integrate one body by `dt_ms`, resolving it against `solids` and
    /// refreshing its blocked flags
    fn step(&self, body: &mut Body, solids: &dyn SolidQuery, dt_ms: f32);

    /// Non-solid overlap test
    fn overlaps(&self, a: &Aabb, b: &Aabb) -> bool {
        a.overlaps(b)
    }

    /// Sides of `a` that are in contact with `b`
    fn touching(&self, a: &Aabb, b: &Aabb) -> Blocked;
}

/// Arcade-style backend: gravity, drag, axis-separated AABB resolution
#[derive(Debug, Clone, Copy)]
pub struct ArcadeKinematics {
    /// Distance at which two edges count as touching
    pub contact_tolerance: f32,
}

impl Default for ArcadeKinematics {
    fn default() -> Self {
        Self {
            contact_tolerance: 1.0,
        }
    }
}

impl ArcadeKinematics {
    fn resolve_x(body: &mut Body, solids: &[Aabb]) {
        let moving = body.vel.x;
        for solid in solids {
            if !body.aabb().overlaps(solid) {
                continue;
            }
            if moving > 0.0 {
                body.pos.x = solid.min().x - body.size.x / 2.0;
                body.blocked.right = true;
            } else if moving < 0.0 {
                body.pos.x = solid.max().x + body.size.x / 2.0;
                body.blocked.left = true;
            } else {
                continue;
            }
            body.vel.x = if body.bounce_x { -moving } else { 0.0 };
        }
    }

    fn resolve_y(body: &mut Body, solids: &[Aabb]) {
        let moving = body.vel.y;
        for solid in solids {
            if !body.aabb().overlaps(solid) {
                continue;
            }
            if moving > 0.0 {
                body.pos.y = solid.min().y - body.size.y / 2.0;
                body.blocked.down = true;
            } else if moving < 0.0 {
                body.pos.y = solid.max().y + body.size.y / 2.0;
                body.blocked.up = true;
            } else {
                continue;
            }
            body.vel.y = 0.0;
        }
    }

    fn clamp_to_world(body: &mut Body, bounds: Vec2) {
        let half = body.size / 2.0;
        if body.pos.x - half.x < 0.0 {
            body.pos.x = half.x;
            body.blocked.left = true;
            body.vel.x = if body.bounce_x { body.vel.x.abs() } else { 0.0 };
        } else if body.pos.x + half.x > bounds.x {
            body.pos.x = bounds.x - half.x;
            body.blocked.right = true;
            body.vel.x = if body.bounce_x { -body.vel.x.abs() } else { 0.0 };
        }
        if body.pos.y - half.y < 0.0 {
            body.pos.y = half.y;
            body.blocked.up = true;
            body.vel.y = body.vel.y.max(0.0);
        } else if body.pos.y + half.y > bounds.y {
            body.pos.y = bounds.y - half.y;
            body.blocked.down = true;
            body.vel.y = body.vel.y.min(0.0);
        }
    }
}

impl Kinematics for ArcadeKinematics {
    fn step(&self, body: &mut Body, solids: &dyn SolidQuery, dt_ms: f32) {
        body.blocked = Blocked::default();
        if !body.enabled {
            return;
        }
        let dt = dt_ms / 1000.0;

        if let Some(gravity) = body.gravity {
            body.vel.y += gravity * dt;
        }
        if body.drag_x > 0.0 {
            let drag = body.drag_x * dt;
            body.vel.x = if body.vel.x.abs() <= drag {
                0.0
            } else {
                body.vel.x - drag * body.vel.x.signum()
            };
        }
        body.vel = body.vel.clamp(-body.max_velocity, body.max_velocity);

        let mut near = Vec::new();

        body.pos.x += body.vel.x * dt;
        solids.solids_near(&body.aabb(), &mut near);
        Self::resolve_x(body, &near);

        near.clear();
        body.pos.y += body.vel.y * dt;
        solids.solids_near(&body.aabb(), &mut near);
        Self::resolve_y(body, &near);

        if body.collide_world_bounds {
            Self::clamp_to_world(body, solids.bounds());
        }
    }

    fn touching(&self, a: &Aabb, b: &Aabb) -> Blocked {
        let tol = self.contact_tolerance;
        let (a0, a1) = (a.min(), a.max());
        let (b0, b1) = (b.min(), b.max());
        let horizontal = a0.x < b1.x && a1.x > b0.x;
        let vertical = a0.y < b1.y && a1.y > b0.y;

        Blocked {
            up: horizontal && (a0.y - b1.y).abs() <= tol,
            down: horizontal && (a1.y - b0.y).abs() <= tol,
            left: vertical && (a0.x - b1.x).abs() <= tol,
            right: vertical && (a1.x - b0.x).abs() <= tol,
        }
    }
}
