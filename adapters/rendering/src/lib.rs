#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for tower defence adapters.
//!
//! Every position in this crate is expressed in field units: the playfield's
//! top-left corner is the origin and one unit equals one simulated pixel.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};
use tower_defence_core::{EnemyKind, TowerId};

/// Side length of the square drawn for a tower.
pub const TOWER_SIZE: f32 = 20.0;
/// Diameter of the circle drawn for a projectile.
pub const PROJECTILE_DIAMETER: f32 = 10.0;
/// Width of the rectangle drawn for a normal enemy.
pub const ENEMY_WIDTH: f32 = 80.0;
/// Height of the rectangle drawn for a normal enemy.
pub const ENEMY_HEIGHT: f32 = 120.0;
/// Factor applied to the enemy width to obtain the boss side length.
pub const BOSS_SIZE_MULTIPLIER: f32 = 3.0;
/// Height of the boss health bar.
pub const HEALTH_BAR_HEIGHT: f32 = 10.0;
/// Banner shown once both waves have been cleared.
pub const VICTORY_TEXT: &str = "VICTORY!";

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Flat colors used for every shape in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Tower squares.
    pub tower: Color,
    /// Projectile circles.
    pub projectile: Color,
    /// Normal enemy rectangles.
    pub enemy: Color,
    /// Boss square.
    pub boss: Color,
    /// Background of the boss health bar.
    pub health_bar_background: Color,
    /// Filled portion of the boss health bar.
    pub health_bar_fill: Color,
    /// Victory banner text.
    pub victory_text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tower: Color::from_rgb_u8(0, 0, 255),
            projectile: Color::from_rgb_u8(0, 255, 0),
            enemy: Color::from_rgb_u8(255, 0, 0),
            boss: Color::from_rgb_u8(255, 200, 0),
            health_bar_background: Color::from_rgb_u8(0, 0, 0),
            health_bar_fill: Color::from_rgb_u8(0, 255, 0),
            victory_text: Color::from_rgb_u8(0, 0, 0),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Position of a left click inside the playfield, in field units.
    pub click: Option<Vec2>,
}

/// Axis-aligned rectangle expressed in field units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Footprint {
    /// Creates a footprint from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Creates a footprint of `size` centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            origin: center - size * 0.5,
            size,
        }
    }
}

/// Tower rendered as a square centred on its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Tower position in field units.
    pub position: Vec2,
}

impl SceneTower {
    /// Creates a new tower descriptor.
    #[must_use]
    pub const fn new(id: TowerId, position: Vec2) -> Self {
        Self { id, position }
    }

    /// Square occupied by the tower.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::centered(self.position, Vec2::splat(TOWER_SIZE))
    }
}

/// Projectile rendered as a small circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Projectile position in field units.
    pub position: Vec2,
}

impl SceneProjectile {
    /// Creates a new projectile descriptor.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self { position }
    }

    /// Centre of the circle, which is the projectile position itself.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.position
    }
}

/// Enemy of either kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Variant used to pick the shape.
    pub kind: EnemyKind,
    /// Enemy position in field units.
    pub position: Vec2,
    /// Current health.
    pub health: i32,
    /// Maximum health for the kind.
    pub max_health: i32,
}

impl SceneEnemy {
    /// Creates a new enemy descriptor.
    #[must_use]
    pub const fn new(kind: EnemyKind, position: Vec2, health: i32, max_health: i32) -> Self {
        Self {
            kind,
            position,
            health,
            max_health,
        }
    }

    /// Rectangle occupied by the enemy.
    ///
    /// Normal enemies hang from their position; the boss is centred on it.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        match self.kind {
            EnemyKind::Normal => {
                Footprint::new(self.position, Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT))
            }
            EnemyKind::Boss => Footprint::centered(self.position, Vec2::splat(boss_side())),
        }
    }

    /// Health bar drawn under the boss. Normal enemies have none.
    ///
    /// The bar hangs one normal enemy height below the boss position.
    #[must_use]
    pub fn health_bar(&self) -> Option<HealthBar> {
        match self.kind {
            EnemyKind::Normal => None,
            EnemyKind::Boss => {
                let side = boss_side();
                let origin = self.position + Vec2::new(-side * 0.5, ENEMY_HEIGHT);
                Some(HealthBar {
                    background: Footprint::new(origin, Vec2::new(side, HEALTH_BAR_HEIGHT)),
                    fill_width: side * health_ratio(self.health, self.max_health),
                })
            }
        }
    }
}

fn boss_side() -> f32 {
    ENEMY_WIDTH * BOSS_SIZE_MULTIPLIER
}

fn health_ratio(health: i32, max_health: i32) -> f32 {
    if max_health <= 0 {
        return 0.0;
    }
    (health as f32 / max_health as f32).clamp(0.0, 1.0)
}

/// Geometry of a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Full-width background rectangle.
    pub background: Footprint,
    /// Width of the filled portion, clamped to the background width.
    pub fill_width: f32,
}

/// Scene description of a single simulation snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Size of the playfield in field units.
    pub field_size: Vec2,
    /// Towers in placement order.
    pub towers: Vec<SceneTower>,
    /// Projectiles in firing order.
    pub projectiles: Vec<SceneProjectile>,
    /// Enemies followed by the boss when present.
    pub enemies: Vec<SceneEnemy>,
    /// Whether the victory banner should be shown.
    pub victory: bool,
}

impl Scene {
    /// Creates an empty scene for a playfield of the given size.
    pub fn new(field_width: f32, field_height: f32) -> Result<Self, RenderingError> {
        if !(field_width > 0.0 && field_height > 0.0) {
            return Err(RenderingError::InvalidFieldSize {
                width: field_width,
                height: field_height,
            });
        }

        Ok(Self {
            field_size: Vec2::new(field_width, field_height),
            towers: Vec::new(),
            projectiles: Vec::new(),
            enemies: Vec::new(),
            victory: false,
        })
    }

    /// Reports whether a field-space position lies on the playfield.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.field_size.x
            && position.y < self.field_size.y
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Colors of the scene's shapes.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting tower defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and refreshes the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The playfield must have a positive area.
    InvalidFieldSize {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFieldSize { width, height } => {
                write!(f, "field size must be positive (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}
