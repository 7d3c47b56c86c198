#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the tower defence simulation.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use glam::Vec2;
use log::info;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tower_defence_core::EnemyKind;
use tower_defence_rendering::{
    Color, FrameInput, Palette, Presentation, RenderingBackend, Scene, SceneEnemy,
    SceneProjectile, SceneTower, PROJECTILE_DIAMETER, VICTORY_TEXT,
};

const VICTORY_FONT_SIZE: u16 = 48;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let avg_render = self.render_accum / frames.max(1);

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.render_accum = Duration::ZERO;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_render,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            palette,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.field_size.x.round() as i32,
            window_height: scene.field_size.y.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input(
                    &scene,
                    &metrics,
                    Vec2::new(cursor_x, cursor_y),
                    is_mouse_button_pressed(MouseButton::Left),
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let render_start = Instant::now();
                draw_towers(&scene.towers, &metrics, &palette);
                draw_projectiles(&scene.projectiles, &metrics, &palette);
                draw_enemies(&scene.enemies, &metrics, &palette);
                if scene.victory {
                    draw_victory(scene.field_size, &metrics, &palette);
                }
                let render = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    render,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_render,
                    }) = fps_metrics
                    {
                        info!(
                            "FPS: {:.2} (10s avg: {:.2}) | render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps field units onto the window, preserving the aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let field = scene.field_size;
        let scale = if field.x <= f32::EPSILON || field.y <= f32::EPSILON {
            1.0
        } else {
            (screen_width / field.x).min(screen_height / field.y)
        };

        let offset_x = ((screen_width - field.x * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - field.y * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }

    fn to_field(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        Some(Vec2::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        ))
    }
}

fn gather_frame_input(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    clicked: bool,
) -> FrameInput {
    if !clicked {
        return FrameInput::default();
    }

    let click = metrics
        .to_field(cursor_position)
        .filter(|position| scene.contains(*position));
    FrameInput { click }
}

fn draw_towers(towers: &[SceneTower], metrics: &SceneMetrics, palette: &Palette) {
    let color = to_macroquad_color(palette.tower);
    for tower in towers {
        let footprint = tower.footprint();
        let origin = metrics.to_screen(footprint.origin);
        let size = footprint.size * metrics.scale;
        macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, color);
    }
}

fn draw_projectiles(projectiles: &[SceneProjectile], metrics: &SceneMetrics, palette: &Palette) {
    let color = to_macroquad_color(palette.projectile);
    let radius = PROJECTILE_DIAMETER * 0.5 * metrics.scale;
    for projectile in projectiles {
        let center = metrics.to_screen(projectile.center());
        macroquad::shapes::draw_circle(center.x, center.y, radius, color);
    }
}

fn draw_enemies(enemies: &[SceneEnemy], metrics: &SceneMetrics, palette: &Palette) {
    for enemy in enemies {
        let fill = match enemy.kind {
            EnemyKind::Normal => palette.enemy,
            EnemyKind::Boss => palette.boss,
        };
        let footprint = enemy.footprint();
        let origin = metrics.to_screen(footprint.origin);
        let size = footprint.size * metrics.scale;
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(fill),
        );

        if let Some(bar) = enemy.health_bar() {
            let origin = metrics.to_screen(bar.background.origin);
            let size = bar.background.size * metrics.scale;
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                size.x,
                size.y,
                to_macroquad_color(palette.health_bar_background),
            );
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                bar.fill_width * metrics.scale,
                size.y,
                to_macroquad_color(palette.health_bar_fill),
            );
        }
    }
}

fn draw_victory(field_size: Vec2, metrics: &SceneMetrics, palette: &Palette) {
    let font_size = (f32::from(VICTORY_FONT_SIZE) * metrics.scale).max(1.0);
    let dimensions =
        macroquad::text::measure_text(VICTORY_TEXT, None, font_size.round() as u16, 1.0);
    let anchor = metrics.to_screen(field_size * 0.5);
    macroquad::text::draw_text(
        VICTORY_TEXT,
        anchor.x - dimensions.width * 0.5,
        anchor.y,
        font_size,
        to_macroquad_color(palette.victory_text),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
