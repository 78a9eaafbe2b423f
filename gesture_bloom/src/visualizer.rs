//! Software-rendered scene view using `minifb`.
//!
//! A perspective camera at `(0, 5, 20)` looks at the origin. Everything is
//! drawn into one ARGB framebuffer per frame:
//!
//! * particles — single pixels, tinted by the tree's green gradient
//! * snowflakes — small white crosses
//! * ornaments and photos — filled sprites, painter-sorted back to front
//! * the star — a projected outline polyline above the tree
//! * overlay — lyric line, status bar, and key legend in a 3×5 bitmap font
//!
//! The photo screen rectangles from the last rendered frame are kept so mouse
//! clicks can be resolved to a photo index.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use bloom_engine::{Scene, SceneStore};
use glam::Vec3;
use thiserror::Error;

use crate::gesture::{SimInput, SimKey};

use std::sync::mpsc::Sender;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 720;

const BG_COLOR: u32 = 0xFF050505;
const BG_LIT: u32 = 0xFF0C0A12; // background when the point light is up
const SNOW_COLOR: u32 = 0xFFE8F0FF;
const STAR_COLOR: u32 = 0xFFFFD700;
const PHOTO_FRAME: u32 = 0xFFE6E6E6;
const PHOTO_FACE: u32 = 0xFF9A8F7A;
const FOCUS_BORDER: u32 = 0xFFFFD700;
const STATUS_Y: usize = WIN_H - 36;
const TEXT_BG: u32 = 0xFF101018;

// Camera: matches the scene's framing.
const EYE: Vec3 = Vec3::new(0.0, 5.0, 20.0);
const FOV_Y_DEG: f32 = 45.0;
const NEAR_Z: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Errors and per-frame input
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("window creation failed: {0}")]
    Window(String),
}

/// What the window reported this frame, already translated for the app loop.
/// Gesture keys (O/F/N/Q) are forwarded to the simulation channel instead and
/// arrive through the gesture source.
#[derive(Debug, Default)]
pub struct FrameInput {
    pub quit: bool,
    pub toggle_camera: bool,
    pub toggle_music: bool,
    /// Left-click position, on the press edge only.
    pub clicked: Option<(f32, f32)>,
    /// Any key or click this frame — used to start audio on first interaction.
    pub any_interaction: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    sim_tx: Sender<SimInput>,

    // Screen-space photo rects from the last frame, for click picking.
    // (x0, y0, x1, y1) per photo index; None while off-screen.
    photo_rects: Vec<Option<(f32, f32, f32, f32)>>,
    mouse_was_down: bool,

    // Cached projection basis.
    focal: f32,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, VisualizerError> {
        let mut window = Window::new(
            "Gesture Bloom — Holiday Scene",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| VisualizerError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        let focal = (WIN_H as f32 / 2.0) / (FOV_Y_DEG.to_radians() / 2.0).tan();

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            photo_rects: Vec::new(),
            mouse_was_down: false,
            focal,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll window input. Gesture keys go to the sim channel; everything else
    /// is returned in the [`FrameInput`].
    pub fn poll_input(&mut self) -> FrameInput {
        let mut input = FrameInput::default();
        if !self.window.is_open() {
            input.quit = true;
            return input;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) || one_shot(&self.window, Key::Escape) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Quit));
            input.quit = true;
            input.any_interaction = true;
        }
        if one_shot(&self.window, Key::O) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::OpenPalm));
            input.any_interaction = true;
        }
        if one_shot(&self.window, Key::F) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::ClosedFist));
            input.any_interaction = true;
        }
        if one_shot(&self.window, Key::N) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Neutral));
            input.any_interaction = true;
        }
        if one_shot(&self.window, Key::C) {
            input.toggle_camera = true;
            input.any_interaction = true;
        }
        if one_shot(&self.window, Key::M) || one_shot(&self.window, Key::Space) {
            input.toggle_music = true;
            input.any_interaction = true;
        }

        // Click on the press edge only.
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.mouse_was_down {
            if let Some(pos) = self.window.get_mouse_pos(MouseMode::Discard) {
                input.clicked = Some(pos);
                input.any_interaction = true;
            }
        }
        self.mouse_was_down = down;

        input
    }

    /// Resolve a click against the photo rects of the last rendered frame.
    /// Front-most photos are checked first.
    pub fn pick_photo(&self, x: f32, y: f32) -> Option<usize> {
        for (idx, rect) in self.photo_rects.iter().enumerate().rev() {
            if let Some((x0, y0, x1, y1)) = rect {
                if x >= *x0 && x <= *x1 && y >= *y0 && y <= *y1 {
                    return Some(idx);
                }
            }
        }
        None
    }

    // ── Projection ────────────────────────────────────────────────────────

    /// Project a world point to (screen_x, screen_y, view_depth).
    fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let v = p - EYE;
        // The camera looks down -Z toward the origin, slightly pitched; a
        // plain look-at basis keeps the math exact.
        let forward = (Vec3::ZERO - EYE).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);

        let z = v.dot(forward);
        if z <= NEAR_Z {
            return None;
        }
        let x = v.dot(right);
        let y = v.dot(up);
        let sx = WIN_W as f32 / 2.0 + x * self.focal / z;
        let sy = WIN_H as f32 / 2.0 - y * self.focal / z;
        Some((sx, sy, z))
    }

    // ── Render ────────────────────────────────────────────────────────────

    /// Render one frame of the scene plus the text overlay.
    pub fn render(
        &mut self,
        scene: &Scene,
        store: &SceneStore,
        lyric: Option<&str>,
        status: &str,
        music_on: bool,
    ) {
        let bg = if scene.light_intensity() > 0.0 { BG_LIT } else { BG_COLOR };
        self.buf.fill(bg);

        let group_yaw = scene.group_yaw();

        // ── Snowflakes (behind everything, unrotated by the group) ────────
        for flake in scene.snowflakes() {
            if let Some((sx, sy, _)) = self.project(flake.position) {
                self.draw_cross(sx as isize, sy as isize, 1, SNOW_COLOR);
            }
        }

        // ── Particles ─────────────────────────────────────────────────────
        let spin = group_yaw + scene.particle_yaw();
        for (pos, &color) in scene
            .particle_positions()
            .iter()
            .zip(scene.particle_colors())
        {
            if let Some((sx, sy, _)) = self.project(rot_y(*pos, spin)) {
                self.set_pixel(sx as usize, sy as usize, color);
            }
        }

        // ── Ornaments + photos, painter-sorted ────────────────────────────
        enum Sprite {
            Ornament { sx: f32, sy: f32, r: f32, color: u32 },
            Photo { idx: usize, sx: f32, sy: f32, hw: f32, hh: f32 },
        }

        let mut sprites: Vec<(f32, Sprite)> = Vec::new();

        for orn in scene.ornaments() {
            if let Some((sx, sy, z)) = self.project(rot_y(orn.position, group_yaw)) {
                let r = self.focal * 0.15 * orn.scale / z;
                sprites.push((z, Sprite::Ornament { sx, sy, r, color: orn.color }));
            }
        }

        self.photo_rects.clear();
        self.photo_rects.resize(scene.photos().len(), None);
        for (idx, photo) in scene.photos().iter().enumerate() {
            if let Some((sx, sy, z)) = self.project(rot_y(photo.position, group_yaw)) {
                // Polaroid plane is 1.0 × 1.2 world units before scaling.
                let hw = self.focal * 0.5 * photo.scale / z;
                let hh = self.focal * 0.6 * photo.scale / z;
                sprites.push((z, Sprite::Photo { idx, sx, sy, hw, hh }));
            }
        }

        // Back to front.
        sprites.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, sprite) in sprites {
            match sprite {
                Sprite::Ornament { sx, sy, r, color } => {
                    self.fill_circle(sx as isize, sy as isize, r.max(1.0) as isize, color);
                }
                Sprite::Photo { idx, sx, sy, hw, hh } => {
                    let x0 = sx - hw;
                    let y0 = sy - hh;
                    let w = (hw * 2.0) as usize;
                    let h = (hh * 2.0) as usize;
                    if w == 0 || h == 0 {
                        continue;
                    }
                    let (xi, yi) = (x0.max(0.0) as usize, y0.max(0.0) as usize);
                    self.fill_rect(xi, yi, w, h, PHOTO_FRAME);
                    // Inner "photograph" inset, polaroid-style with a wider
                    // bottom margin.
                    let inset = (w / 10).max(1);
                    self.fill_rect(
                        xi + inset,
                        yi + inset,
                        w.saturating_sub(inset * 2),
                        h.saturating_sub(inset * 4),
                        PHOTO_FACE,
                    );
                    if store.focused_photo() == Some(idx) {
                        self.draw_border(xi, yi, w, h, FOCUS_BORDER);
                    }
                    self.photo_rects[idx] = Some((x0, y0, sx + hw, sy + hh));
                }
            }
        }

        // ── Star ──────────────────────────────────────────────────────────
        let star = scene.star();
        if star.scale > 0.01 {
            let center = rot_y(star.position, group_yaw);
            let mut pts: Vec<(f32, f32)> = Vec::with_capacity(star.outline.len());
            for v in &star.outline {
                let local = Vec3::new(v.x * star.scale, v.y * star.scale, 0.0);
                let world = center + rot_y(rot_y(local, star.yaw), group_yaw);
                if let Some((sx, sy, _)) = self.project(world) {
                    pts.push((sx, sy));
                }
            }
            if pts.len() == star.outline.len() {
                for i in 0..pts.len() {
                    let (ax, ay) = pts[i];
                    let (bx, by) = pts[(i + 1) % pts.len()];
                    self.draw_line(ax, ay, bx, by, STAR_COLOR);
                }
            }
        }

        // ── Lyric line, centered above the status bar ─────────────────────
        if let Some(line) = lyric {
            let scale = 3usize;
            let text_w = line.chars().count() * 4 * scale;
            let x = (WIN_W.saturating_sub(text_w)) / 2;
            self.draw_label_scaled(line, x, STATUS_Y - 30, scale, 0xFFF5F5F5);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_label(status, 10, STATUS_Y + 6, 0xFFEEEEEE);

        let music = if music_on { "on" } else { "off" };
        let legend = format!(
            "O=open palm  F=fist  N=neutral  C=camera  M=music({})  click=focus photo  Q=quit",
            music
        );
        self.draw_label(&legend, 10, WIN_H - 12, 0xFF888888);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(WIN_W) {
            if y < WIN_H {
                self.buf[y * WIN_W + col] = color;
            }
            if y + h - 1 < WIN_H {
                self.buf[(y + h - 1) * WIN_W + col] = color;
            }
        }
        for row in y..(y + h).min(WIN_H) {
            if x < WIN_W {
                self.buf[row * WIN_W + x] = color;
            }
            if x + w - 1 < WIN_W {
                self.buf[row * WIN_W + x + w - 1] = color;
            }
        }
    }

    fn fill_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    let (x, y) = (cx + dx, cy + dy);
                    if x >= 0 && y >= 0 {
                        self.set_pixel(x as usize, y as usize, color);
                    }
                }
            }
        }
    }

    fn draw_cross(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for d in -r..=r {
            if cx + d >= 0 && cy >= 0 {
                self.set_pixel((cx + d) as usize, cy as usize, color);
            }
            if cx >= 0 && cy + d >= 0 {
                self.set_pixel(cx as usize, (cy + d) as usize, color);
            }
        }
    }

    fn draw_line(&mut self, ax: f32, ay: f32, bx: f32, by: f32, color: u32) {
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = ax + (bx - ax) * t;
            let y = ay + (by - ay) * t;
            if x >= 0.0 && y >= 0.0 {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters for overlay text.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        self.draw_label_scaled(text, x, y, 1, color);
    }

    fn draw_label_scaled(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.set_pixel(
                                    cx + col * scale + sx,
                                    y + row * scale + sy,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

/// Rotate a point around the Y axis.
fn rot_y(p: Vec3, yaw: f32) -> Vec3 {
    let (s, c) = yaw.sin_cos();
    Vec3::new(p.x * c + p.z * s, p.y, -p.x * s + p.z * c)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
