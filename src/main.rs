//! Fixpoint Engine demo
//!
//! Walk around a small scene drawn entirely by the integer rasterizer:
//! - Arrow keys look, W/A/S/D move, T/G raise and lower the camera
//! - C cycles culling, 1 flat, 2 textured, 3 toggles fov 8/9
//! - Space pauses the animation

use fixpoint_engine::config::{load_config, RenderConfig};
use fixpoint_engine::mesh::{gen_box, load_mesh, BoxSides, Mesh};
use fixpoint_engine::rasterizer::{
    fixed_cos, fixed_sin, Color as RgbColor, RasterMode, Renderer, Texture, P, P_ONE, TRIG_MASK,
};
use fixpoint_engine::{RenderError, VERSION};
use log::{error, info, warn};
use macroquad::prelude::*;

/// Cube size
const CUSZ: i32 = 128;
/// Floor grid half-extent in tiles
const GRSZ: i32 = 1;
/// Movement speed
const MOVSPD: i32 = 4;

const CONFIG_PATH: &str = "fixpoint.ron";
const MODEL_PATH: &str = "model.ron";

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Fixpoint Engine v{}", VERSION),
        window_width: 896,
        window_height: 504,
        window_resizable: true,
        ..Default::default()
    }
}

/// Camera position and table angles
struct Walker {
    x: i32,
    y: i32,
    z: i32,
    pitch: i32,
    yaw: i32,
}

impl Walker {
    fn update(&mut self) {
        if is_key_down(KeyCode::Right) {
            self.yaw += 1;
        }
        if is_key_down(KeyCode::Left) {
            self.yaw -= 1;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch -= 1;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch += 1;
        }

        let sy = fixed_sin(self.yaw & TRIG_MASK);
        let cy = fixed_cos(self.yaw & TRIG_MASK);
        let sx = fixed_sin(self.pitch & TRIG_MASK);

        if is_key_down(KeyCode::W) {
            self.x += (MOVSPD * sy) >> P;
            self.y -= (MOVSPD * sx) >> P;
            self.z += (MOVSPD * cy) >> P;
        }
        if is_key_down(KeyCode::S) {
            self.x -= (MOVSPD * sy) >> P;
            self.y += (MOVSPD * sx) >> P;
            self.z -= (MOVSPD * cy) >> P;
        }
        if is_key_down(KeyCode::A) {
            self.x -= (MOVSPD * cy) >> P;
            self.z += (MOVSPD * sy) >> P;
        }
        if is_key_down(KeyCode::D) {
            self.x += (MOVSPD * cy) >> P;
            self.z -= (MOVSPD * sy) >> P;
        }
        if is_key_down(KeyCode::T) {
            self.y += MOVSPD;
        }
        if is_key_down(KeyCode::G) {
            self.y -= MOVSPD;
        }
    }
}

struct Scene {
    floor_tile: Mesh,
    tex_cube: Mesh,
    prop: Mesh,
    textures: Vec<Texture>,
}

impl Scene {
    fn new() -> Result<Self, RenderError> {
        let checker = Texture::checkerboard(
            RgbColor::from_packed(0xd4ccba),
            RgbColor::from_packed(0x3f4f5f),
            RgbColor::from_packed(0x902215),
        );

        let prop = match load_mesh(MODEL_PATH) {
            Ok(mesh) => {
                info!("Loaded {} ({} polygons)", MODEL_PATH, mesh.polygon_count());
                mesh
            }
            Err(e) => {
                warn!("No model from {}: {}, using a box", MODEL_PATH, e);
                gen_box(96, 96, 96, BoxSides::ALL, RgbColor::new(200, 120, 60), None)?
            }
        };

        Ok(Self {
            floor_tile: gen_box(CUSZ, CUSZ, CUSZ, BoxSides::TOP, RgbColor::new(77, 101, 94), None)?,
            tex_cube: gen_box(CUSZ, CUSZ, CUSZ, BoxSides::ALL, RgbColor::WHITE, Some(0))?,
            prop,
            textures: vec![checker],
        })
    }

    fn draw(&self, r: &mut Renderer, color: &mut [u32], t: i32, animate: bool) -> Result<(), RenderError> {
        // prop, swaying side to side
        r.stack_mut().push()?;
        let sway = if animate { (fixed_sin(t & TRIG_MASK) * 256) >> P } else { 0 };
        r.stack_mut().translate(sway, 400, 500);
        r.stack_mut().rotate_y(if animate { t } else { 0 });
        r.render_object(color, &self.prop, &self.textures)?;
        r.stack_mut().pop()?;

        // floor tiles
        for i in -GRSZ..GRSZ {
            for j in -GRSZ..GRSZ {
                r.stack_mut().push()?;
                r.stack_mut().translate(i * CUSZ, 0, 600 + j * CUSZ);
                r.render_object(color, &self.floor_tile, &self.textures)?;
                r.stack_mut().pop()?;
            }
        }

        // textured cube
        r.stack_mut().push()?;
        r.stack_mut().translate(-100, 100, 500);
        if animate {
            r.stack_mut().rotate_x(t >> 2);
            r.stack_mut().rotate_y(t >> 1);
            r.stack_mut().scale((P_ONE * ((t & 0xff) + 128)) >> 8, P_ONE, P_ONE);
        }
        r.render_object(color, &self.tex_cube, &self.textures)?;
        r.stack_mut().pop()?;
        Ok(())
    }
}

/// Expand packed 0x00RRGGBB pixels into RGBA bytes
fn to_rgba(src: &[u32], dst: &mut [u8]) {
    for (px, out) in src.iter().zip(dst.chunks_exact_mut(4)) {
        out.copy_from_slice(&RgbColor::from_packed(*px).to_rgba());
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let config = load_config(CONFIG_PATH).unwrap_or_else(|e| {
        warn!("Using default config ({}: {})", CONFIG_PATH, e);
        RenderConfig::default()
    });

    let mut renderer = match Renderer::from_config(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("Cannot create renderer: {}", e);
            return;
        }
    };
    let scene = match Scene::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Cannot build scene: {}", e);
            return;
        }
    };

    let (w, h) = (config.width, config.height);
    let mut color = vec![0u32; w * h];
    let mut rgba = vec![0u8; w * h * 4];
    let clear_rgb = config.clear_color.to_packed();

    let mut walker = Walker { x: 0, y: 200, z: 90, pitch: 0, yaw: 0 };
    let mut animate = true;
    let mut t: i32 = 0;
    let mut next_report = get_time() + 1.0;

    info!("=== Fixpoint Engine ===");

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        walker.update();
        if is_key_pressed(KeyCode::C) {
            renderer.settings.cull_mode = renderer.settings.cull_mode.cycle();
            info!("cull: {:?}", renderer.settings.cull_mode);
        }
        if is_key_down(KeyCode::Key1) {
            renderer.settings.raster_mode = RasterMode::Flat;
        }
        if is_key_down(KeyCode::Key2) {
            renderer.settings.raster_mode = RasterMode::Textured;
        }
        if is_key_pressed(KeyCode::Key3) {
            renderer.settings.fov = if renderer.settings.fov == 8 { 9 } else { 8 };
            info!("fov: {}", renderer.settings.fov);
        }
        if is_key_pressed(KeyCode::Space) {
            animate = !animate;
        }
        t = t.wrapping_add(1);

        renderer.reset_polygon_count();
        renderer.set_camera(walker.x, walker.y, walker.z, walker.pitch, walker.yaw);
        let frame = renderer
            .clear(&mut color, clear_rgb)
            .and_then(|_| scene.draw(&mut renderer, &mut color, t, animate));
        if let Err(e) = frame {
            error!("Frame skipped: {}", e);
            renderer.stack_mut().reset();
        }

        if get_time() > next_report {
            next_report = get_time() + 1.0;
            info!("FPS: {} polygons: {}", get_fps(), renderer.polygon_count());
        }

        // Present
        to_rgba(&color, &mut rgba);
        let texture = Texture2D::from_rgba8(w as u16, h as u16, &rgba);
        texture.set_filter(FilterMode::Nearest);

        clear_background(BLACK);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
