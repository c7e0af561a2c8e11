/// 区域绘制工具 (ROI Editor)
///
/// 在图片或视频上手绘区域多边形:
/// - 左键: 绘制 / 擦除
/// - 右键或中键拖动: 平移, 滚轮: 以鼠标为中心缩放
/// - D 绘制, E 擦除, R 重置, C 确认, F 适应窗口, 空格 播放/暂停
///
/// 运行: cargo run --bin roi_editor -- <image-or-video> --name "Lane 1" --kind traffic
use clap::Parser;
use egui_macroquad::egui;
use macroquad::prelude::*;
use roi_sentinel::authoring::{EditMode, Playback, PointerEvent, RoiSession, Tick};
use roi_sentinel::geometry::{Point2, ViewTransform};
use roi_sentinel::input::{open_source, FrameSource};
use roi_sentinel::server::RoiRecord;
use roi_sentinel::settings::EditorSettings;
use roi_sentinel::EditorArgs;
use std::time::Instant;

const STROKE_COLOR: Color = YELLOW;
const POLYGON_COLOR: Color = GREEN;
const ERASER_COLOR: Color = RED;

fn window_conf() -> Conf {
    Conf {
        window_title: "ROI Editor".to_owned(),
        window_width: 1280,
        window_height: 720,
        high_dpi: true,
        ..Default::default()
    }
}

struct Editor {
    args: EditorArgs,
    settings: EditorSettings,
    source: Box<dyn FrameSource>,
    session: RoiSession,
    playback: Playback,
    texture: Option<Texture2D>,
    slider_value: u64,
    status: String,

    // 鼠标状态
    is_mouse_over_ui: bool,
    is_panning: bool,
    last_mouse_pos: Vec2,
    last_pointer: Option<Vec2>,
}

impl Editor {
    fn new(args: EditorArgs, settings: EditorSettings, mut source: Box<dyn FrameSource>) -> anyhow::Result<Self> {
        if source.read_next()?.is_none() {
            anyhow::bail!("{} has no frames", args.media.display());
        }
        let playback = Playback::new(source.as_ref());
        let mut editor = Self {
            session: RoiSession::new(&settings),
            args,
            settings,
            source,
            playback,
            texture: None,
            slider_value: 0,
            status: String::new(),
            is_mouse_over_ui: false,
            is_panning: false,
            last_mouse_pos: Vec2::ZERO,
            last_pointer: None,
        };
        editor.upload_frame();
        editor.fit_view();
        Ok(editor)
    }

    fn fit_view(&mut self) {
        let (w, h) = self.source.dimensions();
        *self.session.view_mut() = ViewTransform::fit(w, h, screen_width(), screen_height());
    }

    fn upload_frame(&mut self) {
        let Some(frame) = self.source.current_frame() else {
            return;
        };
        let (w, h) = frame.dimensions();
        let mut rgba = Vec::with_capacity((w * h * 4) as usize);
        for px in frame.pixels() {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }

        // 只在分辨率变化时重建纹理
        match &self.texture {
            Some(tex) if tex.width() == w as f32 && tex.height() == h as f32 => {
                tex.update(&Image {
                    bytes: rgba,
                    width: w as u16,
                    height: h as u16,
                });
            }
            _ => {
                let texture = Texture2D::from_rgba8(w as u16, h as u16, &rgba);
                texture.set_filter(FilterMode::Linear);
                self.texture = Some(texture);
            }
        }
    }

    fn update(&mut self) {
        match self.playback.tick(Instant::now(), self.source.as_mut()) {
            Ok(Tick::Frame(_)) => self.upload_frame(),
            Ok(Tick::Ended) => self.status = "End of video".to_string(),
            Ok(_) => {}
            Err(e) => {
                log::error!("❌ Playback failed: {}", e);
                self.playback.pause();
            }
        }
        self.slider_value = self.playback.slider();
    }

    fn confirm(&mut self) {
        match self.session.confirm() {
            Ok(polygon) => {
                self.status = format!("Confirmed {} vertices", polygon.len());
            }
            Err(e) => {
                log::warn!("⚠️  {}", e);
                self.status = "Need at least 3 points to create a polygon".to_string();
                return;
            }
        }
        let Some(roi) = self.session.to_roi(&self.args.name, self.args.kind) else {
            return;
        };
        let record = RoiRecord::from(&roi);
        match serde_json::to_string(&record) {
            Ok(json) => {
                println!("{}", json);
                if let Some(path) = &self.args.output {
                    match std::fs::write(path, &json) {
                        Ok(()) => log::info!("💾 ROI written to {}", path.display()),
                        Err(e) => log::error!("❌ Could not write {}: {}", path.display(), e),
                    }
                }
            }
            Err(e) => log::error!("❌ Could not serialise ROI: {}", e),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.status = "Drawing reset".to_string();
    }

    fn handle_input(&mut self) {
        let (mx, my) = mouse_position();
        let pointer = vec2(mx, my);

        // 快捷键
        if is_key_pressed(KeyCode::D) {
            self.session.set_mode(EditMode::Draw);
        }
        if is_key_pressed(KeyCode::E) {
            self.session.set_mode(EditMode::Erase);
        }
        if is_key_pressed(KeyCode::R) {
            self.reset();
        }
        if is_key_pressed(KeyCode::C) {
            self.confirm();
        }
        if is_key_pressed(KeyCode::F) {
            self.fit_view();
        }
        if is_key_pressed(KeyCode::Space) {
            self.playback.toggle(Instant::now());
        }

        // 鼠标滚轮缩放 (以鼠标位置为锚点)
        let wheel = mouse_wheel().1;
        if wheel != 0.0 && !self.is_mouse_over_ui {
            let factor = if wheel > 0.0 {
                self.settings.zoom_in_factor
            } else {
                self.settings.zoom_out_factor
            };
            self.session.view_mut().zoom_at(
                Point2::new(mx, my),
                factor,
                self.settings.min_scale,
                self.settings.max_scale,
            );
        }

        // 右键 / 中键拖动平移
        if is_mouse_button_down(MouseButton::Right) || is_mouse_button_down(MouseButton::Middle) {
            if self.is_panning {
                let delta = pointer - self.last_mouse_pos;
                self.session.view_mut().pan_by(delta.x, delta.y);
            } else {
                self.is_panning = true;
            }
            self.last_mouse_pos = pointer;
        } else {
            self.is_panning = false;
        }

        // 左键绘制 / 擦除
        if is_mouse_button_pressed(MouseButton::Left) && !self.is_mouse_over_ui {
            self.session.handle(PointerEvent::Press(Point2::new(mx, my)));
            self.last_pointer = Some(pointer);
        } else if is_mouse_button_down(MouseButton::Left) && self.session.is_active() {
            if self.last_pointer != Some(pointer) {
                self.session.handle(PointerEvent::Move(Point2::new(mx, my)));
                self.last_pointer = Some(pointer);
            }
        }
        if is_mouse_button_released(MouseButton::Left) && self.session.is_active() {
            self.session.handle(PointerEvent::Release);
            self.last_pointer = None;
        }
    }

    fn draw(&self) {
        clear_background(BLACK);

        let view = self.session.view();
        if let Some(texture) = &self.texture {
            draw_texture_ex(
                texture,
                view.pan.x,
                view.pan.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(texture.width() * view.scale, texture.height() * view.scale)),
                    ..Default::default()
                },
            );
        }

        let overlay = self.session.overlay();
        for pair in overlay.stroke.windows(2) {
            draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, 2.0, STROKE_COLOR);
        }
        if let Some(polygon) = &overlay.polygon {
            for (i, a) in polygon.iter().enumerate() {
                let b = polygon[(i + 1) % polygon.len()];
                draw_line(a.x, a.y, b.x, b.y, 3.0, POLYGON_COLOR);
            }
        }
        if overlay.mode == EditMode::Erase {
            let (mx, my) = mouse_position();
            draw_circle_lines(mx, my, overlay.erase_radius, 1.5, ERASER_COLOR);
        }

        let footer = format!(
            "{} | zoom {:.2}x | {} points | {}",
            overlay.mode.label(),
            view.scale,
            self.session.stroke().len(),
            self.status
        );
        draw_text(&footer, 10.0, screen_height() - 10.0, 20.0, WHITE);
    }

    fn draw_egui(&mut self) {
        egui_macroquad::ui(|egui_ctx| {
            self.is_mouse_over_ui = egui_ctx.wants_pointer_input();

            egui::Window::new("ROI")
                .default_pos(egui::pos2(10.0, 10.0))
                .resizable(false)
                .show(egui_ctx, |ui| {
                    ui.label(format!("{} ({})", self.args.name, self.args.kind));

                    let mut mode = self.session.mode();
                    ui.horizontal(|ui| {
                        ui.radio_value(&mut mode, EditMode::Draw, "✏ Draw (D)");
                        ui.radio_value(&mut mode, EditMode::Erase, "🧽 Erase (E)");
                    });
                    if mode != self.session.mode() {
                        self.session.set_mode(mode);
                    }

                    ui.horizontal(|ui| {
                        if ui.button("Reset (R)").clicked() {
                            self.reset();
                        }
                        if ui.button("Confirm (C)").clicked() {
                            self.confirm();
                        }
                        if ui.button("Fit (F)").clicked() {
                            self.fit_view();
                        }
                    });

                    let frames = self.playback.frame_count();
                    if frames > 1 {
                        ui.separator();
                        let label = if self.playback.is_playing() { "⏸ Pause" } else { "▶ Play" };
                        if ui.button(label).clicked() {
                            self.playback.toggle(Instant::now());
                        }
                        let response = ui.add(egui::Slider::new(&mut self.slider_value, 0..=frames - 1).text("frame"));
                        if response.changed() {
                            match self.playback.on_slider_changed(self.slider_value, self.source.as_mut()) {
                                Ok(true) => self.upload_frame(),
                                Ok(false) => {}
                                Err(e) => log::error!("❌ Seek failed: {}", e),
                            }
                        }
                    }

                    if let Some(points) = self.session.polygon_pixels() {
                        ui.separator();
                        ui.label(format!("{} vertices", points.len()));
                    }
                });
        });

        egui_macroquad::draw();
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = EditorArgs::parse();
    let settings = EditorSettings::load(&args.settings);

    let source = match open_source(&args.media) {
        Ok(source) => source,
        Err(e) => {
            log::error!("❌ Could not open {}: {}", args.media.display(), e);
            return;
        }
    };
    let mut editor = match Editor::new(args, settings, source) {
        Ok(editor) => editor,
        Err(e) => {
            log::error!("❌ {}", e);
            return;
        }
    };

    loop {
        editor.update();
        editor.handle_input();
        editor.draw();
        editor.draw_egui();
        next_frame().await
    }
}
