use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{error, info};

use crate::error::Error;
use crate::face_landmarks::LandmarkDetector;
use crate::overlay::{mark_gesture_landmarks, overlay_lines, OverlayLine};
use crate::session::{DriveSession, Step};
use crate::simulator::Simulator;
use crate::webcam::FrameSource;

// error that ended the drive loop, handed back to main once the window is gone
pub type SharedFailure = Arc<Mutex<Option<Error>>>;

pub struct FacedriveApp<C, D, S> {
    session: DriveSession<C, D, S>,
    failure: SharedFailure,
}

impl<C, D, S> FacedriveApp<C, D, S> {
    pub fn new(session: DriveSession<C, D, S>, failure: SharedFailure) -> Self {
        Self { session, failure }
    }
}

impl<C, D, S> eframe::App for FacedriveApp<C, D, S>
where
    C: FrameSource,
    D: LandmarkDetector,
    S: Simulator,
{
    /// Runs one iteration of the drive loop per repaint and keeps repainting.
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let Self { session, failure } = self;

        let drive_frame = match session.step(Instant::now()) {
            Ok(Step::Frame(drive_frame)) => drive_frame,
            Ok(Step::CameraClosed) => {
                frame.close();
                return;
            }
            Err(err) => {
                error!("Drive loop failed: {}", err);
                if let Ok(mut guard) = failure.lock() {
                    *guard = Some(err);
                }
                frame.close();
                return;
            }
        };

        let mut image = drive_frame.image;
        let mut lines: Vec<OverlayLine> = Vec::new();
        if let Some(driven) = &drive_frame.driven {
            mark_gesture_landmarks(&mut image, &driven.landmarks);
            lines.extend(overlay_lines(&driven.gestures.control, driven.gear));
        }

        let rgb = image.to_rgb8();
        let image_size = [rgb.width() as usize, rgb.height() as usize];

        egui::CentralPanel::default().show(ctx, |ui| {
            let ui_image = egui::ColorImage::from_rgb(image_size, rgb.as_raw().as_slice());
            let texture_hdl = ctx.load_texture("frame", ui_image, egui::TextureOptions::default());

            // fit the frame to the panel width
            let ui_img_width = ui.available_width();
            let scale = ui_img_width / image_size[0].max(1) as f32;
            let ui_img_height = image_size[1] as f32 * scale;

            let response = ui.image(&texture_hdl, egui::Vec2::new(ui_img_width, ui_img_height));

            let painter = ui.painter();
            for line in lines.iter() {
                let pos = response.rect.min + egui::vec2(line.origin.0 * scale, line.origin.1 * scale);
                painter.text(
                    pos,
                    egui::Align2::LEFT_BOTTOM,
                    &line.text,
                    egui::FontId::proportional(20.0 * scale),
                    egui::Color32::from_rgb(line.color[0], line.color[1], line.color[2]),
                );
            }
        });

        if ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            info!("Quit key pressed");
            frame.close();
            return;
        }

        // keep the loop spinning
        ctx.request_repaint();
    }
}
