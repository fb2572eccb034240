use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{FrameSubmitter, WindowDimensions};
use crate::traits::SurfaceId;

/// Animated test pattern a producer paints into its window
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Diagonal colour gradient scrolling to the right
    #[default]
    Gradient,
    /// Checkerboard drifting downwards
    Checker,
    /// Whole window pulsing through the hues
    Pulse,
}

/// Paint frame number `frame` of `pattern` into `out`.
///
/// Panics if `out` is not exactly one frame for `dims`.
pub fn render_pattern(pattern: Pattern, dims: WindowDimensions, frame: u64, out: &mut [u8]) {
    assert_eq!(out.len(), dims.frame_len(), "pattern buffer has the wrong size");

    let width = dims.width as usize;
    let shift = frame as usize;
    let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(out);

    match pattern {
        Pattern::Gradient => {
            for (i, px) in pixels.iter_mut().enumerate() {
                let (x, y) = (i % width, i / width);
                *px = [(x + shift) as u8, y as u8, ((x + y) / 2) as u8, 255];
            }
        }
        Pattern::Checker => {
            const CELL: usize = 16;
            for (i, px) in pixels.iter_mut().enumerate() {
                let (x, y) = (i % width, (i / width + shift) % (CELL * 2));
                let on = (x / CELL + y / CELL) % 2 == 0;
                *px = if on { [230, 230, 230, 255] } else { [30, 30, 30, 255] };
            }
        }
        Pattern::Pulse => pixels.fill(hue_to_rgba((frame % 360) as u16)),
    }
}

/// Fully saturated colour for `hue` in degrees
fn hue_to_rgba(hue: u16) -> [u8; 4] {
    let sector = hue / 60;
    let ramp = ((hue % 60) as u32 * 255 / 60) as u8;
    let fall = 255 - ramp;
    match sector {
        0 => [255, ramp, 0, 255],
        1 => [fall, 255, 0, 255],
        2 => [0, 255, ramp, 255],
        3 => [0, fall, 255, 255],
        4 => [ramp, 0, 255, 255],
        _ => [255, 0, fall, 255],
    }
}

/// A frame of a single colour
pub fn solid_frame(dims: WindowDimensions, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat(dims.pixel_count())
}

/// Spawn a thread that paints `pattern` into window `id` every `interval`
/// until `cancel` is set or the window closes.
///
/// The thread returns how many frames it submitted.
pub fn spawn_producer(
    submitter: FrameSubmitter,
    id: SurfaceId,
    pattern: Pattern,
    interval: Duration,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<u64> {
    std::thread::spawn(move || {
        let Some(dims) = submitter.frame_dimensions(id) else {
            log::warn!("producer for {id} started after the window closed");
            return 0;
        };

        let mut buffer = vec![0u8; dims.frame_len()];
        let mut frame = 0u64;
        while !cancel.load(Ordering::SeqCst) {
            render_pattern(pattern, dims, frame, &mut buffer);
            if submitter.submit(id, &buffer).is_closed() {
                log::debug!("{id} closed, producer stopping");
                break;
            }
            frame += 1;
            std::thread::sleep(interval);
        }
        frame
    })
}
