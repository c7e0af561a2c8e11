/// 区域绘制 (Zone authoring)
///
/// - session:  stroke capture, erase, confirm, view transform
/// - playback: frame timing and slider guard for video backgrounds
pub mod playback;
pub mod session;

pub use playback::{Playback, Tick};
pub use session::{EditMode, InteractionState, Overlay, Phase, PointerEvent, RoiSession};
