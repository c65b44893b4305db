//! Geotrail renders personnel movements between agencies as a looping map animation.
//!
//! # Pipeline overview
//!
//! 1. **Load**: movement CSV -> [`MovementRecord`]s
//! 2. **Register**: first coordinates seen per location name -> [`LocationRegistry`]
//! 3. **Base**: background raster + one marker per location -> [`BaseCanvas`] (the template)
//! 4. **Emit**: chronological [`Timeline`] replayed through a [`FrameCompositor`], one frame
//!    file per record, with every earlier transition redrawn as a trail
//! 5. **Assemble**: frame files -> looping GIF, then the frame files are removed
//!
//! Everything runs on one thread. Only the template and the frame being composited are held
//! in memory; the frame history lives on disk between phases 4 and 5.
#![forbid(unsafe_code)]

mod config;
mod data;
mod encode;
mod foundation;
mod pipeline;
mod render;

pub use config::{ColumnNames, PipelinePaths, RenderConfig, frame_file_path};
pub use data::records::{MovementRecord, load_records, parse_date, read_records};
pub use data::registry::{LocationPoint, LocationRegistry};
pub use data::timeline::{EntityState, EntryKind, Placement, Timeline, build_timeline};
pub use encode::gif::{AnimationInfo, assemble, cleanup_frames};
pub use encode::png::{ensure_parent_dir, load_rgba, save_png};
pub use foundation::core::{Canvas, GeoPoint, PixelPoint, Rgba8};
pub use foundation::error::{GeoTrailError, GeoTrailResult};
pub use pipeline::{RunSummary, render_animation, render_animation_with_registry, run};
pub use render::canvas::{BaseCanvas, build_base, compose_base, stamp_markers};
pub use render::compositor::{EmittedFrames, FrameCompositor, StepOutcome, TrailSegment};
pub use render::projection::{Projector, project};
pub use render::raster::{draw_line, fill_circle};
