use std::{collections::BTreeMap, path::PathBuf};

use image::RgbaImage;

use crate::{
    config::{RenderConfig, frame_file_path},
    data::{
        records::MovementRecord,
        registry::LocationRegistry,
        timeline::{EntityState, EntryKind},
    },
    encode::png::save_png,
    foundation::{
        core::{PixelPoint, Rgba8},
        error::{GeoTrailError, GeoTrailResult},
    },
    render::{
        canvas::{BaseCanvas, stamp_markers},
        raster::draw_line,
    },
};

/// A transition kept for redrawing in later frames. Never mutated once appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailSegment {
    pub start: PixelPoint,
    pub end: PixelPoint,
    pub color: Rgba8,
    pub width: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub frame_index: usize,
    pub path: PathBuf,
    /// Segment appended to the trail by this step, if the record was a transition.
    pub transition: Option<TrailSegment>,
}

/// Everything the emit phase hands to the assemble phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmittedFrames {
    /// Frame files in timeline order.
    pub paths: Vec<PathBuf>,
    pub trails: Vec<TrailSegment>,
    /// Transitions ending at each location.
    pub arrivals: BTreeMap<String, usize>,
}

impl EmittedFrames {
    pub fn transitions(&self) -> usize {
        self.trails.len()
    }
}

/// Replays timeline records one at a time, writing one frame file per record.
///
/// Owns the run's trail list and entity state; both live exactly as long as the compositor.
/// At most one composited frame is resident at a time besides the template.
pub struct FrameCompositor<'a> {
    base: &'a BaseCanvas,
    registry: &'a LocationRegistry,
    cfg: &'a RenderConfig,
    frame_dir: PathBuf,
    trails: Vec<TrailSegment>,
    entities: EntityState,
    paths: Vec<PathBuf>,
    arrivals: BTreeMap<String, usize>,
}

impl<'a> FrameCompositor<'a> {
    pub fn new(
        base: &'a BaseCanvas,
        registry: &'a LocationRegistry,
        cfg: &'a RenderConfig,
        frame_dir: impl Into<PathBuf>,
    ) -> GeoTrailResult<Self> {
        let frame_dir = frame_dir.into();
        std::fs::create_dir_all(&frame_dir).map_err(|e| {
            GeoTrailError::io(format!(
                "create frame directory '{}': {e}",
                frame_dir.display()
            ))
        })?;

        Ok(Self {
            base,
            registry,
            cfg,
            frame_dir,
            trails: Vec::new(),
            entities: EntityState::new(),
            paths: Vec::new(),
            arrivals: BTreeMap::new(),
        })
    }

    pub fn trails(&self) -> &[TrailSegment] {
        &self.trails
    }

    pub fn entities(&self) -> &EntityState {
        &self.entities
    }

    pub fn frames_emitted(&self) -> usize {
        self.paths.len()
    }

    /// Composite the frame for `rec` in memory and advance the run state.
    ///
    /// Fails without touching any state when `rec` names a location missing from the registry.
    pub fn render_step(
        &mut self,
        rec: &MovementRecord,
    ) -> GeoTrailResult<(RgbaImage, Option<TrailSegment>)> {
        let registry = self.registry;
        let base = self.base;
        let projector = &base.projector;
        let current = registry.lookup(&rec.location_name)?;

        let transition = match self.entities.classify(rec) {
            EntryKind::Transition { from } => {
                let previous = registry.lookup(from)?;
                Some(TrailSegment {
                    start: projector.project(previous.position),
                    end: projector.project(current.position),
                    color: self.cfg.trail_color,
                    width: self.cfg.line_width,
                })
            }
            EntryKind::Placement => None,
        };

        let mut frame = base.image.clone();
        for seg in &self.trails {
            draw_line(&mut frame, seg.start, seg.end, seg.width, seg.color);
        }

        if let Some(seg) = transition {
            draw_line(
                &mut frame,
                seg.start,
                seg.end,
                self.cfg.transition_width,
                self.cfg.transition_color,
            );
            self.trails.push(seg);
            *self
                .arrivals
                .entry(rec.location_name.clone())
                .or_insert(0) += 1;
        }

        self.entities.record(rec);

        // Markers go last so lines never cover them.
        stamp_markers(&mut frame, registry, projector, self.cfg);

        Ok((frame, transition))
    }

    /// [`render_step`](Self::render_step), then write the frame as the next numbered file.
    pub fn step(&mut self, rec: &MovementRecord) -> GeoTrailResult<StepOutcome> {
        let (frame, transition) = self.render_step(rec)?;

        let frame_index = self.paths.len();
        let path = frame_file_path(&self.frame_dir, frame_index);
        save_png(&frame, &path)?;
        drop(frame);

        tracing::debug!(
            frame = frame_index,
            entity = %rec.entity_id,
            location = %rec.location_name,
            transition = transition.is_some(),
            "frame written"
        );

        self.paths.push(path.clone());
        Ok(StepOutcome {
            frame_index,
            path,
            transition,
        })
    }

    pub fn finish(self) -> EmittedFrames {
        EmittedFrames {
            paths: self.paths,
            trails: self.trails,
            arrivals: self.arrivals,
        }
    }
}
