use std::{collections::BTreeMap, path::Path};

use crate::{
    config::{PipelinePaths, RenderConfig},
    data::{
        records::{MovementRecord, load_records},
        registry::LocationRegistry,
        timeline::build_timeline,
    },
    encode::gif::{AnimationInfo, assemble, cleanup_frames},
    foundation::error::{GeoTrailError, GeoTrailResult},
    render::{canvas::build_base, compositor::FrameCompositor},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub transitions: usize,
    pub locations: usize,
    /// Transitions ending at each location.
    pub arrivals: BTreeMap<String, usize>,
    pub frames_removed: usize,
    pub animation: AnimationInfo,
}

/// Load the dataset at `dataset` and render it with [`render_animation`].
pub fn run(
    dataset: &Path,
    background: &Path,
    cfg: &RenderConfig,
    paths: &PipelinePaths,
) -> GeoTrailResult<RunSummary> {
    cfg.validate()?;
    let records = load_records(dataset, &cfg.columns)?;
    tracing::info!(records = records.len(), dataset = %dataset.display(), "dataset loaded");
    render_animation(&records, background, cfg, paths)
}

/// Full run over already loaded records.
///
/// Two phases: every timeline entry is emitted as a frame file, then the files are assembled
/// into the animation and deleted. A failure in either phase stops the run; frames emitted
/// before the failure stay on disk and no animation is left behind.
#[tracing::instrument(skip(records, cfg, paths), fields(record_count = records.len()))]
pub fn render_animation(
    records: &[MovementRecord],
    background: &Path,
    cfg: &RenderConfig,
    paths: &PipelinePaths,
) -> GeoTrailResult<RunSummary> {
    let registry = LocationRegistry::build(records);
    render_animation_with_registry(records, &registry, background, cfg, paths)
}

/// [`render_animation`] with locations supplied separately from the movement records.
///
/// Any record naming a location outside `registry` aborts the run with a data-integrity error
/// before its frame is written.
#[tracing::instrument(
    skip_all,
    fields(record_count = records.len(), location_count = registry.len())
)]
pub fn render_animation_with_registry(
    records: &[MovementRecord],
    registry: &LocationRegistry,
    background: &Path,
    cfg: &RenderConfig,
    paths: &PipelinePaths,
) -> GeoTrailResult<RunSummary> {
    cfg.validate()?;
    if records.is_empty() {
        return Err(GeoTrailError::validation("dataset has no movement records"));
    }

    let base = build_base(background, registry, cfg, &paths.template)?;

    let timeline = build_timeline(records);
    tracing::info!(entries = timeline.len(), "replaying timeline");

    let mut compositor = FrameCompositor::new(&base, registry, cfg, &paths.frame_dir)?;
    for rec in timeline {
        compositor.step(rec)?;
    }
    let emitted = compositor.finish();
    tracing::info!(
        frames = emitted.paths.len(),
        transitions = emitted.transitions(),
        "frames emitted"
    );

    let animation = match assemble(&emitted.paths, &paths.animation, cfg.frame_duration_ms) {
        Ok(info) => info,
        Err(e) => {
            discard_partial_animation(&paths.animation);
            return Err(e);
        }
    };
    let frames_removed = cleanup_frames(&emitted.paths);

    Ok(RunSummary {
        frames: emitted.paths.len(),
        transitions: emitted.transitions(),
        locations: registry.len(),
        arrivals: emitted.arrivals,
        frames_removed,
        animation,
    })
}

/// Remove a half-written animation. Returns whether a file was removed.
fn discard_partial_animation(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to remove partial animation"
            );
            false
        }
    }
}
