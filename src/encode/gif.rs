use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use image::{
    Delay, Frame,
    codecs::gif::{GifEncoder, Repeat},
};

use crate::{
    encode::png::{ensure_parent_dir, load_rgba},
    foundation::error::{GeoTrailError, GeoTrailResult},
};

/// NeuQuant sampling factor; 1 is best quality and very slow, 30 is fastest.
const QUANTIZER_SPEED: i32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationInfo {
    pub path: PathBuf,
    pub frames: usize,
    pub width: u32,
    pub height: u32,
}

/// Encode the frame files, in the given order, as an infinitely looping GIF.
///
/// Frames are decoded one at a time and streamed into the encoder.
#[tracing::instrument(skip(frame_paths), fields(frame_count = frame_paths.len()))]
pub fn assemble(
    frame_paths: &[PathBuf],
    out_path: &Path,
    frame_duration_ms: u32,
) -> GeoTrailResult<AnimationInfo> {
    if frame_paths.is_empty() {
        return Err(GeoTrailError::validation(
            "cannot assemble an animation from zero frames",
        ));
    }
    if frame_duration_ms == 0 {
        return Err(GeoTrailError::validation("frame duration must be non-zero"));
    }

    ensure_parent_dir(out_path)?;
    let write_err = |e: &dyn std::fmt::Display| {
        GeoTrailError::io(format!("write gif '{}': {e}", out_path.display()))
    };

    let file = File::create(out_path).map_err(|e| write_err(&e))?;
    let mut writer = BufWriter::new(file);
    let delay = Delay::from_numer_denom_ms(frame_duration_ms, 1);

    let mut size = None;
    {
        let mut enc = GifEncoder::new_with_speed(&mut writer, QUANTIZER_SPEED);
        enc.set_repeat(Repeat::Infinite).map_err(|e| write_err(&e))?;

        for path in frame_paths {
            let img = load_rgba(path)?;
            let dims = img.dimensions();
            match size {
                None => size = Some(dims),
                Some(first) if first != dims => {
                    return Err(GeoTrailError::validation(format!(
                        "frame '{}' is {}x{}, expected {}x{}",
                        path.display(),
                        dims.0,
                        dims.1,
                        first.0,
                        first.1
                    )));
                }
                Some(_) => {}
            }
            enc.encode_frame(Frame::from_parts(img, 0, 0, delay))
                .map_err(|e| write_err(&e))?;
        }
    }
    writer.flush().map_err(|e| write_err(&e))?;

    let (width, height) = size.unwrap_or((0, 0));
    tracing::info!(
        frames = frame_paths.len(),
        path = %out_path.display(),
        "animation written"
    );
    Ok(AnimationInfo {
        path: out_path.to_path_buf(),
        frames: frame_paths.len(),
        width,
        height,
    })
}

/// Best-effort removal of intermediate frame files. Returns how many were removed.
pub fn cleanup_frames(frame_paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for path in frame_paths {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "frame file does not exist and cannot be removed"
            );
            continue;
        }
        match std::fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove frame file")
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use image::{AnimationDecoder as _, RgbaImage, codecs::gif::GifDecoder};

    use super::*;
    use crate::encode::png::save_png;

    fn write_frames(dir: &Path, colors: &[[u8; 4]]) -> Vec<PathBuf> {
        colors
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let path = dir.join(format!("frame_{i:05}.png"));
                save_png(&RgbaImage::from_pixel(8, 6, image::Rgba(*c)), &path).unwrap();
                path
            })
            .collect()
    }

    fn decode(path: &Path) -> Vec<image::Frame> {
        let f = BufReader::new(File::open(path).unwrap());
        GifDecoder::new(f)
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
    }

    #[test]
    fn frames_keep_order_delay_and_loop_forever() {
        let dir = tempfile::tempdir().unwrap();
        let colors = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
        let paths = write_frames(dir.path(), &colors);
        let out = dir.path().join("out").join("anim.gif");

        let info = assemble(&paths, &out, 300).unwrap();
        assert_eq!(info.frames, 3);
        assert_eq!((info.width, info.height), (8, 6));

        let frames = decode(&out);
        assert_eq!(frames.len(), 3);
        for (frame, c) in frames.iter().zip(colors) {
            let (n, d) = frame.delay().numer_denom_ms();
            assert_eq!(n / d, 300);
            let px = frame.buffer().get_pixel(4, 3);
            let dominant = (0..3).max_by_key(|&i| px[i]).unwrap();
            let expected = (0..3).max_by_key(|&i| c[i]).unwrap();
            assert_eq!(dominant, expected);
        }

        let bytes = std::fs::read(&out).unwrap();
        let netscape = bytes
            .windows(11)
            .position(|w| w == b"NETSCAPE2.0")
            .expect("loop extension present");
        assert_eq!(&bytes[netscape + 11..netscape + 15], &[3, 1, 0, 0]);
    }

    #[test]
    fn empty_or_mismatched_frames_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("anim.gif");
        assert!(matches!(
            assemble(&[], &out, 300),
            Err(GeoTrailError::Validation(_))
        ));

        let mut paths = write_frames(dir.path(), &[[0, 0, 0, 255]]);
        let odd = dir.path().join("odd.png");
        save_png(&RgbaImage::new(3, 3), &odd).unwrap();
        paths.push(odd);
        assert!(matches!(
            assemble(&paths, &out, 300),
            Err(GeoTrailError::Validation(_))
        ));
    }

    #[test]
    fn missing_frame_aborts_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_frames(dir.path(), &[[0, 0, 0, 255]]);
        paths.push(dir.path().join("gone.png"));
        let err = assemble(&paths, &dir.path().join("anim.gif"), 300).unwrap_err();
        assert!(matches!(err, GeoTrailError::Io(_)));
    }

    #[test]
    fn cleanup_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_frames(dir.path(), &[[1, 1, 1, 255], [2, 2, 2, 255]]);
        std::fs::remove_file(&paths[0]).unwrap();
        paths.push(dir.path().join("never_written.png"));

        assert_eq!(cleanup_frames(&paths), 1);
        assert!(paths.iter().all(|p| !p.exists()));
    }
}
