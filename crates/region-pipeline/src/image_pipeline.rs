//! Image pipeline: grayscale, optional conditioning, contour extraction (§4.1).
//!
//! Stages run in the order the configuration lists them: invert, dilate,
//! threshold, Canny, then contour extraction on whatever binary/edge
//! image the earlier optional stages produced.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::BorderType;

use crate::config::{ContourApprox, ContourMode, DilationElem, ImageCfg, ThresholdCfg, ThresholdType};
use crate::error::PipelineError;
use crate::types::{PixelContour, PixelPoint};

/// Run the image pipeline, returning the pixel contours found in the
/// final conditioned image plus a renderable diagnostic (the final
/// binary/edge image, promoted to RGB). A conditioned image with no
/// surviving contours is not an error: it yields an empty contour list.
pub fn run(image: &RgbImage, cfg: &ImageCfg) -> Result<(Vec<PixelContour>, RgbImage), PipelineError> {
    if cfg.dilation.enable && cfg.dilation.kernel_size == 0 {
        return Err(PipelineError::InvalidConfig(
            "dilation.kernel_size must be > 0 when dilation is enabled".to_string(),
        ));
    }

    let mut gray = image::imageops::grayscale(image);

    if cfg.invert_image {
        image::imageops::invert(&mut gray);
    }
    if cfg.dilation.enable {
        gray = dilate(&gray, cfg.dilation.kernel_size, cfg.dilation.elem);
    }
    if cfg.threshold.enable {
        gray = apply_threshold(&gray, &cfg.threshold);
    }
    if cfg.canny.enable {
        gray = imageproc::edges::canny(&gray, cfg.canny.lower_threshold, cfg.canny.upper_threshold);
    }

    let raw_contours: Vec<imageproc::contours::Contour<u32>> = imageproc::contours::find_contours(&gray);
    let filtered: Vec<_> = raw_contours
        .into_iter()
        .filter(|c| c.points.len() >= 2)
        .filter(|c| match cfg.contour.mode {
            ContourMode::External => matches!(c.border_type, BorderType::Outer) && c.parent.is_none(),
            ContourMode::List | ContourMode::CComp | ContourMode::Tree => true,
        })
        .collect();

    // A bundle contributing no contours is not fatal on its own (§7): it
    // simply adds no curves, while other bundles' closed regions can
    // still satisfy the overall success criterion.
    let pixel_contours = filtered
        .into_iter()
        .map(|c| {
            let points = match cfg.contour.method {
                ContourApprox::None => c.points,
                ContourApprox::Simple | ContourApprox::Tc89L1 | ContourApprox::Tc89Kcos => {
                    compress_collinear(&c.points)
                }
            };
            points
                .into_iter()
                .map(|p| PixelPoint::new(i64::from(p.x), i64::from(p.y)))
                .collect()
        })
        .collect();

    let diagnostic = image::DynamicImage::ImageLuma8(gray).to_rgb8();
    Ok((pixel_contours, diagnostic))
}

/// Offsets covered by a `(2k+1) x (2k+1)` structuring element anchored at its center.
fn structuring_offsets(kernel_size: u32, elem: DilationElem) -> Vec<(i64, i64)> {
    let k = i64::from(kernel_size);
    let mut offsets = Vec::new();
    for dy in -k..=k {
        for dx in -k..=k {
            let included = match elem {
                DilationElem::Rect => true,
                DilationElem::Cross => dx == 0 || dy == 0,
                DilationElem::Ellipse => {
                    let a = k as f64;
                    #[allow(clippy::cast_precision_loss)]
                    let ratio = (dx as f64 / a).powi(2) + (dy as f64 / a).powi(2);
                    ratio <= 1.0
                }
            };
            if included {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Grayscale dilation: each output pixel is the max over its structuring
/// element neighborhood. Hand-rolled to support the `RECT`/`CROSS`/`ELLIPSE`
/// element shapes `imageproc::morphology::dilate`'s `Norm` does not cover.
fn dilate(image: &GrayImage, kernel_size: u32, elem: DilationElem) -> GrayImage {
    let offsets = structuring_offsets(kernel_size, elem);
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut max_v = 0u8;
            for &(dx, dy) in &offsets {
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx >= 0 && ny >= 0 && (nx as u32) < width && (ny as u32) < height {
                    let v = image.get_pixel(nx as u32, ny as u32).0[0];
                    max_v = max_v.max(v);
                }
            }
            out.put_pixel(x, y, Luma([max_v]));
        }
    }
    out
}

/// Hand-rolled threshold: `imageproc::contrast::threshold` only covers the
/// plain binary case, so the remaining OpenCV-style variants are applied
/// as a direct pixel map.
fn apply_threshold(image: &GrayImage, cfg: &ThresholdCfg) -> GrayImage {
    let (width, height) = image.dimensions();
    let max = cfg.max_binary_value;
    GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y).0[0];
        let out = match cfg.kind {
            ThresholdType::Binary => {
                if v > cfg.value {
                    max
                } else {
                    0
                }
            }
            ThresholdType::BinaryInverted => {
                if v > cfg.value {
                    0
                } else {
                    max
                }
            }
            ThresholdType::Trunc => v.min(cfg.value),
            ThresholdType::ToZero => {
                if v > cfg.value {
                    v
                } else {
                    0
                }
            }
            ThresholdType::ToZeroInverted => {
                if v > cfg.value {
                    0
                } else {
                    v
                }
            }
        };
        Luma([out])
    })
}

/// Collapse runs of 8-connected collinear steps, keeping only the points
/// where the local direction changes. A best-effort stand-in for
/// Teh-Chin dominant-point detection, which has no off-the-shelf crate
/// in this stack.
fn compress_collinear(points: &[imageproc::point::Point<u32>]) -> Vec<imageproc::point::Point<u32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for i in 1..points.len() - 1 {
        let prev = points[i - 1];
        let cur = points[i];
        let next = points[i + 1];
        let d1 = (i64::from(cur.x) - i64::from(prev.x), i64::from(cur.y) - i64::from(prev.y));
        let d2 = (i64::from(next.x) - i64::from(cur.x), i64::from(next.y) - i64::from(cur.y));
        if d1 != d2 {
            out.push(cur);
        }
    }
    out.push(points[points.len() - 1]);
    out
}
