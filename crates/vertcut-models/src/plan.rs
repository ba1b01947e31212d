//! Crop plan: ordered segment cover of a video, with repair and validation.

use serde::Serialize;
use thiserror::Error;

use crate::segment::CropSegment;

/// Tolerance for floating-point boundary comparisons (well under one frame).
const BOUNDARY_EPSILON: f64 = 1e-6;

/// Validation failures for a crop plan.
#[derive(Debug, Error, PartialEq)]
pub enum PlanValidationError {
    #[error("plan contains no segments")]
    Empty,

    #[error("segment {index} has non-positive duration ({start_time}s..{end_time}s)")]
    NonPositiveDuration {
        index: usize,
        start_time: f64,
        end_time: f64,
    },

    #[error("segment {index} starts at a negative time ({start_time}s)")]
    NegativeStart { index: usize, start_time: f64 },

    #[error("segment {index} has a zero-sized crop rectangle")]
    ZeroCropDimension { index: usize },

    #[error("plan does not start at 0 (first segment starts at {start_time}s)")]
    DoesNotStartAtZero { start_time: f64 },

    #[error("segment {index} does not begin where its predecessor ends")]
    CoverageBreak { index: usize },

    #[error("plan ends at {end_time}s but the video lasts {duration}s")]
    DoesNotCoverDuration { end_time: f64, duration: f64 },

    #[error(
        "segment {index} crop rectangle {crop_width}x{crop_height}+{crop_x}+{crop_y} \
         exceeds source {source_width}x{source_height}"
    )]
    CropOutOfBounds {
        index: usize,
        crop_x: u32,
        crop_y: u32,
        crop_width: u32,
        crop_height: u32,
        source_width: u32,
        source_height: u32,
    },
}

/// An ordered, gap-free, non-overlapping sequence of crop segments covering
/// a video's full duration.
///
/// A `CropPlan` can only be obtained through [`CropPlan::from_segments`]
/// (strict validation) or [`CropPlan::repair`] (deterministic repair followed
/// by the same validation), so holding one means the renderer invariants
/// hold. Plans are immutable after creation; readers of the persisted JSON
/// artifact deserialize the bare segment array and re-validate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CropPlan {
    segments: Vec<CropSegment>,
}

impl CropPlan {
    /// Validate raw segments into a plan without repairing anything.
    pub fn from_segments(
        segments: Vec<CropSegment>,
        duration: Option<f64>,
        resolution: Option<(u32, u32)>,
    ) -> Result<Self, PlanValidationError> {
        validate(&segments, duration, resolution)?;
        Ok(Self { segments })
    }

    /// Apply the deterministic repair policy, then validate.
    ///
    /// Repair steps, applied identically regardless of which defect is
    /// present:
    /// 1. sort by `start_time`;
    /// 2. snap the first segment's start back to 0;
    /// 3. snap every interior boundary to the next segment's start (this
    ///    fills gaps and truncates overlaps with the same rule);
    /// 4. drop trailing segments starting at or past the known duration and
    ///    snap the last segment's end to it (extending or truncating);
    /// 5. drop segments emptied by truncation;
    /// 6. clamp crop offsets into source bounds when the resolution is known.
    ///
    /// The policy is idempotent: repairing an already-repaired list is a
    /// no-op.
    pub fn repair(
        mut segments: Vec<CropSegment>,
        duration: f64,
        resolution: Option<(u32, u32)>,
    ) -> Result<Self, PlanValidationError> {
        if segments.is_empty() {
            return Err(PlanValidationError::Empty);
        }

        segments.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        segments[0].start_time = 0.0;

        // Interior boundaries: each segment ends where the next one starts.
        for i in 0..segments.len() - 1 {
            let next_start = segments[i + 1].start_time;
            segments[i].end_time = next_start;
        }

        // The surviving last segment always ends exactly at the video's end,
        // extended or truncated as needed. Trailing segments that start at or
        // beyond the end cannot survive truncation and are removed outright.
        while segments.len() > 1
            && segments
                .last()
                .map(|s| s.start_time >= duration)
                .unwrap_or(false)
        {
            segments.pop();
        }
        if let Some(last) = segments.last_mut() {
            last.end_time = duration;
        }

        // Truncation against a co-located successor can empty a segment.
        segments.retain(|s| s.duration() > BOUNDARY_EPSILON);

        if let Some((source_width, source_height)) = resolution {
            for seg in &mut segments {
                if seg.crop_width <= source_width {
                    seg.crop_x = seg.crop_x.min(source_width - seg.crop_width);
                }
                if seg.crop_height <= source_height {
                    seg.crop_y = seg.crop_y.min(source_height - seg.crop_height);
                }
            }
        }

        Self::from_segments(segments, Some(duration), resolution)
    }

    /// The ordered segments.
    pub fn segments(&self) -> &[CropSegment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// A plan is never empty, but clippy insists the pair exists.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of all segment durations; equals the covered video duration.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(CropSegment::duration).sum()
    }
}

fn validate(
    segments: &[CropSegment],
    duration: Option<f64>,
    resolution: Option<(u32, u32)>,
) -> Result<(), PlanValidationError> {
    if segments.is_empty() {
        return Err(PlanValidationError::Empty);
    }

    for (index, seg) in segments.iter().enumerate() {
        if seg.start_time < -BOUNDARY_EPSILON {
            return Err(PlanValidationError::NegativeStart {
                index,
                start_time: seg.start_time,
            });
        }
        if seg.duration() <= BOUNDARY_EPSILON {
            return Err(PlanValidationError::NonPositiveDuration {
                index,
                start_time: seg.start_time,
                end_time: seg.end_time,
            });
        }
        // Crop dimensions must be positive even when the source resolution is
        // unknown and bounds cannot be checked.
        if seg.crop_width == 0 || seg.crop_height == 0 {
            return Err(PlanValidationError::ZeroCropDimension { index });
        }
        if let Some((source_width, source_height)) = resolution {
            if !seg.fits_within(source_width, source_height) {
                return Err(PlanValidationError::CropOutOfBounds {
                    index,
                    crop_x: seg.crop_x,
                    crop_y: seg.crop_y,
                    crop_width: seg.crop_width,
                    crop_height: seg.crop_height,
                    source_width,
                    source_height,
                });
            }
        }
    }

    if segments[0].start_time.abs() > BOUNDARY_EPSILON {
        return Err(PlanValidationError::DoesNotStartAtZero {
            start_time: segments[0].start_time,
        });
    }

    for index in 1..segments.len() {
        if (segments[index].start_time - segments[index - 1].end_time).abs() > BOUNDARY_EPSILON {
            return Err(PlanValidationError::CoverageBreak { index });
        }
    }

    if let Some(duration) = duration {
        let end_time = segments.last().map(|s| s.end_time).unwrap_or(0.0);
        if end_time + BOUNDARY_EPSILON < duration {
            return Err(PlanValidationError::DoesNotCoverDuration { end_time, duration });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, x: u32) -> CropSegment {
        CropSegment::new(start, end, x, 0, 607, 1080)
    }

    #[test]
    fn test_valid_plan_accepted() {
        let plan = CropPlan::from_segments(
            vec![seg(0.0, 5.0, 0), seg(5.0, 10.0, 100)],
            Some(10.0),
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert!((plan.total_duration() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_plan_rejected() {
        let result = CropPlan::from_segments(vec![], Some(10.0), None);
        assert_eq!(result.unwrap_err(), PlanValidationError::Empty);

        let result = CropPlan::repair(vec![], 10.0, None);
        assert_eq!(result.unwrap_err(), PlanValidationError::Empty);
    }

    #[test]
    fn test_single_full_cover_segment_unchanged() {
        let plan = CropPlan::repair(vec![seg(0.0, 10.0, 50)], 10.0, Some((1920, 1080))).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.segments()[0], seg(0.0, 10.0, 50));
    }

    #[test]
    fn test_repair_sorts_out_of_order_segments() {
        let plan = CropPlan::repair(
            vec![seg(5.0, 10.0, 200), seg(0.0, 5.0, 0)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.segments()[0].crop_x, 0);
        assert_eq!(plan.segments()[1].crop_x, 200);
    }

    #[test]
    fn test_repair_extends_first_segment_to_zero() {
        let plan = CropPlan::repair(vec![seg(2.0, 10.0, 0)], 10.0, None).unwrap();
        assert_eq!(plan.segments()[0].start_time, 0.0);
    }

    #[test]
    fn test_repair_extends_last_segment_to_duration() {
        let plan = CropPlan::repair(vec![seg(0.0, 8.0, 0)], 10.0, None).unwrap();
        assert_eq!(plan.segments()[0].end_time, 10.0);
    }

    #[test]
    fn test_repair_fills_gap_by_extending_earlier_segment() {
        // Gap [5,7) for a 10 second video: first segment grows to [0,7)
        let plan = CropPlan::repair(
            vec![seg(0.0, 5.0, 0), seg(7.0, 10.0, 300)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.segments()[0].end_time, 7.0);
        assert_eq!(plan.segments()[1].start_time, 7.0);
        assert!((plan.total_duration() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_repair_truncates_overlap_to_later_start() {
        let plan = CropPlan::repair(
            vec![seg(0.0, 6.0, 0), seg(4.0, 10.0, 300)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.segments()[0].end_time, 4.0);
        assert_eq!(plan.segments()[1].start_time, 4.0);
    }

    #[test]
    fn test_repair_drops_segment_emptied_by_truncation() {
        // Second segment is fully contained in the overlap of its successor.
        let plan = CropPlan::repair(
            vec![seg(0.0, 8.0, 0), seg(3.0, 4.0, 100), seg(3.0, 10.0, 200)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert!((plan.total_duration() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let raw = vec![seg(1.0, 5.0, 0), seg(7.0, 9.5, 300), seg(4.0, 7.0, 150)];
        let once = CropPlan::repair(raw.clone(), 10.0, Some((1920, 1080))).unwrap();
        let twice =
            CropPlan::repair(once.segments().to_vec(), 10.0, Some((1920, 1080))).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_repair_clamps_offset_crop_into_bounds() {
        let plan = CropPlan::repair(
            vec![CropSegment::new(0.0, 10.0, 1500, 0, 607, 1080)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.segments()[0].crop_x, 1313);
    }

    #[test]
    fn test_oversized_crop_rejected() {
        let result = CropPlan::repair(
            vec![CropSegment::new(0.0, 10.0, 0, 0, 2500, 1080)],
            10.0,
            Some((1920, 1080)),
        );
        assert!(matches!(
            result,
            Err(PlanValidationError::CropOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_zero_dimension_crop_rejected_without_resolution() {
        // Positivity holds even when bounds cannot be checked.
        let result = CropPlan::repair(
            vec![CropSegment::new(0.0, 10.0, 0, 0, 0, 1080)],
            10.0,
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            PlanValidationError::ZeroCropDimension { index: 0 }
        );

        let result = CropPlan::from_segments(
            vec![CropSegment::new(0.0, 10.0, 0, 0, 607, 0)],
            Some(10.0),
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            PlanValidationError::ZeroCropDimension { index: 0 }
        );
    }

    #[test]
    fn test_repair_truncates_last_segment_past_duration() {
        let plan = CropPlan::repair(
            vec![seg(0.0, 5.0, 0), seg(5.0, 12.0, 300)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.segments()[1].end_time, 10.0);
        assert!((plan.total_duration() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_repair_drops_trailing_segment_beyond_duration() {
        // A segment entirely past the end cannot survive truncation.
        let plan = CropPlan::repair(
            vec![seg(0.0, 5.0, 0), seg(12.0, 15.0, 300)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.segments()[0].end_time, 10.0);
    }

    #[test]
    fn test_coverage_break_rejected_without_repair() {
        let result = CropPlan::from_segments(
            vec![seg(0.0, 5.0, 0), seg(6.0, 10.0, 0)],
            Some(10.0),
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            PlanValidationError::CoverageBreak { index: 1 }
        );
    }

    #[test]
    fn test_artifact_round_trip() {
        let plan = CropPlan::repair(
            vec![seg(0.0, 5.0, 0), seg(5.0, 10.0, 640)],
            10.0,
            Some((1920, 1080)),
        )
        .unwrap();

        let json = serde_json::to_string_pretty(&plan).unwrap();
        // Transparent serialization: the artifact is a bare JSON array.
        assert!(json.trim_start().starts_with('['));

        let segments: Vec<CropSegment> = serde_json::from_str(&json).unwrap();
        let parsed =
            CropPlan::from_segments(segments, Some(10.0), Some((1920, 1080))).unwrap();
        assert_eq!(parsed, plan);
    }
}
