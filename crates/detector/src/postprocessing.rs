use crate::backend::InferenceOutput;
use crate::classes::class_label;
use crate::error::DetectorError;
use ndarray::Axis;

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// (x1, y1, x2, y2) in original-image pixel coordinates
    pub bbox: [i32; 4],
    pub class_id: usize,
    /// `None` when the class table has a gap at this id
    pub class_name: Option<String>,
    pub confidence: f32,
}

pub struct PostProcessor {
    pub confidence_threshold: f32,
}

impl PostProcessor {
    pub fn new(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Decode raw model outputs into detections.
    ///
    /// For every query row the maximum raw class score is compared against
    /// the threshold (strictly greater keeps the row), the cxcywh box is
    /// converted to corners and rescaled to `original_size` pixels with
    /// round-half-up semantics. Every row above threshold is kept in input
    /// order; the model's query matching already spreads candidates, so no
    /// non-maximum suppression runs here.
    pub fn decode(
        &self,
        output: &InferenceOutput,
        original_size: (u32, u32),
    ) -> Result<Vec<Detection>, DetectorError> {
        let boxes = output
            .boxes
            .view()
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|_| {
                DetectorError::BadOutputShape(format!(
                    "box tensor must be [1, N, 4], got {:?}",
                    output.boxes.shape()
                ))
            })?;
        let logits = output
            .logits
            .view()
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|_| {
                DetectorError::BadOutputShape(format!(
                    "logit tensor must be [1, N, C], got {:?}",
                    output.logits.shape()
                ))
            })?;

        if boxes.shape()[2] != 4 {
            return Err(DetectorError::BadOutputShape(format!(
                "box tensor last axis must be 4, got {:?}",
                boxes.shape()
            )));
        }
        if boxes.shape()[1] != logits.shape()[1] {
            return Err(DetectorError::BadOutputShape(format!(
                "box and logit query counts differ: {} vs {}",
                boxes.shape()[1],
                logits.shape()[1]
            )));
        }

        let boxes = boxes.index_axis(Axis(0), 0);
        let logits = logits.index_axis(Axis(0), 0);
        let (orig_w, orig_h) = (original_size.0 as f32, original_size.1 as f32);

        let mut detections = Vec::new();

        for (box_row, score_row) in boxes.axis_iter(Axis(0)).zip(logits.axis_iter(Axis(0))) {
            let mut max_score = f32::NEG_INFINITY;
            let mut class_id = 0usize;
            for (c, &score) in score_row.iter().enumerate() {
                if score > max_score {
                    max_score = score;
                    class_id = c;
                }
            }

            if max_score <= self.confidence_threshold {
                continue;
            }

            let (x1, y1, x2, y2) = cxcywh_to_xyxy(box_row[0], box_row[1], box_row[2], box_row[3]);
            let bbox = [
                scale_to_pixel(x1, orig_w),
                scale_to_pixel(y1, orig_h),
                scale_to_pixel(x2, orig_w),
                scale_to_pixel(y2, orig_h),
            ];

            detections.push(Detection {
                bbox,
                class_id,
                class_name: class_label(class_id),
                confidence: max_score,
            });
        }

        tracing::debug!(count = detections.len(), "Decoded detections");

        Ok(detections)
    }
}

/// Convert bounding box from center-width-height format to corner format
#[inline]
fn cxcywh_to_xyxy(cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
    let x1 = cx - w / 2.0;
    let y1 = cy - h / 2.0;
    let x2 = cx + w / 2.0;
    let y2 = cy + h / 2.0;
    (x1, y1, x2, y2)
}

/// Scale a normalized coordinate to pixels, rounding half up.
#[inline]
fn scale_to_pixel(coord: f32, scale: f32) -> i32 {
    (coord * scale + 0.5) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    /// Build an InferenceOutput from explicit boxes and one hot score per
    /// row; all other class scores sit at -10.0.
    fn create_test_output(
        boxes_cxcywh: Vec<[f32; 4]>,
        class_scores: Vec<(usize, f32)>,
        num_classes: usize,
    ) -> InferenceOutput {
        let n = boxes_cxcywh.len();

        let mut box_data = Vec::with_capacity(n * 4);
        for b in &boxes_cxcywh {
            box_data.extend_from_slice(b);
        }
        let boxes = Array::from_shape_vec(IxDyn(&[1, n, 4]), box_data).unwrap();

        let mut logit_data = vec![-10.0f32; n * num_classes];
        for (i, (class_idx, score)) in class_scores.iter().enumerate() {
            logit_data[i * num_classes + class_idx] = *score;
        }
        let logits = Array::from_shape_vec(IxDyn(&[1, n, num_classes]), logit_data).unwrap();

        InferenceOutput { boxes, logits }
    }

    #[test]
    fn end_to_end_toy_example() {
        // Two-class toy table: box centered at (0.5, 0.5) with size 0.2,
        // class 1 ("bicycle") at score 0.9, threshold 0.6, 100x100 image.
        let output = create_test_output(vec![[0.5, 0.5, 0.2, 0.2]], vec![(1, 0.9)], 2);

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.class_id, 1);
        assert_eq!(det.class_name.as_deref(), Some("bicycle"));
        assert!((det.confidence - 0.9).abs() < 1e-6);
        assert_eq!(det.bbox, [40, 40, 60, 60]);
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let output = create_test_output(
            vec![
                [0.5, 0.5, 0.2, 0.2], // exactly at threshold: dropped
                [0.5, 0.5, 0.2, 0.2], // just above: kept
                [0.5, 0.5, 0.2, 0.2], // below: dropped
            ],
            vec![(1, 0.6), (2, 0.601), (3, 0.2)],
            91,
        );

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert_eq!(detections.len(), 1, "only the score above 0.6 survives");
        assert_eq!(detections[0].class_id, 2);
    }

    #[test]
    fn overlapping_detections_are_all_retained() {
        // Two near-identical boxes above threshold: both must come out,
        // in input row order. No suppression.
        let output = create_test_output(
            vec![[0.5, 0.5, 0.4, 0.4], [0.51, 0.5, 0.4, 0.4]],
            vec![(3, 0.95), (3, 0.9)],
            91,
        );

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (200, 200)).unwrap();

        assert_eq!(detections.len(), 2, "overlap must not suppress anything");
        assert!(detections[0].confidence > detections[1].confidence);
        assert_eq!(detections[0].class_id, 3);
        assert_eq!(detections[1].class_id, 3);
    }

    #[test]
    fn rescaling_rounds_half_up() {
        // All inputs are exact binary fractions, so the scaled coordinates
        // are exact: x1 = 37.5 -> 38, x2 = 62.5 -> 63 (half rounds up),
        // y1 = 31.25 -> 31, y2 = 68.75 -> 69 (ordinary rounding).
        let output = create_test_output(vec![[0.5, 0.5, 0.25, 0.375]], vec![(1, 0.9)], 91);

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert_eq!(detections[0].bbox, [38, 31, 63, 69]);
    }

    #[test]
    fn rescaling_uses_width_and_height_independently() {
        let output = create_test_output(vec![[0.5, 0.5, 0.2, 0.2]], vec![(1, 0.9)], 91);

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (200, 100)).unwrap();

        assert_eq!(
            detections[0].bbox,
            [80, 40, 120, 60],
            "x scales by width, y by height"
        );
    }

    #[test]
    fn gap_class_ids_have_no_label() {
        // id 12 is one of COCO's unused slots
        let output = create_test_output(vec![[0.5, 0.5, 0.2, 0.2]], vec![(12, 0.9)], 91);

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert_eq!(detections[0].class_id, 12);
        assert_eq!(detections[0].class_name, None);
    }

    #[test]
    fn out_of_table_ids_get_synthesized_labels() {
        let output = create_test_output(vec![[0.5, 0.5, 0.2, 0.2]], vec![(95, 0.9)], 120);

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert_eq!(detections[0].class_id, 95);
        assert_eq!(detections[0].class_name.as_deref(), Some("class_95"));
    }

    #[test]
    fn detections_come_out_in_query_order() {
        let output = create_test_output(
            vec![
                [0.1, 0.1, 0.05, 0.05],
                [0.2, 0.2, 0.05, 0.05],
                [0.3, 0.3, 0.05, 0.05],
            ],
            vec![(1, 0.7), (17, 0.99), (3, 0.8)],
            91,
        );

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        let ids: Vec<usize> = detections.iter().map(|d| d.class_id).collect();
        assert_eq!(ids, vec![1, 17, 3], "row order, not confidence order");
    }

    #[test]
    fn empty_query_set_yields_no_detections() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 0, 4]), vec![]).unwrap();
        let logits = Array::from_shape_vec(IxDyn(&[1, 0, 91]), vec![]).unwrap();
        let output = InferenceOutput { boxes, logits };

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn all_below_threshold_yields_no_detections() {
        let output = create_test_output(
            vec![[0.1, 0.1, 0.1, 0.1], [0.2, 0.2, 0.1, 0.1]],
            vec![(1, 0.3), (2, 0.59)],
            91,
        );

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (100, 100)).unwrap();

        assert!(detections.is_empty());
    }

    #[test]
    fn malformed_box_axis_is_rejected() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 2, 5]), vec![0.0; 10]).unwrap();
        let logits = Array::from_shape_vec(IxDyn(&[1, 2, 91]), vec![0.0; 182]).unwrap();
        let output = InferenceOutput { boxes, logits };

        let post_processor = PostProcessor::new(0.6);
        let err = post_processor.decode(&output, (100, 100)).unwrap_err();

        assert!(matches!(err, DetectorError::BadOutputShape(_)));
    }

    #[test]
    fn mismatched_query_counts_are_rejected() {
        let boxes = Array::from_shape_vec(IxDyn(&[1, 3, 4]), vec![0.0; 12]).unwrap();
        let logits = Array::from_shape_vec(IxDyn(&[1, 2, 91]), vec![0.0; 182]).unwrap();
        let output = InferenceOutput { boxes, logits };

        let post_processor = PostProcessor::new(0.6);
        let err = post_processor.decode(&output, (100, 100)).unwrap_err();

        assert!(matches!(err, DetectorError::BadOutputShape(_)));
    }

    #[test]
    fn realistic_query_set_filters_to_confident_rows() {
        // 300 queries, three confident rows, everything else at -10.0
        let num_queries = 300;
        let num_classes = 91;

        let mut box_data = vec![0.0f32; num_queries * 4];
        box_data[0..4].copy_from_slice(&[0.2, 0.3, 0.2, 0.4]);
        box_data[4..8].copy_from_slice(&[0.5, 0.5, 0.3, 0.3]);
        box_data[8..12].copy_from_slice(&[0.8, 0.8, 0.3, 0.3]);
        let boxes = Array::from_shape_vec(IxDyn(&[1, num_queries, 4]), box_data).unwrap();

        let mut logit_data = vec![-10.0f32; num_queries * num_classes];
        logit_data[1] = 0.95; // query 0: person
        logit_data[num_classes + 18] = 0.8; // query 1: dog
        logit_data[2 * num_classes + 3] = 0.7; // query 2: car
        let logits = Array::from_shape_vec(IxDyn(&[1, num_queries, num_classes]), logit_data)
            .unwrap();

        let output = InferenceOutput { boxes, logits };

        let post_processor = PostProcessor::new(0.6);
        let detections = post_processor.decode(&output, (1920, 1080)).unwrap();

        assert_eq!(detections.len(), 3, "300 queries filter down to 3");
        assert_eq!(detections[0].class_name.as_deref(), Some("person"));
        assert_eq!(detections[1].class_name.as_deref(), Some("dog"));
        assert_eq!(detections[2].class_name.as_deref(), Some("car"));
    }
}
