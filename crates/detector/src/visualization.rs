use crate::error::DetectorError;
use crate::postprocessing::Detection;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub struct Visualizer {
    font: FontRef<'static>,
    font_scale: PxScale,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualizer {
    pub fn new() -> Self {
        let font_data = include_bytes!("../assets/DejaVuSans.ttf");
        let font = FontRef::try_from_slice(font_data).expect("embedded font parses");

        Self {
            font,
            font_scale: PxScale::from(18.0),
        }
    }

    /// Re-read the original image, overlay the detections, and save the
    /// annotated copy to `output_path`.
    pub fn annotate(
        &self,
        image_path: &Path,
        detections: &[Detection],
        output_path: &Path,
    ) -> anyhow::Result<()> {
        let mut image = image::open(image_path)
            .map_err(|source| DetectorError::UnreadableImage {
                path: image_path.to_path_buf(),
                source,
            })?
            .to_rgb8();

        self.draw_detections(&mut image, detections);

        image.save(output_path)?;
        tracing::info!(path = %output_path.display(), "Annotated image written");

        Ok(())
    }

    pub fn draw_detections(&self, image: &mut RgbImage, detections: &[Detection]) {
        for detection in detections {
            let [x1, y1, x2, y2] = detection.bbox;
            let width = (x2 - x1).max(1) as u32;
            let height = (y2 - y1).max(1) as u32;

            let rect = Rect::at(x1, y1).of_size(width, height);
            draw_hollow_rect_mut(image, rect, BOX_COLOR);
            // Second rectangle for a 2px outline
            let inner = Rect::at(x1 + 1, y1 + 1)
                .of_size(width.saturating_sub(2).max(1), height.saturating_sub(2).max(1));
            draw_hollow_rect_mut(image, inner, BOX_COLOR);

            let label = format!(
                "{}: {:.2}",
                detection.class_name.as_deref().unwrap_or("unknown"),
                detection.confidence
            );
            let text_y = (y1 - 20).max(0);
            draw_text_mut(
                image,
                TEXT_COLOR,
                x1.max(0),
                text_y,
                self.font_scale,
                &self.font,
                &label,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(bbox: [i32; 4], class_name: Option<&str>) -> Detection {
        Detection {
            bbox,
            class_id: 1,
            class_name: class_name.map(str::to_owned),
            confidence: 0.87,
        }
    }

    #[test]
    fn drawing_marks_the_box_outline() {
        let visualizer = Visualizer::new();
        let mut image = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));

        visualizer.draw_detections(&mut image, &[detection([20, 30, 60, 70], Some("person"))]);

        assert_eq!(*image.get_pixel(20, 50), BOX_COLOR, "left edge");
        assert_eq!(*image.get_pixel(59, 50), BOX_COLOR, "right edge");
        assert_eq!(*image.get_pixel(40, 30), BOX_COLOR, "top edge");
        assert_eq!(
            *image.get_pixel(40, 50),
            Rgb([0, 0, 0]),
            "interior stays untouched"
        );
    }

    #[test]
    fn out_of_bounds_boxes_do_not_panic() {
        let visualizer = Visualizer::new();
        let mut image = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));

        visualizer.draw_detections(
            &mut image,
            &[
                detection([-10, -10, 20, 20], Some("person")),
                detection([40, 40, 80, 80], None),
            ],
        );
    }
}
