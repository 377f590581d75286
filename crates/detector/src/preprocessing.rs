use crate::error::DetectorError;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use ndarray::{Array, IxDyn};
use std::path::Path;

#[derive(Debug)]
pub struct PreprocessOutput {
    /// `[1, H, W, 3]` u8 tensor, BGR channel order, no normalization.
    pub tensor: Array<u8, IxDyn>,
    /// Original image size as (width, height), needed to rescale boxes.
    pub original_size: (u32, u32),
}

pub struct PreProcessor {
    pub input_size: (u32, u32),
}

impl PreProcessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self { input_size }
    }

    /// Decode an image file and turn it into the model's input tensor.
    ///
    /// The resize stretches to `input_size` without preserving aspect
    /// ratio; box coordinates are mapped back through `original_size`
    /// during postprocessing. The graph was exported against OpenCV-style
    /// input, so channels are emitted in BGR order.
    pub fn prepare(&self, path: &Path) -> anyhow::Result<PreprocessOutput> {
        let img = image::open(path).map_err(|source| DetectorError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })?;
        let rgb = img.to_rgb8();
        let original_size = (rgb.width(), rgb.height());

        tracing::debug!(
            width = original_size.0,
            height = original_size.1,
            target_width = self.input_size.0,
            target_height = self.input_size.1,
            "Preparing input tensor"
        );

        let resized = self.stretch_resize(rgb)?;
        let tensor = to_bgr_tensor(&resized, self.input_size)?;

        Ok(PreprocessOutput {
            tensor,
            original_size,
        })
    }

    fn stretch_resize(&self, rgb: image::RgbImage) -> anyhow::Result<Vec<u8>> {
        let (src_width, src_height) = (rgb.width(), rgb.height());
        let mut raw = rgb.into_raw();

        let src = Image::from_slice_u8(src_width, src_height, &mut raw, PixelType::U8x3)?;
        let mut dst = Image::new(self.input_size.0, self.input_size.1, PixelType::U8x3);

        Resizer::new().resize(
            &src,
            &mut dst,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        Ok(dst.buffer().to_vec())
    }
}

fn to_bgr_tensor(buffer: &[u8], (width, height): (u32, u32)) -> anyhow::Result<Array<u8, IxDyn>> {
    let mut data = Vec::with_capacity(buffer.len());
    for px in buffer.chunks_exact(3) {
        data.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    Ok(Array::from_shape_vec(
        IxDyn(&[1, height as usize, width as usize, 3]),
        data,
    )?)
}
