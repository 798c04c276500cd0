use anyhow::{Context, Result};
use image::RgbaImage;
use log::debug;
use minimp4::Mp4Muxer;
use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVBuffer;
use std::fs;
use std::io::Cursor;
use std::path::Path;

const BITRATE_BPS: u32 = 5_000_000;

/// Converts an RGBA frame to planar YUV 4:2:0 (BT.601). Chroma is averaged over
/// each 2x2 block; odd edges average the pixels that exist.
pub fn rgba_to_yuv420(image: &RgbaImage) -> Vec<u8> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let chroma_width = width.div_ceil(2);
    let chroma_height = height.div_ceil(2);
    let chroma_len = chroma_width * chroma_height;

    let mut yuv = vec![0u8; width * height + 2 * chroma_len];
    let (luma, chroma) = yuv.split_at_mut(width * height);
    let (u_plane, v_plane) = chroma.split_at_mut(chroma_len);

    for (i, pixel) in image.pixels().enumerate() {
        let [r, g, b] = [pixel[0] as f32, pixel[1] as f32, pixel[2] as f32];
        luma[i] = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
    }

    for cy in 0..chroma_height {
        for cx in 0..chroma_width {
            let (mut u_sum, mut v_sum, mut count) = (0.0f32, 0.0f32, 0.0f32);
            for y in (2 * cy)..(2 * cy + 2).min(height) {
                for x in (2 * cx)..(2 * cx + 2).min(width) {
                    let pixel = image.get_pixel(x as u32, y as u32);
                    let [r, g, b] = [pixel[0] as f32, pixel[1] as f32, pixel[2] as f32];
                    u_sum += -0.169 * r - 0.331 * g + 0.5 * b + 128.0;
                    v_sum += 0.5 * r - 0.419 * g - 0.081 * b + 128.0;
                    count += 1.0;
                }
            }
            let idx = cy * chroma_width + cx;
            u_plane[idx] = (u_sum / count).round().clamp(0.0, 255.0) as u8;
            v_plane[idx] = (v_sum / count).round().clamp(0.0, 255.0) as u8;
        }
    }
    yuv
}

/// H.264 encoder that collects the bitstream in memory until [`VideoWriter::finish`].
pub struct VideoWriter {
    encoder: Encoder,
    h264: Vec<u8>,
    width: u32,
    height: u32,
    frames: usize,
}

impl VideoWriter {
    /// `width` and `height` must be even.
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        let config = EncoderConfig::new()
            .max_frame_rate(FrameRate::from_hz(fps as f32))
            .bitrate(BitRate::from_bps(BITRATE_BPS));
        let encoder = Encoder::with_api_config(openh264::OpenH264API::from_source(), config)
            .context("Failed to initialize H.264 encoder")?;
        Ok(Self {
            encoder,
            h264: Vec::new(),
            width,
            height,
            frames: 0,
        })
    }

    /// Encodes one frame given as YUV 4:2:0 bytes from [`rgba_to_yuv420`].
    pub fn encode(&mut self, yuv: Vec<u8>) -> Result<()> {
        let source = YUVBuffer::from_vec(yuv, self.width as usize, self.height as usize);
        let bitstream = self
            .encoder
            .encode(&source)
            .with_context(|| format!("Failed to encode frame {}", self.frames))?;
        bitstream.write_vec(&mut self.h264);
        self.frames += 1;
        Ok(())
    }

    /// Muxes the encoded stream into an MP4 file at `path`. Returns the frame count.
    pub fn finish(self, path: &Path, description: &str) -> Result<usize> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut muxer = Mp4Muxer::new(&mut buffer);
            muxer.init_video(self.width as i32, self.height as i32, false, description);
            muxer.write_video(&self.h264);
            muxer.close();
        }
        let bytes = buffer.into_inner();
        debug!("Muxed {} H.264 bytes into {} MP4 bytes.", self.h264.len(), bytes.len());
        fs::write(path, &bytes).with_context(|| format!("Failed to write video file to {}", path.display()))?;
        Ok(self.frames)
    }
}
