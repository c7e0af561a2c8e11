/// JPEG 编码 (frames sent to the detector and the report endpoint)
use crate::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    frame.write_with_encoder(encoder)?;
    Ok(bytes)
}

pub fn encode_jpeg_base64(frame: &RgbImage, quality: u8) -> Result<String> {
    Ok(BASE64.encode(encode_jpeg(frame, quality)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_jpeg_round_trip_dimensions() {
        let frame = RgbImage::from_pixel(32, 16, Rgb([200, 40, 40]));
        let bytes = encode_jpeg(&frame, 80).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn test_base64_is_decodable() {
        let frame = RgbImage::new(8, 8);
        let text = encode_jpeg_base64(&frame, 50).unwrap();
        let bytes = BASE64.decode(text).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
