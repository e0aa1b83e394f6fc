//! FFmpeg filter graphs.

/// Centered 9:16 crop of the full height, scaled to 1080x1920.
pub const FILTER_VERTICAL_CENTER: &str = "crop=ih*9/16:ih:(iw-ih*9/16)/2:0,scale=1080:1920";

/// 9:16 vertical crop, at `crop_x` when given, centered otherwise.
pub fn vertical_crop_filter(crop_x: Option<u32>) -> String {
    match crop_x {
        Some(x) => format!("crop=ih*9/16:ih:{x}:0,scale=1080:1920"),
        None => FILTER_VERTICAL_CENTER.to_string(),
    }
}

/// Downscale to `height`, keeping aspect ratio with an even width.
pub fn downscale_filter(height: u32) -> String {
    format!("scale=-2:{height}")
}
