use image::RgbaImage;
#[cfg(feature = "parallel")]
use rayon::slice::ParallelSliceMut;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;

/// A color key, red/green/blue.
pub type Rgb = [u8; 3];

const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Replaces every pixel whose RGB equals `color` with fully transparent black.
/// The pixel's own alpha is ignored when matching. `None` leaves the image as is.
pub fn make_transparent(image: &mut RgbaImage, color: Option<Rgb>) {
    let Some(color) = color else {
        return;
    };
    let image_buf: &mut [u8] = &mut **image;

    #[cfg(feature = "parallel")]
    image_buf
        .par_chunks_exact_mut(4)
        .for_each(|px| clear_if_keyed(px, &color));

    #[cfg(not(feature = "parallel"))]
    image_buf
        .chunks_exact_mut(4)
        .for_each(|px| clear_if_keyed(px, &color));
}

fn clear_if_keyed(px: &mut [u8], color: &Rgb) {
    if px[..3] == color[..] {
        px.copy_from_slice(&CLEAR);
    }
}
