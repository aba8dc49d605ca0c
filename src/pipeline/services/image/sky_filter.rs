use image::{imageops::FilterType, DynamicImage, Rgb};

use crate::config::SkyFilterConfig;

/// Hue in degrees, saturation and value in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Hsv {
    pub fn from_rgb(px: &Rgb<u8>) -> Self {
        let r = px[0] as f32 / 255.0;
        let g = px[1] as f32 / 255.0;
        let b = px[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        // achromatic pixels report hue 0
        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Self {
            hue,
            saturation,
            value: max,
        }
    }
}

/// Cheap pre-filter that skips regions which are mostly sky.
#[derive(Debug, Clone, Default)]
pub struct SkyFilter {
    config: SkyFilterConfig,
}

impl SkyFilter {
    pub fn new(config: SkyFilterConfig) -> Self {
        Self { config }
    }

    fn is_sky_like(&self, hsv: Hsv) -> bool {
        let blue = hsv.hue >= self.config.hue_min && hsv.hue <= self.config.hue_max;
        let overcast =
            hsv.value > self.config.bright_min && hsv.saturation < self.config.saturation_max;
        blue || overcast
    }

    /// Fraction of sampled pixels that look like sky.
    pub fn sky_fraction(&self, image: &DynamicImage) -> f32 {
        let n = self.config.sample_size;
        if n == 0 || image.width() == 0 || image.height() == 0 {
            return 0.0;
        }

        let sample = image.resize_exact(n, n, FilterType::Triangle).to_rgb8();
        let sky_pixels = sample
            .pixels()
            .filter(|px| self.is_sky_like(Hsv::from_rgb(px)))
            .count();

        sky_pixels as f32 / sample.pixels().len() as f32
    }

    pub fn is_mostly_sky(&self, image: &DynamicImage) -> bool {
        self.sky_fraction(image) > self.config.sky_fraction_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, RgbImage};

    fn solid(color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb(color)))
    }

    #[test]
    fn hsv_conversion_matches_reference_colors() {
        let blue = Hsv::from_rgb(&Rgb([0, 0, 255]));
        assert_eq!(blue.hue, 240.0);
        assert_eq!(blue.saturation, 1.0);

        let sky = Hsv::from_rgb(&Rgb([135, 206, 235]));
        assert!((sky.hue - 197.4).abs() < 0.5);

        let grey = Hsv::from_rgb(&Rgb([128, 128, 128]));
        assert_eq!(grey.hue, 0.0);
        assert_eq!(grey.saturation, 0.0);

        let magenta = Hsv::from_rgb(&Rgb([255, 0, 128]));
        assert!(magenta.hue > 329.0 && magenta.hue < 331.0);
    }

    #[test]
    fn blue_and_white_regions_are_sky() {
        let filter = SkyFilter::default();
        assert!(filter.is_mostly_sky(&solid([135, 206, 235])));
        assert!(filter.is_mostly_sky(&solid([250, 250, 250])));
    }

    #[test]
    fn vegetation_and_soil_are_not_sky() {
        let filter = SkyFilter::default();
        assert!(!filter.is_mostly_sky(&solid([40, 140, 40])));
        assert!(!filter.is_mostly_sky(&solid([120, 80, 40])));
        // bright but saturated yellow
        assert!(!filter.is_mostly_sky(&solid([250, 240, 60])));
    }

    #[test]
    fn fraction_must_exceed_threshold() {
        // top half sky, bottom half field: 50% is not "mostly"
        let mut img = RgbImage::from_pixel(40, 40, Rgb([40, 140, 40]));
        for y in 0..20 {
            for x in 0..40 {
                img.put_pixel(x, y, Rgb([90, 150, 230]));
            }
        }
        let img = DynamicImage::ImageRgb8(img);
        let filter = SkyFilter::default();

        let fraction = filter.sky_fraction(&img);
        assert!(fraction > 0.4 && fraction < 0.6, "fraction was {fraction}");
        assert!(!filter.is_mostly_sky(&img));
    }

    #[test]
    fn configurable_cutoffs_are_honoured() {
        let config = SkyFilterConfig {
            sky_fraction_threshold: 0.3,
            ..SkyFilterConfig::default()
        };
        let mut img = RgbImage::from_pixel(40, 40, Rgb([40, 140, 40]));
        for y in 0..20 {
            for x in 0..40 {
                img.put_pixel(x, y, Rgb([90, 150, 230]));
            }
        }
        assert!(SkyFilter::new(config).is_mostly_sky(&DynamicImage::ImageRgb8(img)));
    }
}
