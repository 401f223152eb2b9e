use crate::geometry::ImageSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AspectRatioMode {
    #[default]
    Free,
    Original,
    Square,
    // Landscape
    R3_2,
    R4_3,
    R16_9,
    R16_10,
    // Portrait
    R2_3,
    R3_4,
    R9_16,
    R10_16,
    Custom,
}

impl AspectRatioMode {
    pub const LANDSCAPE: [AspectRatioMode; 4] = [
        AspectRatioMode::R3_2,
        AspectRatioMode::R4_3,
        AspectRatioMode::R16_9,
        AspectRatioMode::R16_10,
    ];

    pub const PORTRAIT: [AspectRatioMode; 4] = [
        AspectRatioMode::R2_3,
        AspectRatioMode::R3_4,
        AspectRatioMode::R9_16,
        AspectRatioMode::R10_16,
    ];

    /// Same shape, other orientation.
    pub fn counterpart(&self) -> Self {
        match self {
            AspectRatioMode::R3_2 => AspectRatioMode::R2_3,
            AspectRatioMode::R4_3 => AspectRatioMode::R3_4,
            AspectRatioMode::R16_9 => AspectRatioMode::R9_16,
            AspectRatioMode::R16_10 => AspectRatioMode::R10_16,
            AspectRatioMode::R2_3 => AspectRatioMode::R3_2,
            AspectRatioMode::R3_4 => AspectRatioMode::R4_3,
            AspectRatioMode::R9_16 => AspectRatioMode::R16_9,
            AspectRatioMode::R10_16 => AspectRatioMode::R16_10,
            _ => *self,
        }
    }

    pub fn is_portrait(&self) -> bool {
        Self::PORTRAIT.contains(self)
    }

    /// Width / height for this mode, `None` when free-form.
    pub fn ratio(&self, image: Option<&ImageSpec>, custom: (u32, u32)) -> Option<f32> {
        match self {
            AspectRatioMode::Free => None,
            AspectRatioMode::Original => image.map(ImageSpec::aspect),
            AspectRatioMode::Square => Some(1.0),
            AspectRatioMode::R3_2 => Some(3.0 / 2.0),
            AspectRatioMode::R4_3 => Some(4.0 / 3.0),
            AspectRatioMode::R16_9 => Some(16.0 / 9.0),
            AspectRatioMode::R16_10 => Some(16.0 / 10.0),
            AspectRatioMode::R2_3 => Some(2.0 / 3.0),
            AspectRatioMode::R3_4 => Some(3.0 / 4.0),
            AspectRatioMode::R9_16 => Some(9.0 / 16.0),
            AspectRatioMode::R10_16 => Some(10.0 / 16.0),
            AspectRatioMode::Custom => Some(custom.0.max(1) as f32 / custom.1.max(1) as f32),
        }
    }

    /// Preset matching `ratio`, falling back to `Custom`.
    pub fn from_ratio(ratio: Option<f32>) -> Self {
        let Some(ratio) = ratio else {
            return AspectRatioMode::Free;
        };
        std::iter::once(AspectRatioMode::Square)
            .chain(Self::LANDSCAPE)
            .chain(Self::PORTRAIT)
            .find(|mode| {
                mode.ratio(None, (1, 1))
                    .is_some_and(|r| (r - ratio).abs() < 1e-3)
            })
            .unwrap_or(AspectRatioMode::Custom)
    }
}

/// Closest `w:h` with `h <= 100` for a free-standing ratio.
pub fn approximate_ratio(ratio: f32) -> (u32, u32) {
    (1..=100u32)
        .map(|h| {
            let w = ((ratio * h as f32).round() as u32).max(1);
            (w, h, (w as f32 / h as f32 - ratio).abs())
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(w, h, _)| (w, h))
        .unwrap_or((1, 1))
}

impl std::fmt::Display for AspectRatioMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AspectRatioMode::Free => "Free",
            AspectRatioMode::Original => "Original",
            AspectRatioMode::Square => "1:1",
            AspectRatioMode::R3_2 => "3:2",
            AspectRatioMode::R4_3 => "4:3",
            AspectRatioMode::R16_9 => "16:9",
            AspectRatioMode::R16_10 => "16:10",
            AspectRatioMode::R2_3 => "2:3",
            AspectRatioMode::R3_4 => "3:4",
            AspectRatioMode::R9_16 => "9:16",
            AspectRatioMode::R10_16 => "10:16",
            AspectRatioMode::Custom => "Custom",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_round_trips() {
        for mode in AspectRatioMode::LANDSCAPE {
            assert!(mode.counterpart().is_portrait());
            assert_eq!(mode.counterpart().counterpart(), mode);
        }
        assert_eq!(AspectRatioMode::Square.counterpart(), AspectRatioMode::Square);
    }

    #[test]
    fn original_uses_image_shape() {
        let spec = ImageSpec::new(1920, 1080);
        let r = AspectRatioMode::Original.ratio(Some(&spec), (1, 1)).unwrap();
        assert!((r - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(AspectRatioMode::Original.ratio(None, (1, 1)), None);
    }

    #[test]
    fn from_ratio_finds_presets() {
        assert_eq!(AspectRatioMode::from_ratio(None), AspectRatioMode::Free);
        assert_eq!(AspectRatioMode::from_ratio(Some(1.0)), AspectRatioMode::Square);
        assert_eq!(AspectRatioMode::from_ratio(Some(0.75)), AspectRatioMode::R3_4);
        assert_eq!(AspectRatioMode::from_ratio(Some(2.35)), AspectRatioMode::Custom);
    }

    #[test]
    fn approximates_odd_ratios() {
        assert_eq!(approximate_ratio(2.35), (47, 20));
        assert_eq!(approximate_ratio(1.0), (1, 1));
    }
}
