use image::Rgba;

/// The three reference colours every renderer draws with. The encoder buckets layer pixels back
/// into these values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Shade {
    /// Surface facing the light (pure red).
    Highlight = 0,
    /// Unlit flat surface (pure green).
    Neutral = 1,
    /// Surface facing away from the light (pure blue).
    Shadow = 2,
}

impl Shade {
    pub const ALL: [Shade; 3] = [Shade::Highlight, Shade::Neutral, Shade::Shadow];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn color(self) -> Rgba<u8> {
        match self {
            Shade::Highlight => Rgba([255, 0, 0, 255]),
            Shade::Neutral => Rgba([0, 255, 0, 255]),
            Shade::Shadow => Rgba([0, 0, 255, 255]),
        }
    }

    /// Nearest reference colour by dominant channel; ties resolve toward the lower value.
    pub fn classify(px: &Rgba<u8>) -> Shade {
        let [r, g, b, _] = px.0;
        if r >= g && r >= b {
            Shade::Highlight
        } else if g >= b {
            Shade::Neutral
        } else {
            Shade::Shadow
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/palette.rs"]
mod tests;
