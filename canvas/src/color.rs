//! RGBA colors, hex parsing, and source-over compositing.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// A straight (non-premultiplied) RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in buffer order.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA` (leading `#` optional).
    ///
    /// 3- and 6-digit forms are fully opaque. Anything else falls back to
    /// opaque black, so a bad color never stops a fill or stroke from replaying.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or(Self::BLACK)
    }

    /// Strict variant of [`Rgba::parse`]; `None` for unsupported formats.
    #[must_use]
    pub fn try_parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let nibbles = hex.bytes().map(nibble).collect::<Option<Vec<u8>>>()?;
        match nibbles.as_slice() {
            [r, g, b] => Some(Self::new(r * 17, g * 17, b * 17, 255)),
            [r1, r0, g1, g0, b1, b0] => Some(Self::new((r1 << 4) | r0, (g1 << 4) | g0, (b1 << 4) | b0, 255)),
            [r1, r0, g1, g0, b1, b0, a1, a0] => Some(Self::new(
                (r1 << 4) | r0,
                (g1 << 4) | g0,
                (b1 << 4) | b0,
                (a1 << 4) | a0,
            )),
            _ => None,
        }
    }

    /// Canonical uppercase `#RRGGBBAA`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Composite `self` over `dst` (canvas `source-over`).
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        let sa = u32::from(self.a);
        if sa == 255 {
            return self;
        }
        if sa == 0 {
            return dst;
        }

        let da = u32::from(dst.a);
        let inv = 255 - sa;
        // Output alpha scaled by 255.
        let out_a = sa * 255 + da * inv;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }

        let channel = |s: u8, d: u8| -> u8 {
            let num = u32::from(s) * sa * 255 + u32::from(d) * da * inv;
            u8::try_from((num + out_a / 2) / out_a).unwrap_or(u8::MAX)
        };

        Self {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: u8::try_from((out_a + 127) / 255).unwrap_or(u8::MAX),
        }
    }
}

fn nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
