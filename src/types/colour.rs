//! Colour type used by pixel targets and tilesheets.

use std::fmt;

/// An RGBA colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    /// Create a new colour from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colour.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Black. The canvas background for areas no layer covers.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Convert to an RGBA array.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Check if the colour is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Check if the colour is fully opaque.
    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Source-over alpha composite of `self` onto `dest`.
    ///
    /// Matches the alpha-blend state tile passes draw with: fully opaque
    /// source replaces, fully transparent source leaves `dest` untouched,
    /// anything in between blends per channel.
    pub fn over(self, dest: Colour) -> Colour {
        if self.a == 255 {
            return self;
        }
        if self.a == 0 {
            return dest;
        }

        let sa = self.a as u32;
        let da = dest.a as u32;
        let out_a = sa + da * (255 - sa) / 255;
        if out_a == 0 {
            return Colour::TRANSPARENT;
        }

        let blend = |s: u8, d: u8| -> u8 {
            let s = s as u32;
            let d = d as u32;
            ((s * sa + d * da * (255 - sa) / 255) / out_a) as u8
        };

        Colour::new(
            blend(self.r, dest.r),
            blend(self.g, dest.g),
            blend(self.b, dest.b),
            out_a as u8,
        )
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Colour::BLACK, Colour::rgb(0, 0, 0));
        assert_eq!(Colour::WHITE, Colour::rgb(255, 255, 255));
        assert!(Colour::TRANSPARENT.is_transparent());
        assert!(Colour::BLACK.is_opaque());
    }

    #[test]
    fn test_over_opaque_replaces() {
        let red = Colour::rgb(255, 0, 0);
        assert_eq!(red.over(Colour::BLACK), red);
    }

    #[test]
    fn test_over_transparent_keeps_dest() {
        let green = Colour::rgb(0, 255, 0);
        assert_eq!(Colour::TRANSPARENT.over(green), green);
    }

    #[test]
    fn test_over_half_alpha_on_black() {
        let half_red = Colour::new(255, 0, 0, 128);
        let out = half_red.over(Colour::BLACK);

        assert!(out.is_opaque());
        // 255 * 128 / 255 = 128, give or take integer rounding
        assert!(out.r >= 127 && out.r <= 129, "r was {}", out.r);
        assert_eq!(out.g, 0);
        assert_eq!(out.b, 0);
    }

    #[test]
    fn test_over_preserves_opacity_of_dest() {
        let half = Colour::new(0, 0, 255, 100);
        let out = half.over(Colour::rgb(255, 255, 255));
        assert!(out.is_opaque());
    }

    #[test]
    fn test_to_rgba() {
        assert_eq!(Colour::new(1, 2, 3, 4).to_rgba(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Colour::rgb(255, 0, 0)), "#FF0000");
        assert_eq!(format!("{}", Colour::new(255, 0, 0, 128)), "#FF000080");
    }
}
