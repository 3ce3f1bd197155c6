use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub power: f32,
}

impl Material {
    /// Material whose ambient and diffuse terms share `color`.
    #[must_use]
    pub const fn tinted(color: Color) -> Self {
        Self {
            ambient: color,
            diffuse: color,
            specular: Color::new(1.0, 1.0, 1.0, 1.0),
            emissive: Color::new(0.0, 0.0, 0.0, 0.5),
            power: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialPreset {
    #[default]
    None,
    Red,
    Orange,
    Green,
    Blue,
    Yellow,
    Purple,
    White,
    Black,
}

impl MaterialPreset {
    pub const ALL: [MaterialPreset; 9] = [
        MaterialPreset::None,
        MaterialPreset::Red,
        MaterialPreset::Orange,
        MaterialPreset::Green,
        MaterialPreset::Blue,
        MaterialPreset::Yellow,
        MaterialPreset::Purple,
        MaterialPreset::White,
        MaterialPreset::Black,
    ];

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            MaterialPreset::None => Color::new(1.0, 1.0, 1.0, 0.4),
            MaterialPreset::Red => Color::new(1.0, 0.05, 0.05, 0.5),
            MaterialPreset::Orange => Color::new(0.66, 0.33, 0.05, 0.5),
            MaterialPreset::Green => Color::new(0.05, 1.0, 0.05, 0.25),
            MaterialPreset::Blue => Color::new(0.05, 0.05, 1.0, 0.25),
            MaterialPreset::Yellow => Color::new(0.5, 0.5, 0.05, 0.25),
            MaterialPreset::Purple => Color::new(0.5, 0.05, 0.5, 0.25),
            MaterialPreset::White => Color::new(1.0, 1.0, 1.0, 0.25),
            MaterialPreset::Black => Color::new(0.0, 0.0, 0.0, 0.5),
        }
    }
}

/// The fixed table of preset materials.
#[derive(Debug, Clone)]
pub struct Materials {
    materials: [Material; 9],
}

impl Materials {
    #[must_use]
    pub fn new() -> Self {
        Self {
            materials: MaterialPreset::ALL.map(|preset| Material::tinted(preset.color())),
        }
    }

    #[must_use]
    pub fn get(&self, preset: MaterialPreset) -> &Material {
        &self.materials[preset as usize]
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<MaterialPreset> for Materials {
    type Output = Material;

    fn index(&self, preset: MaterialPreset) -> &Self::Output {
        self.get(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::*;

    fn assert_color(actual: Color, expected: (f32, f32, f32, f32)) {
        assert_float_absolute_eq!(actual.r, expected.0, 0.0001);
        assert_float_absolute_eq!(actual.g, expected.1, 0.0001);
        assert_float_absolute_eq!(actual.b, expected.2, 0.0001);
        assert_float_absolute_eq!(actual.a, expected.3, 0.0001);
    }

    #[test]
    fn golden_table() {
        let expected = [
            (MaterialPreset::None, (1.0, 1.0, 1.0, 0.4)),
            (MaterialPreset::Red, (1.0, 0.05, 0.05, 0.5)),
            (MaterialPreset::Orange, (0.66, 0.33, 0.05, 0.5)),
            (MaterialPreset::Green, (0.05, 1.0, 0.05, 0.25)),
            (MaterialPreset::Blue, (0.05, 0.05, 1.0, 0.25)),
            (MaterialPreset::Yellow, (0.5, 0.5, 0.05, 0.25)),
            (MaterialPreset::Purple, (0.5, 0.05, 0.5, 0.25)),
            (MaterialPreset::White, (1.0, 1.0, 1.0, 0.25)),
            (MaterialPreset::Black, (0.0, 0.0, 0.0, 0.5)),
        ];
        let materials = Materials::new();

        for (preset, color) in expected {
            let material = &materials[preset];
            assert_color(material.ambient, color);
            assert_color(material.diffuse, color);
            assert_color(material.specular, (1.0, 1.0, 1.0, 1.0));
            assert_color(material.emissive, (0.0, 0.0, 0.0, 0.5));
            assert_float_absolute_eq!(material.power, 1.0, 0.0);
        }
    }

    #[test]
    fn default_preset_is_none() {
        assert_eq!(MaterialPreset::default(), MaterialPreset::None);
        assert_eq!(
            Materials::default().get(MaterialPreset::default()),
            &Material::tinted(Color::new(1.0, 1.0, 1.0, 0.4))
        );
    }
}
