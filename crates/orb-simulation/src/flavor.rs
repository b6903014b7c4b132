//! Flavor channels and their mapping onto simulation settings
//!
//! Each flavor has a smell and a taste intensity (0-2, neutral at 1). Their
//! average drives exactly one setting, always relative to the value that
//! setting had at startup, so repeated slider nudges never drift.

use crate::settings::Settings;

/// The four influence channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Fruity,
    Sweet,
    Spicy,
    Smokey,
}

/// Which half of a flavor pair is being set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Smell,
    Taste,
}

/// The setting a flavor drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorTarget {
    Speed,
    Attraction,
    SwirlForce,
    MotionBlurDamp,
}

impl FlavorTarget {
    pub fn read(self, settings: &Settings) -> f32 {
        match self {
            FlavorTarget::Speed => settings.speed,
            FlavorTarget::Attraction => settings.attraction,
            FlavorTarget::SwirlForce => settings.swirl_force,
            FlavorTarget::MotionBlurDamp => settings.motion_blur_damp,
        }
    }
}

impl Flavor {
    pub const ALL: [Flavor; 4] = [Flavor::Fruity, Flavor::Sweet, Flavor::Spicy, Flavor::Smokey];

    pub fn name(self) -> &'static str {
        match self {
            Flavor::Fruity => "Fruity",
            Flavor::Sweet => "Sweet",
            Flavor::Spicy => "Spicy",
            Flavor::Smokey => "Smokey",
        }
    }

    pub fn target(self) -> FlavorTarget {
        match self {
            Flavor::Fruity => FlavorTarget::Speed,
            Flavor::Sweet => FlavorTarget::Attraction,
            Flavor::Spicy => FlavorTarget::SwirlForce,
            Flavor::Smokey => FlavorTarget::MotionBlurDamp,
        }
    }

    /// Change in the target setting per unit of average intensity above 1
    pub fn coefficient(self) -> f32 {
        match self {
            Flavor::Fruity => 0.5,
            Flavor::Sweet => 0.25,
            Flavor::Spicy => 0.1,
            Flavor::Smokey => 0.06,
        }
    }

    /// Signature color shown while this flavor is selected
    pub fn color(self) -> u32 {
        match self {
            Flavor::Fruity => 0x9747ff,
            Flavor::Sweet => 0xefc300,
            Flavor::Spicy => 0xff0141,
            Flavor::Smokey => 0xd65900,
        }
    }

    fn slot(self) -> usize {
        match self {
            Flavor::Fruity => 0,
            Flavor::Sweet => 1,
            Flavor::Spicy => 2,
            Flavor::Smokey => 3,
        }
    }
}

/// Smell/taste pair for one flavor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intensity {
    pub smell: f32,
    pub taste: f32,
}

impl Default for Intensity {
    fn default() -> Self {
        Self {
            smell: 1.0,
            taste: 1.0,
        }
    }
}

impl Intensity {
    pub fn average(&self) -> f32 {
        (self.smell + self.taste) / 2.0
    }
}

/// A computed setting write, ready to go through the reactive write path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlavorWrite {
    pub target: FlavorTarget,
    pub value: f32,
}

/// `base + coefficient * (average - 1)`
pub fn map_flavor(base: f32, coefficient: f32, average: f32) -> f32 {
    base + coefficient * (average - 1.0)
}

/// Current intensities plus the startup value of every driven setting
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorMapping {
    intensities: [Intensity; 4],
    bases: [f32; 4],
}

impl FlavorMapping {
    /// Capture the base values from the startup settings
    pub fn new(settings: &Settings) -> Self {
        Self {
            intensities: [Intensity::default(); 4],
            bases: Flavor::ALL.map(|flavor| flavor.target().read(settings)),
        }
    }

    pub fn intensity(&self, flavor: Flavor) -> Intensity {
        self.intensities[flavor.slot()]
    }

    pub fn base(&self, flavor: Flavor) -> f32 {
        self.bases[flavor.slot()]
    }

    /// Pure mapping from an average intensity to the target setting's value
    pub fn map(&self, flavor: Flavor, average: f32) -> FlavorWrite {
        FlavorWrite {
            target: flavor.target(),
            value: map_flavor(self.base(flavor), flavor.coefficient(), average),
        }
    }

    /// Record one channel and return the write it implies
    pub fn set(&mut self, flavor: Flavor, channel: Channel, value: f32) -> FlavorWrite {
        let intensity = &mut self.intensities[flavor.slot()];
        match channel {
            Channel::Smell => intensity.smell = value,
            Channel::Taste => intensity.taste = value,
        }
        let average = intensity.average();
        self.map(flavor, average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_deterministic() {
        let mapping = FlavorMapping::new(&Settings::default());
        let a = mapping.map(Flavor::Sweet, 1.7);
        let b = mapping.map(Flavor::Sweet, 1.7);
        assert_eq!(a, b);
        assert_eq!(a.target, FlavorTarget::Attraction);
    }

    #[test]
    fn test_reverting_restores_base() {
        let settings = Settings::default();
        let mut mapping = FlavorMapping::new(&settings);

        let raised = mapping.set(Flavor::Fruity, Channel::Smell, 2.0);
        assert_eq!(raised.value, settings.speed + 0.5 * 0.5);

        let restored = mapping.set(Flavor::Fruity, Channel::Smell, 1.0);
        assert_eq!(restored.value, settings.speed);
    }

    #[test]
    fn test_coefficients() {
        let settings = Settings::default();
        let mapping = FlavorMapping::new(&settings);

        let spicy = mapping.map(Flavor::Spicy, 2.0);
        assert_eq!(spicy.target, FlavorTarget::SwirlForce);
        assert!((spicy.value - (settings.swirl_force + 0.1)).abs() < 1e-6);

        let smokey = mapping.map(Flavor::Smokey, 0.0);
        assert_eq!(smokey.target, FlavorTarget::MotionBlurDamp);
        assert!((smokey.value - (settings.motion_blur_damp - 0.06)).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_set_does_not_accumulate() {
        let mut mapping = FlavorMapping::new(&Settings::default());
        let first = mapping.set(Flavor::Spicy, Channel::Taste, 1.5);
        for _ in 0..10 {
            assert_eq!(mapping.set(Flavor::Spicy, Channel::Taste, 1.5), first);
        }
    }
}
