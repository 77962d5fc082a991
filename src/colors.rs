use std::collections::HashMap;

use eframe::egui::Color32;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::Node;

pub const BLACK: Color32 = Color32::BLACK;
pub const BACKGROUND: Color32 = Color32::from_gray(204);
pub const SEARCH_HIGHLIGHT: Color32 = Color32::from_rgb(230, 0, 230);

/// Color families, each one is a band of similar hues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    /// Background and top level rows, reds.
    Base,
    /// Frames with a source location, greens.
    Source,
    /// Frames with only a function name, yellows.
    Function,
    /// Frames with only an address, light blues.
    Address,
    /// Thread rows, blues.
    Thread,
}

impl ColorFamily {
    /// `factor * (offset + random 0..64) + summand`, read as a 0xRRGGBB value.
    fn parameters(&self) -> (u32, u32, u32) {
        match self {
            ColorFamily::Base => (0x000202, 0x10, 0xff0000),
            ColorFamily::Source => (0x010001, 0xa0, 0x003f00),
            ColorFamily::Function => (0x000101, 0xa0, 0x3f0000),
            ColorFamily::Address => (0x010100, 0xa0, 0x00003f),
            ColorFamily::Thread => (0x020200, 0x10, 0x0000ff),
        }
    }

    pub fn of_node(node: &Node) -> ColorFamily {
        if node.depth <= 1 {
            ColorFamily::Base
        } else if node.source.is_some() {
            ColorFamily::Source
        } else if node.function.is_some() {
            ColorFamily::Function
        } else if node.address.is_some() {
            ColorFamily::Address
        } else {
            ColorFamily::Thread
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorKey {
    pub family: ColorFamily,
    pub key: String,
}

impl ColorKey {
    pub fn new(family: ColorFamily, key: impl Into<String>) -> Self {
        Self {
            family,
            key: key.into(),
        }
    }

    /// Nodes sharing a source location (or address) share a color.
    pub fn of_node(node: &Node) -> ColorKey {
        let key = node
            .source
            .as_deref()
            .or(node.address.as_deref())
            .or(node.function.as_deref())
            .or(node.thread.as_deref())
            .unwrap_or_default();
        ColorKey::new(ColorFamily::of_node(node), key)
    }
}

/// Stable colors for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct ColorCache {
    rng: ChaCha8Rng,
    colors: HashMap<ColorKey, Color32>,
}

impl ColorCache {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            colors: HashMap::new(),
        }
    }

    pub fn color(&mut self, key: &ColorKey) -> Color32 {
        if let Some(color) = self.colors.get(key) {
            return *color;
        }
        let color = self.generate(key.family);
        self.colors.insert(key.clone(), color);
        color
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    fn generate(&mut self, family: ColorFamily) -> Color32 {
        let (factor, offset, summand) = family.parameters();
        let value = factor * (offset + self.rng.random_range(0..64)) + summand;
        Color32::from_rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}
