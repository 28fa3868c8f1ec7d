//! Materials for arena geometry.

use std::collections::HashMap;

use bevy::prelude::*;

/// Arena materials, created once per distinct color.
pub struct ArenaPalette<'a> {
    materials: &'a mut Assets<StandardMaterial>,
    cache: HashMap<[u32; 3], Handle<StandardMaterial>>,
    pub pickup: Handle<StandardMaterial>,
    pub teleporter: Handle<StandardMaterial>,
}

impl<'a> ArenaPalette<'a> {
    pub fn new(materials: &'a mut Assets<StandardMaterial>) -> Self {
        // Pickup material - bright, slightly glowing
        let pickup = materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.8, 0.2),
            emissive: LinearRgba::new(0.6, 0.5, 0.1, 1.0),
            perceptual_roughness: 0.4,
            ..default()
        });

        // Teleporter material - translucent blue
        let teleporter = materials.add(StandardMaterial {
            base_color: Color::srgba(0.2, 0.5, 1.0, 0.4),
            emissive: LinearRgba::new(0.1, 0.3, 0.9, 1.0),
            alpha_mode: AlphaMode::Blend,
            ..default()
        });

        Self {
            materials,
            cache: HashMap::new(),
            pickup,
            teleporter,
        }
    }

    /// Matte material of the given color.
    pub fn solid(&mut self, color: (f32, f32, f32)) -> Handle<StandardMaterial> {
        let key = [color.0.to_bits(), color.1.to_bits(), color.2.to_bits()];
        if let Some(handle) = self.cache.get(&key) {
            return handle.clone();
        }

        let handle = self.materials.add(StandardMaterial {
            base_color: Color::srgb(color.0, color.1, color.2),
            perceptual_roughness: 0.85,
            ..default()
        });
        self.cache.insert(key, handle.clone());
        handle
    }
}
