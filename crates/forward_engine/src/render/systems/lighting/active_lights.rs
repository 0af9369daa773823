//! Fixed-capacity active light list
//!
//! The list is positional: slot order is the order lights are handed to the
//! binder, and shadow-casting lights are expected to occupy the front slots
//! so shadow sub-passes can walk a prefix.
//!
//! Two counts are derived by scanning rather than stored:
//! [`ActiveLights::active_light_count`] stops at the first empty slot and
//! [`ActiveLights::active_shadow_light_count`] additionally stops at the
//! first light without a shadow map. Both trust the dense-prefix layout. A
//! gap truncates the count even if lights follow it, and a shadow caster
//! after a non-caster is not counted. [`ActiveLights::push`] and
//! [`ActiveLights::remove`] maintain the layout; [`ActiveLights::set`] does
//! not, and [`ActiveLights::validate`] reports violations.

use super::light::Light;
use crate::render::api::GraphicsDevice;
use crate::render::{RenderError, RenderResult};

/// Maximum number of simultaneously active lights
pub const MAX_FORWARD_LIGHTS: usize = 4;

/// Active lights, shadow casters first
#[derive(Debug, Default)]
pub struct ActiveLights {
    slots: [Option<Light>; MAX_FORWARD_LIGHTS],
}

impl ActiveLights {
    /// Create an empty light list
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lights before the first empty slot
    pub fn active_light_count(&self) -> usize {
        self.slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(MAX_FORWARD_LIGHTS)
    }

    /// Number of shadow-casting lights before the first empty slot or the
    /// first light without a shadow map
    pub fn active_shadow_light_count(&self) -> usize {
        self.slots
            .iter()
            .position(|slot| !slot.as_ref().is_some_and(Light::is_shadow_caster))
            .unwrap_or(MAX_FORWARD_LIGHTS)
    }

    /// Whether every slot is occupied
    pub fn is_full(&self) -> bool {
        self.active_light_count() == MAX_FORWARD_LIGHTS
    }

    /// Light in a slot
    pub fn get(&self, index: usize) -> Option<&Light> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutable light in a slot
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Put a light into a slot (or clear it), returning what was there
    ///
    /// Positional and unchecked: this can leave gaps or shadow casters
    /// behind non-casters.
    pub fn set(&mut self, index: usize, light: Option<Light>) -> RenderResult<Option<Light>> {
        let slot = self.slots.get_mut(index).ok_or_else(|| out_of_range(index))?;
        Ok(std::mem::replace(slot, light))
    }

    /// Add a light, keeping the layout dense with shadow casters in front
    ///
    /// A shadow caster goes right after the existing casters, shifting the
    /// non-casters back by one; other lights go to the first empty slot.
    /// Returns the slot the light landed in.
    pub fn push(&mut self, light: Light) -> RenderResult<usize> {
        let count = self.active_light_count();
        if count == MAX_FORWARD_LIGHTS {
            return Err(RenderError::PreconditionViolation(format!(
                "active light list is full ({MAX_FORWARD_LIGHTS} lights)"
            )));
        }

        let index = if light.is_shadow_caster() {
            self.active_shadow_light_count()
        } else {
            count
        };
        self.slots[count] = Some(light);
        self.slots[index..=count].rotate_right(1);

        log::debug!("Light added to slot {index} ({} active)", count + 1);
        Ok(index)
    }

    /// Remove the light in a slot and shift later lights down
    pub fn remove(&mut self, index: usize) -> RenderResult<Light> {
        let light = self
            .slots
            .get_mut(index)
            .ok_or_else(|| out_of_range(index))?
            .take()
            .ok_or_else(|| {
                RenderError::PreconditionViolation(format!("light slot {index} is empty"))
            })?;
        self.slots[index..].rotate_left(1);
        Ok(light)
    }

    /// Compact the list and move shadow casters in front of other lights
    ///
    /// Stable: relative order within casters and within non-casters is kept.
    /// Use after attaching a shadow map to a light already in the list.
    pub fn sort_shadow_casters_first(&mut self) {
        let mut lights: Vec<Light> = self.slots.iter_mut().filter_map(Option::take).collect();
        lights.sort_by_key(|light| !light.is_shadow_caster());
        for (slot, light) in self.slots.iter_mut().zip(lights) {
            *slot = Some(light);
        }
    }

    /// Check the dense-prefix layout
    ///
    /// Fails if an occupied slot follows an empty one, or a shadow caster
    /// follows a light without a shadow map.
    pub fn validate(&self) -> RenderResult<()> {
        let mut first_empty = None;
        let mut first_non_caster = None;

        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                None => {
                    first_empty.get_or_insert(index);
                }
                Some(light) => {
                    if let Some(empty) = first_empty {
                        return Err(RenderError::PreconditionViolation(format!(
                            "light in slot {index} follows empty slot {empty}"
                        )));
                    }
                    if light.is_shadow_caster() {
                        if let Some(plain) = first_non_caster {
                            return Err(RenderError::PreconditionViolation(format!(
                                "shadow-casting light in slot {index} follows non-casting light in slot {plain}"
                            )));
                        }
                    } else {
                        first_non_caster.get_or_insert(index);
                    }
                }
            }
        }
        Ok(())
    }

    /// Lights in the active prefix
    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.slots.iter().map_while(Option::as_ref)
    }

    /// Shadow-casting lights in the active prefix
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Light> {
        self.iter().take_while(|light| light.is_shadow_caster())
    }

    /// Destroy every light, releasing their shadow textures
    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) {
        for light in self.slots.iter_mut().filter_map(Option::take) {
            light.destroy(device);
        }
    }
}

fn out_of_range(index: usize) -> RenderError {
    RenderError::PreconditionViolation(format!(
        "light slot {index} is out of range (capacity {MAX_FORWARD_LIGHTS})"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::tests::recording_device::RecordingDevice;

    fn plain(x: f32) -> Light {
        Light::new().with_position(Vec3::new(x, 0.0, 0.0))
    }

    fn caster(device: &mut RecordingDevice, x: f32) -> Light {
        let mut light = plain(x);
        light
            .attach_shadow_caster(device, 256, 1.0, 20.0, Vec3::new(0.0, -1.0, -1.0))
            .unwrap();
        light
    }

    fn xs(lights: &ActiveLights) -> Vec<f32> {
        lights.iter().map(|light| light.position.x).collect()
    }

    #[test]
    fn test_empty_list_counts_zero() {
        let lights = ActiveLights::new();
        assert_eq!(lights.active_light_count(), 0);
        assert_eq!(lights.active_shadow_light_count(), 0);
        assert!(lights.validate().is_ok());
    }

    #[test]
    fn test_two_leading_lights_count_two() {
        let mut lights = ActiveLights::new();
        lights.set(0, Some(plain(1.0))).unwrap();
        lights.set(1, Some(plain(2.0))).unwrap();

        assert_eq!(lights.active_light_count(), 2);
    }

    #[test]
    fn test_gap_truncates_count() {
        let mut lights = ActiveLights::new();
        lights.set(0, Some(plain(1.0))).unwrap();
        lights.set(2, Some(plain(3.0))).unwrap();

        assert_eq!(lights.active_light_count(), 1);
        assert_eq!(xs(&lights), vec![1.0]);
        assert!(matches!(lights.validate(), Err(RenderError::PreconditionViolation(_))));
    }

    #[test]
    fn test_full_list_counts_capacity() {
        let mut lights = ActiveLights::new();
        for i in 0..MAX_FORWARD_LIGHTS {
            lights.push(plain(i as f32)).unwrap();
        }

        assert!(lights.is_full());
        assert_eq!(lights.active_light_count(), MAX_FORWARD_LIGHTS);
        assert!(matches!(lights.push(plain(9.0)), Err(RenderError::PreconditionViolation(_))));
    }

    #[test]
    fn test_shadow_count_stops_at_first_non_caster() {
        let mut device = RecordingDevice::new();
        let mut lights = ActiveLights::new();
        lights.set(0, Some(plain(1.0))).unwrap();
        lights.set(1, Some(caster(&mut device, 2.0))).unwrap();

        assert_eq!(lights.active_light_count(), 2);
        assert_eq!(lights.active_shadow_light_count(), 0);
        assert_eq!(lights.shadow_casters().count(), 0);
        assert!(lights.validate().is_err());

        lights.destroy_all(&mut device);
    }

    #[test]
    fn test_push_keeps_shadow_casters_in_front() {
        let mut device = RecordingDevice::new();
        let mut lights = ActiveLights::new();

        assert_eq!(lights.push(plain(1.0)).unwrap(), 0);
        assert_eq!(lights.push(caster(&mut device, 2.0)).unwrap(), 0);
        assert_eq!(lights.push(plain(3.0)).unwrap(), 2);
        assert_eq!(lights.push(caster(&mut device, 4.0)).unwrap(), 1);

        assert_eq!(xs(&lights), vec![2.0, 4.0, 1.0, 3.0]);
        assert_eq!(lights.active_shadow_light_count(), 2);
        assert!(lights.validate().is_ok());

        lights.destroy_all(&mut device);
        assert_eq!(device.textures_released(), 2);
        assert_eq!(lights.active_light_count(), 0);
    }

    #[test]
    fn test_remove_compacts_following_lights() {
        let mut lights = ActiveLights::new();
        for i in 0..3 {
            lights.push(plain(i as f32)).unwrap();
        }

        let removed = lights.remove(1).unwrap();

        assert_eq!(removed.position.x, 1.0);
        assert_eq!(xs(&lights), vec![0.0, 2.0]);
        assert!(lights.get(2).is_none());
        assert!(lights.remove(3).is_err());
        assert!(lights.remove(MAX_FORWARD_LIGHTS).is_err());
    }

    #[test]
    fn test_sort_moves_new_caster_forward_and_closes_gaps() {
        let mut device = RecordingDevice::new();
        let mut lights = ActiveLights::new();
        lights.set(0, Some(plain(1.0))).unwrap();
        lights.set(2, Some(plain(3.0))).unwrap();
        lights.set(3, Some(plain(4.0))).unwrap();

        lights
            .get_mut(2)
            .unwrap()
            .attach_shadow_caster(&mut device, 256, 1.0, 20.0, Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        lights.sort_shadow_casters_first();

        assert_eq!(xs(&lights), vec![3.0, 1.0, 4.0]);
        assert_eq!(lights.active_shadow_light_count(), 1);
        assert!(lights.validate().is_ok());

        lights.destroy_all(&mut device);
    }

    #[test]
    fn test_set_out_of_range_is_rejected() {
        let mut lights = ActiveLights::new();
        assert!(lights.set(MAX_FORWARD_LIGHTS, Some(plain(0.0))).is_err());
    }
}
