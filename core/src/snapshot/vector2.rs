//! Two-component aggregate of snapshot cells.
//!
//! Most mutable fields in the simulation are 2D vectors (positions,
//! headings). `SnapVec2` keeps each component in its own cell and resolves
//! every operand through the caller's view before doing arithmetic; results
//! are plain [`Vec2`] values, never a third snapshot state.

use super::cell::SnapCell;
use super::coordinator::{Mutator, Perspective, SaveCoordinator};
use crate::vec2::Vec2;
use std::ops::{Add, Sub};

pub struct SnapVec2<T: Send + Sync + 'static> {
    pub x: SnapCell<T>,
    pub y: SnapCell<T>,
}

impl<T: Copy + Send + Sync + 'static> SnapVec2<T> {
    pub fn new(v: Vec2<T>, coordinator: &SaveCoordinator) -> Self {
        Self {
            x: SnapCell::new(v.x, coordinator),
            y: SnapCell::new(v.y, coordinator),
        }
    }

    pub fn get(&self, view: Perspective<'_>) -> Vec2<T> {
        Vec2::new(self.x.get(view), self.y.get(view))
    }

    pub fn set(&self, v: Vec2<T>, mutator: &mut Mutator) {
        self.x.set(v.x, mutator);
        self.y.set(v.y, mutator);
    }

    pub fn add_assign(&self, v: Vec2<T>, mutator: &mut Mutator)
    where
        T: Add<Output = T>,
    {
        self.x.add_assign(v.x, mutator);
        self.y.add_assign(v.y, mutator);
    }

    pub fn sub_assign(&self, v: Vec2<T>, mutator: &mut Mutator)
    where
        T: Sub<Output = T>,
    {
        self.x.sub_assign(v.x, mutator);
        self.y.sub_assign(v.y, mutator);
    }
}

impl SnapVec2<f32> {
    pub fn plus(&self, o: &SnapVec2<f32>, view: Perspective<'_>) -> Vec2<f32> {
        self.get(view) + o.get(view)
    }

    pub fn minus(&self, o: &SnapVec2<f32>, view: Perspective<'_>) -> Vec2<f32> {
        self.get(view) - o.get(view)
    }

    pub fn scaled(&self, s: f32, view: Perspective<'_>) -> Vec2<f32> {
        self.get(view) * s
    }

    pub fn divided(&self, s: f32, view: Perspective<'_>) -> Vec2<f32> {
        self.get(view) / s
    }

    pub fn magnitude(&self, view: Perspective<'_>) -> f32 {
        self.get(view).magnitude()
    }

    pub fn normalized(&self, view: Perspective<'_>) -> Vec2<f32> {
        self.get(view).normalized()
    }

    pub fn dot(&self, o: &SnapVec2<f32>, view: Perspective<'_>) -> f32 {
        self.get(view).dot(o.get(view))
    }

    pub fn cross(&self, o: &SnapVec2<f32>, view: Perspective<'_>) -> f32 {
        self.get(view).cross(o.get(view))
    }

    pub fn angle_deg(&self, o: &SnapVec2<f32>, view: Perspective<'_>) -> f32 {
        self.get(view).angle_deg(o.get(view))
    }
}
