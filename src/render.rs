//! Capability interface between the engine and whatever draws it.
//!
//! The engine only creates, moves, recolours and destroys shapes through a
//! [`RenderSink`], and tells the sink when a layer should be republished.

use std::collections::HashMap;

use crate::config::AgentColorWeights;
use crate::genetics::Genetics;
use crate::sampling::Position;

/// Opaque handle to a shape owned by a render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

pub type Color = [f32; 4];

pub trait RenderSink {
    fn create_agent(&mut self, position: Position, radius: f64, fill: Color) -> RenderHandle;
    /// `position` is the centre of the square.
    fn create_food(&mut self, position: Position, size: f64, fill: Color) -> RenderHandle;
    fn set_position(&mut self, handle: RenderHandle, position: Position);
    fn set_fill(&mut self, handle: RenderHandle, fill: Color);
    fn destroy(&mut self, handle: RenderHandle);
    fn redraw_agents(&mut self);
    fn redraw_food(&mut self);
}

/// Maps sight, speed and reproduce to red, green and blue.
pub fn agent_color(genetics: &Genetics, weights: &AgentColorWeights) -> Color {
    [
        channel(genetics.sight * weights.sight),
        channel(genetics.speed * weights.speed),
        channel(genetics.reproduce * weights.reproduce),
        1.0,
    ]
}

fn channel(value: f64) -> f32 {
    let byte = if value.is_finite() {
        (value.floor() as i64).rem_euclid(256)
    } else {
        0
    };
    byte as f32 / 255.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Circle { radius: f64 },
    Square { size: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub position: Position,
    pub fill: Color,
}

/// Sink that keeps shapes in memory without drawing them.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    next_handle: u64,
    pub shapes: HashMap<RenderHandle, Shape>,
    pub agent_redraws: u64,
    pub food_redraws: u64,
    pub destroyed: u64,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_shapes(&self) -> usize {
        self.shapes.len()
    }

    fn insert(&mut self, shape: Shape) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(handle, shape);
        handle
    }
}

impl RenderSink for HeadlessSink {
    fn create_agent(&mut self, position: Position, radius: f64, fill: Color) -> RenderHandle {
        self.insert(Shape {
            kind: ShapeKind::Circle { radius },
            position,
            fill,
        })
    }

    fn create_food(&mut self, position: Position, size: f64, fill: Color) -> RenderHandle {
        self.insert(Shape {
            kind: ShapeKind::Square { size },
            position,
            fill,
        })
    }

    fn set_position(&mut self, handle: RenderHandle, position: Position) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.position = position;
        }
    }

    fn set_fill(&mut self, handle: RenderHandle, fill: Color) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.fill = fill;
        }
    }

    fn destroy(&mut self, handle: RenderHandle) {
        if self.shapes.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn redraw_agents(&mut self) {
        self.agent_redraws += 1;
    }

    fn redraw_food(&mut self) {
        self.food_redraws += 1;
    }
}
