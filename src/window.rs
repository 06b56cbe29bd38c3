//! Piston window host: pumps the simulation from the window event loop and
//! draws the most recently published agent and food layers.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use forage_sim::render::{Color, RenderHandle, RenderSink, Shape, ShapeKind};
use forage_sim::{Position, Simulation, SimulationConfig};
use piston_window::*;

const BACKGROUND: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
const TPS_STEP: f64 = 5.0;

/// Keeps every live shape and a published copy of each layer.
#[derive(Default)]
pub struct WindowSink {
    next_handle: u64,
    shapes: HashMap<RenderHandle, Shape>,
    agent_layer: Vec<Shape>,
    food_layer: Vec<Shape>,
}

impl WindowSink {
    fn insert(&mut self, shape: Shape) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(handle, shape);
        handle
    }

    fn publish(&self, circles: bool) -> Vec<Shape> {
        self.shapes
            .values()
            .filter(|s| matches!(s.kind, ShapeKind::Circle { .. }) == circles)
            .copied()
            .collect()
    }

    fn draw(&self, transform: math::Matrix2d, g: &mut G2d) {
        for shape in self.food_layer.iter().chain(&self.agent_layer) {
            match shape.kind {
                ShapeKind::Square { size } => rectangle(
                    shape.fill,
                    [
                        shape.position.x - size / 2.0,
                        shape.position.y - size / 2.0,
                        size,
                        size,
                    ],
                    transform,
                    g,
                ),
                ShapeKind::Circle { radius } => ellipse(
                    shape.fill,
                    ellipse::circle(shape.position.x, shape.position.y, radius),
                    transform,
                    g,
                ),
            }
        }
    }
}

impl RenderSink for WindowSink {
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
        self.shapes.remove(&handle);
    }

    fn redraw_agents(&mut self) {
        self.agent_layer = self.publish(true);
    }

    fn redraw_food(&mut self) {
        self.food_layer = self.publish(false);
    }
}

pub fn run(config: SimulationConfig, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let size = [config.surface.width as u32, config.surface.height as u32];
    let mut window: PistonWindow = WindowSettings::new("forage-sim", size)
        .exit_on_esc(true)
        .build()?;
    window.set_max_fps(60);
    window.set_ups(240);

    let mut sim = match seed {
        Some(s) => Simulation::with_seed(config, WindowSink::default(), s)?,
        None => Simulation::new(config, WindowSink::default())?,
    };
    sim.sink_mut().redraw_agents();
    sim.sink_mut().redraw_food();

    let ups = Rc::new(Cell::new(0u32));
    let ups_hook = Rc::clone(&ups);
    sim.on_ups(move |value| ups_hook.set(value));
    sim.start()?;

    while let Some(e) = window.next() {
        if let Some(Button::Keyboard(key)) = e.press_args() {
            match key {
                Key::Space if sim.is_running() => sim.stop(),
                Key::Space => sim.start()?,
                Key::R => sim.reset()?,
                Key::Up => sim.set_tps(sim.config().tps + TPS_STEP)?,
                Key::Down if sim.config().tps > TPS_STEP => {
                    sim.set_tps(sim.config().tps - TPS_STEP)?
                }
                _ => {}
            }
        }

        if let Err(err) = sim.pump(Instant::now()) {
            log::error!("Tick failed: {}", err);
            sim.stop();
        }

        if e.update_args().is_some() {
            let stats = sim.stats();
            window.set_title(format!(
                "forage-sim | tick {} | agents {} | food {} | ups {}",
                sim.ticks(),
                stats.agents,
                stats.foods,
                ups.get()
            ));
        }

        window.draw_2d(&e, |c, g, _device| {
            clear(BACKGROUND, g);
            sim.sink().draw(c.transform, g);
        });
    }

    sim.stop();
    Ok(())
}
