use rand::Rng;
use winit::event::{ElementState, MouseButton, WindowEvent};

use crate::scene::{Scene, Triangle};

/// The subset of window events the input handler reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEvent {
    Moved { x: f64, y: f64 },
    Button {
        button: MouseButton,
        state: ElementState,
    },
}

impl MouseEvent {
    pub fn from_window_event(event: &WindowEvent<'_>) -> Option<Self> {
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(MouseEvent::Moved {
                x: position.x,
                y: position.y,
            }),
            WindowEvent::MouseInput { state, button, .. } => Some(MouseEvent::Button {
                button: *button,
                state: *state,
            }),
            _ => None,
        }
    }
}

/// Each channel is an integer in 0..100 scaled down, so it lands in [0, 0.99].
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    let mut channel = || rng.gen_range(0..100u32) as f32 / 100.0;
    [channel(), channel(), channel()]
}

pub struct Input<R> {
    cursor: Option<(f64, f64)>,
    rng: R,
}

impl<R: Rng> Input<R> {
    pub fn new(rng: R) -> Self {
        Input {
            cursor: None,
            rng,
        }
    }

    /// Cursor position in window pixels, origin top-left. `None` until the
    /// cursor first moves over the window.
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Returns the triangle spawned by this event, if any.
    pub fn handle(&mut self, event: MouseEvent, scene: &mut Scene) -> Option<Triangle> {
        match event {
            MouseEvent::Moved { x, y } => {
                self.cursor = Some((x, y));
                None
            }
            MouseEvent::Button {
                button: MouseButton::Left,
                state: ElementState::Pressed,
            } => {
                let (x, y) = match self.cursor() {
                    Some(cursor) => cursor,
                    None => {
                        log::debug!("ignoring click before the cursor position is known");
                        return None;
                    }
                };
                let height = scene.dims().height as f32;
                let triangle = Triangle {
                    position: [x as f32, height - y as f32],
                    color: random_color(&mut self.rng),
                };
                log::debug!(
                    "spawned triangle at {:?} with color {:?}",
                    triangle.position,
                    triangle.color
                );
                scene.spawn(triangle);
                Some(triangle)
            }
            MouseEvent::Button { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gfx_hal::window::Extent2D;
    use rand::{rngs::StdRng, SeedableRng};
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, ModifiersState, MouseScrollDelta, TouchPhase};

    const DIMS: Extent2D = Extent2D {
        width: 1920,
        height: 1080,
    };

    fn input() -> Input<StdRng> {
        Input::new(StdRng::seed_from_u64(7))
    }

    fn click(input: &mut Input<StdRng>, scene: &mut Scene, x: f64, y: f64) {
        input.handle(MouseEvent::Moved { x, y }, scene);
        input.handle(
            MouseEvent::Button {
                button: MouseButton::Left,
                state: ElementState::Pressed,
            },
            scene,
        );
    }

    #[test]
    fn click_position_is_flipped_vertically() {
        let mut scene = Scene::new(DIMS);
        let mut input = input();
        click(&mut input, &mut scene, 37.0, 1000.0);

        assert_eq!(scene.triangles().len(), 1);
        assert_eq!(scene.triangles()[0].position, [37.0, 80.0]);
    }

    #[test]
    fn colors_are_hundredths_below_one() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            for channel in random_color(&mut rng).iter() {
                assert!(*channel >= 0.0 && *channel <= 0.99);
                let scaled = channel * 100.0;
                assert!((scaled - scaled.round()).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn only_left_press_spawns() {
        let mut scene = Scene::new(DIMS);
        let mut input = input();

        input.handle(MouseEvent::Moved { x: 5.0, y: 5.0 }, &mut scene);
        for button in [MouseButton::Right, MouseButton::Middle, MouseButton::Other(4)].iter() {
            let event = MouseEvent::Button {
                button: *button,
                state: ElementState::Pressed,
            };
            assert_eq!(input.handle(event, &mut scene), None);
        }
        let release = MouseEvent::Button {
            button: MouseButton::Left,
            state: ElementState::Released,
        };
        assert_eq!(input.handle(release, &mut scene), None);
        assert!(scene.triangles().is_empty());

        let press = MouseEvent::Button {
            button: MouseButton::Left,
            state: ElementState::Pressed,
        };
        assert!(input.handle(press, &mut scene).is_some());
        assert_eq!(scene.triangles().len(), 1);
        assert!(input.handle(press, &mut scene).is_some());
        assert_eq!(scene.triangles().len(), 2);
    }

    #[test]
    fn movement_only_updates_cursor() {
        let mut scene = Scene::new(DIMS);
        let mut input = input();
        input.handle(MouseEvent::Moved { x: 12.5, y: 99.0 }, &mut scene);

        assert_eq!(input.cursor(), Some((12.5, 99.0)));
        assert!(scene.triangles().is_empty());
    }

    #[test]
    fn three_clicks_spawn_in_order() {
        let mut scene = Scene::new(DIMS);
        let mut input = input();

        click(&mut input, &mut scene, 100.0, 100.0);
        click(&mut input, &mut scene, 500.0, 200.0);
        click(&mut input, &mut scene, 960.0, 540.0);

        let positions: Vec<[f32; 2]> = scene.triangles().iter().map(|t| t.position).collect();
        assert_eq!(
            positions,
            vec![[100.0, 980.0], [500.0, 880.0], [960.0, 540.0]]
        );
    }

    #[test]
    fn click_without_cursor_is_ignored() {
        let mut scene = Scene::new(DIMS);
        let mut input = input();
        let press = MouseEvent::Button {
            button: MouseButton::Left,
            state: ElementState::Pressed,
        };

        assert_eq!(input.cursor(), None);
        assert_eq!(input.handle(press, &mut scene), None);
        assert!(scene.triangles().is_empty());
    }

    #[test]
    #[allow(deprecated)]
    fn window_events_map_to_mouse_events() {
        let device_id = unsafe { DeviceId::dummy() };

        let moved = WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(320.0, 240.0),
            modifiers: ModifiersState::empty(),
        };
        assert_eq!(
            MouseEvent::from_window_event(&moved),
            Some(MouseEvent::Moved { x: 320.0, y: 240.0 })
        );

        let pressed = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
            modifiers: ModifiersState::empty(),
        };
        assert_eq!(
            MouseEvent::from_window_event(&pressed),
            Some(MouseEvent::Button {
                button: MouseButton::Left,
                state: ElementState::Pressed,
            })
        );

        let wheel = WindowEvent::MouseWheel {
            device_id,
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: TouchPhase::Moved,
            modifiers: ModifiersState::empty(),
        };
        assert_eq!(MouseEvent::from_window_event(&wheel), None);
        assert_eq!(
            MouseEvent::from_window_event(&WindowEvent::Focused(true)),
            None
        );
    }
}
