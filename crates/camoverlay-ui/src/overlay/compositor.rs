//! Overlay compositor
//!
//! Owns the drawing surface and the current scene. A `step` is compiled in
//! millimeters, scaled to display units, and pushed point by point through
//! the homography before it is presented. `standby` leaves everything as is.

use tracing::{debug, info};

use camoverlay_core::{Homography, HomographyRecord, Step, StepType, Vec2};
use camoverlay_settings::Config;
use camoverlay_visualizer::{
    compile_step, CalibrationBox, DrawingSurface, Group, LoweringOptions, MarkContext,
};

use super::calibration::CalibrationTool;
use super::poller::FetchedStep;

/// What the overlay is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Standby,
    Step,
    Calibration,
}

/// Generator context derived from the configuration
pub fn mark_context(config: &Config) -> MarkContext {
    let calibration = &config.calibration;
    MarkContext {
        calibration: CalibrationBox {
            width: calibration.width,
            height: calibration.height,
            offset_x: calibration.offset_x,
            offset_y: calibration.offset_y,
            scale_factor: calibration.scale_factor,
        },
        display_scale: config.display.scale_factor,
        default_tool_diameter: config.machine.default_tool_diameter,
        lowering: LoweringOptions {
            ebb_steps_per_mm: config.machine.ebb_steps_per_mm,
        },
    }
}

/// Applies steps to a drawing surface
pub struct Compositor<S: DrawingSurface> {
    surface: S,
    context: MarkContext,
    state: OverlayState,
    scene: Group,
    calibration: CalibrationTool,
}

impl<S: DrawingSurface> Compositor<S> {
    pub fn new(surface: S, config: &Config) -> Self {
        let context = mark_context(config);
        let calibration = CalibrationTool::new(&context.calibration, config.calibration.hit_tolerance);
        Self {
            surface,
            context,
            state: OverlayState::Standby,
            scene: Group::new("overlay"),
            calibration,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// The last presented scene, in display units after warping
    pub fn scene(&self) -> &Group {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn context(&self) -> &MarkContext {
        &self.context
    }

    pub fn calibration(&self) -> &CalibrationTool {
        &self.calibration
    }

    /// Apply a fetched step
    ///
    /// Returns whether anything was redrawn.
    pub fn apply(&mut self, fetched: &FetchedStep) -> anyhow::Result<bool> {
        let step = &fetched.step;
        match &step.step_type {
            StepType::Standby => {
                debug!("Standby step, keeping current scene");
                Ok(false)
            }
            StepType::Unknown(kind) => {
                debug!("Ignoring step of unknown type '{}'", kind);
                Ok(false)
            }
            StepType::Step => {
                self.show_step(step, &fetched.homography)?;
                Ok(true)
            }
            StepType::Calibration => {
                self.show_calibration()?;
                Ok(true)
            }
        }
    }

    /// Compile, scale, warp and present a step
    pub fn show_step(&mut self, step: &Step, homography: &Homography) -> anyhow::Result<()> {
        let mut scene = compile_step(step, &self.context);
        scene.zoom(self.context.display_scale);
        if !homography.is_identity() {
            scene.for_each_point_mut(&mut |p| *p = homography.transform_point(*p));
        }

        self.surface.clear();
        self.surface.present(&scene)?;
        self.scene = scene;
        if self.state != OverlayState::Step {
            info!("Overlay state: step");
        }
        self.state = OverlayState::Step;
        debug!("Presented step '{}'", step.name);
        Ok(())
    }

    /// Present the calibration box as currently dragged
    pub fn show_calibration(&mut self) -> anyhow::Result<()> {
        let scene = self.calibration.scene();
        self.surface.clear();
        self.surface.present(&scene)?;
        self.scene = scene;
        if self.state != OverlayState::Calibration {
            info!("Overlay state: calibration");
        }
        self.state = OverlayState::Calibration;
        Ok(())
    }

    /// Start a corner drag; only meaningful while calibrating
    pub fn on_mouse_down(&mut self, point: Vec2) -> anyhow::Result<Option<usize>> {
        if self.state != OverlayState::Calibration {
            return Ok(None);
        }
        let grabbed = self.calibration.on_mouse_down(point);
        if grabbed.is_some() {
            self.show_calibration()?;
        }
        Ok(grabbed)
    }

    pub fn on_mouse_drag(&mut self, delta: Vec2) -> anyhow::Result<()> {
        if self.state != OverlayState::Calibration || !self.calibration.is_dragging() {
            return Ok(());
        }
        self.calibration.on_mouse_drag(delta);
        self.show_calibration()
    }

    /// Finish a drag; the returned record still has to be persisted
    pub fn on_mouse_up(&mut self) -> anyhow::Result<Option<HomographyRecord>> {
        if self.state != OverlayState::Calibration {
            return Ok(None);
        }
        let record = self.calibration.on_mouse_up();
        if record.is_some() {
            self.show_calibration()?;
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camoverlay_core::{Isa, Location, Mark, PlainMark, ToolType, ToolpathMark, TssName};

    #[derive(Default)]
    struct RecordingSurface {
        clears: usize,
        presented: Vec<Group>,
    }

    impl DrawingSurface for RecordingSurface {
        fn clear(&mut self) {
            self.clears += 1;
        }

        fn present(&mut self, scene: &Group) -> anyhow::Result<()> {
            self.presented.push(scene.clone());
            Ok(())
        }
    }

    fn crosshair_step() -> Step {
        Step::new(
            "crosshair",
            StepType::Step,
            vec![Mark::Crosshair(PlainMark {
                location: Location::new(10.0, 20.0),
            })],
        )
    }

    fn fetched(step: Step, homography: Homography) -> FetchedStep {
        FetchedStep { step, homography }
    }

    #[test]
    fn test_standby_does_not_touch_scene() {
        let mut compositor = Compositor::new(RecordingSurface::default(), &Config::default());
        compositor
            .apply(&fetched(crosshair_step(), Homography::identity()))
            .unwrap();
        let before = compositor.scene().clone();

        let redrawn = compositor
            .apply(&fetched(Step::standby(), Homography::identity()))
            .unwrap();
        assert!(!redrawn);
        assert_eq!(compositor.scene(), &before);
        assert_eq!(compositor.state(), OverlayState::Step);
        assert_eq!(compositor.surface().presented.len(), 1);
        assert_eq!(compositor.surface().clears, 1);
    }

    #[test]
    fn test_step_is_scaled_then_warped() {
        let mut config = Config::default();
        config.display.scale_factor = 2.0;
        let mut compositor = Compositor::new(RecordingSurface::default(), &config);

        let shift = Homography::from_correspondences(
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            &[
                Vec2::new(5.0, 5.0),
                Vec2::new(6.0, 5.0),
                Vec2::new(6.0, 6.0),
                Vec2::new(5.0, 6.0),
            ],
        )
        .unwrap();
        compositor.apply(&fetched(crosshair_step(), shift)).unwrap();

        let vertical = compositor.scene().paths()[0].vertices();
        assert!(vertical[0].distance(Vec2::new(25.0, 5.0)) < 1e-6);
    }

    #[test]
    fn test_display_scale_widens_face_ghost() {
        let mut config = Config::default();
        config.display.scale_factor = 4.0;
        let mut compositor = Compositor::new(RecordingSurface::default(), &config);

        let mut mark = ToolpathMark::new(
            TssName::Basic,
            Isa::Gcode,
            vec!["G0 X0 Y0".to_string(), "G1 X10".to_string()],
        );
        mark.tool_type = Some(ToolType::Face);
        mark.tool_diam = Some(6.0);
        let step = Step::new("face", StepType::Step, vec![Mark::Toolpath(mark)]);
        compositor.apply(&fetched(step, Homography::identity())).unwrap();

        let ghost = compositor.scene().find_group("ghost").unwrap();
        let path = ghost.paths()[0];
        assert_eq!(path.vertices()[1], Vec2::new(40.0, 0.0));
        assert_eq!(path.style.stroke_width, 24.0);
    }

    #[test]
    fn test_unknown_step_type_is_ignored() {
        let mut compositor = Compositor::new(RecordingSurface::default(), &Config::default());
        let step = Step::new("?", StepType::Unknown("teleport".into()), Vec::new());
        assert!(!compositor.apply(&fetched(step, Homography::identity())).unwrap());
        assert!(compositor.surface().presented.is_empty());
    }

    #[test]
    fn test_calibration_drag_round_trip() {
        let mut compositor = Compositor::new(RecordingSurface::default(), &Config::default());
        assert_eq!(compositor.on_mouse_down(Vec2::ZERO).unwrap(), None);

        compositor
            .apply(&fetched(Step::calibration(), Homography::identity()))
            .unwrap();
        assert_eq!(compositor.state(), OverlayState::Calibration);

        let corner = compositor.calibration().corners()[0];
        assert_eq!(compositor.on_mouse_down(corner).unwrap(), Some(0));
        compositor.on_mouse_drag(Vec2::new(3.0, 0.0)).unwrap();
        let record = compositor.on_mouse_up().unwrap().unwrap();
        assert_eq!(record.dst_pts[0], corner.x + 3.0);
        assert_eq!(compositor.surface().presented.len(), 4);
    }
}
