//! Controller behavior against a recording renderer.

use std::cell::RefCell;
use std::rc::Rc;

use neural_automata::prelude::*;
use neural_automata::random::hex_to_rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Resize,
    Begin,
    Stop,
    SetKernel,
    SetColor,
    SetActivation,
    SetState,
    SetZoom,
    Recompile,
    ApplyValues,
    Render,
    UpdateState,
    UpdateDisplay,
}

struct MockRenderer {
    width: u32,
    height: u32,
    running: bool,
    calls: Vec<Call>,
    kernel: Kernel,
    color: Vec3,
    activation: String,
    state: Option<StateBuffer>,
    zoom: u32,
    speed: u32,
    persistent: bool,
    skip: bool,
}

/// Activation source the mock refuses to compile.
const BROKEN: &str = "fn activation(x: f32) -> f32 { return x +; }";

impl MockRenderer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            running: false,
            calls: Vec::new(),
            kernel: Kernel::IDENTITY,
            color: Vec3::ZERO,
            activation: String::new(),
            state: None,
            zoom: 1,
            speed: 1,
            persistent: false,
            skip: false,
        }
    }

    fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|&&c| c == call).count()
    }
}

impl Renderer for MockRenderer {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Resize);
        self.width = width;
        self.height = height;
    }
    fn begin_render(&mut self) {
        assert!(!self.running, "begin_render while running");
        self.calls.push(Call::Begin);
        self.running = true;
    }
    fn stop_render(&mut self) {
        assert!(self.running, "stop_render while stopped");
        self.calls.push(Call::Stop);
        self.running = false;
    }
    fn is_running(&self) -> bool {
        self.running
    }
    fn set_kernel(&mut self, kernel: Kernel) {
        self.calls.push(Call::SetKernel);
        self.kernel = kernel;
    }
    fn set_color(&mut self, color: Vec3) {
        self.calls.push(Call::SetColor);
        self.color = color;
    }
    fn set_activation_source(&mut self, source: &str) {
        self.calls.push(Call::SetActivation);
        self.activation = source.to_string();
    }
    fn set_state(&mut self, state: StateBuffer) {
        self.calls.push(Call::SetState);
        self.state = Some(state);
    }
    fn set_zoom_level(&mut self, zoom: u32) {
        self.calls.push(Call::SetZoom);
        self.zoom = zoom;
    }
    fn recompile(&mut self) -> Result<(), CompileError> {
        self.calls.push(Call::Recompile);
        if self.activation == BROKEN {
            Err(CompileError::new("Step", "expected expression"))
        } else {
            Ok(())
        }
    }
    fn apply_values(&mut self) {
        self.calls.push(Call::ApplyValues);
    }
    fn render(&mut self) {
        self.calls.push(Call::Render);
    }
    fn update_state(&mut self) {
        self.calls.push(Call::UpdateState);
    }
    fn update_display(&mut self) {
        self.calls.push(Call::UpdateDisplay);
    }
    fn simulation_speed(&self) -> u32 {
        self.speed
    }
    fn set_simulation_speed(&mut self, speed: u32) {
        self.speed = speed;
    }
    fn persistent(&self) -> bool {
        self.persistent
    }
    fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }
    fn skip_frames(&self) -> bool {
        self.skip
    }
    fn set_skip_frames(&mut self, skip: bool) {
        self.skip = skip;
    }
}

#[derive(Clone, Default)]
struct RecordingDisplay(Rc<RefCell<Vec<String>>>);

impl DisplaySink for RecordingDisplay {
    fn set_background(&mut self, hex: &str) {
        self.0.borrow_mut().push(hex.to_string());
    }
}

fn attached(seed: u64) -> Controller<MockRenderer> {
    let mut controller = Controller::with_seed(Box::new(NullDisplay), seed);
    controller.attach_renderer(MockRenderer::new(16, 8)).unwrap();
    controller.renderer_mut().unwrap().calls.clear();
    controller
}

fn mock(controller: &Controller<MockRenderer>) -> &MockRenderer {
    controller.renderer().unwrap()
}

fn clear_calls(controller: &mut Controller<MockRenderer>) {
    controller.renderer_mut().unwrap().calls.clear();
}

// ========== Attach ==========

#[test]
fn test_attach_pushes_settings_and_starts() {
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), 1);
    controller.attach_renderer(MockRenderer::new(16, 8)).unwrap();

    let r = mock(&controller);
    assert!(r.running);
    assert_eq!(r.count(Call::Recompile), 1);
    assert_eq!(r.kernel, Kernel::IDENTITY);
    assert_eq!(r.color, Vec3::ONE);
    assert_eq!(r.activation, ACTIVATION_FUNCTIONS[0].source);
    assert_eq!(r.state.as_ref().unwrap().len(), 16 * 8 * 4);
}

#[test]
fn test_attach_while_paused_does_not_start() {
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), 1);
    controller.set_paused(true);
    controller.attach_renderer(MockRenderer::new(4, 4)).unwrap();
    assert!(!mock(&controller).running);
    assert_eq!(mock(&controller).count(Call::Begin), 0);
}

// ========== Apply protocol ==========

#[test]
fn test_apply_running_stops_pushes_and_restarts() {
    let mut controller = attached(2);

    controller.apply(false).unwrap();
    assert_eq!(
        mock(&controller).calls,
        vec![
            Call::Stop,
            Call::SetKernel,
            Call::SetColor,
            Call::SetActivation,
            Call::Begin
        ]
    );

    clear_calls(&mut controller);
    controller.apply(true).unwrap();
    assert_eq!(
        mock(&controller).calls,
        vec![
            Call::Stop,
            Call::SetKernel,
            Call::SetColor,
            Call::SetActivation,
            Call::Recompile,
            Call::Begin
        ]
    );
    assert!(mock(&controller).running);
}

#[test]
fn test_apply_paused_uses_apply_values() {
    let mut controller = attached(3);
    controller.set_paused(true);
    clear_calls(&mut controller);

    controller.apply(true).unwrap();
    assert_eq!(
        mock(&controller).calls,
        vec![
            Call::SetKernel,
            Call::SetColor,
            Call::SetActivation,
            Call::Recompile,
            Call::ApplyValues
        ]
    );
    assert!(!mock(&controller).running);
}

#[test]
fn test_apply_without_renderer_is_ok() {
    let mut controller: Controller<MockRenderer> = Controller::new(Box::new(NullDisplay));
    assert!(controller.apply(true).is_ok());
    assert!(controller.apply(false).is_ok());
}

#[test]
fn test_compile_error_is_returned_and_loop_restarts() {
    let mut controller = attached(4);
    controller.set_activation(ActivationSource::from_source(BROKEN.to_string()));

    let err = controller.apply(true).unwrap_err();
    assert_eq!(err.stage, "Step");
    assert!(mock(&controller).running);
    assert_eq!(controller.config().activation.source(), BROKEN);

    controller.set_activation(ActivationSource::from_catalog(1));
    assert!(controller.apply(true).is_ok());
}

#[test]
fn test_pushed_values_are_copies() {
    let mut controller = attached(5);
    let kernel = Kernel([0.5; 9]);
    controller.set_kernel(kernel, Symmetry::NONE);
    controller.apply(false).unwrap();

    controller.set_kernel(Kernel::IDENTITY, Symmetry::NONE);
    assert_eq!(mock(&controller).kernel, kernel);
}

// ========== State ==========

#[test]
fn test_reset_state_empty_keeps_stored_type() {
    let mut controller = attached(6);
    controller.set_reset_type(ResetType::Random);

    controller.reset_state(Some(ResetType::Empty));
    assert_eq!(controller.config().reset_type, ResetType::Random);
    assert_eq!(mock(&controller).state.as_ref().unwrap().lit_bytes(), 0);

    controller.reset_state(Some(ResetType::Center));
    assert_eq!(controller.config().reset_type, ResetType::Center);
    assert_eq!(mock(&controller).state.as_ref().unwrap().lit_bytes(), 4);
}

#[test]
fn test_reset_state_defaults_to_configured_type() {
    let mut controller = attached(7);
    controller.set_reset_type(ResetType::CenterTop);
    controller.reset_state(None);

    let state = mock(&controller).state.as_ref().unwrap();
    assert_eq!(&state.as_bytes()[32..36], &[255, 255, 255, 255]);
    assert_eq!(state.lit_bytes(), 4);
}

// ========== Mutation ==========

#[test]
fn test_mutation_stays_in_bounds() {
    let mut controller = attached(8);

    for _ in 0..2000 {
        controller.mutate_current_settings().unwrap();
        let config = controller.config();
        assert!(config.kernel.0.iter().all(|w| (-1.0..=1.0).contains(w)));
        assert!(config.color.to_array().iter().all(|c| (0.0..=1.0).contains(c)));
        assert!((1..=10).contains(&config.simulation_speed));
        assert!((1..=10).contains(&config.zoom_level));
        assert!(hex_to_rgb(&config.background_color).is_some());
    }
}

#[test]
fn test_only_activation_mutation_recompiles() {
    let mut controller = attached(9);
    let mut seen = std::collections::HashSet::new();

    for _ in 0..500 {
        clear_calls(&mut controller);
        let kind = controller.mutate_current_settings().unwrap();
        seen.insert(kind);

        let recompiles = mock(&controller).count(Call::Recompile);
        let expected = usize::from(kind == MutationKind::ActivationFunction);
        assert_eq!(recompiles, expected, "{:?}", kind);
    }

    assert_eq!(seen.len(), MutationKind::ALL.len());
}

#[test]
fn test_activation_mutation_advances_catalog() {
    let mut controller = attached(10);
    controller.set_activation(ActivationSource::from_source("fn activation(x: f32) -> f32 { return x; }"));

    loop {
        if controller.mutate_current_settings().unwrap() == MutationKind::ActivationFunction {
            break;
        }
    }
    assert_eq!(controller.config().activation.catalog_index(), Some(0));
}

#[test]
fn test_mutation_headless() {
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), 11);
    for _ in 0..100 {
        controller.mutate_current_settings().unwrap();
    }
    assert!((1..=10).contains(&controller.config().simulation_speed));
}

/// Mutation kinds whose config field differs between `a` and `b`.
fn changed_fields(a: &SimulationConfig, b: &SimulationConfig) -> Vec<MutationKind> {
    let mut changed = Vec::new();
    if a.kernel != b.kernel {
        changed.push(MutationKind::Kernel);
    }
    if a.color != b.color {
        changed.push(MutationKind::ForegroundColor);
    }
    if a.background_color != b.background_color {
        changed.push(MutationKind::BackgroundColor);
    }
    if a.activation != b.activation {
        changed.push(MutationKind::ActivationFunction);
    }
    if a.reset_type != b.reset_type {
        changed.push(MutationKind::ResetType);
    }
    if a.simulation_speed != b.simulation_speed {
        changed.push(MutationKind::SimulationSpeed);
    }
    if a.zoom_level != b.zoom_level {
        changed.push(MutationKind::ZoomLevel);
    }
    changed
}

#[test]
fn test_each_mutation_touches_one_field() {
    let display = RecordingDisplay::default();
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(display.clone()), 27);
    controller.attach_renderer(MockRenderer::new(16, 8)).unwrap();

    for _ in 0..2000 {
        let before = controller.config().clone();
        let backgrounds_before = display.0.borrow().len();
        clear_calls(&mut controller);

        let kind = controller.mutate_current_settings().unwrap();
        let after = controller.config().clone();

        let changed = changed_fields(&before, &after);
        assert!(changed.len() <= 1, "{:?} changed {:?}", kind, changed);
        if let Some(&field) = changed.first() {
            assert_eq!(field, kind);
        }
        assert_eq!(after.paused, before.paused);
        assert_eq!(after.persistent, before.persistent);
        assert_eq!(after.symmetry, before.symmetry);

        let r = mock(&controller);
        match kind {
            MutationKind::ResetType => {
                assert_eq!(after.reset_type, before.reset_type.next());
                assert_eq!(r.count(Call::SetState), 1);
            }
            MutationKind::ActivationFunction => {
                assert_eq!(after.activation, before.activation.next());
                assert_eq!(r.activation, after.activation.source());
            }
            MutationKind::BackgroundColor => {
                let backgrounds = display.0.borrow();
                assert_eq!(backgrounds.len(), backgrounds_before + 1);
                assert_eq!(backgrounds.last(), Some(&after.background_color));
            }
            MutationKind::ZoomLevel => {
                assert_eq!(r.count(Call::SetZoom), 1);
                assert_eq!(r.zoom, after.zoom_level);
            }
            MutationKind::SimulationSpeed => {
                assert_eq!(r.speed, after.simulation_speed);
            }
            MutationKind::Kernel => {
                assert_eq!(r.kernel, after.kernel);
            }
            MutationKind::ForegroundColor => {
                assert_eq!(r.color, after.color);
            }
        }
        if kind != MutationKind::ResetType {
            assert_eq!(r.count(Call::SetState), 0, "{:?}", kind);
        }
        if kind != MutationKind::BackgroundColor {
            assert_eq!(display.0.borrow().len(), backgrounds_before, "{:?}", kind);
        }
    }
}

// ========== Randomization ==========

#[test]
fn test_randomize_with_no_toggles_changes_nothing() {
    let mut controller = attached(12);
    let before = controller.config().clone();

    controller
        .randomize_all_parameters(Some(&RandomizationOptions::none()))
        .unwrap();
    assert_eq!(controller.config(), &before);
}

#[test]
fn test_randomize_all_ranges() {
    let display = RecordingDisplay::default();
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(display.clone()), 13);
    controller.attach_renderer(MockRenderer::new(8, 8)).unwrap();

    for _ in 0..50 {
        controller.randomize_all_parameters(None).unwrap();
        let config = controller.config();
        assert!(ResetType::NON_EMPTY.contains(&config.reset_type));
        assert!((1..=5).contains(&config.simulation_speed));
        assert!((1..=5).contains(&config.zoom_level));
        assert!(config.color.to_array().contains(&1.0));
        assert!(config.activation.catalog_index().is_some());

        let r = mock(&controller);
        assert_eq!(r.speed, config.simulation_speed);
        assert_eq!(r.zoom, config.zoom_level);
        assert_eq!(r.persistent, config.persistent);
        assert_eq!(r.kernel, config.kernel);
    }

    let last = display.0.borrow().last().cloned().unwrap();
    assert_eq!(last, controller.config().background_color);
}

#[test]
fn test_randomize_uses_stored_toggles() {
    let mut controller = attached(14);
    controller.update_randomization_options(RandomizationUpdate {
        kernel: Some(false),
        foreground_color: Some(false),
        background_color: Some(false),
        persistent_pixels: Some(false),
        activation_function: Some(false),
        reset_type: Some(false),
        ..Default::default()
    });
    let before = controller.config().clone();

    controller.randomize_all_parameters(None).unwrap();
    let after = controller.config();
    assert_eq!(after.kernel, before.kernel);
    assert_eq!(after.color, before.color);
    assert_eq!(after.background_color, before.background_color);
    assert_eq!(after.activation, before.activation);
    assert!(controller.randomization_options().simulation_speed);
    assert!(controller.randomization_options().zoom_level);
}

#[test]
fn test_randomize_headless() {
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), 15);
    controller.randomize_all_parameters(None).unwrap();
    assert!((1..=5).contains(&controller.config().simulation_speed));
}

#[test]
fn test_randomized_kernel_matches_symmetry_flags() {
    let mut full_seen = 0;
    for seed in 0..400 {
        let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), seed);
        let options = RandomizationOptions {
            kernel: true,
            ..RandomizationOptions::none()
        };
        controller.randomize_all_parameters(Some(&options)).unwrap();

        let k = controller.config().kernel;
        let sym = controller.config().symmetry;
        if sym.full {
            full_seen += 1;
            assert!(sym.horizontal && sym.vertical, "seed {}", seed);
            assert_eq!(k, k.full_symmetry(), "seed {}", seed);
        }
        if sym.horizontal {
            assert_eq!(k, k.h_symmetry(), "seed {}", seed);
        }
        if sym.vertical {
            assert_eq!(k, k.v_symmetry(), "seed {}", seed);
        }
    }
    assert!(full_seen > 0);
}

// ========== Presets ==========

#[test]
fn test_load_replaces_fields_and_recompiles_once() {
    let mut controller = attached(16);
    let preset = PresetConfig {
        reset_type: ResetType::Center,
        filter: Kernel([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]),
        activation: ACTIVATION_FUNCTIONS[4].source.to_string(),
        color: PresetColor::Rgb(Vec3::new(0.2, 0.4, 0.6)),
        persistent: true,
    };

    controller.load(&preset, true).unwrap();

    let config = controller.config();
    assert_eq!(config.reset_type, ResetType::Center);
    assert_eq!(config.kernel, preset.filter);
    assert_eq!(config.activation.source(), preset.activation);
    assert_eq!(config.color, Vec3::new(0.2, 0.4, 0.6));
    assert!(config.persistent);

    let r = mock(&controller);
    assert_eq!(r.count(Call::Recompile), 1);
    assert_eq!(r.count(Call::SetState), 1);
    assert_eq!(r.kernel, preset.filter);
    assert!(r.persistent);
}

#[test]
fn test_load_random_color_keeps_current() {
    let mut controller = attached(17);
    controller.set_color(Vec3::new(0.3, 0.3, 0.3));
    let mut preset = (find_preset("worms").unwrap().config)();
    preset.color = PresetColor::Random;

    controller.load(&preset, false).unwrap();
    assert_eq!(controller.config().color, Vec3::new(0.3, 0.3, 0.3));
    assert_eq!(mock(&controller).count(Call::SetState), 0);
}

// ========== Setters ==========

#[test]
fn test_simulation_speed_input() {
    let mut controller = attached(18);

    controller.set_simulation_speed_input("3");
    assert_eq!(controller.config().simulation_speed, 3);
    assert_eq!(mock(&controller).speed, 3);

    controller.set_simulation_speed_input("abc");
    assert_eq!(controller.config().simulation_speed, 3);

    controller.set_simulation_speed_input("-2");
    assert_eq!(controller.config().simulation_speed, 3);

    controller.set_simulation_speed_input("7 fps");
    assert_eq!(controller.config().simulation_speed, 7);
}

#[test]
fn test_zoom_never_below_one() {
    let mut controller = attached(19);
    controller.set_zoom_level(0);
    assert_eq!(controller.config().zoom_level, 1);
    assert_eq!(mock(&controller).zoom, 1);
}

#[test]
fn test_background_color() {
    let display = RecordingDisplay::default();
    let mut controller: Controller<MockRenderer> = Controller::new(Box::new(display.clone()));

    assert!(!controller.set_background_color("#fff"));
    assert_eq!(controller.config().background_color, "#000000");
    assert!(display.0.borrow().is_empty());

    assert!(controller.set_background_color("#FF8000"));
    assert_eq!(controller.config().background_color, "#ff8000");
    assert_eq!(display.0.borrow().as_slice(), ["#ff8000"]);
}

#[test]
fn test_persistent_recompiles() {
    let mut controller = attached(20);
    controller.set_persistent(true).unwrap();
    assert!(mock(&controller).persistent);
    assert_eq!(mock(&controller).count(Call::Recompile), 1);
}

// ========== Playback ==========

#[test]
fn test_set_paused_is_idempotent() {
    let mut controller = attached(21);

    controller.set_paused(false);
    assert!(mock(&controller).calls.is_empty());

    assert!(controller.pause_toggle());
    assert_eq!(mock(&controller).calls, vec![Call::Stop]);

    controller.set_paused(true);
    assert_eq!(mock(&controller).calls, vec![Call::Stop]);

    assert!(!controller.pause_toggle());
    assert_eq!(mock(&controller).calls, vec![Call::Stop, Call::Begin]);
}

#[test]
fn test_step_and_offset() {
    let mut controller = attached(22);
    controller.step();
    controller.offset_skipped_frame();
    assert_eq!(
        mock(&controller).calls,
        vec![Call::Render, Call::UpdateState, Call::UpdateDisplay]
    );
}

#[test]
fn test_resize_reseeds() {
    let mut controller = attached(23);
    controller.set_reset_type(ResetType::RandomBool);

    controller.on_resize(16, 8);
    assert!(mock(&controller).calls.is_empty());

    controller.on_resize(32, 24);
    let r = mock(&controller);
    assert_eq!(
        r.calls,
        vec![Call::Stop, Call::Resize, Call::SetState, Call::Begin]
    );
    assert_eq!(r.state.as_ref().unwrap().len(), 32 * 24 * 4);
}

#[test]
fn test_resize_while_paused() {
    let mut controller = attached(24);
    controller.set_paused(true);
    clear_calls(&mut controller);

    controller.on_resize(10, 10);
    assert_eq!(mock(&controller).calls, vec![Call::Resize, Call::SetState]);
}

// ========== Defaults ==========

#[test]
fn test_reset_all_settings_headless() {
    let mut controller: Controller<MockRenderer> = Controller::with_seed(Box::new(NullDisplay), 25);
    controller.randomize_all_parameters(None).unwrap();
    controller.update_randomization_options(RandomizationUpdate {
        kernel: Some(false),
        ..Default::default()
    });
    controller.set_paused(true);

    controller.reset_all_settings_to_defaults().unwrap();
    assert_eq!(controller.config(), &SimulationConfig::default());
    assert_eq!(controller.randomization_options(), &RandomizationOptions::default());
}

#[test]
fn test_reset_all_settings_resumes_renderer() {
    let mut controller = attached(26);
    controller.set_skip_frames(true);
    controller.set_simulation_speed(7);
    controller.set_zoom_level(4);
    controller.set_paused(true);

    controller.reset_all_settings_to_defaults().unwrap();
    let r = mock(&controller);
    assert!(!r.skip);
    assert_eq!(r.speed, 1);
    assert_eq!(r.zoom, 1);
    assert_eq!(r.kernel, Kernel::IDENTITY);
    assert!(r.running);
    assert!(!controller.is_paused());
}
