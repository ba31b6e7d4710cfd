//! Drop engine
//!
//! Owns the drawing surface, the board, the live token set and the hover
//! state, and advances all of them one frame at a time. The host drives it:
//! a browser calls `tick` from its animation-frame loop, headless callers use
//! `step` for exact, frame-rate independent stepping.

pub mod viewport;

use glam::DVec2;

use crate::config::{DisplaySettings, EngineConfig};
use crate::error::EngineError;
use crate::renderer::{Canvas, scene};
use crate::sim::{Board, FixedTimestep, Landing, Token, advance};

pub use viewport::Viewport;

/// Hand a frame's landings to `notify` in order
///
/// `is_running` is checked before each one, so a `notify` that stops the
/// engine suppresses every landing after it.
pub fn dispatch_landings(
    landings: Vec<Landing>,
    mut is_running: impl FnMut() -> bool,
    mut notify: impl FnMut(Landing),
) {
    for landing in landings {
        if !is_running() {
            log::debug!("Engine stopped, dropping landing of token {}", landing.token_id);
            break;
        }
        notify(landing);
    }
}

pub struct DropEngine<C: Canvas> {
    canvas: C,
    config: EngineConfig,
    board: Board,
    viewport: Viewport,
    /// Live tokens in drop order
    tokens: Vec<Token>,
    next_id: u32,
    hovered: Option<usize>,
    timestep: FixedTimestep,
    running: bool,
    /// Frames drawn so far
    frames: u64,
}

impl<C: Canvas> DropEngine<C> {
    /// Build the board and fit the canvas to it
    ///
    /// The canvas's current size is taken as the container size.
    pub fn new(mut canvas: C, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let board = Board::new(&config.board);
        let viewport = Viewport::fit(canvas.size(), DVec2::new(board.width, board.height))?;
        viewport.apply_to(&mut canvas);

        log::info!(
            "Drop engine ready: {} pegs, {} buckets, scale {:.3}",
            board.pegs.len(),
            board.buckets.len(),
            viewport.scale()
        );

        let timestep = FixedTimestep::new(config.timestep.dt(), config.timestep.max_substeps);
        Ok(Self {
            canvas,
            config,
            board,
            viewport,
            tokens: Vec::new(),
            next_id: 1,
            hovered: None,
            timestep,
            running: true,
            frames: 0,
        })
    }

    /// Drop a new token at a fixed-point horizontal offset
    ///
    /// `None` drops from the board centre. Returns the token id that the
    /// eventual `Landing` will carry.
    pub fn start(&mut self, offset: Option<f64>) -> Result<u32, EngineError> {
        if !self.running {
            return Err(EngineError::Stopped);
        }
        let offset = offset.unwrap_or_else(|| self.board.center_offset());
        if !self.board.contains_offset(offset) {
            log::warn!("Rejected drop at offset {}", offset);
            let span = self.board.drop_span();
            return Err(EngineError::OffsetOutOfRange {
                offset,
                left: span.start,
                right: span.end,
            });
        }

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.tokens
            .push(Token::new(id, offset, &self.board, &self.config.physics));
        log::debug!("Token {} dropped at offset {}", id, offset);
        Ok(id)
    }

    /// Halt the engine: no more frames, no more landings
    ///
    /// Tokens still in flight are kept for inspection but never advance.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.timestep.reset();
            log::info!(
                "Drop engine stopped after {} frames ({} tokens in flight)",
                self.frames,
                self.tokens.len()
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Record a new container size, applied at the start of the next frame
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.viewport.request_resize(width, height) {
            log::warn!("Ignoring resize to {}x{}", width, height);
        }
    }

    /// Update hover from a pointer position in canvas pixels
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let logical = self.viewport.to_logical(DVec2::new(x, y));
        self.hovered = self.board.bucket_at(logical);
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
    }

    /// Advance by host frame time: draw once, then run as many fixed physics
    /// steps as the elapsed time covers
    ///
    /// Returns the drops that landed during this frame, in drop order. After
    /// `stop` (or a frame fault) this does nothing and returns no landings.
    pub fn tick(&mut self, frame_dt: f64) -> Result<Vec<Landing>, EngineError> {
        if !self.running {
            return Ok(Vec::new());
        }
        let steps = self.timestep.accumulate(frame_dt);
        self.frame(steps)
    }

    /// Draw once and run exactly one physics step
    pub fn step(&mut self) -> Result<Vec<Landing>, EngineError> {
        if !self.running {
            return Ok(Vec::new());
        }
        self.frame(1)
    }

    fn frame(&mut self, steps: u32) -> Result<Vec<Landing>, EngineError> {
        if let Some(scale) = self.viewport.apply_pending(&mut self.canvas) {
            let (w, h) = self.viewport.canvas_size();
            log::info!("Resized canvas to {}x{} (scale {:.3})", w, h, scale);
        }

        scene::draw_frame(
            &mut self.canvas,
            &self.board,
            &mut self.tokens,
            self.hovered,
            &self.config.display,
        );

        let result = advance(&mut self.tokens, &self.board, &self.config.physics, steps)
            .and_then(|landings| self.canvas.finish().map(|()| landings));

        match result {
            Ok(landings) => {
                self.frames += 1;
                for landing in &landings {
                    log::debug!(
                        "Token {} landed in bucket {} after {} ticks",
                        landing.token_id,
                        landing.bucket,
                        landing.ticks
                    );
                }
                Ok(landings)
            }
            Err(e) => {
                if e.is_frame_fault() {
                    log::error!("Frame fault, stopping engine: {}", e);
                    self.running = false;
                }
                Err(e)
            }
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Change presentation settings; physics is unaffected
    pub fn set_display(&mut self, display: DisplaySettings) {
        self.config.display = display;
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPreset;
    use crate::renderer::RecordingCanvas;
    use crate::renderer::scene::colors;
    use crate::sim::fixed::{pad, unpad};
    use proptest::prelude::*;

    const MAX_STEPS: usize = 3000;

    fn engine(width: u32, height: u32) -> DropEngine<RecordingCanvas> {
        DropEngine::new(RecordingCanvas::new(width, height), EngineConfig::default()).unwrap()
    }

    fn run_until_idle(engine: &mut DropEngine<RecordingCanvas>) -> Vec<Landing> {
        let mut landings = Vec::new();
        for _ in 0..MAX_STEPS {
            landings.extend(engine.step().unwrap());
            if engine.tokens().is_empty() {
                break;
            }
        }
        landings
    }

    #[test]
    fn test_zero_sized_surface_is_fatal() {
        let result = DropEngine::new(RecordingCanvas::new(0, 0), EngineConfig::default());
        assert!(matches!(
            result,
            Err(EngineError::ZeroSizedSurface { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = EngineConfig::default();
        config.board.rows = 0;
        let result = DropEngine::new(RecordingCanvas::new(800, 800), config);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_scale_fits_container() {
        let engine = engine(400, 400);
        assert_eq!(engine.scale(), 0.5);
        assert_eq!(engine.canvas().size(), (400, 400));
        assert_eq!(engine.canvas().scale(), 0.5);

        let engine = self::engine(400, 900);
        assert_eq!(engine.scale(), 0.5);
        assert_eq!(engine.canvas().size(), (400, 400));
    }

    #[test]
    fn test_center_drop_lands_in_bucket_ten() {
        let mut engine = engine(800, 800);
        let id = engine.start(None).unwrap();
        let landings = run_until_idle(&mut engine);
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].token_id, id);
        assert_eq!(landings[0].offset, pad(400.0));
        // Right of the middle bucket: vertical contacts break toward +x
        assert_eq!(landings[0].bucket, 10);
        assert_eq!(landings[0].ticks, 665);
    }

    #[test]
    fn test_same_offset_same_bucket_on_separate_engines() {
        let mut a = engine(800, 800);
        let mut b = engine(800, 800);
        a.start(Some(pad(385.0))).unwrap();
        b.start(Some(pad(385.0))).unwrap();
        let la = run_until_idle(&mut a);
        let lb = run_until_idle(&mut b);
        assert_eq!(la.len(), 1);
        assert_eq!(la, lb);
    }

    #[test]
    fn test_canvas_size_does_not_change_outcome() {
        let mut small = engine(300, 300);
        let mut large = engine(1600, 1600);
        small.start(Some(pad(413.0))).unwrap();
        large.start(Some(pad(413.0))).unwrap();
        assert_eq!(run_until_idle(&mut small), run_until_idle(&mut large));
    }

    #[test]
    fn test_concurrent_drops_each_notify_once() {
        let mut engine = engine(800, 800);
        let first = engine.start(Some(pad(395.0))).unwrap();
        let second = engine.start(Some(pad(413.0))).unwrap();
        assert_ne!(first, second);

        let landings = run_until_idle(&mut engine);
        assert_eq!(landings.len(), 2);
        for landing in &landings {
            let expected = if landing.token_id == first { 395.0 } else { 413.0 };
            assert_eq!(landing.offset, pad(expected));
        }

        // Nothing fires twice
        for _ in 0..10 {
            assert!(engine.step().unwrap().is_empty());
        }
    }

    #[test]
    fn test_stop_halts_frames_and_drops() {
        let mut engine = engine(800, 800);
        engine.start(Some(pad(395.0))).unwrap();
        engine.step().unwrap();
        let frames = engine.canvas().frames();

        engine.stop();
        assert!(!engine.is_running());
        for _ in 0..MAX_STEPS {
            assert!(engine.step().unwrap().is_empty());
            assert!(engine.tick(1.0 / 60.0).unwrap().is_empty());
        }
        assert_eq!(engine.canvas().frames(), frames);
        assert_eq!(engine.tokens().len(), 1);
        assert_eq!(engine.start(None), Err(EngineError::Stopped));
    }

    #[test]
    fn test_stop_inside_landing_callback_suppresses_the_rest() {
        let engine = std::cell::RefCell::new(engine(800, 800));
        let landings: Vec<Landing> = (1..=3)
            .map(|id| Landing {
                token_id: id,
                bucket: 8,
                offset: pad(400.0),
                ticks: 600,
            })
            .collect();

        let mut delivered = Vec::new();
        dispatch_landings(
            landings,
            || engine.borrow().is_running(),
            |landing| {
                delivered.push(landing.token_id);
                engine.borrow_mut().stop();
            },
        );
        assert_eq!(delivered, vec![1]);
    }

    #[test]
    fn test_dispatch_delivers_in_order_while_running() {
        let mut delivered = Vec::new();
        let landings = vec![
            Landing { token_id: 4, bucket: 2, offset: pad(300.0), ticks: 10 },
            Landing { token_id: 2, bucket: 9, offset: pad(420.0), ticks: 12 },
        ];
        dispatch_landings(landings, || true, |landing| delivered.push(landing.token_id));
        assert_eq!(delivered, vec![4, 2]);
    }

    #[test]
    fn test_idle_frames_redraw_static_board() {
        let mut engine = engine(800, 800);
        engine.step().unwrap();
        let first = engine.canvas().commands().to_vec();
        engine.step().unwrap();
        assert_eq!(engine.canvas().commands(), first.as_slice());
        assert_eq!(engine.canvas().frames(), 2);
        assert_eq!(
            engine.canvas().solid_circles(colors::PEG).len(),
            engine.board().pegs.len()
        );
    }

    #[test]
    fn test_resize_applies_on_next_frame() {
        let mut engine = engine(800, 800);
        engine.start(Some(pad(395.0))).unwrap();
        for _ in 0..20 {
            engine.step().unwrap();
        }

        let mut reference = self::engine(800, 800);
        reference.start(Some(pad(395.0))).unwrap();
        for _ in 0..20 {
            reference.step().unwrap();
        }

        engine.resize(400, 400);
        assert_eq!(engine.scale(), 1.0);
        engine.step().unwrap();
        reference.step().unwrap();
        assert_eq!(engine.scale(), 0.5);
        assert_eq!(engine.canvas().size(), (400, 400));

        // Logical state is untouched by the resize
        assert_eq!(engine.tokens()[0].pos, reference.tokens()[0].pos);
        assert_eq!(engine.tokens()[0].vel, reference.tokens()[0].vel);
    }

    #[test]
    fn test_zero_resize_keeps_dimensions() {
        let mut engine = engine(800, 800);
        engine.resize(0, 0);
        engine.step().unwrap();
        assert_eq!(engine.scale(), 1.0);
        assert_eq!(engine.canvas().size(), (800, 800));
    }

    #[test]
    fn test_hover_uses_inverse_scale() {
        let mut engine = engine(400, 400);
        engine.pointer_move(200.0, 315.0);
        assert_eq!(engine.hovered(), Some(8));
        engine.step().unwrap();
        assert!(engine.canvas().texts().contains(&"16.8%"));

        engine.pointer_move(200.0, 100.0);
        assert_eq!(engine.hovered(), None);
        engine.pointer_move(200.0, 315.0);
        engine.pointer_leave();
        assert_eq!(engine.hovered(), None);
    }

    #[test]
    fn test_hover_does_not_affect_physics() {
        let mut plain = engine(800, 800);
        let mut hovering = engine(800, 800);
        plain.start(Some(pad(395.0))).unwrap();
        hovering.start(Some(pad(395.0))).unwrap();
        hovering.pointer_move(400.0, 630.0);
        assert_eq!(run_until_idle(&mut plain), run_until_idle(&mut hovering));
    }

    #[test]
    fn test_offset_outside_bucket_row_is_rejected() {
        let mut engine = engine(800, 800);
        assert_eq!(
            engine.start(Some(pad(-5.0))),
            Err(EngineError::OffsetOutOfRange {
                offset: pad(-5.0),
                left: 94.0,
                right: 706.0
            })
        );
        // On the board but beside the lattice: would fall forever
        assert!(matches!(
            engine.start(Some(pad(20.0))),
            Err(EngineError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            engine.start(Some(pad(780.0))),
            Err(EngineError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            engine.start(Some(f64::INFINITY)),
            Err(EngineError::OffsetOutOfRange { .. })
        ));
        assert!(engine.tokens().is_empty());
    }

    #[test]
    fn test_surface_fault_stops_engine() {
        let mut engine = engine(800, 800);
        engine.start(Some(pad(395.0))).unwrap();
        engine.canvas_mut().fail_next_frame("context lost");
        assert_eq!(
            engine.step(),
            Err(EngineError::Surface("context lost".into()))
        );
        assert!(!engine.is_running());
        assert!(engine.step().unwrap().is_empty());
    }

    #[test]
    fn test_tick_matches_step_at_nominal_rate() {
        let mut ticked = engine(800, 800);
        let mut stepped = engine(800, 800);
        ticked.start(Some(pad(395.0))).unwrap();
        stepped.start(Some(pad(395.0))).unwrap();
        for _ in 0..100 {
            ticked.tick(1.0 / 60.0).unwrap();
            stepped.step().unwrap();
        }
        assert_eq!(ticked.tokens()[0].pos, stepped.tokens()[0].pos);
        assert_eq!(ticked.tokens()[0].ticks, 100);
    }

    #[test]
    fn test_slow_frames_catch_up_with_substeps() {
        let mut engine = engine(800, 800);
        engine.start(Some(pad(395.0))).unwrap();
        // A 30 Hz host runs two physics steps per frame
        engine.tick(2.0 / 60.0).unwrap();
        assert_eq!(engine.tokens()[0].ticks, 2);
        // A stalled frame is capped
        engine.tick(5.0).unwrap();
        assert_eq!(engine.tokens()[0].ticks, 2 + 8);
    }

    #[test]
    fn test_display_settings_are_presentation_only() {
        let mut low = engine(800, 800);
        low.set_display(DisplaySettings::from_preset(QualityPreset::Low));
        let mut high = engine(800, 800);
        low.start(Some(pad(413.0))).unwrap();
        high.start(Some(pad(413.0))).unwrap();
        assert_eq!(run_until_idle(&mut low), run_until_idle(&mut high));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_accepted_drop_stays_on_board_and_lands(x in 0.0f64..800.0) {
            let mut engine = engine(400, 400);
            let offset = pad(x);
            let Ok(id) = engine.start(Some(offset)) else {
                prop_assert!(!engine.board().drop_span().contains(&unpad(offset)));
                return Ok(());
            };
            let radius = engine.config().physics.ball_radius;
            let mut landings = Vec::new();
            for _ in 0..MAX_STEPS {
                landings.extend(engine.step().unwrap());
                match engine.tokens().first() {
                    Some(token) => {
                        let lx = token.logical_pos().x;
                        prop_assert!(lx >= radius && lx <= 800.0 - radius);
                    }
                    None => break,
                }
            }
            prop_assert_eq!(landings.len(), 1);
            prop_assert_eq!(landings[0].token_id, id);
            prop_assert_eq!(landings[0].offset, offset);
        }

        #[test]
        fn prop_drop_is_deterministic(x in 300.0f64..500.0) {
            let mut a = engine(800, 800);
            let mut b = engine(320, 240);
            a.start(Some(pad(x))).unwrap();
            b.start(Some(pad(x))).unwrap();
            for _ in 0..300 {
                let la = a.step().unwrap();
                let lb = b.step().unwrap();
                prop_assert_eq!(la, lb);
            }
            prop_assert_eq!(a.tokens().len(), b.tokens().len());
            for (ta, tb) in a.tokens().iter().zip(b.tokens()) {
                prop_assert_eq!(ta.pos, tb.pos);
            }
        }
    }
}
