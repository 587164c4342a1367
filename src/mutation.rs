//! Single-field mutations.

use rand::Rng;

/// Largest change a single mutation makes to a kernel weight or color channel.
pub const MUTATION_DELTA: f32 = 0.2;

/// Upper bound for speed and zoom after a mutation.
pub const MUTATION_MAX_STEP: u32 = 10;

/// Which field a call to
/// [`Controller::mutate_current_settings`](crate::Controller::mutate_current_settings)
/// perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// One kernel weight nudged, clamped to `[-1, 1]`.
    Kernel,
    /// One foreground channel nudged, clamped to `[0, 1]`.
    ForegroundColor,
    /// One background channel nudged, clamped to `[0, 1]`.
    BackgroundColor,
    /// Next catalog activation. The only kind that recompiles.
    ActivationFunction,
    /// Next reset type; the grid is regenerated.
    ResetType,
    /// Speed ±1 within `[1, 10]`.
    SimulationSpeed,
    /// Zoom ±1 within `[1, 10]`.
    ZoomLevel,
}

impl MutationKind {
    pub const ALL: [MutationKind; 7] = [
        MutationKind::Kernel,
        MutationKind::ForegroundColor,
        MutationKind::BackgroundColor,
        MutationKind::ActivationFunction,
        MutationKind::ResetType,
        MutationKind::SimulationSpeed,
        MutationKind::ZoomLevel,
    ];

    /// Uniform pick over all kinds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn requires_recompile(self) -> bool {
        matches!(self, MutationKind::ActivationFunction)
    }
}

/// Uniform delta in `[-MUTATION_DELTA, MUTATION_DELTA)`.
pub(crate) fn random_delta<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() * 2.0 * MUTATION_DELTA - MUTATION_DELTA
}

/// +1 or -1 with equal probability.
pub(crate) fn random_step<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    if rng.gen::<bool>() {
        1
    } else {
        -1
    }
}

/// `value + step`, clamped to `[1, MUTATION_MAX_STEP]`.
pub(crate) fn stepped(value: u32, step: i64) -> u32 {
    (value as i64 + step).clamp(1, MUTATION_MAX_STEP as i64) as u32
}
