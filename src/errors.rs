use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    // ---- Marshaling ----
    /// Vector length disagrees with the graph's trainable-parameter count.
    ShapeMismatch {
        expected: usize,
        actual: usize,
    },

    // ---- Gradient ----
    /// Implies that finite differences should be used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    NonFiniteGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Evaluation ----
    /// Loss evaluated to a non-finite value.
    NonFiniteLoss {
        value: f64,
    },

    /// A second optimization run was started against a session already mid-run.
    SessionBusy,

    // ---- Optimizer contract ----
    /// The optimizer instance fails its contract check.
    UnsupportedOptimizer {
        name: String,
        reason: String,
    },

    /// Step size needs to be positive and finite.
    InvalidStepSize {
        step: f64,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLbfgsMemory {
        mem: usize,
        reason: &'static str,
    },

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    // ---- Options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },

    /// Loss change tolerance needs to be positive and finite.
    InvalidTolLoss {
        tol: f64,
        reason: &'static str,
    },

    /// Iteration budget needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// A reserved option key was misused (strict mode only).
    OptionConflict {
        key: String,
        reason: &'static str,
    },

    // ---- Run outcome ----
    /// Final parameters must be finite.
    InvalidSolution {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// The optimizer produced no final parameter vector.
    MissingSolution,

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for BridgeError {}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Marshaling ----
            BridgeError::ShapeMismatch { expected, actual } => {
                write!(
                    f,
                    "Parameter vector length mismatch: graph holds {expected} trainable \
                     parameters, vector has {actual}"
                )
            }

            // ---- Gradient ----
            BridgeError::GradientNotImplemented => {
                write!(f, "Graph does not implement a backward pass")
            }
            BridgeError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            BridgeError::NonFiniteGradient { index, value, reason } => {
                write!(f, "Non-finite gradient at index {index}: {value}: {reason}")
            }

            // ---- Evaluation ----
            BridgeError::NonFiniteLoss { value } => {
                write!(f, "Non-finite loss value: {value}")
            }
            BridgeError::SessionBusy => {
                write!(f, "Evaluation session already has an active optimization run")
            }

            // ---- Optimizer contract ----
            BridgeError::UnsupportedOptimizer { name, reason } => {
                write!(f, "Optimizer '{name}' fails the bridge contract: {reason}")
            }
            BridgeError::InvalidStepSize { step, reason } => {
                write!(f, "Invalid step size {step}: {reason}")
            }
            BridgeError::InvalidLbfgsMemory { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            BridgeError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }

            // ---- Options ----
            BridgeError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            BridgeError::InvalidTolLoss { tol, reason } => {
                write!(f, "Invalid loss change tolerance {tol}: {reason}")
            }
            BridgeError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid iteration budget {max_iter}: {reason}")
            }
            BridgeError::OptionConflict { key, reason } => {
                write!(f, "Option conflict on reserved key '{key}': {reason}")
            }

            // ---- Run outcome ----
            BridgeError::InvalidSolution { index, value, reason } => {
                write!(f, "Invalid final parameter at index {index}: {value}: {reason}")
            }
            BridgeError::MissingSolution => {
                write!(f, "Optimizer returned no final parameter vector")
            }

            // ---- Argmin ----
            BridgeError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            BridgeError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            BridgeError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            BridgeError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            BridgeError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            BridgeError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            BridgeError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            BridgeError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            BridgeError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for BridgeError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast() {
            Ok(bridge_err) => match bridge_err {
                ArgminError::InvalidParameter { text } => BridgeError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => BridgeError::NotImplemented { text },
                ArgminError::NotInitialized { text } => BridgeError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => BridgeError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => BridgeError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => BridgeError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => BridgeError::ImpossibleError { text },
                _ => BridgeError::UnknownError,
            },
            Err(err) => match err.downcast::<BridgeError>() {
                Ok(bridge_err) => bridge_err,
                Err(other) => BridgeError::BackendError { text: other.to_string() },
            },
        }
    }
}
