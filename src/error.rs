//! Error types.
//!
//! Two layers:
//!
//! - `GradingError`: structured failures of the grading core (input validation,
//!   allocation, policy). These are values returned to the immediate caller;
//!   nothing is retried.
//! - `AppError`: the binary's boundary type, a message plus a process exit code.

use std::time::Duration;

use crate::domain::ComponentKind;

/// Exit code for argument, file, and format problems.
pub const EXIT_IO: u8 = 2;
/// Exit code for malformed records and policies.
pub const EXIT_INVALID_INPUT: u8 = 3;
/// Exit code for an allocation program with no feasible point.
pub const EXIT_INFEASIBLE: u8 = 4;
/// Exit code for an allocation solve that exceeded its time bound.
pub const EXIT_TIMEOUT: u8 = 5;

/// Failures of the grading core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    #[error("Invalid input{}: {constraint}", location(.subject, .component))]
    InvalidInput {
        subject: Option<String>,
        component: Option<ComponentKind>,
        constraint: String,
    },

    #[error("Bonus allocation is infeasible: {constraint}")]
    OptimizationInfeasible { constraint: String },

    #[error("Bonus allocation exceeded its time limit of {} ms", .limit.as_millis())]
    OptimizationTimeout { limit: Duration },

    #[error("Invalid grading policy `{field}`: {reason}")]
    InvalidPolicy { field: &'static str, reason: String },
}

impl GradingError {
    /// Input error scoped to the whole record (no subject).
    pub fn record(constraint: impl Into<String>) -> Self {
        Self::InvalidInput {
            subject: None,
            component: None,
            constraint: constraint.into(),
        }
    }

    /// Input error scoped to one subject.
    pub fn subject(subject: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::InvalidInput {
            subject: Some(subject.into()),
            component: None,
            constraint: constraint.into(),
        }
    }

    /// Input error scoped to one component of one subject.
    pub fn component(
        subject: impl Into<String>,
        component: ComponentKind,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            subject: Some(subject.into()),
            component: Some(component),
            constraint: constraint.into(),
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            GradingError::InvalidInput { .. } | GradingError::InvalidPolicy { .. } => EXIT_INVALID_INPUT,
            GradingError::OptimizationInfeasible { .. } => EXIT_INFEASIBLE,
            GradingError::OptimizationTimeout { .. } => EXIT_TIMEOUT,
        }
    }
}

fn location(subject: &Option<String>, component: &Option<ComponentKind>) -> String {
    match (subject.as_deref(), component) {
        (Some(s), Some(c)) => format!(" in subject '{s}' ({})", c.label()),
        (Some(s), None) => format!(" in subject '{s}'"),
        (None, Some(c)) => format!(" ({})", c.label()),
        (None, None) => String::new(),
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<GradingError> for AppError {
    fn from(err: GradingError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_subject_and_component() {
        let err = GradingError::component("Physics", ComponentKind::Practical, "missing credit");
        assert_eq!(
            err.to_string(),
            "Invalid input in subject 'Physics' (practical): missing credit"
        );
        assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    }

    #[test]
    fn grading_errors_map_to_distinct_exit_codes() {
        let infeasible = AppError::from(GradingError::OptimizationInfeasible {
            constraint: "cap".to_string(),
        });
        let timeout = AppError::from(GradingError::OptimizationTimeout {
            limit: Duration::from_millis(250),
        });
        assert_eq!(infeasible.exit_code(), EXIT_INFEASIBLE);
        assert_eq!(timeout.exit_code(), EXIT_TIMEOUT);
        assert_eq!(timeout.to_string(), "Bonus allocation exceeded its time limit of 250 ms");
    }
}
