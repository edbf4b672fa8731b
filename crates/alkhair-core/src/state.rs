//! Screen-facing load state.

use crate::error::Error;

/// Where a screen's data load currently stands
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UiState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> UiState<T> {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UiState<U> {
        match self {
            Self::Idle => UiState::Idle,
            Self::Loading => UiState::Loading,
            Self::Success(data) => UiState::Success(f(data)),
            Self::Error(message) => UiState::Error(message),
        }
    }
}

impl<T, E: Into<Error>> From<Result<T, E>> for UiState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Error(error.into().to_string()),
        }
    }
}
