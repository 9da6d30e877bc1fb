use crate::UnbindError;

/// Releases the fields a binder assigned.
///
/// Calling `unbind` twice on a real binder fails with
/// `UnbindError::AlreadyCleared`.
pub trait Unbinder {
    fn unbind(&mut self) -> Result<(), UnbindError>;
}

/// Returned when no binder exists for a target or any of its ancestors.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopUnbinder;

impl Unbinder for NoopUnbinder {
    fn unbind(&mut self) -> Result<(), UnbindError> {
        Ok(())
    }
}
