//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod view;

pub(crate) use check::CheckArgs;
pub(crate) use view::ViewArgs;
