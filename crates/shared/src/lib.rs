//! Wire and data model shared by the Iron Test resource client and controllers.

pub mod domain;
pub mod error;
pub mod protocol;
