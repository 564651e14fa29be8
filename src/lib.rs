//! In-memory task tracker: an ordered task store, pure view projections over
//! it, and the `td` terminal front end.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;
