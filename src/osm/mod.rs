// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod projection;
mod reader;

pub use projection::{Bounds, Projection, EARTH_RADIUS};
pub use reader::{load_from_buffer, load_from_file, load_from_io, Error, FileFormat, Options};
