//! gridpaint - Core of a 2D tile map editor
//!
//! This library provides:
//! - A cell registry mapping integer codes to named, colored cell types
//! - A growable grid store with a spawn position and per-cell aux data
//! - Incremental repainting onto any [`surface::Surface`]
//! - Pointer and key driven editing sessions
//! - JSON map files with an optional aux companion file

pub mod aux_data;
pub mod cli;
pub mod color;
pub mod config;
pub mod coords;
pub mod editor;
pub mod grid;
pub mod input;
pub mod map_file;
pub mod output;
pub mod registry;
pub mod render;
pub mod surface;
