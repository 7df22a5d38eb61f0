#![warn(clippy::all)]
#![doc = include_str!("../README.md")]

// Modules that make up the GeoMapView library.
mod args;
mod container;
mod data_source;
mod error;
mod file_dialog;
mod file_extension;
mod filter;
mod layout;
mod locations;
mod map_bridge;
mod metadata;
mod region_codes;
mod selection;
mod traits;

// Publicly expose the contents of these modules.
pub use self::{
    args::Arguments,
    container::*,
    data_source::*,
    error::*,
    file_dialog::*,
    file_extension::*,
    filter::*,
    layout::*,
    locations::*,
    map_bridge::*,
    metadata::*,
    region_codes::*,
    selection::*,
    traits::*,
};
