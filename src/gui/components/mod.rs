pub mod surface_preview;
pub mod tile_list;
