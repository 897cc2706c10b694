/// Grid geometry and tile placement.
pub mod grid;
