pub mod font;
pub mod renderer;
