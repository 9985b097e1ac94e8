//! Bundled demo transitions

pub mod brightness;
pub mod diffusion;
pub mod life;

pub use brightness::Brightness;
pub use diffusion::Diffusion;
pub use life::GameOfLife;
