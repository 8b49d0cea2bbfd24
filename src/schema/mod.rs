pub mod character;
pub mod development;
pub mod event;
pub mod object;
pub mod plot;
pub mod setting;
pub mod state;
pub mod world;
