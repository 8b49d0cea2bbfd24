pub mod context;
pub mod costume;
pub mod develop;
pub mod grammar;
pub mod lowering;
pub mod normalize;
pub mod pipeline;
pub mod plotter;
pub mod render;
pub mod tree;
pub mod variety;
pub mod voice;
