pub use tenebra_engine as engine;
pub use tenebra_graphics as graphics;
pub use tenebra_input as input;
pub use tenebra_math as math;
