pub mod chart;
pub mod indicators;
pub mod market;
pub mod signals;
pub mod timeframe;

pub use chart::*;
pub use indicators::*;
pub use market::*;
pub use signals::*;
pub use timeframe::*;
