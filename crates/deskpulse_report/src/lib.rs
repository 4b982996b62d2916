mod columns;
mod duration;
mod export;
mod goal;
mod metrics;
mod row;
mod session;

pub use columns::*;
pub use duration::*;
pub use export::*;
pub use goal::*;
pub use metrics::*;
pub use row::*;
pub use session::*;
