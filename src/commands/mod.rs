pub mod browse;
pub mod fetch;
pub mod history;
pub mod incoming;
pub mod info;
pub mod reconcile;

pub use browse::*;
pub use fetch::*;
pub use history::*;
pub use incoming::*;
pub use info::*;
pub use reconcile::*;
