pub mod carts;
pub mod orders;
pub mod preferences;

pub use carts::CartService;
pub use orders::OrderService;
pub use preferences::PreferenceService;
