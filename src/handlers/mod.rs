pub mod health;
pub mod orders;
pub mod products;
pub mod users;

pub use health::health_routes;
pub use orders::order_routes;
pub use products::product_routes;
pub use users::user_routes;
