//! Role-partitioned routing and the navigation guard

pub mod guard;
pub mod navigator;
pub mod routes;

// Re-export main components
pub use guard::{evaluate, RouteDecision};
pub use navigator::{Navigation, NavigationTicket, Navigator};
pub use routes::{default_routes, RouteDef, RouteMeta, RouteTable};
