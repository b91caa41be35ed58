//! Domain services composing chain adapters, provider adapters and the
//! cache store into the query surface the transport layer calls.

pub mod prices;
pub mod swaps;
pub mod tokens;

pub use prices::PricesService;
pub use swaps::{DevRouteSource, RouteSource, SwapsService};
pub use tokens::TokensService;
