pub mod api;
pub mod auth;
pub mod catalog;
pub mod user;

pub use api::{Envelope, Paginated, PaginationMeta, SearchParams, SortOrder};
pub use user::{default_route_for, Profile, Role, User, LOGIN_ROUTE};
