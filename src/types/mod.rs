//! Shared response types.

mod pagination;
mod response;

pub use pagination::{Paginated, PaginationMeta, ProductPage};
pub use response::{Created, NoContent};
