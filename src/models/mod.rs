/// Resource records and request/response payloads

mod category;
mod product;
mod user;

pub use category::{Category, CreateCategory};
pub use product::{CreateProduct, Product, UpdateProduct};
pub use user::{CreateUser, UpdateUser, User, UserResponse};
