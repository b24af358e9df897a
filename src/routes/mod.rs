/// HTTP handlers
///
/// Identifiers travel in the query string (`/users/id/?id=N`) rather than in
/// the path; existing clients rely on that shape.

mod categories;
mod health_check;
mod login;
mod params;
mod products;
mod users;

pub use categories::{create_category, get_category_by_id, get_category_by_title, list_categories};
pub use health_check::health_check;
pub use login::{login, refresh};
pub use params::IdParam;
pub use products::{create_product, delete_product, get_product, list_products, update_product};
pub use users::{
    create_user, delete_user, get_user_by_email, get_user_by_id, get_user_by_username, list_users,
    update_user,
};
