//! Row types and requests for every table.

mod batch;
mod delivery;
mod machine;
mod product;
mod product_instance;
mod site;
mod user;

pub use batch::{Batch, EditBatch, NewBatch};
pub use delivery::{Delivery, EditDelivery, NewDelivery};
pub use machine::{EditMachine, Machine, NewMachine};
pub use product::{EditProduct, NewProduct, Product};
pub use product_instance::{EditProductInstance, NewProductInstance, ProductInstance};
pub use site::{EditSite, NewSite, Site};
pub use user::{EditUser, NewUser, User};

/// Overwrite `field` only when an edit supplies a value.
fn assign<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
