mod file;
mod inventory;

pub use file::{FileRecord, NewFileRecord};
pub use inventory::inventory_items;
