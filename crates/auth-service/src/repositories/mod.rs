pub mod users;

pub use users::{PgUserDirectory, UserDirectory, UserRecord};
