pub mod alerts;
pub mod api_key;
pub mod history;
pub mod users;
