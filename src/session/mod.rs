pub mod exam;
pub mod flow;
pub mod question;
pub mod record;
pub mod state;
