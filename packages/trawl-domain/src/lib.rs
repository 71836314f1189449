pub mod duration;
pub mod expansion;
pub mod record;
pub mod request;
