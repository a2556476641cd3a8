pub mod request;
pub mod response;

pub use request::NewsRequest;
pub use response::{NewsItem, Recap};
