pub mod criteria;
pub mod guards;
pub mod search;
