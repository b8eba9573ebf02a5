pub mod assignments;
pub mod auth;
pub mod classrooms;
pub mod profile;
pub mod reference;
pub mod schools;
