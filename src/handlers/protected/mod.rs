pub mod assignments;
pub mod classrooms;
pub mod profile;
pub mod schools;
