pub mod assignment;
pub mod classroom;
pub mod enrollment;
pub mod profile;
pub mod reference;
pub mod school;
pub mod user;

pub use assignment::{Assignment, AssignmentDetail};
pub use classroom::{Classroom, ClassroomDetail};
pub use enrollment::EnrolledStudent;
pub use profile::UserProfile;
pub use reference::{Gender, Prefix, PrefixDetail};
pub use school::School;
pub use user::{User, UserPublic};
