pub mod comment;
pub mod issue;
pub mod project;
pub mod user;

pub use comment::Comment;
pub use issue::Issue;
pub use project::Project;
pub use user::User;
