pub mod comment_service;
pub mod issue_service;
pub mod project_service;
pub mod user_service;

pub use comment_service::CommentService;
pub use issue_service::IssueService;
pub use project_service::ProjectService;
pub use user_service::UserService;
