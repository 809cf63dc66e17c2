pub mod comment_links;
pub mod list_comments;
pub mod post_comment;
