mod helpers;
mod test_comment_flows;
mod test_listing;
