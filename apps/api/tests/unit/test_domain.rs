use chrono::{TimeZone, Utc};
use comment_threads::{
    domain::{
        comment::{entity::Comment, errors::CommentError, tree::TreeCachePage},
        shared::pagination::{PageInfo, PageRequest},
        sorting::sorter::SortRegistry,
        target::{entity::TargetKey, locator::TargetSpec},
    },
    infrastructure::security::{
        SecurityHashCodec, TimestampRule, security_hash::check_timestamp,
    },
};
use uuid::Uuid;

fn article() -> TargetKey {
    TargetKey::new("blog.article", "42")
}

fn comment_at(secs: i64) -> Comment {
    Comment::draft(&article(), Utc.timestamp_opt(secs, 0).unwrap())
}

#[test]
fn article_scenario_builds_expected_tree() {
    let c1 = comment_at(100);
    let c2 = comment_at(200);
    let mut c3 = comment_at(150);
    c3.attach_to(&c1);

    let sorts = SortRegistry::new();
    let roots = sorts.sort(vec![c2.clone(), c1.clone()], Some("oldest"));
    let page = TreeCachePage::build(roots, vec![c3.clone()]);

    let root_ids: Vec<Uuid> = page.roots().map(|c| c.id).collect();
    assert_eq!(root_ids, [c1.id, c2.id]);
    let c1_children: Vec<Uuid> = page.children(c1.id).map(|c| c.id).collect();
    assert_eq!(c1_children, [c3.id]);
    assert_eq!(page.children(c2.id).count(), 0);
}

#[test]
fn oldest_and_newest_reverse_root_order() {
    let roots = vec![comment_at(300), comment_at(100), comment_at(200)];
    let sorts = SortRegistry::new();

    let oldest: Vec<i64> = sorts
        .sort(roots.clone(), Some("oldest"))
        .iter()
        .map(|c| c.submitted_at.timestamp())
        .collect();
    let mut newest: Vec<i64> = sorts
        .sort(roots, Some("newest"))
        .iter()
        .map(|c| c.submitted_at.timestamp())
        .collect();
    assert_eq!(oldest, [100, 200, 300]);
    newest.reverse();
    assert_eq!(newest, oldest);
}

#[test]
fn descendant_of_filtered_parent_is_dropped() {
    let root = comment_at(100);
    let mut hidden = comment_at(110);
    hidden.attach_to(&root);
    let mut orphan = comment_at(120);
    orphan.attach_to(&hidden);

    let page = TreeCachePage::build(vec![root.clone()], vec![orphan.clone()]);
    assert!(!page.contains(orphan.id));
    assert_eq!(page.children(root.id).count(), 0);
    assert_eq!(page.roots().count(), 1);
}

#[test]
fn security_token_binds_all_three_inputs() {
    let codec = SecurityHashCodec::new("unit-secret").unwrap();
    let digest = codec.issue("blog.article", "42", 1_700_000_000);

    assert_eq!(digest.len(), 64);
    assert!(codec.verify("blog.article", "42", 1_700_000_000, &digest));
    assert!(!codec.verify("blog.article", "43", 1_700_000_000, &digest));
    assert!(!codec.verify("blog.comment", "42", 1_700_000_000, &digest));
    assert!(!codec.verify("blog.article", "42", 1_700_000_001, &digest));
}

#[test]
fn timestamp_rules_follow_submission_mode() {
    let now = 1_700_000_000;
    let fresh = TimestampRule::Fresh { now };
    assert!(check_timestamp(now - 30 * 60, fresh).is_ok());
    assert_eq!(
        check_timestamp(now - 3 * 3600, fresh),
        Err(CommentError::TimestampInvalid)
    );

    let stored = 1_600_000_000;
    assert!(check_timestamp(stored, TimestampRule::MatchesSubmission(stored)).is_ok());
    assert_eq!(
        check_timestamp(stored + 1, TimestampRule::MatchesSubmission(stored)),
        Err(CommentError::TimestampInvalid)
    );
}

#[test]
fn target_spec_prefers_parent() {
    let parent = Uuid::now_v7();
    assert_eq!(
        TargetSpec::from_parts(Some("blog.article"), Some("42"), Some(parent)),
        Ok(TargetSpec::Parent(parent))
    );
    assert_eq!(
        TargetSpec::from_parts(Some("blog.article"), Some("  "), None),
        Err(CommentError::MissingTarget)
    );
}

#[test]
fn page_info_is_stable_past_the_end() {
    let request = PageRequest::new(Some(9), 10);
    let info = PageInfo::new(&request, 25);
    assert_eq!(info.num_pages, 3);
    assert!(!info.has_next);
    assert!(info.has_previous);
    assert_eq!(request.window().offset, 80);
}
