use crate::{
    application::{
        comment_links::use_case::CommentLinksUseCase,
        list_comments::use_case::ListCommentsUseCase,
        post_comment::use_case::CommentLifecycle,
    },
    config::Config,
    domain::{
        comment::{
            events::ObserverRegistry, repository::CommentRepository, tree_store::CommentTreeStore,
        },
        sorting::sorter::SortRegistry,
        target::{locator::ContentLocator, registry::TargetRegistry},
    },
    infrastructure::{
        monitoring::TracingObserver,
        security::{ContentPolicy, KeywordModerator, RoleAuthorizer, SecurityHashCodec},
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub comments: Arc<dyn CommentRepository>,
    pub listing: Arc<ListCommentsUseCase>,
    pub lifecycle: Arc<CommentLifecycle>,
    pub links: Arc<CommentLinksUseCase>,
}

impl AppState {
    /// Wires the comment use cases around a repository and the registered
    /// target kinds.
    pub fn new(
        config: Config,
        comments: Arc<dyn CommentRepository>,
        targets: TargetRegistry,
        sorts: SortRegistry,
        observers: ObserverRegistry,
    ) -> anyhow::Result<Self> {
        let settings = config.comment_settings();
        let locator = Arc::new(ContentLocator::new(Arc::new(targets), comments.clone()));
        let store = CommentTreeStore::new(comments.clone(), settings.hide_removed);
        let sorts = Arc::new(sorts);

        let lifecycle = CommentLifecycle::new(
            locator.clone(),
            comments.clone(),
            Arc::new(SecurityHashCodec::new(&config.secret_key)?),
            ContentPolicy::new(
                settings.max_length,
                settings.allow_profanities,
                settings.profanities,
            ),
            Arc::new(RoleAuthorizer::new(config.allow_anonymous_comments)),
            Arc::new(observers),
        );
        let listing = ListCommentsUseCase::new(
            locator.clone(),
            store.clone(),
            sorts.clone(),
            settings.per_page,
        );
        let links = CommentLinksUseCase::new(locator, comments.clone(), store, sorts, settings.per_page);

        Ok(Self {
            config,
            comments,
            listing: Arc::new(listing),
            lifecycle: Arc::new(lifecycle),
            links: Arc::new(links),
        })
    }
}

/// Observers every deployment runs: event logging, plus keyword moderation
/// when enabled.
pub fn default_observers(config: &Config) -> ObserverRegistry {
    let mut observers = ObserverRegistry::new();
    observers.register(Arc::new(TracingObserver));
    if config.enable_auto_moderation {
        observers.register(Arc::new(KeywordModerator::new(config.moderation_veto_score)));
    }
    observers
}

/// Built-in sort keys extended with `COMMENT_SORTS`.
pub fn sort_registry(config: &Config) -> anyhow::Result<SortRegistry> {
    let mut sorts = SortRegistry::new();
    if let Some(definitions) = &config.comment_sorts {
        sorts.register_definitions(definitions)?;
    }
    Ok(sorts)
}
