//! Article feed: query descriptor, request building, paging state, search
//! debounce and the cache-backed store that ties them together.

mod controller;
mod debounce;
mod query;
mod store;

pub use controller::{ApplyOutcome, FeedController, FeedPhase, PendingFetch, RequestKey};
pub use debounce::{SearchDebouncer, SearchIntent, DEFAULT_SEARCH_DEBOUNCE};
pub use query::{
    normalize_category, FeedRequest, QueryDescriptor, ALL_CATEGORIES, ARTICLES_TAG,
    DEFAULT_PAGE_SIZE, MIN_SEARCH_LEN,
};
pub use store::{FeedStore, DEFAULT_FEED_TTL};
