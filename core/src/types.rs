//! Request option builders for the Pocket API.
//!
//! # Design
//! Each operation gets a struct with the keys the service documents as
//! typed optional fields, plus an `extra` map passed through verbatim. No
//! value is validated locally. Conversion to [`Params`] is infallible;
//! typed fields are written first and `extra` entries overwrite them.

use serde_json::{Map, Value};

/// Request parameters: a JSON object keyed by parameter name.
pub type Params = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unread,
    Archive,
    All,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Unread => "unread",
            State::Archive => "archive",
            State::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Article,
    Video,
    Image,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Newest,
    Oldest,
    Title,
    Site,
}

impl Sort {
    pub fn as_str(self) -> &'static str {
        match self {
            Sort::Newest => "newest",
            Sort::Oldest => "oldest",
            Sort::Title => "title",
            Sort::Site => "site",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailType {
    Simple,
    Complete,
}

impl DetailType {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailType::Simple => "simple",
            DetailType::Complete => "complete",
        }
    }
}

/// Filters for the retrieve endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrieveOptions {
    pub state: Option<State>,
    pub favorite: Option<bool>,
    /// A tag name, or `_untagged_` for items without tags.
    pub tag: Option<String>,
    pub content_type: Option<ContentType>,
    pub sort: Option<Sort>,
    pub detail_type: Option<DetailType>,
    pub search: Option<String>,
    pub domain: Option<String>,
    /// Unix timestamp; only items modified after it are returned.
    pub since: Option<i64>,
    pub count: Option<u32>,
    /// Only meaningful together with `count`.
    pub offset: Option<u32>,
    pub extra: Params,
}

impl RetrieveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.favorite = Some(favorite);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn detail_type(mut self, detail_type: DetailType) -> Self {
        self.detail_type = Some(detail_type);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Pass an arbitrary key through untouched.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        put(&mut params, "state", self.state.map(State::as_str));
        put(&mut params, "favorite", self.favorite.map(u8::from));
        put(&mut params, "tag", self.tag.as_deref());
        put(&mut params, "contentType", self.content_type.map(ContentType::as_str));
        put(&mut params, "sort", self.sort.map(Sort::as_str));
        put(&mut params, "detailType", self.detail_type.map(DetailType::as_str));
        put(&mut params, "search", self.search.as_deref());
        put(&mut params, "domain", self.domain.as_deref());
        put(&mut params, "since", self.since);
        put(&mut params, "count", self.count);
        put(&mut params, "offset", self.offset);
        extend(params, &self.extra)
    }
}

/// Optional fields for the add endpoint. The URL itself is positional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOptions {
    pub title: Option<String>,
    /// Sent comma-joined.
    pub tags: Vec<String>,
    pub tweet_id: Option<String>,
    pub extra: Params,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tweet_id(mut self, tweet_id: impl Into<String>) -> Self {
        self.tweet_id = Some(tweet_id.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        put(&mut params, "title", self.title.as_deref());
        put(&mut params, "tags", join_tags(&self.tags));
        put(&mut params, "tweet_id", self.tweet_id.as_deref());
        extend(params, &self.extra)
    }
}

/// A modify action understood by the send endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add,
    Archive,
    Readd,
    Favorite,
    Unfavorite,
    Delete,
    TagsAdd,
    TagsRemove,
    TagsReplace,
    TagsClear,
    TagRename,
    /// Sent as-is, for actions this crate does not name.
    Custom(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Add => "add",
            Action::Archive => "archive",
            Action::Readd => "readd",
            Action::Favorite => "favorite",
            Action::Unfavorite => "unfavorite",
            Action::Delete => "delete",
            Action::TagsAdd => "tags_add",
            Action::TagsRemove => "tags_remove",
            Action::TagsReplace => "tags_replace",
            Action::TagsClear => "tags_clear",
            Action::TagRename => "tag_rename",
            Action::Custom(name) => name,
        }
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        match name {
            "add" => Action::Add,
            "archive" => Action::Archive,
            "readd" => Action::Readd,
            "favorite" => Action::Favorite,
            "unfavorite" => Action::Unfavorite,
            "delete" => Action::Delete,
            "tags_add" => Action::TagsAdd,
            "tags_remove" => Action::TagsRemove,
            "tags_replace" => Action::TagsReplace,
            "tags_clear" => Action::TagsClear,
            "tag_rename" => Action::TagRename,
            other => Action::Custom(other.to_string()),
        }
    }
}

/// Fields accompanying a modify action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifyOptions {
    pub item_id: Option<String>,
    /// Unix timestamp at which the action happened.
    pub time: Option<i64>,
    /// Sent comma-joined.
    pub tags: Vec<String>,
    pub old_tag: Option<String>,
    pub new_tag: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub extra: Params,
}

impl ModifyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    pub fn time(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn rename_tag(mut self, old_tag: impl Into<String>, new_tag: impl Into<String>) -> Self {
        self.old_tag = Some(old_tag.into());
        self.new_tag = Some(new_tag.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        put(&mut params, "item_id", self.item_id.as_deref());
        put(&mut params, "time", self.time);
        put(&mut params, "tags", join_tags(&self.tags));
        put(&mut params, "old_tag", self.old_tag.as_deref());
        put(&mut params, "new_tag", self.new_tag.as_deref());
        put(&mut params, "url", self.url.as_deref());
        put(&mut params, "title", self.title.as_deref());
        extend(params, &self.extra)
    }
}

/// One entry of a batch sent to the send endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyAction {
    pub action: Action,
    pub options: ModifyOptions,
}

impl ModifyAction {
    pub fn new(action: Action, options: ModifyOptions) -> Self {
        Self { action, options }
    }

    /// The `action` key is written first, so an `action` key in
    /// `options.extra` replaces it.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("action".to_string(), Value::from(self.action.as_str()));
        extend(params, &self.options.to_params())
    }
}

fn put<V: Into<Value>>(params: &mut Params, key: &str, value: Option<V>) {
    if let Some(value) = value {
        params.insert(key.to_string(), value.into());
    }
}

fn extend(mut params: Params, extra: &Params) -> Params {
    params.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
    params
}

fn join_tags(tags: &[String]) -> Option<String> {
    (!tags.is_empty()).then(|| tags.join(","))
}
