use serde_json::Value;
use snafu::{ensure, OptionExt as _, ResultExt as _, Snafu};

use crate::model::{ExportBundle, ExportSource, ItemDraft, ItemId, TrackedItem};
use crate::query;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("video name is required"))]
    EmptyName,

    #[snafu(display("video `{id}` does not exist"))]
    NotFound { id: ItemId },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ImportError {
    #[snafu(display("import file is not valid JSON: {source}"))]
    Malformed { source: serde_json::Error },

    #[snafu(display("invalid file format - missing videos array"))]
    MissingVideos,

    #[snafu(display("invalid file format - videos must be an array"))]
    NotASequence,

    #[snafu(display("invalid video entry in import file: {source}"))]
    InvalidItem { source: serde_json::Error },
}

/// The ordered, in-memory collection every view is derived from.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<TrackedItem>,
}

impl ItemStore {
    pub fn new(items: Vec<TrackedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn snapshot(&self) -> Vec<TrackedItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&TrackedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn next_id(&self) -> ItemId {
        query::next_id(&self.items)
    }

    pub fn add(&mut self, draft: ItemDraft) -> Result<&TrackedItem, StoreError> {
        ensure!(!draft.name.trim().is_empty(), EmptyNameSnafu);

        let item = TrackedItem::from_draft(self.next_id(), draft);
        tracing::debug!(id = item.id, name = %item.name, "added video");

        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn update(&mut self, id: ItemId, draft: ItemDraft) -> Result<&TrackedItem, StoreError> {
        ensure!(!draft.name.trim().is_empty(), EmptyNameSnafu);

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .context(NotFoundSnafu { id })?;

        item.apply(draft);
        tracing::debug!(id, name = %item.name, "updated video");

        Ok(&*item)
    }

    pub fn delete(&mut self, id: ItemId) -> Option<TrackedItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        tracing::debug!(id, "deleted video");
        Some(self.items.remove(index))
    }

    pub fn duplicate(&mut self, id: ItemId) -> Result<&TrackedItem, StoreError> {
        let copy = self
            .get(id)
            .context(NotFoundSnafu { id })?
            .duplicate(self.next_id());

        tracing::debug!(original = id, copy = copy.id, "duplicated video");
        self.items.push(copy);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Swap in a whole new collection, as a load or an import does.
    pub fn replace(&mut self, items: Vec<TrackedItem>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn export(&self, source: ExportSource) -> ExportBundle {
        ExportBundle::new(self.snapshot(), source)
    }

    /// Replace the collection with the `videos` of an export file.
    ///
    /// The file must be a JSON object with a `videos` array. On any error the store
    /// is left as it was.
    pub fn import(&mut self, text: &str) -> Result<usize, ImportError> {
        let items = parse_import(text)?;
        let count = items.len();

        self.replace(items);
        Ok(count)
    }
}

fn parse_import(text: &str) -> Result<Vec<TrackedItem>, ImportError> {
    let mut bundle: Value = serde_json::from_str(text).context(MalformedSnafu)?;
    let videos = bundle
        .get_mut("videos")
        .map(Value::take)
        .context(MissingVideosSnafu)?;

    ensure!(videos.is_array(), NotASequenceSnafu);

    serde_json::from_value(videos).context(InvalidItemSnafu)
}
