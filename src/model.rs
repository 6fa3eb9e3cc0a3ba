use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Key into the widget catalog. Layout items hold this, never the catalog
/// entry itself, so a saved layout may reference a widget that no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for WidgetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A placed widget, in grid units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(rename = "i", alias = "id")]
    pub id: WidgetId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    pub fn new(id: impl Into<WidgetId>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// Column edge past the item. Saturates instead of wrapping.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn same_rect(&self, other: &LayoutItem) -> bool {
        self.x == other.x && self.y == other.y && self.w == other.w && self.h == other.h
    }
}

/// Ordered placed items, unique by id. Order only matters for paint order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    items: Vec<LayoutItem>,
}

impl Layout {
    pub fn new(items: Vec<LayoutItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, id: &WidgetId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &WidgetId) -> Option<&LayoutItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Option<&mut LayoutItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    pub(crate) fn push(&mut self, item: LayoutItem) {
        self.items.push(item);
    }

    pub(crate) fn remove(&mut self, id: &WidgetId) -> Option<LayoutItem> {
        let idx = self.index_of(id)?;
        Some(self.items.remove(idx))
    }

    /// Overwrites the item with the same id. Returns false if there is none.
    pub(crate) fn replace(&mut self, item: LayoutItem) -> bool {
        match self.get_mut(&item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Lowest occupied row edge; every row at or below it is empty.
    pub fn bottom(&self) -> u32 {
        self.items.iter().map(LayoutItem::bottom).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a LayoutItem;
    type IntoIter = std::slice::Iter<'a, LayoutItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Catalog entry describing a widget that can be placed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "supported_pages", alias = "supportedContexts")]
    pub supported_contexts: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Preview data for one widget, keyed by widget id in the data feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataEntry {
    pub value: MetricValue,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A persisted dashboard. Fields the editor does not understand are carried
/// through untouched so a save does not drop them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layout: Layout,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
