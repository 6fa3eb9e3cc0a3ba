//! Read-only widget catalog and data feed lookups, plus the filtering used by
//! the add-widget picker.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::model::{DataEntry, Layout, LayoutItem, Widget, WidgetId};

pub type DataFeed = HashMap<WidgetId, DataEntry>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    widgets: Vec<Widget>,
}

impl Catalog {
    pub fn new(widgets: Vec<Widget>) -> Self {
        Self { widgets }
    }

    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

/// What to draw for a layout item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidgetBinding<'a> {
    /// The id has no catalog entry.
    Missing,
    /// Known widget, nothing in the data feed yet.
    AwaitingData(&'a Widget),
    Ready(&'a Widget, &'a DataEntry),
}

pub fn resolve<'a>(
    item: &LayoutItem,
    catalog: &'a Catalog,
    data: &'a DataFeed,
) -> WidgetBinding<'a> {
    match catalog.get(&item.id) {
        None => WidgetBinding::Missing,
        Some(widget) => match data.get(&item.id) {
            None => WidgetBinding::AwaitingData(widget),
            Some(entry) => WidgetBinding::Ready(widget, entry),
        },
    }
}

/// Catalog widgets that are not yet placed, in catalog order.
pub fn available_widgets<'a>(catalog: &'a Catalog, layout: &Layout) -> Vec<&'a Widget> {
    catalog
        .widgets()
        .iter()
        .filter(|w| !layout.contains(&w.id))
        .collect()
}

/// Sorted union of the contexts the given widgets support.
pub fn context_options(widgets: &[&Widget]) -> Vec<String> {
    widgets
        .iter()
        .flat_map(|w| w.supported_contexts.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContextFilter {
    #[default]
    All,
    Only(String),
}

impl ContextFilter {
    pub fn accepts(&self, widget: &Widget) -> bool {
        match self {
            ContextFilter::All => true,
            ContextFilter::Only(ctx) => widget.supported_contexts.contains(ctx),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WidgetQuery {
    pub keyword: String,
    pub context: ContextFilter,
}

/// Applies the context filter, then fuzzy-matches the keyword against name,
/// description and id. With a keyword the best matches come first; without
/// one the input order is kept.
pub fn filter_widgets<'a>(widgets: &[&'a Widget], query: &WidgetQuery) -> Vec<&'a Widget> {
    let in_context = widgets.iter().copied().filter(|w| query.context.accepts(w));
    let keyword = query.keyword.trim();
    if keyword.is_empty() {
        return in_context.collect();
    }
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(&Widget, i64)> = in_context
        .filter_map(|w| {
            let haystack = format!("{} {} {}", w.name, w.description, w.id);
            matcher.fuzzy_match(&haystack, keyword).map(|score| (w, score))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
    scored.into_iter().map(|(w, _)| w).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Rise,
    Fall,
    Critical,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionSegment {
    pub kind: SegmentKind,
    pub text: String,
}

const CRITICAL_SUFFIXES: &[&str] = &[" 嚴重", " critical"];

/// Splits a data-feed description into highlighted runs: `↑12.5%` rises,
/// `↓3%` falls and `<n> critical` counts. Everything else is plain.
pub fn segment_description(input: &str) -> Vec<DescriptionSegment> {
    let mut out = Vec::new();
    let mut plain = String::new();
    let mut rest = input;
    while let Some(ch) = rest.chars().next() {
        let hit = match ch {
            '↑' => match_percent(rest, ch).map(|len| (SegmentKind::Rise, len)),
            '↓' => match_percent(rest, ch).map(|len| (SegmentKind::Fall, len)),
            c if c.is_ascii_digit() => match_critical(rest).map(|len| (SegmentKind::Critical, len)),
            _ => None,
        };
        match hit {
            Some((kind, len)) => {
                if !plain.is_empty() {
                    out.push(DescriptionSegment {
                        kind: SegmentKind::Plain,
                        text: std::mem::take(&mut plain),
                    });
                }
                out.push(DescriptionSegment {
                    kind,
                    text: rest[..len].to_string(),
                });
                rest = &rest[len..];
            }
            None => {
                plain.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    if !plain.is_empty() {
        out.push(DescriptionSegment {
            kind: SegmentKind::Plain,
            text: plain,
        });
    }
    out
}

fn digit_run(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// `<arrow>\d+(\.\d+)?%`, returning the byte length.
fn match_percent(s: &str, arrow: char) -> Option<usize> {
    let mut len = arrow.len_utf8();
    let int = digit_run(&s[len..]);
    if int == 0 {
        return None;
    }
    len += int;
    if s[len..].starts_with('.') {
        let frac = digit_run(&s[len + 1..]);
        if frac > 0 {
            len += 1 + frac;
        }
    }
    s[len..].starts_with('%').then_some(len + 1)
}

/// `\d+ (嚴重|critical)`, returning the byte length.
fn match_critical(s: &str) -> Option<usize> {
    let int = digit_run(s);
    CRITICAL_SUFFIXES
        .iter()
        .find(|suffix| s[int..].starts_with(*suffix))
        .map(|suffix| int + suffix.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: &str, name: &str, description: &str, contexts: &[&str]) -> Widget {
        Widget {
            id: WidgetId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            supported_contexts: contexts.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            widget("incident_count", "Open incidents", "Active incidents", &["incidents", "home"]),
            widget("cpu_usage", "CPU usage", "Cluster CPU load", &["resources"]),
            widget("mttr", "Mean time to resolve", "Incident MTTR", &["incidents"]),
        ])
    }

    fn entry() -> DataEntry {
        serde_json::from_str(r#"{"value":7}"#).unwrap()
    }

    #[test]
    fn test_resolve_bindings() {
        let catalog = sample_catalog();
        let mut data = DataFeed::new();
        data.insert(WidgetId::new("cpu_usage"), entry());

        let ghost = LayoutItem::new("deleted_widget", 0, 0, 4, 2);
        assert_eq!(resolve(&ghost, &catalog, &data), WidgetBinding::Missing);

        let pending = LayoutItem::new("mttr", 0, 0, 4, 2);
        assert!(matches!(
            resolve(&pending, &catalog, &data),
            WidgetBinding::AwaitingData(w) if w.name == "Mean time to resolve"
        ));

        let ready = LayoutItem::new("cpu_usage", 0, 0, 4, 2);
        assert!(matches!(
            resolve(&ready, &catalog, &data),
            WidgetBinding::Ready(_, e) if e.value.to_string() == "7"
        ));
    }

    #[test]
    fn test_available_widgets_excludes_placed() {
        let catalog = sample_catalog();
        let layout = Layout::new(vec![LayoutItem::new("cpu_usage", 0, 0, 4, 2)]);
        let ids: Vec<&str> = available_widgets(&catalog, &layout)
            .iter()
            .map(|w| w.id.as_str())
            .collect();
        assert_eq!(ids, vec!["incident_count", "mttr"]);
    }

    #[test]
    fn test_context_options_sorted_unique() {
        let catalog = sample_catalog();
        let all = available_widgets(&catalog, &Layout::default());
        assert_eq!(context_options(&all), vec!["home", "incidents", "resources"]);
    }

    #[test]
    fn test_filter_by_context_and_keyword() {
        let catalog = sample_catalog();
        let all = available_widgets(&catalog, &Layout::default());

        let query = WidgetQuery {
            keyword: String::new(),
            context: ContextFilter::Only("incidents".into()),
        };
        let ids: Vec<&str> = filter_widgets(&all, &query).iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["incident_count", "mttr"]);

        let query = WidgetQuery {
            keyword: "cpu".into(),
            context: ContextFilter::All,
        };
        let ids: Vec<&str> = filter_widgets(&all, &query).iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["cpu_usage"]);

        let query = WidgetQuery {
            keyword: "cpu".into(),
            context: ContextFilter::Only("home".into()),
        };
        assert!(filter_widgets(&all, &query).is_empty());
    }

    #[test]
    fn test_segment_description() {
        let segments = segment_description("↑12.5% vs last week, 3 嚴重");
        assert_eq!(
            segments,
            vec![
                DescriptionSegment { kind: SegmentKind::Rise, text: "↑12.5%".into() },
                DescriptionSegment { kind: SegmentKind::Plain, text: " vs last week, ".into() },
                DescriptionSegment { kind: SegmentKind::Critical, text: "3 嚴重".into() },
            ]
        );

        let segments = segment_description("down ↓4% with 12 critical");
        let kinds: Vec<SegmentKind> = segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentKind::Plain, SegmentKind::Fall, SegmentKind::Plain, SegmentKind::Critical]
        );
        assert_eq!(segments[3].text, "12 critical");
    }

    #[test]
    fn test_segment_description_rejects_partial_patterns() {
        let segments = segment_description("↑% and ↓1.x% and 5 ok");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Plain);
        assert!(segment_description("").is_empty());
    }
}
