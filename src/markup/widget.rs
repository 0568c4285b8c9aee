//! Widget content, focus anchors and the arrow visibility condition.
//!
//! Ids are positional among visible widgets: the n-th visible widget is
//! `500 + n` and its anchor button is that id followed by `777`.

use crate::catalog::WidgetCatalog;
use crate::markup::{Document, Node};
use crate::store::widget::WidgetSource;
use crate::store::{Projector, WidgetItem};

pub const FIRST_WIDGET_ID: u32 = 500;
pub const ANCHOR_SUFFIX: &str = "777";
/// Main menu list the anchors hand focus back to.
pub const MENU_CONTROL: u32 = 9001;
/// Group holding the widget lists.
pub const WIDGET_GROUP_CONTROL: u32 = 9002;

pub fn anchor_id(widget_id: u32) -> String {
    format!("{widget_id}{ANCHOR_SUFFIX}")
}

pub struct WidgetProjector {
    catalog: WidgetCatalog,
}

fn param(name: &str, value: impl Into<String>) -> Node {
    Node::text_node("param", value).with_attr("name", name)
}

impl WidgetProjector {
    pub fn new(catalog: WidgetCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    /// Path param of a widget, including the per-widget suffix of add-on
    /// widgets.
    pub fn widget_path(&self, widget: &WidgetItem, id: u32) -> String {
        let path = widget.content_path(&self.catalog);
        if self.catalog.is_addon_widget(widget.category, widget.widget_type) {
            format!("{path}-{id}")
        } else {
            path
        }
    }

    fn content_node(&self, widget: &WidgetItem, id: u32) -> Node {
        let (cat, typ, style) = (widget.category, widget.widget_type, widget.style);
        let catalog = &self.catalog;

        let mut node = Node::new("include")
            .with_attr("content", "widget_mainmenu")
            .with_child(param("id", id.to_string()))
            .with_child(param("header", widget.header.resolve(catalog.strings())));
        if catalog.is_limitable(cat, typ) {
            node.push(param("limit", widget.limit.to_string()));
        }
        node.push(param("type", catalog.style_widget(cat, typ, style)));
        node.push(param("itemwidth", catalog.width(cat, typ, style).to_string()));
        node.push(param("height", catalog.height(cat, typ, style).to_string()));
        node.push(param("path", self.widget_path(widget, id)));
        if catalog.has_static_content(cat, typ) {
            node.push(param("static_content", "true"));
        }
        if let Some(onclick) = catalog.onclick(cat, typ) {
            node.push(param("onclick", onclick));
            node.push(param("useonclick", "true"));
        }
        let sortby = if catalog.is_orderable(cat, typ) {
            catalog.sortby_dynamic(widget.sortby)
        } else {
            catalog.sortby(cat, typ)
        };
        node.push(param("sortby", sortby));
        node.push(param("sortorder", catalog.sortorder(cat, typ)));
        if let Some(target) = catalog.target(cat, typ) {
            node.push(param("target", target));
        }
        if catalog.show_play_status(cat, typ) {
            node.push(param("showplaystatus", "true"));
        }
        node
    }

    /// Command run when the hidden anchor button is clicked.
    pub fn anchor_click(&self, widget: &WidgetItem) -> String {
        let header_action = || {
            self.catalog
                .header_action(widget.category, widget.widget_type)
        };
        match widget.source(&self.catalog) {
            WidgetSource::Playlist { kind, file } => format!(
                "ActivateWindow({},special://profile/playlists/{}/{file},return)",
                kind.window(),
                kind.as_str()
            ),
            WidgetSource::AddonPath(Some(entry)) => match entry.plugin_id() {
                Some(plugin) => format!("RunAddon({plugin})"),
                None => header_action(),
            },
            _ => header_action(),
        }
    }

    fn anchor_node(&self, widget: &WidgetItem, position: usize, count: usize) -> Node {
        let id = FIRST_WIDGET_ID + position as u32;
        let last = FIRST_WIDGET_ID + count.saturating_sub(1) as u32;
        let up = if position == 0 { last } else { id - 1 };
        let down = if position + 1 >= count {
            FIRST_WIDGET_ID
        } else {
            id + 1
        };
        Node::new("control")
            .with_attr("type", "button")
            .with_attr("id", anchor_id(id))
            .with_child(Node::text_node("visible", "false").with_attr("allowhiddenfocus", "true"))
            .with_child(Node::text_node(
                "onright",
                format!("SetProperty(active_channel,{id})"),
            ))
            .with_child(Node::text_node("onright", id.to_string()))
            .with_child(Node::text_node("onleft", MENU_CONTROL.to_string()))
            .with_child(Node::text_node("onup", format!("SetFocus({up})")))
            .with_child(Node::text_node("ondown", format!("SetFocus({down})")))
            .with_child(Node::text_node("onclick", self.anchor_click(widget)))
    }

    fn static_content_node(&self, widget: &WidgetItem, id: u32) -> Node {
        let mut content = Node::new("content");
        if let WidgetSource::Addons(addons) = widget.source(&self.catalog) {
            for addon in addons {
                content.push(
                    Node::new("item")
                        .with_child(Node::text_node("label", addon.name.as_str()))
                        .with_child(Node::text_node("thumb", addon.thumb.as_str()))
                        .with_child(Node::text_node("onclick", format!("RunAddon({})", addon.id))),
                );
            }
        }
        Node::new("include")
            .with_attr("name", self.widget_path(widget, id))
            .with_child(content)
    }
}

/// `ControlGroup(9002).HasFocus | Control.HasFocus(500777) | ...`
pub fn arrows_condition(visible_count: usize) -> String {
    let mut terms = vec![format!("ControlGroup({WIDGET_GROUP_CONTROL}).HasFocus")];
    terms.extend(
        (0..visible_count)
            .map(|pos| format!("Control.HasFocus({})", anchor_id(FIRST_WIDGET_ID + pos as u32))),
    );
    terms.join(" | ")
}

impl Projector<WidgetItem> for WidgetProjector {
    fn project(&self, items: &[WidgetItem]) -> Document {
        let visible: Vec<&WidgetItem> = items.iter().filter(|w| w.visible).collect();
        let count = visible.len();

        let mut content = Node::new("include").with_attr("name", "home_widget_content");
        let mut anchors = Node::new("include").with_attr("name", "home_widget_anchors");
        let mut statics = Vec::new();
        for (position, widget) in visible.iter().enumerate() {
            let id = FIRST_WIDGET_ID + position as u32;
            content.push(self.content_node(widget, id));
            anchors.push(self.anchor_node(widget, position, count));
            if self
                .catalog
                .is_addon_widget(widget.category, widget.widget_type)
            {
                statics.push(self.static_content_node(widget, id));
            }
        }

        let mut doc = Document::includes();
        doc.root.push(content);
        doc.root.push(anchors);
        for block in statics {
            doc.root.push(block);
        }
        doc.root.push(
            Node::new("include")
                .with_attr("name", "cond_show_updown_arrows")
                .with_child(Node::text_node("visible", arrows_condition(count))),
        );
        doc
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::{ConfigContext, StringTable};
    use crate::label::Label;
    use crate::store::{AddonPathEntry, AddonRef, Element};

    fn projector() -> WidgetProjector {
        let ctx = ConfigContext::new(".", ".", ".")
            .with_strings(StringTable::from_pairs([(30033, "New widget")]));
        WidgetProjector::new(WidgetCatalog::new(&ctx))
    }

    fn widget(header: &str, category: i32, widget_type: i32, style: i32) -> WidgetItem {
        WidgetItem {
            header: Label::parse(header),
            category,
            widget_type,
            style,
            ..WidgetItem::template()
        }
    }

    fn params(node: &Node) -> Vec<(&str, &str)> {
        node.children_named("param")
            .map(|p| (p.attr("name").unwrap_or(""), p.text()))
            .collect()
    }

    fn content_blocks(doc: &Document) -> Vec<&Node> {
        doc.include("home_widget_content")
            .map(|n| n.children.iter().collect())
            .unwrap_or_default()
    }

    fn anchor_ids(doc: &Document) -> Vec<&str> {
        doc.include("home_widget_anchors")
            .map(|n| n.children.iter().filter_map(|c| c.attr("id")).collect())
            .unwrap_or_default()
    }

    #[test]
    fn unset_widget_renders_one_plain_block() {
        let doc = projector().project(&[widget("30033", -1, -1, -1)]);
        let blocks = content_blocks(&doc);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            params(blocks[0]),
            vec![
                ("id", "500"),
                ("header", "New widget"),
                ("type", ""),
                ("itemwidth", "0"),
                ("height", "0"),
                ("path", ""),
                ("sortby", ""),
                ("sortorder", ""),
            ]
        );
        assert_eq!(anchor_ids(&doc), vec!["500777"]);
        assert_eq!(
            doc.include_names(),
            vec!["home_widget_content", "home_widget_anchors", "cond_show_updown_arrows"]
        );
    }

    #[test]
    fn library_widget_params_in_order() {
        let mut recent = widget("Recent", 1, 0, 1);
        recent.limit = 12;
        let doc = projector().project(&[recent]);
        assert_eq!(
            params(content_blocks(&doc)[0]),
            vec![
                ("id", "500"),
                ("header", "Recent"),
                ("limit", "12"),
                ("type", "widget_landscape"),
                ("itemwidth", "380"),
                ("height", "260"),
                ("path", "videodb://recentlyaddedmovies/"),
                ("sortby", "dateadded"),
                ("sortorder", "descending"),
                ("showplaystatus", "true"),
            ]
        );
    }

    #[test]
    fn orderable_widget_uses_selected_sort_key() {
        let mut channels = widget("Channels", 0, 0, 0);
        channels.sortby = 1;
        let doc = projector().project(&[channels]);
        let block_params = params(content_blocks(&doc)[0]);
        assert!(block_params.contains(&("sortby", "channelnumber")));
    }

    #[test]
    fn anchors_wrap_around_visible_widgets() {
        let mut hidden = widget("Hidden", 1, 0, 0);
        hidden.visible = false;
        let items = vec![
            widget("A", 1, 0, 0),
            hidden,
            widget("B", 2, 0, 0),
            widget("C", 3, 0, 0),
        ];
        let doc = projector().project(&items);
        assert_eq!(anchor_ids(&doc), vec!["500777", "501777", "502777"]);

        let anchors = doc
            .include("home_widget_anchors")
            .expect("anchors block should exist");
        let nav: Vec<(&str, &str)> = anchors
            .children
            .iter()
            .map(|a| {
                (
                    a.child("onup").map(Node::text).unwrap_or(""),
                    a.child("ondown").map(Node::text).unwrap_or(""),
                )
            })
            .collect();
        assert_eq!(
            nav,
            vec![
                ("SetFocus(502)", "SetFocus(501)"),
                ("SetFocus(500)", "SetFocus(502)"),
                ("SetFocus(501)", "SetFocus(500)"),
            ]
        );
        let first = &anchors.children[0];
        let rights: Vec<&str> = first.children_named("onright").map(Node::text).collect();
        assert_eq!(rights, vec!["SetProperty(active_channel,500)", "500"]);
        assert_eq!(first.child("onleft").map(Node::text), Some("9001"));
        assert_eq!(
            first.child("visible").and_then(|v| v.attr("allowhiddenfocus")),
            Some("true")
        );

        let cond = doc
            .include("cond_show_updown_arrows")
            .and_then(|n| n.child("visible"))
            .map(Node::text);
        assert_eq!(
            cond,
            Some(
                "ControlGroup(9002).HasFocus | Control.HasFocus(500777) | \
                 Control.HasFocus(501777) | Control.HasFocus(502777)"
            )
        );
    }

    #[test]
    fn hiding_shifts_later_ids_and_showing_restores_them() {
        let projector = projector();
        let mut items = vec![
            widget("A", 1, 0, 0),
            widget("B", 2, 0, 0),
            widget("C", 3, 0, 0),
        ];
        let original = projector.project(&items);
        assert_eq!(anchor_ids(&original), vec!["500777", "501777", "502777"]);

        items[1].visible = false;
        let hidden = projector.project(&items);
        let ids: Vec<&str> = content_blocks(&hidden)
            .iter()
            .map(|b| params(b)[0].1)
            .collect();
        assert_eq!(ids, vec!["500", "501"]);
        assert_eq!(params(content_blocks(&hidden)[1])[1], ("header", "C"));

        items[1].visible = true;
        assert_eq!(projector.project(&items), original);
    }

    #[test]
    fn playlist_and_addon_path_anchor_clicks() {
        let projector = projector();
        let mut playlist = widget("Kids", 1, 2, 0);
        playlist.playlist = Some("kids.xsp".into());
        let mut songs = widget("Songs", 3, 3, 0);
        songs.playlist = Some("mix.m3u".into());
        let mut addon_path = widget("News", 5, 1, 0);
        addon_path.addonpath = Some(AddonPathEntry {
            id: 0,
            name: "News".into(),
            path: "plugin://plugin.video.news/latest/".into(),
        });

        assert_eq!(
            projector.anchor_click(&playlist),
            "ActivateWindow(Videos,special://profile/playlists/video/kids.xsp,return)"
        );
        assert_eq!(
            projector.anchor_click(&songs),
            "ActivateWindow(Music,special://profile/playlists/music/mix.m3u,return)"
        );
        assert_eq!(projector.anchor_click(&addon_path), "RunAddon(plugin.video.news)");
        assert_eq!(
            projector.anchor_click(&widget("Recent", 1, 0, 0)),
            "ActivateWindow(Videos,videodb://recentlyaddedmovies/,return)"
        );

        let doc = projector.project(&[addon_path]);
        let block_params = params(content_blocks(&doc)[0]);
        assert!(block_params.contains(&("path", "plugin://plugin.video.news/latest/")));
        assert!(block_params.contains(&("target", "videos")));
    }

    #[test]
    fn addon_widget_emits_static_content_include() {
        let mut addons = widget("Add-ons", 5, 0, 0);
        addons.addons = Some(vec![
            AddonRef {
                id: "plugin.video.a".into(),
                name: "A".into(),
                thumb: "a.png".into(),
            },
            AddonRef {
                id: "script.b".into(),
                name: "B".into(),
                thumb: "b.png".into(),
            },
        ]);
        let doc = projector().project(&[widget("Recent", 1, 0, 0), addons]);
        assert_eq!(
            doc.include_names(),
            vec![
                "home_widget_content",
                "home_widget_anchors",
                "widget_addons-501",
                "cond_show_updown_arrows"
            ]
        );
        let block_params = params(content_blocks(&doc)[1]);
        assert!(block_params.contains(&("path", "widget_addons-501")));
        assert!(block_params.contains(&("static_content", "true")));

        let items: Vec<Vec<&str>> = doc
            .include("widget_addons-501")
            .and_then(|n| n.child("content"))
            .map(|c| {
                c.children
                    .iter()
                    .map(|i| i.children.iter().map(Node::text).collect())
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(
            items,
            vec![
                vec!["A", "a.png", "RunAddon(plugin.video.a)"],
                vec!["B", "b.png", "RunAddon(script.b)"],
            ]
        );
    }

    #[test]
    fn running_at_path_and_static_onclick() {
        let mut running = widget("Tonight", 0, 3, 0);
        running.pointintime = Some("20:15".into());
        running.channels = Some(vec![1, 2, 3]);
        let doc = projector().project(&[running]);
        let block_params = params(content_blocks(&doc)[0]);
        assert!(block_params.contains(&(
            "path",
            "plugin://script.homemenu.helper/?info=runningat&pointintime=20:15&channels=1-2-3"
        )));
        assert!(block_params.contains(&("useonclick", "true")));
        assert!(!block_params.iter().any(|(name, _)| *name == "limit"));
    }

    #[test]
    fn no_visible_widgets_leaves_group_condition_only() {
        let mut hidden = widget("A", 1, 0, 0);
        hidden.visible = false;
        let doc = projector().project(&[hidden]);
        assert!(content_blocks(&doc).is_empty());
        assert_eq!(arrows_condition(0), "ControlGroup(9002).HasFocus");
    }
}
