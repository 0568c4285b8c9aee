//! Main menu and submenu include blocks.

use crate::catalog::ActionCatalog;
use crate::markup::{Document, Node};
use crate::store::{MenuItem, Projector};

pub const FIRST_SUBMENU_ID: u32 = 10;
pub const SUBMENU_ID_STRIDE: u32 = 10;
/// Thumb size written when an item keeps the first (unset) size.
pub const DEFAULT_THUMBSIZE: u8 = 5;

pub struct MenuProjector {
    catalog: ActionCatalog,
}

impl MenuProjector {
    pub fn new(catalog: ActionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ActionCatalog {
        &mut self.catalog
    }

    /// `<item>` with label, thumb and click handlers. `submenu_id` is only
    /// written for main menu items.
    fn item_node(&self, item: &MenuItem, submenu_id: Option<u32>) -> Node {
        let mut node = Node::new("item")
            .with_child(Node::text_node("label", item.label.to_markup()))
            .with_child(Node::text_node("thumb", item.thumb.as_str()));

        let action = self
            .catalog
            .locate(item.actiontype, item.action, item.target.as_deref());
        let command = self.catalog.build_command(item.actiontype, action, 0);
        match (
            self.catalog.availability_condition(item.actiontype),
            self.catalog.fallback_command(item.actiontype),
        ) {
            (Some(condition), Some(fallback)) => {
                node.push(Node::text_node("onclick", command).with_attr("condition", condition));
                node.push(
                    Node::text_node("onclick", fallback)
                        .with_attr("condition", format!("!{condition}")),
                );
            }
            _ => node.push(Node::text_node("onclick", command)),
        }

        push_properties(&mut node, item, submenu_id);
        node
    }

    /// Main menu item that opens submenu `submenu_id` instead of acting.
    fn parent_node(&self, item: &MenuItem, submenu_id: u32) -> Node {
        let mut node = Node::new("item")
            .with_child(Node::text_node("label", item.label.to_markup()))
            .with_child(Node::text_node("thumb", item.thumb.as_str()))
            .with_child(Node::text_node("onclick", format!("SetFocus({submenu_id})")));
        push_properties(&mut node, item, Some(submenu_id));
        node
    }
}

fn push_properties(node: &mut Node, item: &MenuItem, submenu_id: Option<u32>) {
    let thumbsize = if item.thumbsize > 0 {
        item.thumbsize
    } else {
        DEFAULT_THUMBSIZE
    };
    node.push(
        Node::text_node("property", format!("$NUMBER[{thumbsize}]")).with_attr("name", "thumbsize"),
    );
    if let Some(id) = submenu_id {
        node.push(Node::text_node("property", format!("$NUMBER[{id}]")).with_attr("name", "submenu_id"));
    }
}

impl Projector<MenuItem> for MenuProjector {
    fn project(&self, items: &[MenuItem]) -> Document {
        let mut content = Node::new("content");
        let mut submenus = Node::new("include").with_attr("name", "home_mainmenu_submenus");
        let mut submenu_blocks = Vec::new();
        let mut submenu_id = FIRST_SUBMENU_ID;

        for item in items.iter().filter(|i| i.visible) {
            let children: Vec<&MenuItem> = item.visible_children().collect();
            if children.is_empty() {
                content.push(self.item_node(item, Some(0)));
                continue;
            }
            content.push(self.parent_node(item, submenu_id));
            submenus.push(
                Node::new("include")
                    .with_attr("content", "home_submenu")
                    .with_child(
                        Node::text_node("param", submenu_id.to_string()).with_attr("name", "id"),
                    ),
            );
            let mut sub_content = Node::new("content");
            for child in children {
                sub_content.push(self.item_node(child, None));
            }
            submenu_blocks.push(
                Node::new("include")
                    .with_attr("name", format!("home_submenu_content_id_{submenu_id}"))
                    .with_child(sub_content),
            );
            submenu_id += SUBMENU_ID_STRIDE;
        }

        let mut doc = Document::includes();
        doc.root.push(
            Node::new("include")
                .with_attr("name", "home_mainmenu_content")
                .with_child(content),
        );
        doc.root.push(submenus);
        for block in submenu_blocks {
            doc.root.push(block);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::ConfigContext;
    use crate::host::OfflineQuery;
    use crate::label::Label;
    use crate::store::Element;

    fn projector() -> (tempfile::TempDir, MenuProjector) {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        let ctx = ConfigContext::new(dir.path(), dir.path(), dir.path());
        let catalog = ActionCatalog::new(&ctx, Rc::new(OfflineQuery));
        (dir, MenuProjector::new(catalog))
    }

    fn item(label: &str, actiontype: i32, action: i32) -> MenuItem {
        MenuItem {
            label: Label::parse(label),
            thumb: format!("{label}.png"),
            actiontype,
            action,
            ..MenuItem::template()
        }
    }

    fn main_items(doc: &Document) -> Vec<&Node> {
        doc.include("home_mainmenu_content")
            .and_then(|i| i.child("content"))
            .map(|c| c.children_named("item").collect())
            .unwrap_or_default()
    }

    #[test]
    fn library_items_get_conditional_click_pair() {
        let (_dir, projector) = projector();
        let doc = projector.project(&[item("342", 0, 0)]);
        let items = main_items(&doc);
        assert_eq!(items.len(), 1);
        let node = items[0];
        assert_eq!(node.child("label").map(Node::text), Some("$LOCALIZE[342]"));
        let clicks: Vec<(Option<&str>, &str)> = node
            .children_named("onclick")
            .map(|n| (n.attr("condition"), n.text()))
            .collect();
        assert_eq!(
            clicks,
            vec![
                (
                    Some("Library.HasContent(movies)"),
                    "ActivateWindow(Videos,videodb://movies/titles/,return)"
                ),
                (
                    Some("!Library.HasContent(movies)"),
                    "ActivateWindow(Videos,sources://video/,return)"
                ),
            ]
        );
        let props: Vec<(Option<&str>, &str)> = node
            .children_named("property")
            .map(|n| (n.attr("name"), n.text()))
            .collect();
        assert_eq!(
            props,
            vec![
                (Some("thumbsize"), "$NUMBER[5]"),
                (Some("submenu_id"), "$NUMBER[0]")
            ]
        );
    }

    #[test]
    fn other_types_get_a_single_click_and_unset_is_empty() {
        let (_dir, projector) = projector();
        let mut weather = item("Weather", 6, 4);
        weather.thumbsize = 2;
        let doc = projector.project(&[weather, item("Blank", -1, -1)]);
        let items = main_items(&doc);
        let clicks: Vec<Vec<&str>> = items
            .iter()
            .map(|n| n.children_named("onclick").map(Node::text).collect())
            .collect();
        assert_eq!(clicks, vec![vec!["ActivateWindow(Weather)"], vec![""]]);
        assert_eq!(
            items[0]
                .child_with_attr("property", "name", "thumbsize")
                .map(Node::text),
            Some("$NUMBER[2]")
        );
    }

    #[test]
    fn parents_with_visible_children_open_their_submenu() {
        let (_dir, projector) = projector();
        let mut movies = item("Movies", 0, 0);
        movies.submenu = vec![item("A", 0, 1), item("B", 4, 1)];
        let mut music = item("Music", 2, 0);
        music.submenu = vec![MenuItem {
            visible: false,
            ..item("Hidden", 2, 1)
        }];
        let mut hidden = item("Gone", 6, 0);
        hidden.visible = false;
        hidden.submenu = vec![item("C", 6, 1)];
        let mut tv = item("TV", 4, 0);
        tv.submenu = vec![item("D", 4, 2)];

        let doc = projector.project(&[movies, music, hidden, tv]);
        assert_eq!(
            doc.include_names(),
            vec![
                "home_mainmenu_content",
                "home_mainmenu_submenus",
                "home_submenu_content_id_10",
                "home_submenu_content_id_20"
            ]
        );

        let items = main_items(&doc);
        assert_eq!(items.len(), 3);
        let parent_clicks: Vec<&str> = items[0].children_named("onclick").map(Node::text).collect();
        assert_eq!(parent_clicks, vec!["SetFocus(10)"]);
        assert_eq!(
            items[0]
                .child_with_attr("property", "name", "submenu_id")
                .map(Node::text),
            Some("$NUMBER[10]")
        );
        // All children hidden: rendered as a plain item.
        assert_eq!(items[1].children_named("onclick").count(), 2);
        assert_eq!(
            items[2]
                .child_with_attr("property", "name", "submenu_id")
                .map(Node::text),
            Some("$NUMBER[20]")
        );

        let submenu_ids: Vec<&str> = doc
            .include("home_mainmenu_submenus")
            .map(|n| {
                n.children_named("include")
                    .filter_map(|i| i.child("param").map(Node::text))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(submenu_ids, vec!["10", "20"]);

        let sub_items: Vec<&Node> = doc
            .include("home_submenu_content_id_10")
            .and_then(|i| i.child("content"))
            .map(|c| c.children_named("item").collect())
            .unwrap_or_default();
        assert_eq!(sub_items.len(), 2);
        assert!(sub_items
            .iter()
            .all(|n| n.child_with_attr("property", "name", "submenu_id").is_none()));
        assert_eq!(
            sub_items[1].child("onclick").map(Node::text),
            Some("ActivateWindow(TVGuide)")
        );
    }

    #[test]
    fn empty_menu_still_has_fixed_blocks() {
        let (_dir, projector) = projector();
        let doc = projector.project(&[]);
        assert_eq!(
            doc.include_names(),
            vec!["home_mainmenu_content", "home_mainmenu_submenus"]
        );
        let xml = doc.to_xml_string().expect("document should serialise");
        assert!(xml.contains("<content/>"));
    }
}
