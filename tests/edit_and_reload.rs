use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use home_menu_maker::host::{Answer, OfflineQuery, QueryService, ScriptedDialogs};
use home_menu_maker::store::Direction;
use home_menu_maker::{ConfigContext, Label, MenuEditor, WidgetEditor};

struct Session {
    _profile: tempfile::TempDir,
    _skin: tempfile::TempDir,
    ctx: ConfigContext,
}

fn session() -> Session {
    let resources = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources");
    let profile = tempfile::tempdir().expect("tempdir creation should succeed");
    let skin = tempfile::tempdir().expect("tempdir creation should succeed");
    let ctx = ConfigContext::new(resources, profile.path(), skin.path());
    Session {
        _profile: profile,
        _skin: skin,
        ctx,
    }
}

fn offline() -> Rc<dyn QueryService> {
    Rc::new(OfflineQuery)
}

#[test]
fn bundled_defaults_produce_markup_on_first_open() {
    let s = session();
    assert!(!s.ctx.strings.is_empty());

    let menu = MenuEditor::open(&s.ctx, offline()).expect("menu should open");
    let widgets = WidgetEditor::open(&s.ctx, offline()).expect("widgets should open");
    assert_eq!(menu.store().len(), 7);
    assert!(!widgets.store().is_dirty());

    let menu_xml =
        fs::read_to_string(s.ctx.menu_markup_path()).expect("menu markup should be written");
    assert!(menu_xml.contains("$LOCALIZE[342]"));
    assert!(menu_xml.contains("home_submenu_content_id_10"));
    assert!(menu_xml.contains("home_submenu_content_id_40"));
    assert!(!menu_xml.contains("home_submenu_content_id_50"));
    assert!(s.ctx.menu_user_path().exists());

    let widget_xml =
        fs::read_to_string(s.ctx.widgets_markup_path()).expect("widget markup should be written");
    assert!(widget_xml.contains("Next episodes"));
    assert!(widget_xml.contains("504777"));
    assert!(!widget_xml.contains("505777"));
}

#[test]
fn menu_edits_survive_a_reopen() {
    let s = session();
    let mut menu = MenuEditor::open(&s.ctx, offline()).expect("menu should open");

    menu.select(4);
    let mut dialogs = ScriptedDialogs::new([Answer::Text(Some("Photos".into()))]);
    assert!(menu.edit_label(&mut dialogs));
    assert!(menu.move_item(Direction::Up));
    assert!(menu.commit());

    let reopened = MenuEditor::open(&s.ctx, offline()).expect("menu should reopen");
    let moved = &reopened.store().items()[3];
    assert_eq!(moved.label, Label::literal("Photos"));
    assert_eq!(moved.thumb, "icons/mainmenu/pictures.png");

    let menu_xml =
        fs::read_to_string(s.ctx.menu_markup_path()).expect("menu markup should be written");
    assert!(menu_xml.contains("<label>Photos</label>"));
}

#[test]
fn hiding_a_widget_shrinks_the_anchor_chain_and_exit_lists_commands() {
    let s = session();
    let mut widgets = WidgetEditor::open(&s.ctx, offline()).expect("widgets should open");

    widgets.select(0);
    assert!(widgets.toggle_visibility());
    let commands = widgets.close();
    assert!(commands
        .iter()
        .all(|c| c.starts_with("Skin.Reset(runningat_")));

    let widget_xml =
        fs::read_to_string(s.ctx.widgets_markup_path()).expect("widget markup should be written");
    assert!(!widget_xml.contains("Next episodes"));
    assert!(widget_xml.contains("503777"));
    assert!(!widget_xml.contains("504777"));

    let reopened = WidgetEditor::open(&s.ctx, offline()).expect("widgets should reopen");
    assert!(!reopened.store().items()[0].visible);
}
