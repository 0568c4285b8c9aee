use std::env;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout, Margin};
use ratatui::prelude::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::{error, info, warn};
use unicode_width::UnicodeWidthStr;

use home_menu_maker::host::{Dialogs, FileQuery, NumericKind, QueryService};
use home_menu_maker::store::Direction;
use home_menu_maker::{logging, ConfigContext, MenuEditor, Row, WidgetEditor};

const THEME_ENV: &str = "HOME_MENU_THEME";

fn main() -> Result<()> {
    let ctx = ConfigContext::from_env();
    let log_path = logging::init(&ctx).context("Unable to set up logging")?;
    info!(
        target: "home_menu_maker::host",
        log = %log_path.display(),
        profile = %ctx.profile_dir.display(),
        "starting"
    );

    let mut app = AppState::new(ctx)?;
    run_app(&mut app)?;

    // The skin picks these up when the host runs them on exit.
    for command in app.finish() {
        println!("{command}");
    }
    Ok(())
}

fn run_app(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = event_loop(&mut terminal, app);

    restore_terminal(&mut terminal)?;
    result
}

fn event_loop<B>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()>
where
    B: ratatui::backend::Backend + Write,
{
    let tick_rate = Duration::from_millis(200);
    loop {
        terminal.draw(|frame| render(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if let Some(action) = app.take_pending_action() {
            app.execute_deferred_action(terminal, action)?;
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn restore_terminal<B>(terminal: &mut Terminal<B>) -> Result<()>
where
    B: ratatui::backend::Backend + Write,
{
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(frame: &mut Frame, app: &AppState) {
    let size = frame.size();
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.background)),
        size,
    );

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(size);

    let header = Paragraph::new(app.title_line())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(app.theme.text)
                .bg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(header, chunks[0]);

    let shortcuts_bg = color_from_hex("#76B3C5").unwrap_or(app.theme.highlight);
    let shortcuts = Paragraph::new(app.footer_line())
        .alignment(Alignment::Center)
        .style(Style::default().bg(shortcuts_bg));
    frame.render_widget(shortcuts, chunks[1]);

    let content_area = chunks[2];
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.surface)),
        content_area,
    );
    render_panes(
        frame,
        content_area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
        app,
    );

    let status = Paragraph::new(app.status_text())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .bg(app.theme.primary)
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(status, chunks[3]);

    if let Some(popup) = &app.active_popup {
        render_popup(frame, popup, app);
    }
}

/// Element list on the left, details of the selection on the right.
fn render_panes(frame: &mut Frame, area: Rect, app: &AppState) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let panes = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let rows = app.rows();
    let label_width = panes[0].width.saturating_sub(4) as usize / 2;
    let selected = app.selected_position();
    let mut items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let style = app.row_style(row, index == selected);
            ListItem::new(row_line(row, label_width)).style(style)
        })
        .collect();
    if items.is_empty() {
        items.push(ListItem::new("(empty, press n to add)"));
    }
    let list = List::new(items).block(
        Block::default()
            .title(app.list_title())
            .borders(Borders::ALL)
            .style(Style::default().bg(app.theme.surface).fg(app.theme.text)),
    );
    frame.render_widget(list, panes[0]);

    let detail = Paragraph::new(app.detail_lines().join("\n"))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .style(Style::default().bg(app.theme.surface).fg(app.theme.text)),
        );
    frame.render_widget(detail, panes[1]);
}

fn row_line(row: &Row, label_width: usize) -> Line<'static> {
    let marker = if row.has_children { "▶" } else { " " };
    let hidden = if row.visible { "" } else { " (hidden)" };
    let label = format!("{marker} {}{hidden}", row.label);
    let padding = label_width.saturating_sub(label.width());
    Line::from(format!("{label}{}  {}", " ".repeat(padding), row.detail))
}

fn render_popup(frame: &mut Frame, popup: &PopupState, app: &AppState) {
    let (title, text, width, height) = match popup {
        PopupState::Info(lines) => ("Details", lines.join("\n"), 60, 50),
        PopupState::Message(msg) => ("Message", msg.clone(), 50, 30),
    };
    let area = centered_rect(frame.size(), width, height);
    frame.render_widget(Clear, area);
    let block = Paragraph::new(format!("{text}\n\nPress Enter or Esc to close."))
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(app.theme.surface).fg(app.theme.text))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .style(Style::default().bg(app.theme.surface)),
        );
    frame.render_widget(block, area);
}

fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let horizontal = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Percentage((100 - height_percent) / 2),
            Constraint::Percentage(height_percent),
            Constraint::Percentage((100 - height_percent) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

fn with_terminal_suspension<B, F, T>(terminal: &mut Terminal<B>, f: F) -> Result<T>
where
    B: ratatui::backend::Backend + Write,
    F: FnOnce() -> Result<T>,
{
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    let result = f();
    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    result
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Menu,
    Widgets,
}

/// Editor operations that prompt, run with the terminal suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeferredAction {
    EditLabel,
    EditIcon,
    ChooseAction,
    DeleteItem,
    ResetMenu,
    EditHeader,
    EditLimit,
    ChooseWidget,
    EditChannels,
    EditPointInTime,
    EditAddons,
    EditPlaylist,
    EditAddonPath,
    AddAddonPath,
    ManageAddonPaths,
    DeleteWidget,
    ResetWidgets,
}

enum PopupState {
    Info(Vec<String>),
    Message(String),
}

struct AppState {
    ctx: ConfigContext,
    menu: MenuEditor,
    widgets: WidgetEditor,
    tab: Tab,
    theme: Theme,
    status_message: Option<String>,
    pending_action: Option<DeferredAction>,
    active_popup: Option<PopupState>,
    should_quit: bool,
}

impl AppState {
    fn new(ctx: ConfigContext) -> Result<Self> {
        let query: Rc<dyn QueryService> = Rc::new(FileQuery::new(ctx.rpc_dir()));
        let menu = MenuEditor::open(&ctx, Rc::clone(&query)).with_context(|| {
            format!(
                "Unable to load a menu from {} or {}",
                ctx.menu_user_path().display(),
                ctx.menu_default_path().display()
            )
        })?;
        let widgets = WidgetEditor::open(&ctx, query).with_context(|| {
            format!(
                "Unable to load widgets from {} or {}",
                ctx.widgets_user_path().display(),
                ctx.widgets_default_path().display()
            )
        })?;
        let theme_key = env::var(THEME_ENV).unwrap_or_else(|_| "nord".into());
        let theme = Theme::from_name(&theme_key).unwrap_or_else(Theme::fallback);
        Ok(Self {
            ctx,
            menu,
            widgets,
            tab: Tab::Menu,
            theme,
            status_message: None,
            pending_action: None,
            active_popup: None,
            should_quit: false,
        })
    }

    fn title_line(&self) -> Line<'static> {
        let tab = |name: &'static str, active: bool| {
            let style = if active {
                Style::default()
                    .fg(self.theme.background)
                    .bg(self.theme.highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text).bg(self.theme.primary)
            };
            Span::styled(format!(" {name} "), style)
        };
        Line::from(vec![
            tab("Main menu", self.tab == Tab::Menu),
            Span::raw("  "),
            tab("Widgets", self.tab == Tab::Widgets),
        ])
    }

    fn list_title(&self) -> String {
        match (self.tab, self.menu.submenu_parent()) {
            (Tab::Menu, Some(parent)) => {
                let label = self
                    .menu
                    .store()
                    .items()
                    .get(parent)
                    .map(|item| item.label.resolve(&self.ctx.strings))
                    .unwrap_or_default();
                format!("Submenu of {label}")
            }
            (Tab::Menu, None) => "Main menu".into(),
            (Tab::Widgets, _) => "Widgets".into(),
        }
    }

    fn rows(&self) -> Vec<Row> {
        match self.tab {
            Tab::Menu => self.menu.rows(),
            Tab::Widgets => self.widgets.rows(),
        }
    }

    fn selected_position(&self) -> usize {
        match self.tab {
            Tab::Menu => self.menu.selection().position(),
            Tab::Widgets => self.widgets.selection().position(),
        }
    }

    fn row_style(&self, row: &Row, selected: bool) -> Style {
        let mut style = Style::default().fg(self.theme.text).bg(self.theme.surface);
        if !row.visible {
            style = style.fg(self.theme.accent);
        }
        if selected {
            style = style
                .bg(self.theme.highlight)
                .fg(self.theme.background)
                .add_modifier(Modifier::BOLD);
        }
        style
    }

    fn detail_lines(&self) -> Vec<String> {
        match self.tab {
            Tab::Menu => match self.menu.detail() {
                Some(d) => vec![
                    format!("Label: {}", d.label),
                    format!("Icon: {}", d.thumb),
                    format!("Visible: {}", yes_no(d.visible)),
                    format!("Action type: {}", d.action_type),
                    format!("Action: {}", d.action),
                    format!("Thumb size: {}", d.thumb_size),
                    format!("Submenu entries: {}", d.submenu_len),
                ],
                None => Vec::new(),
            },
            Tab::Widgets => match self.widgets.detail() {
                Some(d) => {
                    let mut lines = vec![
                        format!("Header: {}", d.header),
                        format!("Category: {}", d.category),
                        format!("Widget: {}", d.widget),
                        format!("Visible: {}", yes_no(d.visible)),
                    ];
                    if !d.description.is_empty() {
                        lines.push(format!("Style: {}", d.description));
                    }
                    if let Some(limit) = d.limit {
                        lines.push(format!("Limit: {limit}"));
                    }
                    if let Some(sort) = d.sort {
                        lines.push(format!("Sort by: {sort}"));
                    }
                    lines.push(format!("Path: {}", d.path));
                    for (index, addon) in d.addons.iter().enumerate() {
                        let cursor = if index == self.widgets.addon_cursor() {
                            ">"
                        } else {
                            " "
                        };
                        lines.push(format!("{cursor} {addon}"));
                    }
                    lines
                }
                None => Vec::new(),
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.active_popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.active_popup = None;
            }
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = match self.tab {
                    Tab::Menu => Tab::Widgets,
                    Tab::Widgets => Tab::Menu,
                };
                self.set_status(None);
            }
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char('i') => self.show_info_popup(),
            _ => match self.tab {
                Tab::Menu => self.handle_menu_key(key),
                Tab::Widgets => self.handle_widget_key(key),
            },
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let changed = match key.code {
            KeyCode::Up if shift => moved(self.menu.move_item(Direction::Up)),
            KeyCode::Down if shift => moved(self.menu.move_item(Direction::Down)),
            KeyCode::Char('K') => moved(self.menu.move_item(Direction::Up)),
            KeyCode::Char('J') => moved(self.menu.move_item(Direction::Down)),
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu.select_next();
                None
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                self.menu.open_submenu();
                None
            }
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => {
                self.menu.close_submenu();
                None
            }
            KeyCode::Char('v') => Some(self.menu.toggle_visibility()),
            KeyCode::Char('t') => Some(self.menu.cycle_action_type(true)),
            KeyCode::Char('T') => Some(self.menu.cycle_action_type(false)),
            KeyCode::Char('z') => Some(self.menu.cycle_thumb_size(true)),
            KeyCode::Char('Z') => Some(self.menu.cycle_thumb_size(false)),
            KeyCode::Char('n') => Some(self.menu.new_element()),
            KeyCode::Char('S') => Some(self.menu.new_submenu()),
            KeyCode::Char('e') => self.defer(DeferredAction::EditLabel),
            KeyCode::Char('g') => self.defer(DeferredAction::EditIcon),
            KeyCode::Char('a') => self.defer(DeferredAction::ChooseAction),
            KeyCode::Char('d') => self.defer(DeferredAction::DeleteItem),
            KeyCode::Char('R') => self.defer(DeferredAction::ResetMenu),
            KeyCode::Char('r') => {
                self.menu.reload_catalog();
                self.set_status(Some("Playlists and add-ons reloaded".into()));
                None
            }
            _ => None,
        };
        self.report(changed);
    }

    fn handle_widget_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let changed = match key.code {
            KeyCode::Up if shift => moved(self.widgets.move_item(Direction::Up)),
            KeyCode::Down if shift => moved(self.widgets.move_item(Direction::Down)),
            KeyCode::Char('K') => moved(self.widgets.move_item(Direction::Up)),
            KeyCode::Char('J') => moved(self.widgets.move_item(Direction::Down)),
            KeyCode::Up | KeyCode::Char('k') => {
                self.widgets.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.widgets.select_next();
                None
            }
            KeyCode::Char('v') => Some(self.widgets.toggle_visibility()),
            KeyCode::Char('c') => Some(self.widgets.cycle_category(true)),
            KeyCode::Char('C') => Some(self.widgets.cycle_category(false)),
            KeyCode::Char('s') => Some(self.widgets.cycle_sort_order(true)),
            KeyCode::Char('n') => Some(self.widgets.new_element()),
            KeyCode::Char('[') => {
                self.widgets.select_addon(false);
                None
            }
            KeyCode::Char(']') => {
                self.widgets.select_addon(true);
                None
            }
            KeyCode::Char('{') => moved(self.widgets.move_addon(Direction::Up)),
            KeyCode::Char('}') => moved(self.widgets.move_addon(Direction::Down)),
            KeyCode::Char('e') => self.defer(DeferredAction::EditHeader),
            KeyCode::Char('L') => self.defer(DeferredAction::EditLimit),
            KeyCode::Char('a') => self.defer(DeferredAction::ChooseWidget),
            KeyCode::Char('x') => self.defer(DeferredAction::EditChannels),
            KeyCode::Char('p') => self.defer(DeferredAction::EditPointInTime),
            KeyCode::Char('o') => self.defer(DeferredAction::EditAddons),
            KeyCode::Char('y') => self.defer(DeferredAction::EditPlaylist),
            KeyCode::Char('P') => self.defer(DeferredAction::EditAddonPath),
            KeyCode::Char('+') => self.defer(DeferredAction::AddAddonPath),
            KeyCode::Char('-') => self.defer(DeferredAction::ManageAddonPaths),
            KeyCode::Char('d') => self.defer(DeferredAction::DeleteWidget),
            KeyCode::Char('R') => self.defer(DeferredAction::ResetWidgets),
            _ => None,
        };
        self.report(changed);
    }

    fn defer(&mut self, action: DeferredAction) -> Option<bool> {
        self.pending_action = Some(action);
        None
    }

    fn report(&mut self, changed: Option<bool>) {
        match changed {
            Some(true) => self.set_status(Some("Changed, not saved yet".into())),
            Some(false) => self.set_status(Some("Not available here".into())),
            None => {}
        }
    }

    fn take_pending_action(&mut self) -> Option<DeferredAction> {
        self.pending_action.take()
    }

    fn execute_deferred_action<B>(
        &mut self,
        terminal: &mut Terminal<B>,
        action: DeferredAction,
    ) -> Result<()>
    where
        B: ratatui::backend::Backend + Write,
    {
        let changed = with_terminal_suspension(terminal, || {
            let mut dialogs = StdinDialogs;
            Ok(self.apply_action(action, &mut dialogs))
        })?;
        self.set_status(Some(if changed {
            "Changed, not saved yet".into()
        } else {
            "Nothing changed".into()
        }));
        Ok(())
    }

    fn apply_action(&mut self, action: DeferredAction, dialogs: &mut dyn Dialogs) -> bool {
        match action {
            DeferredAction::EditLabel => self.menu.edit_label(dialogs),
            DeferredAction::EditIcon => self.menu.edit_icon(dialogs),
            DeferredAction::ChooseAction => self.menu.choose_action(dialogs),
            DeferredAction::DeleteItem => self.menu.delete(dialogs),
            DeferredAction::ResetMenu => self.menu.reset(dialogs),
            DeferredAction::EditHeader => self.widgets.edit_header(dialogs),
            DeferredAction::EditLimit => self.widgets.edit_limit(dialogs),
            DeferredAction::ChooseWidget => self.widgets.choose_widget(dialogs),
            DeferredAction::EditChannels => self.widgets.edit_channels(dialogs),
            DeferredAction::EditPointInTime => self.widgets.edit_point_in_time(dialogs),
            DeferredAction::EditAddons => self.widgets.edit_addons(dialogs),
            DeferredAction::EditPlaylist => self.widgets.edit_playlist(dialogs),
            DeferredAction::EditAddonPath => self.widgets.edit_addon_path(dialogs),
            DeferredAction::AddAddonPath => self.widgets.add_addon_path(dialogs),
            DeferredAction::ManageAddonPaths => self.widgets.manage_addon_paths(dialogs),
            DeferredAction::DeleteWidget => self.widgets.delete(dialogs),
            DeferredAction::ResetWidgets => self.widgets.reset(dialogs),
        }
    }

    fn save(&mut self) {
        let menu = self.menu.commit();
        let widgets = self.widgets.commit();
        let message = match (menu, widgets) {
            (false, false) if self.is_dirty() => "Save failed, see the log".to_string(),
            (false, false) => "Nothing to save".to_string(),
            _ => format!("Saved to {}", self.ctx.skin_xml_dir.display()),
        };
        self.set_status(Some(message));
    }

    fn is_dirty(&self) -> bool {
        self.menu.store().is_dirty() || self.widgets.store().is_dirty()
    }

    /// Leave both editors, returning the skin commands to run.
    fn finish(&mut self) -> Vec<String> {
        while !self.menu.back() {}
        let commands = self.widgets.close();
        if self.is_dirty() {
            error!(
                target: "home_menu_maker::host",
                "exiting with unsaved changes"
            );
            eprintln!(
                "Some changes could not be saved; see {}",
                self.ctx.log_path().display()
            );
        }
        commands
    }

    fn show_info_popup(&mut self) {
        let lines = self.detail_lines();
        if lines.is_empty() {
            self.active_popup = Some(PopupState::Message("Nothing selected".into()));
        } else {
            self.active_popup = Some(PopupState::Info(lines));
        }
    }

    fn set_status(&mut self, message: Option<String>) {
        self.status_message = message;
    }

    fn status_text(&self) -> String {
        let total = self.rows().len();
        let current = if total == 0 {
            0
        } else {
            self.selected_position() + 1
        };
        let dirty = if self.is_dirty() { " | unsaved" } else { "" };
        let mut text = format!("Item {current}/{total} | Theme: {}{dirty}", self.theme.name);
        if let Some(msg) = &self.status_message {
            text.push_str(" | ");
            text.push_str(msg);
        }
        text
    }

    fn footer_line(&self) -> Line<'static> {
        let base_bg = color_from_hex("#76B3C5").unwrap_or(self.theme.highlight);
        let shortcut_fg = color_from_hex("#FDA009").unwrap_or(self.theme.accent);
        let label_fg = color_from_hex("#2E3544").unwrap_or(self.theme.surface);
        let shortcut_style = Style::default()
            .fg(shortcut_fg)
            .bg(base_bg)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(label_fg).bg(base_bg);
        let shortcuts = match self.tab {
            Tab::Menu => MENU_SHORTCUTS,
            Tab::Widgets => WIDGET_SHORTCUTS,
        };
        let mut spans: Vec<Span<'static>> = Vec::new();
        for (index, shortcut) in COMMON_SHORTCUTS.iter().chain(shortcuts).enumerate() {
            if index > 0 {
                spans.push(Span::styled(" | ", label_style));
            }
            spans.push(Span::styled(shortcut.key, shortcut_style));
            spans.push(Span::styled(shortcut.label, label_style));
        }
        Line::from(spans)
    }
}

fn moved(changed: bool) -> Option<bool> {
    changed.then_some(true)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Prompts on stdin while the terminal UI is suspended.
struct StdinDialogs;

impl StdinDialogs {
    fn read(result: Result<String>) -> Option<String> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "home_menu_maker::host", error = %err, "prompt failed");
                None
            }
        }
    }

    fn print_options(options: &[String], marked: &[usize]) {
        for (index, option) in options.iter().enumerate() {
            let mark = if marked.contains(&index) { "*" } else { " " };
            println!("{mark}{:>3}. {option}", index + 1);
        }
    }
}

impl Dialogs for StdinDialogs {
    fn input(&mut self, heading: &str, default: &str) -> Option<String> {
        Self::read(prompt_with_default(heading, default))
    }

    fn select(
        &mut self,
        heading: &str,
        options: &[String],
        preselect: Option<usize>,
    ) -> Option<usize> {
        println!("{heading}");
        let marked: Vec<usize> = preselect.into_iter().collect();
        Self::print_options(options, &marked);
        let raw = Self::read(prompt_optional("Number (empty to cancel)"))?;
        let number: usize = raw.parse().ok()?;
        number.checked_sub(1).filter(|i| *i < options.len())
    }

    fn multiselect(
        &mut self,
        heading: &str,
        options: &[String],
        preselect: &[usize],
    ) -> Option<Vec<usize>> {
        println!("{heading}");
        Self::print_options(options, preselect);
        let current: Vec<String> = preselect.iter().map(|i| (i + 1).to_string()).collect();
        let raw = Self::read(prompt_with_default(
            "Numbers separated by commas ('-' for none)",
            &current.join(","),
        ))?;
        if raw == "-" {
            return Some(Vec::new());
        }
        let picked: Vec<usize> = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<usize>().ok())
            .filter_map(|n| n.checked_sub(1))
            .filter(|i| *i < options.len())
            .collect();
        Some(picked)
    }

    fn numeric(&mut self, heading: &str, default: &str, kind: NumericKind) -> Option<String> {
        let hint = match kind {
            NumericKind::Number => heading.to_string(),
            NumericKind::Time => format!("{heading} (HH:MM)"),
        };
        Self::read(prompt_with_default(&hint, default))
    }

    fn yes_no(&mut self, heading: &str, message: &str) -> bool {
        println!("{heading}");
        Self::read(prompt_bool(message, false).map(|v| v.to_string()))
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    fn ok(&mut self, heading: &str, message: &str) {
        println!("{heading}\n{message}\nPress Enter to continue...");
        let _ = io::stdin().read_line(&mut String::new());
    }
}

#[derive(Clone)]
struct Theme {
    name: String,
    primary: Color,
    accent: Color,
    highlight: Color,
    background: Color,
    surface: Color,
    text: Color,
}

impl Theme {
    fn from_name(name: &str) -> Option<Self> {
        THEME_PRESETS
            .iter()
            .find(|preset| preset.0 == name)
            .map(|(_, def)| Theme::from_definition(def))
    }

    fn fallback() -> Self {
        Theme::from_definition(&THEME_PRESETS[0].1)
    }

    fn from_definition(def: &ThemeDefinition) -> Theme {
        Theme::from_hexes(
            def.name.to_string(),
            def.primary,
            def.accent,
            def.highlight,
            def.background,
            def.surface,
            def.text,
        )
    }

    fn from_hexes(
        name: String,
        primary: &str,
        accent: &str,
        highlight: &str,
        background: &str,
        surface: &str,
        text: &str,
    ) -> Theme {
        Theme {
            name,
            primary: color_from_hex(primary).unwrap_or(Color::Blue),
            accent: color_from_hex(accent).unwrap_or(Color::Cyan),
            highlight: color_from_hex(highlight).unwrap_or(Color::Cyan),
            background: color_from_hex(background).unwrap_or(Color::Black),
            surface: color_from_hex(surface).unwrap_or(Color::DarkGray),
            text: color_from_hex(text).unwrap_or(Color::White),
        }
    }
}

struct ThemeDefinition {
    name: &'static str,
    primary: &'static str,
    accent: &'static str,
    highlight: &'static str,
    background: &'static str,
    surface: &'static str,
    text: &'static str,
}

const THEME_PRESETS: &[(&str, ThemeDefinition)] = &[
    (
        "nord",
        ThemeDefinition {
            name: "Nord",
            primary: "#5E81AC",
            accent: "#D08770",
            highlight: "#76B3C5",
            background: "#3B4252",
            surface: "#4C566A",
            text: "#ECEFF4",
        },
    ),
    (
        "classic",
        ThemeDefinition {
            name: "Midnight Classic",
            primary: "#6FC6D4",
            accent: "#0F1A2B",
            highlight: "#9FE6EC",
            background: "#314A63",
            surface: "#416079",
            text: "#F2F8FF",
        },
    ),
    (
        "mist",
        ThemeDefinition {
            name: "Midnight Mist",
            primary: "#66C3CF",
            accent: "#0E1828",
            highlight: "#96DFE8",
            background: "#2C4156",
            surface: "#3B5A72",
            text: "#F4FBFF",
        },
    ),
];

#[derive(Clone, Copy)]
struct FooterShortcut {
    key: &'static str,
    label: &'static str,
}

const COMMON_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "q",
        label: " Exit",
    },
    FooterShortcut {
        key: "⇥",
        label: " Switch",
    },
    FooterShortcut {
        key: "^s",
        label: " Save",
    },
    FooterShortcut {
        key: "i",
        label: " Info",
    },
    FooterShortcut {
        key: "J/K",
        label: " Move",
    },
    FooterShortcut {
        key: "n",
        label: " New",
    },
    FooterShortcut {
        key: "d",
        label: " Delete",
    },
];

const MENU_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "↵",
        label: " Submenu",
    },
    FooterShortcut {
        key: "e",
        label: " Label",
    },
    FooterShortcut {
        key: "g",
        label: " Icon",
    },
    FooterShortcut {
        key: "t",
        label: " Type",
    },
    FooterShortcut {
        key: "a",
        label: " Action",
    },
    FooterShortcut {
        key: "z",
        label: " Size",
    },
    FooterShortcut {
        key: "S",
        label: " New submenu",
    },
];

const WIDGET_SHORTCUTS: &[FooterShortcut] = &[
    FooterShortcut {
        key: "e",
        label: " Header",
    },
    FooterShortcut {
        key: "c",
        label: " Category",
    },
    FooterShortcut {
        key: "a",
        label: " Widget",
    },
    FooterShortcut {
        key: "L",
        label: " Limit",
    },
    FooterShortcut {
        key: "x/p",
        label: " Channels/Time",
    },
    FooterShortcut {
        key: "o",
        label: " Add-ons",
    },
    FooterShortcut {
        key: "y",
        label: " Playlist",
    },
    FooterShortcut {
        key: "P",
        label: " Path",
    },
];

fn color_from_hex(value: &str) -> Option<Color> {
    let normalized = normalize_hex(value);
    let bytes = normalized.as_bytes();
    let r = u8::from_str_radix(std::str::from_utf8(&bytes[1..3]).ok()?, 16).ok()?;
    let g = u8::from_str_radix(std::str::from_utf8(&bytes[3..5]).ok()?, 16).ok()?;
    let b = u8::from_str_radix(std::str::from_utf8(&bytes[5..7]).ok()?, 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

fn normalize_hex(value: &str) -> String {
    let mut cleaned = value.trim().to_string();
    if !cleaned.starts_with('#') {
        cleaned.insert(0, '#');
    }
    if cleaned.len() != 7 {
        return "#ffffff".into();
    }
    cleaned
}

fn prompt_with_default(prompt: &str, default: &str) -> Result<String> {
    println!("{prompt} [{default}]: ");
    print!("> ");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn prompt_optional(prompt: &str) -> Result<String> {
    println!("{prompt}: ");
    print!("> ");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

fn prompt_bool(prompt: &str, default: bool) -> Result<bool> {
    let default_hint = if default { "Y/n" } else { "y/N" };
    println!("{prompt} ({default_hint})");
    print!("> ");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    let trimmed = buf.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        Ok(default)
    } else if trimmed == "y" || trimmed == "yes" {
        Ok(true)
    } else if trimmed == "n" || trimmed == "no" {
        Ok(false)
    } else {
        Ok(default)
    }
}
