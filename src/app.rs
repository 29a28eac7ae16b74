use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, ToSpan},
    widgets::{Block, Clear, List, ListItem, Paragraph, Wrap},
};
use tracing::{error, warn};
use tui_input::{Input, InputRequest, backend::crossterm::EventHandler};

use crate::{
    confirm::{Confirmation, DELETE_MESSAGE, DELETE_TITLE, Fixed},
    models::{Note, NoteId},
    storage::KeyValueStore,
    store::NoteStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    List,
    Form,
    /// Waiting for a yes/no on deleting this note
    Confirm(NoteId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusedInput {
    Title,
    Description,
}

pub struct App<S> {
    store: NoteStore<S>,
    current_screen: Screen,
    list_index: usize,
    title_input: Input,
    description_input: Input,
    focused_input: FocusedInput,
    status: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: NoteStore<S>) -> Self {
        App {
            store,
            current_screen: Screen::List,
            list_index: 0,
            title_input: Input::default(),
            description_input: Input::default(),
            focused_input: FocusedInput::Title,
            status: None,
        }
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            let event = crossterm::event::read()?;

            if self.handle_event(&event) {
                return Ok(());
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match self.current_screen {
            Screen::List => return self.handle_list_key(key),
            Screen::Form => self.handle_form_key(key, event),
            Screen::Confirm(id) => self.handle_confirm_key(key, id),
        }
        false
    }

    fn handle_list_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('a') => {
                self.status = None;
                self.focused_input = FocusedInput::Title;
                self.current_screen = Screen::Form;
            }
            KeyCode::Char('d') => {
                if let Some(entry) = self.store.get(self.list_index) {
                    self.status = None;
                    self.current_screen = Screen::Confirm(entry.id);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, key: &KeyEvent, event: &Event) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                self.save_note();
            }
            (_, KeyCode::Tab) => {
                self.toggle_input();
            }
            (_, KeyCode::Esc) => self.current_screen = Screen::List,
            (_, KeyCode::Enter) => match self.focused_input {
                FocusedInput::Title => self.focused_input = FocusedInput::Description,
                FocusedInput::Description => {
                    self.description_input.handle(InputRequest::InsertChar('\n'));
                }
            },
            _ => {
                match self.focused_input {
                    FocusedInput::Title => {
                        self.title_input.handle_event(event);
                    }
                    FocusedInput::Description => {
                        self.description_input.handle_event(event);
                    }
                };
            }
        }
    }

    fn handle_confirm_key(&mut self, key: &KeyEvent, id: NoteId) {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Confirmation::Affirm,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Confirmation::Cancel,
            _ => return,
        };
        self.current_screen = Screen::List;
        self.delete_note(id, answer);
    }

    fn draw(&self, frame: &mut Frame) {
        match self.current_screen {
            Screen::List => {
                self.render_list(frame);
            }
            Screen::Form => {
                self.render_form(frame);
            }
            Screen::Confirm(_) => {
                self.render_list(frame);
                render_confirm(frame);
            }
        }
    }

    fn render_form(&self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let help_message = Line::from_iter([
            "Esc".bold().yellow(),
            " back, ".to_span(),
            "Ctrl+S".bold().yellow(),
            " save, ".to_span(),
            "Tab".bold().yellow(),
            " switch input focus, ".to_span(),
            "Enter".bold().yellow(),
            " new line.".to_span(),
        ])
        .centered();

        render_input(
            frame,
            &self.title_input,
            layout[0],
            "Title",
            self.focused_input == FocusedInput::Title,
        );
        render_multiline_input(
            frame,
            &self.description_input,
            layout[1],
            "Description",
            self.focused_input == FocusedInput::Description,
        );
        frame.render_widget(self.footer(help_message), layout[2]);
    }

    fn render_list(&self, frame: &mut Frame) {
        let outer_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(30), Constraint::Min(1)])
            .split(outer_layout[0]);

        let block = Block::bordered()
            .title("My Notes")
            .border_set(border::THICK);

        let help_message = Line::from_iter([
            "Esc/q".bold().yellow(),
            " exit, ".to_span(),
            "a".bold().yellow(),
            " add, ".to_span(),
            "d".bold().red(),
            " delete".to_span(),
        ])
        .centered();

        frame.render_widget(self.footer(help_message), outer_layout[1]);

        if self.store.is_empty() {
            frame.render_widget(
                Paragraph::new("No notes found").centered().block(block),
                layout[0],
            );
            return;
        }

        let notes_list_items = self.store.entries().iter().enumerate().map(|(i, entry)| {
            let item = if entry.note.title.is_empty() {
                ListItem::new(Line::from("(untitled)")).italic()
            } else {
                ListItem::new(Line::from(entry.note.title.as_str())).bold()
            };

            if i == self.list_index {
                item.black().on_white()
            } else {
                item
            }
        });
        let note_details = self.store.get(self.list_index).map(|entry| {
            Paragraph::new(entry.note.description.as_str())
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(entry.note.title.as_str()))
        });

        frame.render_widget(List::new(notes_list_items).block(block), layout[0]);
        frame.render_widget(note_details, layout[1]);
    }

    /// Shows the last error in place of the key help.
    fn footer<'a>(&'a self, help_message: Line<'a>) -> Line<'a> {
        match &self.status {
            Some(status) => Line::from(status.as_str()).red().bold().centered(),
            None => help_message,
        }
    }

    fn save_note(&mut self) {
        let note = Note::new(self.title_input.value(), self.description_input.value());

        match self.store.append(note) {
            Ok(entries) => {
                self.list_index = entries.len() - 1;
                self.title_input.reset();
                self.description_input.reset();
                self.focused_input = FocusedInput::Title;
                self.status = None;
                self.current_screen = Screen::List;
            }
            Err(err) => {
                error!(error = %err, "could not save note");
                self.status = Some(format!("Could not save note: {err}"));
            }
        }
    }

    fn delete_note(&mut self, id: NoteId, answer: Confirmation) {
        let Some(index) = self.store.position(id) else {
            warn!(%id, "note vanished before delete was confirmed");
            return;
        };

        match self.store.confirm_and_remove(index, &mut Fixed(answer)) {
            Ok(Some(_)) => {
                if self.list_index >= self.store.len() && self.list_index != 0 {
                    self.list_index -= 1;
                }
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "could not delete note");
                self.status = Some(format!("Could not delete note: {err}"));
            }
        }
    }

    fn select_next(&mut self) {
        if self.store.is_empty() {
            return;
        }
        if self.list_index + 1 >= self.store.len() {
            self.list_index = 0;
        } else {
            self.list_index += 1;
        }
    }

    fn select_previous(&mut self) {
        if self.store.is_empty() {
            return;
        }
        if self.list_index == 0 {
            self.list_index = self.store.len() - 1;
        } else {
            self.list_index -= 1;
        }
    }

    fn toggle_input(&mut self) {
        self.focused_input = match self.focused_input {
            FocusedInput::Title => FocusedInput::Description,
            FocusedInput::Description => FocusedInput::Title,
        };
    }
}

fn render_input(frame: &mut Frame, input: &Input, area: Rect, title: &str, focused: bool) {
    let mut paragraph = Paragraph::new(input.value());
    let mut block = Block::bordered().title(title);

    if focused {
        block = block.border_style(Style::new().yellow());
        let width = area.width.max(3) - 3;
        let scroll = input.visual_scroll(width as usize);
        paragraph = paragraph.scroll((0, scroll as u16));

        let x = input.visual_cursor().max(scroll) - scroll + 1;
        frame.set_cursor_position((area.x + x as u16, area.y + 1));
    }

    frame.render_widget(paragraph.block(block), area);
}

fn render_multiline_input(
    frame: &mut Frame,
    input: &Input,
    area: Rect,
    title: &str,
    focused: bool,
) {
    let mut paragraph = Paragraph::new(input.value());
    let mut block = Block::bordered().title(title);

    if focused {
        block = block.border_style(Style::new().yellow());
        let (x, y) = cursor_position(input.value(), input.cursor());
        let scroll_x = x.saturating_sub(area.width.saturating_sub(3));
        let scroll_y = y.saturating_sub(area.height.saturating_sub(3));
        paragraph = paragraph.scroll((scroll_y, scroll_x));

        frame.set_cursor_position((
            area.x + 1 + x - scroll_x,
            area.y + 1 + y - scroll_y,
        ));
    }

    frame.render_widget(paragraph.block(block), area);
}

/// Column and row of the char at `cursor` in a newline-separated value.
fn cursor_position(value: &str, cursor: usize) -> (u16, u16) {
    let before: Vec<char> = value.chars().take(cursor).collect();
    let row = before.iter().filter(|&&c| c == '\n').count();
    let column = before.iter().rev().take_while(|&&c| c != '\n').count();
    (column as u16, row as u16)
}

fn render_confirm(frame: &mut Frame) {
    let [area] = Layout::horizontal([Constraint::Length(46)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(area);

    let text = vec![
        Line::from(DELETE_MESSAGE).centered(),
        Line::default(),
        Line::from_iter([
            "y".bold().yellow(),
            " OK   ".to_span(),
            "n".bold().yellow(),
            " Cancel".to_span(),
        ])
        .centered(),
    ];

    let block = Block::bordered()
        .title(DELETE_TITLE)
        .border_style(Style::new().red());

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::{error::StorageError, storage::MemoryStore, store::DEFAULT_KEY};

    /// Serves a fixed value and rejects every write.
    struct ReadOnly(Option<String>);

    impl KeyValueStore for ReadOnly {
        fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
            Ok(self.0.clone())
        }

        fn set(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("read-only".into()))
        }
    }

    fn app_with(notes: &[(&str, &str)]) -> App<MemoryStore> {
        let mut store = NoteStore::load(MemoryStore::new(), DEFAULT_KEY).unwrap();
        for (title, description) in notes {
            store.append(Note::new(*title, *description)).unwrap();
        }
        App::new(store)
    }

    fn press(app: &mut App<impl KeyValueStore>, code: KeyCode) -> bool {
        app.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(app: &mut App<impl KeyValueStore>, c: char) {
        app.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )));
    }

    fn type_text(app: &mut App<impl KeyValueStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen_text(app: &App<impl KeyValueStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn quits_from_list() {
        let mut app = app_with(&[]);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn navigation_wraps_and_ignores_empty_list() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.list_index, 0);

        let mut app = app_with(&[("A", "x"), ("B", "y")]);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.list_index, 1);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.list_index, 0);
    }

    #[test]
    fn form_saves_and_clears() {
        let mut app = app_with(&[("A", "x")]);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Bq");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "y");
        ctrl(&mut app, 's');

        assert_eq!(app.current_screen, Screen::List);
        assert_eq!(app.store().notes(), vec![Note::new("A", "x"), Note::new("Bq", "y")]);
        assert_eq!(app.list_index, 1);
        assert_eq!(app.title_input.value(), "");
        assert_eq!(app.description_input.value(), "");
    }

    #[test]
    fn delete_asks_first() {
        let mut app = app_with(&[("A", "x"), ("B", "y")]);
        press(&mut app, KeyCode::Down);

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.current_screen, Screen::Confirm(_)));
        press(&mut app, KeyCode::Char('z'));
        assert!(matches!(app.current_screen, Screen::Confirm(_)));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.current_screen, Screen::List);
        assert_eq!(app.store().len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store().notes(), vec![Note::new("A", "x")]);
        assert_eq!(app.list_index, 0);
    }

    #[test]
    fn delete_on_empty_list_does_nothing() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.current_screen, Screen::List);
    }

    #[test]
    fn failed_save_keeps_input() {
        let mut app = App::new(NoteStore::load(ReadOnly(None), DEFAULT_KEY).unwrap());
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "keep me");
        ctrl(&mut app, 's');

        assert_eq!(app.current_screen, Screen::Form);
        assert_eq!(app.title_input.value(), "keep me");
        assert!(app.store().is_empty());
        assert!(app.status.as_deref().unwrap().starts_with("Could not save note"));
    }

    #[test]
    fn failed_delete_keeps_note_and_reports() {
        let raw = r#"[{"title":"A","description":"x"}]"#;
        let store = NoteStore::load(ReadOnly(Some(raw.to_string())), DEFAULT_KEY).unwrap();
        let mut app = App::new(store);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.current_screen, Screen::List);
        assert_eq!(app.store().len(), 1);
        assert!(app.status.as_deref().unwrap().starts_with("Could not delete note"));
        assert!(screen_text(&app).contains("Could not delete note"));
    }

    #[test]
    fn description_takes_several_lines() {
        let mut app = app_with(&[]);

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Groceries");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focused_input, FocusedInput::Description);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "eggs");
        ctrl(&mut app, 's');

        assert_eq!(app.store().notes(), vec![Note::new("Groceries", "milk\neggs")]);
    }

    #[test]
    fn cursor_tracks_rows_and_columns() {
        assert_eq!(cursor_position("", 0), (0, 0));
        assert_eq!(cursor_position("milk", 4), (4, 0));
        assert_eq!(cursor_position("milk\neggs", 5), (0, 1));
        assert_eq!(cursor_position("milk\neggs", 7), (2, 1));
        assert_eq!(cursor_position("a\n\nb", 3), (0, 2));
    }

    #[test]
    fn renders_empty_placeholder_and_dialog() {
        let app = app_with(&[]);
        assert!(screen_text(&app).contains("No notes found"));

        let mut app = app_with(&[("Groceries", "milk")]);
        assert!(screen_text(&app).contains("Groceries"));

        press(&mut app, KeyCode::Char('d'));
        let text = screen_text(&app);
        assert!(text.contains(DELETE_TITLE));
        assert!(text.contains(DELETE_MESSAGE));
    }
}
