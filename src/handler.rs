use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, Focus};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::CatalogLoaded(result) => app.apply_catalog(result),
        AppEvent::ChatResolved { token, result } => app.resolve_question(token, result),
        AppEvent::ComparisonResolved { generation, result } => {
            app.resolve_comparison(generation, result)
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // An open alert swallows everything until dismissed
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return;
    }

    match key.code {
        KeyCode::Tab => return app.focus_next(),
        KeyCode::BackTab => return app.focus_prev(),
        KeyCode::PageUp => return app.chat.log.scroll_up(10),
        KeyCode::PageDown => return app.chat.log.scroll_down(10),
        _ => {}
    }

    if app.focus.is_text_field() {
        handle_text_key(app, key);
    } else {
        handle_control_key(app, key);
    }
}

fn handle_text_key(app: &mut App, key: KeyEvent) {
    let focus = app.focus;

    // Enter in the question field asks; Up/Down in the specification field
    // walks the presets.
    match (focus, key.code) {
        (Focus::Question, KeyCode::Enter) => return app.submit_question(),
        (Focus::Specification, KeyCode::Enter) => return app.submit_comparison(),
        (Focus::Specification, KeyCode::Up) => return app.comparison.cycle_preset(false),
        (Focus::Specification, KeyCode::Down) => return app.comparison.cycle_preset(true),
        (Focus::Question, KeyCode::Up) => return app.chat.log.scroll_up(1),
        (Focus::Question, KeyCode::Down) => return app.chat.log.scroll_down(1),
        _ => {}
    }

    let input = match focus {
        Focus::Specification => &mut app.comparison.specification,
        _ => &mut app.chat.question,
    };

    match key.code {
        KeyCode::Esc => app.focus = Focus::ProductSelect,
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        // Ctrl/Alt chords are commands, never text
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            input.insert(c)
        }
        _ => {}
    }
}

fn handle_control_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('r') => {
            if !app.catalog.loading {
                app.load_products();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            Focus::ProductSelect => app.catalog.chat_product.select_prev(),
            Focus::ProductA => app.catalog.product_a.select_prev(),
            Focus::ProductB => app.catalog.product_b.select_prev(),
            _ => app.chat.log.scroll_up(1),
        },
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            Focus::ProductSelect => app.catalog.chat_product.select_next(),
            Focus::ProductA => app.catalog.product_a.select_next(),
            Focus::ProductB => app.catalog.product_b.select_next(),
            _ => app.chat.log.scroll_down(1),
        },
        KeyCode::Enter | KeyCode::Char(' ') => match app.focus {
            Focus::ProductSelect => app.focus = Focus::Question,
            Focus::AskButton => app.submit_question(),
            Focus::ComparisonHeader => app.toggle_comparison(),
            Focus::CompareButton => app.submit_comparison(),
            Focus::ProductA | Focus::ProductB => app.focus_next(),
            Focus::Question | Focus::Specification => {}
        },
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.chat.log.scroll_down(3),
        MouseEventKind::ScrollUp => app.chat.log.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ManualsClient, Product};
    use crate::config::Config;
    use tokio::sync::mpsc;

    fn app() -> App {
        let client = ManualsClient::new(&Config::default()).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(client, tx);
        app.apply_catalog(Ok(vec![
            Product { id: "p1".to_string(), name: "Phone One".to_string() },
            Product { id: "p2".to_string(), name: "Phone Two".to_string() },
        ]));
        app
    }

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        handle_event(app, AppEvent::Key(key)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_select_with_arrows() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.catalog.chat_product.value(), "p1");
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.catalog.chat_product.value(), "p2");
        press(&mut app, KeyCode::Up);
        assert_eq!(app.catalog.chat_product.value(), "p1");
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Question);
        // 'q' is text here, not quit
        type_text(&mut app, "quiet?");
        assert!(!app.should_quit);
        assert_eq!(app.chat.question.value(), "quiet?");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.chat.question.value(), "quiet");
    }

    #[test]
    fn test_q_quits_outside_text_fields() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_alert_blocks_input_until_dismissed() {
        let mut app = app();
        app.focus = Focus::AskButton;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.alert.as_deref(), Some("Please select a product."));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::AskButton);

        press(&mut app, KeyCode::Esc);
        assert!(app.alert.is_none());
    }

    #[test]
    fn test_header_enter_toggles_comparison() {
        let mut app = app();
        app.focus = Focus::ComparisonHeader;
        press(&mut app, KeyCode::Enter);
        assert!(app.comparison.expanded);
        assert!(app.comparison.icon_rotated);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.comparison.expanded);
    }

    #[test]
    fn test_specification_presets_with_arrows() {
        let mut app = app();
        app.toggle_comparison();
        app.focus = Focus::Specification;
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.comparison.specification.value(), "RAM");
        type_text(&mut app, " size");
        assert_eq!(app.comparison.specification.value(), "RAM size");
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = app();
        app.focus = Focus::Question;
        type_text(&mut app, "ram");
        for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
            let key = KeyEvent::new(KeyCode::Char('u'), modifiers);
            handle_event(&mut app, AppEvent::Key(key)).unwrap();
        }
        assert_eq!(app.chat.question.value(), "ram");

        // Shift is how capitals arrive and still types
        let key = KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT);
        handle_event(&mut app, AppEvent::Key(key)).unwrap();
        assert_eq!(app.chat.question.value(), "ramS");
    }

    #[test]
    fn test_ctrl_c_quits_from_text_field() {
        let mut app = app();
        app.focus = Focus::Question;
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(key)).unwrap();
        assert!(app.should_quit);
    }
}
