use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};
use crate::app::{App, Focus};
use crate::catalog::ProductSelect;
use crate::input::TextInput;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);

    let [chat_column, compare_column] = Layout::horizontal([
        Constraint::Percentage(58),
        Constraint::Percentage(42),
    ])
    .areas(body_area);

    render_chat_column(app, frame, chat_column);
    render_comparison_column(app, frame, compare_column);
    render_footer(app, frame, footer_area);

    if let Some(message) = &app.alert {
        render_alert(message, frame, area);
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Product Manual Intelligence ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = if app.alert.is_some() {
        (" ALERT ", Style::default().bg(Color::Red).fg(Color::White))
    } else if app.focus.is_text_field() {
        (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" NAV ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let hints = if app.alert.is_some() {
        " Enter/Esc: dismiss"
    } else if app.focus.is_text_field() {
        " Enter: submit  Tab: next  Esc: leave field  Ctrl-C: quit"
    } else {
        " Tab: next  ↑↓: choose  Enter: activate  r: reload products  q: quit"
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ];

    if app.catalog.loading {
        spans.push(Span::styled("  Loading products...", Style::default().fg(Color::Yellow)));
    } else if let Some(error) = &app.catalog.load_error {
        spans.push(Span::styled(
            format!("  {} (r to retry)", error),
            Style::default().fg(Color::Red),
        ));
    }

    let waiting = app.chat.log.pending_count();
    if waiting > 0 {
        spans.push(Span::styled(
            format!("  {} waiting", waiting),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_select(select: &ProductSelect, title: &str, focused: bool, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title(format!(" {} ", title));

    let label_style = if select.is_placeholder() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let count = select.options().len().saturating_sub(1);
    let line = Line::from(vec![
        Span::styled(select.label().to_string(), label_style),
        Span::styled(format!("  ▾ ({} products)", count), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_text_input(
    input: &TextInput,
    title: &str,
    placeholder: &str,
    focused: bool,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(format!(" {} ", title));

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_col) = input.visible(inner_width);

    let paragraph = if input.value().is_empty() && !focused {
        Paragraph::new(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(paragraph.block(block), area);

    if focused {
        frame.set_cursor_position((area.x + cursor_col as u16 + 1, area.y + 1));
    }
}

fn render_button(label: &str, focused: bool, frame: &mut Frame, area: Rect) {
    let style = if focused {
        Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)).centered())
        .block(Block::default().borders(Borders::ALL).border_style(border_style(focused)));
    frame.render_widget(button, area);
}

fn render_chat_column(app: &mut App, frame: &mut Frame, area: Rect) {
    let [select_area, chat_area, input_row] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    render_select(
        &app.catalog.chat_product,
        "Product",
        app.focus == Focus::ProductSelect,
        frame,
        select_area,
    );

    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat.log.set_viewport(chat_area.height.saturating_sub(2), chat_area.width.saturating_sub(2));

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Ask the manuals ");

    let chat_text = if app.chat.log.is_empty() {
        Text::from(Span::styled(
            "Choose a product and ask a question about its manual...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(app.chat.log.lines())
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat.log.scroll, 0));
    frame.render_widget(chat, chat_area);

    let [question_area, ask_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(9),
    ])
    .areas(input_row);

    render_text_input(
        &app.chat.question,
        "Question",
        "Type your question...",
        app.focus == Focus::Question,
        frame,
        question_area,
    );
    render_button("Ask", app.focus == Focus::AskButton, frame, ask_area);
}

fn render_comparison_column(app: &App, frame: &mut Frame, area: Rect) {
    let panel = &app.comparison;
    let header_focused = app.focus == Focus::ComparisonHeader;

    let [header_area, content_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let icon = if panel.icon_rotated { "▼" } else { "▶" };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} ", icon), Style::default().fg(Color::Magenta)),
        Span::styled("Compare Products", Style::default().bold()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(header_focused)),
    );
    frame.render_widget(header, header_area);

    if !panel.expanded {
        let hint = Paragraph::new("Select the header and press Enter to compare two products.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, content_area);
        return;
    }

    let [a_area, b_area, spec_area, button_area, result_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(content_area);

    render_select(&app.catalog.product_a, "Product A", app.focus == Focus::ProductA, frame, a_area);
    render_select(&app.catalog.product_b, "Product B", app.focus == Focus::ProductB, frame, b_area);
    render_text_input(
        &panel.specification,
        "Specification (↑↓ presets)",
        "all specifications",
        app.focus == Focus::Specification,
        frame,
        spec_area,
    );
    render_button("Compare", app.focus == Focus::CompareButton, frame, button_area);

    render_comparison_result(app, frame, result_area);
}

fn render_comparison_result(app: &App, frame: &mut Frame, area: Rect) {
    let panel = &app.comparison;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Comparison Results ");

    let Some(table) = panel.table() else {
        // Result area stays hidden until the first successful comparison
        if panel.is_awaiting() {
            let waiting = Paragraph::new(Span::styled(
                "Comparing...",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
            .block(block);
            frame.render_widget(waiting, area);
        }
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [status_area, table_area] = Layout::vertical([
        Constraint::Length(if table.notice.is_some() || panel.is_awaiting() { 1 } else { 0 }),
        Constraint::Min(0),
    ])
    .areas(inner);

    if let Some(notice) = &table.notice {
        frame.render_widget(
            Paragraph::new(Span::styled(notice.clone(), Style::default().fg(Color::Red))),
            status_area,
        );
    } else if panel.is_awaiting() {
        frame.render_widget(
            Paragraph::new(Span::styled("Comparing...", Style::default().fg(Color::DarkGray))),
            status_area,
        );
    }

    let header = Row::new(table.headers.clone())
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = table
        .rows
        .iter()
        .map(|[spec, a, b]| {
            Row::new(vec![
                Span::styled(spec.clone(), Style::default().bold()),
                Span::raw(a.clone()),
                Span::raw(b.clone()),
            ])
        })
        .collect();

    let widget = Table::new(
        rows,
        [
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ],
    )
    .header(header);

    frame.render_widget(widget, table_area);
}

fn render_alert(message: &str, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 5.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Alert ");

    let text = Text::from(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled("Press Enter to dismiss", Style::default().fg(Color::DarkGray))),
    ]);

    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ComparisonResult, ComparisonRow, ManualsClient, Product};
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};
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

    fn draw(app: &mut App) -> Vec<String> {
        draw_sized(app, 120, 40)
    }

    fn draw_sized(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect()
    }

    fn contains(screen: &[String], needle: &str) -> bool {
        screen.iter().any(|row| row.contains(needle))
    }

    #[test]
    fn test_initial_screen() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(contains(&screen, "Choose a product..."));
        assert!(contains(&screen, "▶ Compare Products"));
        assert!(!contains(&screen, "Choose product A..."));
        assert!(app.chat_area.is_some());
    }

    #[test]
    fn test_expanded_panel_shows_table_rows() {
        let mut app = app();
        app.toggle_comparison();
        let pending = app.comparison.submit("p1", "p2").unwrap();
        app.resolve_comparison(
            pending.generation,
            Ok(ComparisonResult {
                product_a_name: "Phone One".to_string(),
                product_b_name: "Phone Two".to_string(),
                comparisons: vec![
                    ComparisonRow {
                        specification: "RAM".to_string(),
                        product_a_value: "8GB".to_string(),
                        product_b_value: "12GB".to_string(),
                    },
                    ComparisonRow {
                        specification: "Weight".to_string(),
                        product_a_value: "170g".to_string(),
                        product_b_value: "199g".to_string(),
                    },
                ],
                error: None,
            }),
        );

        let screen = draw(&mut app);
        assert!(contains(&screen, "▼ Compare Products"));
        assert!(contains(&screen, "Choose product A..."));
        assert!(contains(&screen, "Comparison Results"));
        let header_row = screen
            .iter()
            .find(|row| row.contains("Specification") && row.contains("Phone One"))
            .expect("table header rendered");
        assert!(header_row.contains("Phone Two"));
        assert!(contains(&screen, "12GB"));
        assert!(contains(&screen, "199g"));
    }

    #[test]
    fn test_chat_messages_and_alert_render() {
        let mut app = app();
        app.catalog.chat_product.select_value("p1");
        app.chat.question.set("How heavy is it?");
        let pending = app.chat.submit("p1").unwrap();

        let screen = draw(&mut app);
        assert!(contains(&screen, "You asked"));
        assert!(contains(&screen, "How heavy is it?"));
        assert!(contains(&screen, "Analyzing manuals"));

        app.chat.resolve(
            pending.token,
            Ok(crate::api::ChatResponse {
                answer: "It weighs **170g**.".to_string(),
                data_available: Some(true),
            }),
        );
        app.show_alert("Comparison failed.");

        let screen = draw(&mut app);
        assert!(contains(&screen, "It weighs 170g."));
        assert!(!contains(&screen, "Analyzing manuals"));
        assert!(contains(&screen, "Comparison failed."));
        assert!(contains(&screen, " ALERT "));
    }

    #[test]
    fn test_long_wrapped_answer_is_scrolled_into_view() {
        let mut app = app();
        // First frame records the real chat size
        draw_sized(&mut app, 80, 24);

        app.chat.question.set("Tell me everything");
        let pending = app.chat.submit("p1").unwrap();
        let answer = (0..60)
            .map(|i| format!("w{i:02}xxxxxxxxx"))
            .collect::<Vec<_>>()
            .join(" ");
        app.chat.resolve(
            pending.token,
            Ok(crate::api::ChatResponse {
                answer,
                data_available: Some(true),
            }),
        );

        let screen = draw_sized(&mut app, 80, 24);
        assert!(app.chat.log.scroll > 0);
        assert!(contains(&screen, "w59xxxxxxxxx"));
        assert!(contains(&screen, "Verified from dataset"));

        // Scrolling down cannot pass the end, and the end stays reachable
        app.chat.log.scroll_up(5);
        app.chat.log.scroll_down(100);
        let screen = draw_sized(&mut app, 80, 24);
        assert!(contains(&screen, "Verified from dataset"));
    }

    #[test]
    fn test_catalog_error_in_footer() {
        let mut app = app();
        app.catalog.load_error = Some("Could not load products".to_string());
        let screen = draw(&mut app);
        assert!(contains(&screen, "Could not load products (r to retry)"));
    }
}
