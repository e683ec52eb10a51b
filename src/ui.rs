use ratatui::{prelude::*, widgets::*};

use crate::app::{App, FocusedPane, Mode};

pub fn render(f: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Max(3)])
        .split(f.size());

    if let [content_area, instructions_area] = main_chunks[..] {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(content_area);

        if let [devices_area, options_area] = content_chunks[..] {
            if app.mode == Mode::Whitelist {
                render_whitelist_pane(f, app, devices_area);
            } else {
                render_devices_pane(f, app, devices_area);
            }
            render_options_pane(f, app, options_area);
            render_instructions(f, app, instructions_area);
        }
    }
}

fn render_devices_pane(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.is_focused(FocusedPane::Devices);

    let items: Vec<ListItem> = app
        .devices
        .iter()
        .map(|d| ListItem::new(format!("{}  (id {})", d.name, d.id)))
        .collect();

    let list = List::new(items)
        .block(create_block("Devices", is_focused))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut app.device_list_state.clone());
}

fn render_whitelist_pane(f: &mut Frame, app: &App, area: Rect) {
    let whitelist = app.config.whitelist_set();

    let items: Vec<ListItem> = app
        .all_devices
        .iter()
        .map(|d| {
            let mark = if whitelist.contains(&d.key()) {
                "✅"
            } else {
                "  "
            };
            ListItem::new(format!("{} {}  (id {})", mark, d.name, d.id))
        })
        .collect();

    let list = List::new(items)
        .block(create_block("Whitelist", true))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut app.whitelist_list_state.clone());
}

fn render_options_pane(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.mode == Mode::Normal && app.is_focused(FocusedPane::Options);

    let Some(device) = app.selected_device() else {
        f.render_widget(create_block("Options", is_focused), area);
        return;
    };

    let title = format!("Options: {}  (id {})", device.name, device.id);
    let on_off = |v: bool| if v { "On" } else { "Off" };

    let items = vec![
        ListItem::new(format!("{:<16} <{:+.2}>", "Speed:", app.speed_as_float())),
        ListItem::new(format!(
            "{:<16} <{}>",
            "Extended (CTM):",
            on_off(app.extended)
        )),
        ListItem::new(format!("{:<16} <{}>", "Save by ID:", on_off(app.save_by_id))),
        ListItem::new(format!(
            "{:<16} <{}>",
            "Only whitelist:",
            on_off(app.config.show_only_whitelist)
        )),
        ListItem::new(
            Line::from("-> Apply All Profiles <-")
                .style(Style::default().fg(Color::Green))
                .alignment(Alignment::Center),
        ),
        ListItem::new(Line::from("Refresh Devices").alignment(Alignment::Center)),
        ListItem::new(
            Line::from("-> Edit Whitelist <-")
                .style(Style::default().fg(Color::Cyan))
                .alignment(Alignment::Center),
        ),
    ];

    let list = List::new(items)
        .block(create_block(&title, is_focused))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::Blue),
        );

    f.render_stateful_widget(list, area, &mut app.option_list_state.clone());
}

fn render_instructions(f: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(msg) = &app.info_message {
        msg.clone()
    } else if app.mode == Mode::Whitelist {
        String::from("↑/↓: Navigate | Enter/Space: Toggle Device | Esc: Done")
    } else {
        String::from(
            "Tab: Switch Panes | ↑/↓: Navigate | ←/→: Change Value | Enter: Execute Action | q: Quit",
        )
    };

    let color = if app.info_message.is_some() {
        Color::Cyan
    } else {
        Color::Yellow
    };

    let instructions = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::Reset)),
        );

    f.render_widget(instructions, area);
}

fn create_block(title: &str, is_focused: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(if is_focused {
            Color::Blue
        } else {
            Color::Reset
        }))
}
