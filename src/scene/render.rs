//! Draw the scene into a ratzilla frame and register tap targets.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use super::{BakePhase, Mode, Scene, INVENTORY_SLOTS, KEY_BACK};
use crate::cafe::quest::{ClueId, ClueState, QUEST_TITLE, UNSOLVED_LABEL};
use crate::cafe::catalog::ingredient_label;
use crate::cafe::Cafe;
use crate::click::{is_narrow_layout, ClickState};

const LETTER: &str = "The café appreciates your endless curiosity. \
Every riddle you cracked was baked with love, and the cat insists on sharing the cake. \
Happy birthday!";

pub fn render(scene: &Scene, cafe: &Cafe, f: &mut Frame, click_state: &Rc<RefCell<ClickState>>) {
    let size = f.area();
    {
        let mut cs = click_state.borrow_mut();
        cs.terminal_cols = size.width;
        cs.terminal_rows = size.height;
        cs.clear_targets();
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    render_title(f, scene, main_chunks[0]);
    if is_narrow_layout(size.width) {
        render_narrow_layout(f, scene, cafe, main_chunks[1], click_state);
    } else {
        render_wide_layout(f, scene, cafe, main_chunks[1], click_state);
    }
    render_help(f, scene, main_chunks[2], click_state);
}

fn render_title(f: &mut Frame, scene: &Scene, area: Rect) {
    let (title, style) = match &scene.toast {
        Some(toast) => (
            format!("★ {toast} ★"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        None => (
            "☕ Virtual Cat Café".to_string(),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
    };
    let widget = Paragraph::new(Line::from(Span::styled(title, style)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

/// Wide layout: left (screen + actions) | right (cat + log)
fn render_wide_layout(
    f: &mut Frame,
    scene: &Scene,
    cafe: &Cafe,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    let action_height = (scene.actions.len() as u16 + 2).max(3);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(action_height)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(columns[1]);

    render_screen(f, scene, cafe, left[0]);
    render_actions(f, scene, left[1], click_state);
    render_cat(f, scene, right[0]);
    render_log(f, scene, right[1]);
}

/// Narrow layout: cat, screen, actions and log stacked
fn render_narrow_layout(
    f: &mut Frame,
    scene: &Scene,
    cafe: &Cafe,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let action_height = (scene.actions.len() as u16 + 2).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(action_height),
            Constraint::Length(5),
        ])
        .split(area);

    render_cat(f, scene, chunks[0]);
    render_screen(f, scene, cafe, chunks[1]);
    render_actions(f, scene, chunks[2], click_state);
    render_log(f, scene, chunks[3]);
}

fn panel(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {title} "))
}

fn dim(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::Gray)))
}

fn bold(text: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render_screen(f: &mut Frame, scene: &Scene, cafe: &Cafe, area: Rect) {
    let (title, color, lines) = match &scene.mode {
        Mode::Welcome => ("✧ Welcome ✧", Color::LightMagenta, welcome_lines()),
        Mode::Room => ("Café", Color::Green, room_lines(scene, cafe)),
        Mode::Bake => ("Baking Corner", Color::LightRed, bake_lines(scene)),
        Mode::Inventory => ("Inventory", Color::Magenta, inventory_lines(cafe)),
        Mode::RecipeBook => ("Recipe Book", Color::Cyan, recipe_book_lines(cafe)),
        Mode::Clue(clue) => ("Clue", Color::Yellow, clue_lines(cafe, *clue)),
        Mode::Letter => ("Letter", Color::LightYellow, vec![dim(LETTER)]),
    };
    let widget = Paragraph::new(lines)
        .block(panel(title, color))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        bold("Virtual Cat Café", Color::LightMagenta),
        Line::from(""),
        dim("I hope you enjoy this cat café I made for you!"),
        dim("You can bake! And... pet the cat! There are some cute surprises too!"),
    ]
}

fn room_lines(scene: &Scene, cafe: &Cafe) -> Vec<Line<'static>> {
    let status = cafe.quest.status();
    let mut lines = vec![
        dim("Sunlight pools on the checkered floor. An ivy plant, three frames and a window watch the counter."),
        Line::from(""),
        bold(QUEST_TITLE, Color::Yellow),
    ];
    if scene.discovered.is_empty() {
        lines.push(dim(status.intro));
    }
    for clue in &scene.discovered {
        if let Some(step) = status.steps.iter().find(|s| s.clue == *clue) {
            let color = if step.is_complete {
                Color::LightGreen
            } else {
                Color::DarkGray
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {} ", clue.glyph()), Style::default().fg(Color::Yellow)),
                Span::styled(step.label.clone(), Style::default().fg(color)),
            ]));
        }
    }
    if scene.parcel_visible(cafe) {
        lines.push(bold(
            "🎁 A ribboned package hums beneath the counter.",
            Color::LightMagenta,
        ));
    } else if status.is_surprise_claimed {
        lines.push(dim("🎉 Check your inventory, the confetti cake is ready to serve."));
    }
    lines
}

fn bake_lines(scene: &Scene) -> Vec<Line<'static>> {
    let mut lines = vec![
        dim("Choose 2 or 3 ingredients. Store finished treats to feed your cat later."),
        Line::from(""),
        bold(scene.selection_preview(), Color::White),
        Line::from(""),
    ];
    match &scene.bake {
        BakePhase::Choosing => {}
        BakePhase::Baking(_) => lines.push(bold("The oven hums... ♨", Color::LightRed)),
        BakePhase::Result { treat, stored } => {
            let color = if treat.is_fallback {
                Color::Gray
            } else {
                Color::LightYellow
            };
            lines.push(bold(treat.name.clone(), color));
            lines.push(dim(treat.description.clone()));
            if *stored {
                lines.push(dim("Visit your inventory to feed this treat."));
            }
        }
    }
    lines
}

fn inventory_lines(cafe: &Cafe) -> Vec<Line<'static>> {
    let items = cafe.inventory.newest_first();
    if items.is_empty() {
        return vec![dim("(the pantry is empty)")];
    }
    let mut lines: Vec<Line<'static>> = items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  {}", item.treat.name),
                Style::default().fg(Color::Magenta),
            ))
        })
        .collect();
    if items.len() > INVENTORY_SLOTS {
        lines.push(dim(format!(
            "Only the newest {INVENTORY_SLOTS} can be fed from here."
        )));
    }
    lines
}

fn recipe_ingredients(key: &str) -> String {
    key.split('+')
        .map(ingredient_label)
        .collect::<Vec<_>>()
        .join(" + ")
}

fn recipe_book_lines(cafe: &Cafe) -> Vec<Line<'static>> {
    let book = cafe.catalog.recipe_book();
    let found = book.iter().filter(|t| cafe.unlocks.contains(&t.key)).count();
    let mut lines = vec![dim(format!("{found}/{} recipes discovered", book.len()))];
    if found < book.len() {
        lines.push(dim("Experiment with new ingredient blends to reveal locked treats."));
    }
    for treat in book {
        lines.push(Line::from(""));
        if cafe.unlocks.contains(&treat.key) {
            lines.push(bold(format!("  {}", treat.name), Color::Cyan));
            lines.push(Line::from(Span::styled(
                format!("    Ingredients: {}", recipe_ingredients(&treat.key)),
                Style::default().fg(Color::White),
            )));
            lines.push(dim(format!("    {}", treat.description)));
        } else {
            lines.push(dim("  ★ Locked Recipe"));
            lines.push(dim("    Ingredients: ???"));
        }
    }
    lines
}

fn clue_lines(cafe: &Cafe, clue: ClueId) -> Vec<Line<'static>> {
    let mut lines = vec![bold(
        format!("{} Hidden in {}", clue.glyph(), clue.location()),
        Color::Yellow,
    )];
    let Some(requirement) = cafe.quest.requirement(clue) else {
        return lines;
    };
    match cafe.quest.clue_state(clue) {
        Some(ClueState::Solved(key)) => {
            let name = cafe.catalog.lookup_by_key(key).name.clone();
            lines.push(bold(format!("Solved: {name}"), Color::LightGreen));
        }
        _ => lines.push(bold(UNSOLVED_LABEL, Color::DarkGray)),
    }
    lines.push(Line::from(""));
    lines.push(dim(requirement.hint));
    lines
}

fn render_cat(f: &mut Frame, scene: &Scene, area: Rect) {
    let face = if scene.is_sleeping() { "(=-.-=) zZ" } else { "(=^.^=)" };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{face} "), Style::default().fg(Color::LightYellow)),
        Span::styled(scene.reaction.mood, Style::default().fg(Color::Gray)),
    ])];
    lines.push(dim(scene.cat_label.clone()));
    if scene.is_speaking {
        lines.push(Line::from(Span::styled(
            format!("“{}”", scene.reaction.message),
            Style::default().fg(Color::White),
        )));
    }
    let widget = Paragraph::new(lines)
        .block(panel("Café Cat", Color::LightYellow))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_actions(
    f: &mut Frame,
    scene: &Scene,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let items: Vec<ListItem> = scene
        .actions
        .iter()
        .map(|a| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" [{}] ", a.key.to_uppercase()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(a.label.as_str(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();
    let widget = List::new(items).block(panel("▶ Actions (tap to choose)", Color::Yellow));
    f.render_widget(widget, area);

    // first row sits under the top border
    let mut cs = click_state.borrow_mut();
    let visible = area.height.saturating_sub(2) as usize;
    for (i, action) in scene.actions.iter().take(visible).enumerate() {
        cs.add_target(area.y + 1 + i as u16, action.key);
    }
}

fn render_log(f: &mut Frame, scene: &Scene, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start = scene.log.len().saturating_sub(visible_height);

    let lines: Vec<Line> = scene.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(panel("Log", Color::Blue))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_help(
    f: &mut Frame,
    scene: &Scene,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (text, key) = match scene.mode {
        Mode::Welcome => ("[E] Enter the café", 'e'),
        Mode::Room => ("[P] Pet the cat", 'p'),
        _ => ("[Q/Esc] Back", KEY_BACK),
    };
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);

    click_state
        .borrow_mut()
        .add_span(area.y, area.height, key);
}
