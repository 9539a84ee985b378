use crate::config::PlayerNames;
use crate::game::{Cell, Player};
use crate::stats::GameStats;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::board_view::{BoardView, ViewStatus};

const STATS_LINES: usize = 8;

pub fn render(
    frame: &mut Frame,
    view: &BoardView,
    selected_column: usize,
    message: &Option<String>,
    names: &PlayerNames,
    stats: &GameStats,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(board_height(view.rows())), // Board + stats
            Constraint::Length(3),  // Message
            Constraint::Length(4),  // Controls
        ])
        .split(frame.area());

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_header(frame, view, names, chunks[0]);
    render_board(frame, view, selected_column, middle[0]);
    render_stats(frame, stats, names, middle[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

/// Rows plus the column labels, both borders and the selection marker.
fn board_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(4)
}

fn player_color(player: Player) -> Color {
    match player {
        Player::Player1 => Color::Red,
        Player::Player2 => Color::Yellow,
    }
}

fn render_header(frame: &mut Frame, view: &BoardView, names: &PlayerNames, area: Rect) {
    let mode = view.mode().map(|m| m.label()).unwrap_or("No game");
    let (status, color) = match view.status() {
        ViewStatus::Idle => ("Not in play  |  press s or t to start".to_string(), Color::Gray),
        ViewStatus::InPlay => (
            format!("{}'s turn  |  {}", names.name(view.turn()), mode),
            player_color(view.turn()),
        ),
        ViewStatus::Won { owner, .. } => (
            format!("{} wins!  |  {}", names.name(owner), mode),
            player_color(owner),
        ),
        ViewStatus::Drawn => (format!("Draw  |  {}", mode), Color::Gray),
        ViewStatus::Stopped => ("Left the game".to_string(), Color::Gray),
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connect Four"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, view: &BoardView, selected_column: usize, area: Rect) {
    let columns = view.columns();
    let winning_cell = match view.status() {
        ViewStatus::Won { row, col, .. } => Some((row, col)),
        _ => None,
    };
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")]; // Padding (3 chars to match "  ║")
    for col in 0..columns {
        let label = format!("{:^3}", (col + 1) % 100);
        if col == selected_column {
            col_line.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(label));
        }
    }
    col_line.push(Span::raw("  ")); // Suffix padding to match " ║"
    lines.push(Line::from(col_line));

    let rule = "═".repeat(columns * 3 + 1);
    lines.push(Line::from(format!("  ╔{}╗", rule)));

    for row in 0..view.rows() {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..columns {
            let (symbol, color) = match view.cell(row, col) {
                Cell::Empty => (" . ", Color::DarkGray),
                Cell::Player1 => (" ● ", player_color(Player::Player1)),
                Cell::Player2 => (" ● ", player_color(Player::Player2)),
            };
            let mut style = Style::default().fg(color);
            if winning_cell == Some((row, col)) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            row_spans.push(Span::styled(symbol, style));
        }

        row_spans.push(Span::raw(" ║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from(format!("  ╚{}╝", rule)));

    // Selection indicator
    let mut indicator_line = vec![Span::raw("   ")];
    for col in 0..columns {
        if col == selected_column {
            indicator_line.push(Span::styled(" ▲ ", Style::default().fg(Color::Cyan)));
        } else {
            indicator_line.push(Span::raw("   "));
        }
    }
    indicator_line.push(Span::raw("  "));
    lines.push(Line::from(indicator_line));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_stats(frame: &mut Frame, stats: &GameStats, names: &PlayerNames, area: Rect) {
    let mut lines = vec![
        Line::from(format!("Games finished: {}", stats.total_games())),
        Line::from(format!(
            "{}: {:.0}%  {}: {:.0}%  Draw: {:.0}%",
            names.player1,
            stats.win_rate(Player::Player1, 100) * 100.0,
            names.player2,
            stats.win_rate(Player::Player2, 100) * 100.0,
            stats.draw_rate(100) * 100.0,
        )),
        Line::from(""),
    ];

    lines.extend(
        stats
            .recent_log(STATS_LINES)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Gray)))),
    );

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Stats"));
    frame.render_widget(widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line1 = Line::from("←/→: Move  |  Enter: Drop  |  X: Leave game  |  Q: Quit");
    let line2 = Line::from(vec![
        Span::styled("New game", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(": s Single player (vs computer)   t Two player"),
    ]);

    let controls = Paragraph::new(vec![line1, line2])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_height_saturates() {
        assert_eq!(board_height(6), 10);
        assert_eq!(board_height(70_000), u16::MAX);
        assert_eq!(board_height(usize::from(u16::MAX) - 1), u16::MAX);
    }
}
